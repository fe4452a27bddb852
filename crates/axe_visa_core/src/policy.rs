//! crates/axe_visa_core/src/policy.rs
//!
//! The access and lifecycle policy: the single source of truth for "what can
//! this session do to this record". Every list and detail screen consults
//! these functions instead of branching on the role inline.
//!
//! All functions are pure over the caller-supplied session and record
//! snapshot. Persistence ordering and conflict resolution belong to the
//! database layer; the policy only decides whether an action is permitted
//! and what the resulting record value would be.

use crate::domain::{ApplicationRecord, ApplicationStatus, Role, Session};
use uuid::Uuid;

/// Why a policy operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// The action is not permitted for this role/ownership combination.
    #[error("operation not permitted for this session")]
    Forbidden,
    /// A required input was missing or malformed (e.g. an empty reason).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The record id could not be resolved. Produced by the storage layer
    /// and passed through unchanged.
    #[error("record not found")]
    NotFound,
}

pub type PolicyResult<T> = Result<T, PolicyError>;

fn owns(session: &Session, record: &ApplicationRecord) -> bool {
    record.assigned_expert_id == Some(session.subject_id)
}

/// Whether the session may see the record's detail view at all.
///
/// Admins see everything. An expert sees only records assigned to them;
/// expert-scoped list endpoints are already filtered server-side, so this
/// guards the single-record path.
pub fn can_view(session: &Session, record: &ApplicationRecord) -> bool {
    match session.role {
        Role::Admin => true,
        Role::Expert => owns(session, record),
    }
}

/// Whether the session may edit arbitrary record fields (the admin
/// annotation included). Experts transition status and annotate a reason
/// but never edit fields.
pub fn can_edit(session: &Session, _record: &ApplicationRecord) -> bool {
    session.role == Role::Admin
}

/// Whether the session may delete the record. Deletion is irreversible and
/// admin-only.
pub fn can_delete(session: &Session, _record: &ApplicationRecord) -> bool {
    session.role == Role::Admin
}

/// Whether the session may assign (or re-assign) an expert to a record.
/// Assignment is distinct from a status transition and is allowed in any
/// status.
pub fn can_assign_expert(session: &Session) -> bool {
    session.role == Role::Admin
}

/// The set of statuses this session may move the record to.
///
/// Empty unless the record is still pending, the session is an expert, and
/// that expert owns the record. This is the single gate evaluated both
/// before rendering Accept/Reject controls and before accepting a transition
/// request; any ambiguity about role or ownership yields no transitions.
pub fn available_transitions(
    session: &Session,
    record: &ApplicationRecord,
) -> Vec<ApplicationStatus> {
    if record.status != ApplicationStatus::Pending {
        return Vec::new();
    }
    if session.role != Role::Expert || !owns(session, record) {
        return Vec::new();
    }
    vec![ApplicationStatus::Approved, ApplicationStatus::Rejected]
}

/// Applies a status transition, returning the updated record value.
///
/// Re-validates everything the UI should already have checked: the target
/// must be in [`available_transitions`] and the reason must be non-empty.
/// Terminal records never reach the mutation path because their available
/// set is empty, which makes the precondition check subsume the
/// terminal-state guard.
pub fn apply_transition(
    session: &Session,
    record: &ApplicationRecord,
    target: ApplicationStatus,
    reason: &str,
) -> PolicyResult<ApplicationRecord> {
    if !available_transitions(session, record).contains(&target) {
        return Err(PolicyError::Forbidden);
    }
    if reason.trim().is_empty() {
        return Err(PolicyError::InvalidInput(
            "a reason is required to accept or reject".to_string(),
        ));
    }
    let mut updated = record.clone();
    updated.status = target;
    updated.reason = Some(reason.trim().to_string());
    Ok(updated)
}

/// Assigns an expert to the record, leaving the status untouched.
pub fn assign_expert(
    session: &Session,
    record: &ApplicationRecord,
    expert_id: Uuid,
) -> PolicyResult<ApplicationRecord> {
    if !can_assign_expert(session) {
        return Err(PolicyError::Forbidden);
    }
    let mut updated = record.clone();
    updated.assigned_expert_id = Some(expert_id);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApplicationKind;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn session(role: Role) -> Session {
        Session {
            role,
            subject_id: Uuid::new_v4(),
            token: "test-token".to_string(),
        }
    }

    fn record(status: ApplicationStatus, assigned: Option<Uuid>) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            kind: ApplicationKind::Kyc,
            applicant_fields: BTreeMap::new(),
            status,
            assigned_expert_id: assigned,
            reason: None,
            admin_reason: None,
            attached_documents: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    fn owning_expert(status: ApplicationStatus) -> (Session, ApplicationRecord) {
        let s = session(Role::Expert);
        let r = record(status, Some(s.subject_id));
        (s, r)
    }

    #[test]
    fn terminal_records_offer_no_transitions_for_any_role() {
        for status in [ApplicationStatus::Approved, ApplicationStatus::Rejected] {
            let (expert, owned) = owning_expert(status);
            assert!(available_transitions(&expert, &owned).is_empty());

            let admin = session(Role::Admin);
            let r = record(status, None);
            assert!(available_transitions(&admin, &r).is_empty());
        }
    }

    #[test]
    fn admin_can_edit_and_delete_everything() {
        let admin = session(Role::Admin);
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Approved,
            ApplicationStatus::Rejected,
        ] {
            let r = record(status, Some(Uuid::new_v4()));
            assert!(can_view(&admin, &r));
            assert!(can_edit(&admin, &r));
            assert!(can_delete(&admin, &r));
        }
    }

    #[test]
    fn admin_never_gets_status_transitions() {
        let admin = session(Role::Admin);
        let r = record(ApplicationStatus::Pending, Some(admin.subject_id));
        assert!(available_transitions(&admin, &r).is_empty());
        assert_eq!(
            apply_transition(&admin, &r, ApplicationStatus::Approved, "looks fine"),
            Err(PolicyError::Forbidden)
        );
    }

    #[test]
    fn non_owning_expert_is_denied_everything() {
        let expert = session(Role::Expert);
        let r = record(ApplicationStatus::Pending, Some(Uuid::new_v4()));

        assert!(!can_view(&expert, &r));
        assert!(!can_edit(&expert, &r));
        assert!(!can_delete(&expert, &r));
        assert!(!can_assign_expert(&expert));
        assert!(available_transitions(&expert, &r).is_empty());
        assert_eq!(
            apply_transition(&expert, &r, ApplicationStatus::Rejected, "x"),
            Err(PolicyError::Forbidden)
        );
        assert_eq!(
            assign_expert(&expert, &r, Uuid::new_v4()),
            Err(PolicyError::Forbidden)
        );
    }

    #[test]
    fn unassigned_record_offers_no_transitions_to_experts() {
        let expert = session(Role::Expert);
        let r = record(ApplicationStatus::Pending, None);
        assert!(available_transitions(&expert, &r).is_empty());
    }

    #[test]
    fn owning_expert_sees_both_transitions_on_pending() {
        let (expert, r) = owning_expert(ApplicationStatus::Pending);
        assert!(can_view(&expert, &r));
        let transitions = available_transitions(&expert, &r);
        assert!(transitions.contains(&ApplicationStatus::Approved));
        assert!(transitions.contains(&ApplicationStatus::Rejected));
        assert_eq!(transitions.len(), 2);
    }

    #[test]
    fn approve_with_reason_updates_status_and_reason_only() {
        let (expert, r) = owning_expert(ApplicationStatus::Pending);
        let updated = apply_transition(&expert, &r, ApplicationStatus::Approved, "docs verified")
            .expect("owning expert may approve a pending record");
        assert_eq!(updated.status, ApplicationStatus::Approved);
        assert_eq!(updated.reason.as_deref(), Some("docs verified"));
        assert_eq!(updated.assigned_expert_id, r.assigned_expert_id);
        assert_eq!(updated.id, r.id);
        // The input snapshot is untouched.
        assert_eq!(r.status, ApplicationStatus::Pending);
    }

    #[test]
    fn empty_or_blank_reason_is_invalid_input() {
        let (expert, r) = owning_expert(ApplicationStatus::Pending);
        for reason in ["", "   ", "\t\n"] {
            let err = apply_transition(&expert, &r, ApplicationStatus::Rejected, reason)
                .expect_err("blank reason must be rejected");
            assert!(matches!(err, PolicyError::InvalidInput(_)));
        }
        // The record is unchanged after the failed attempts.
        assert_eq!(r.status, ApplicationStatus::Pending);
        assert!(r.reason.is_none());
    }

    #[test]
    fn transition_to_pending_is_never_available() {
        let (expert, r) = owning_expert(ApplicationStatus::Pending);
        assert_eq!(
            apply_transition(&expert, &r, ApplicationStatus::Pending, "revert"),
            Err(PolicyError::Forbidden)
        );
    }

    #[test]
    fn approved_record_is_never_transitioned_again() {
        let (expert, r) = owning_expert(ApplicationStatus::Pending);
        let approved = apply_transition(&expert, &r, ApplicationStatus::Approved, "ok").unwrap();

        for target in [ApplicationStatus::Approved, ApplicationStatus::Rejected] {
            assert_eq!(
                apply_transition(&expert, &approved, target, "again"),
                Err(PolicyError::Forbidden)
            );
        }
        assert_eq!(approved.status, ApplicationStatus::Approved);
        assert_eq!(approved.reason.as_deref(), Some("ok"));
    }

    #[test]
    fn admin_assigns_expert_without_touching_status() {
        let admin = session(Role::Admin);
        let r = record(ApplicationStatus::Pending, None);
        let expert_id = Uuid::new_v4();

        let updated = assign_expert(&admin, &r, expert_id).unwrap();
        assert_eq!(updated.assigned_expert_id, Some(expert_id));
        assert_eq!(updated.status, ApplicationStatus::Pending);
    }

    #[test]
    fn admin_can_reassign_regardless_of_status() {
        let admin = session(Role::Admin);
        for status in [ApplicationStatus::Approved, ApplicationStatus::Rejected] {
            let r = record(status, Some(Uuid::new_v4()));
            let new_expert = Uuid::new_v4();
            let updated = assign_expert(&admin, &r, new_expert).unwrap();
            assert_eq!(updated.assigned_expert_id, Some(new_expert));
            assert_eq!(updated.status, status);
        }
    }
}
