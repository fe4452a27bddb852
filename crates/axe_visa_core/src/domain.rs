//! crates/axe_visa_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The role attached to an authenticated dashboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Expert,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "expert" => Some(Role::Expert),
            _ => None,
        }
    }
}

/// An authenticated session. Exactly one is active in a client at a time;
/// established at login, cleared at logout or when the credential expires.
///
/// Always passed explicitly into the policy and into data fetches. The core
/// never reads ambient state (cookies, globals) to discover who is acting.
#[derive(Debug, Clone)]
pub struct Session {
    pub role: Role,
    pub subject_id: Uuid,
    pub token: String,
}

/// The three application families the dashboard manages. The lifecycle
/// policy is identical for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationKind {
    Kyc,
    Passport,
    Visa,
}

impl ApplicationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationKind::Kyc => "kyc",
            ApplicationKind::Passport => "passport",
            ApplicationKind::Visa => "visa",
        }
    }

    pub fn parse(s: &str) -> Option<ApplicationKind> {
        match s {
            "kyc" => Some(ApplicationKind::Kyc),
            "passport" => Some(ApplicationKind::Passport),
            "visa" => Some(ApplicationKind::Visa),
            _ => None,
        }
    }
}

/// Lifecycle status of an application record.
///
/// Starts at `Pending`. The only transitions are `Pending -> Approved` and
/// `Pending -> Rejected`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<ApplicationStatus> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "approved" => Some(ApplicationStatus::Approved),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    /// True for `Approved` and `Rejected`, the two terminal sinks.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

/// A KYC submission, passport application, or visa application.
///
/// `applicant_fields` carries the free-form applicant data (name, address,
/// country, dates) and `attached_documents` maps a document slot name to an
/// opaque stored-file reference. Neither is interpreted by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub kind: ApplicationKind,
    pub applicant_fields: BTreeMap<String, String>,
    pub status: ApplicationStatus,
    pub assigned_expert_id: Option<Uuid>,
    /// Rationale supplied by the expert performing a status transition.
    pub reason: Option<String>,
    /// Free-text annotation visible to admins only.
    pub admin_reason: Option<String>,
    pub attached_documents: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// A verification expert. Created through the signup flow; read-mostly after.
#[derive(Debug, Clone)]
pub struct ExpertProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience_years: i32,
    pub expertise: String,
    pub countries: String,
    pub company_name: String,
    pub office_address: String,
    pub working_hours: String,
    pub terms_accepted: bool,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct Credentials {
    pub subject_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// An applicant account (the "All Users" listing).
#[derive(Debug, Clone)]
pub struct Applicant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A platform-level supporting document managed by admins.
#[derive(Debug, Clone)]
pub struct PlatformDocument {
    pub id: Uuid,
    pub title: String,
    pub file_ref: String,
    pub created_at: DateTime<Utc>,
}

/// The supporting letter templates the dashboard manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterKind {
    CoverLetter,
    Noc,
    Sponsorship,
}

impl LetterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterKind::CoverLetter => "cover-letter",
            LetterKind::Noc => "noc",
            LetterKind::Sponsorship => "sponsorship",
        }
    }

    pub fn parse(s: &str) -> Option<LetterKind> {
        match s {
            "cover-letter" => Some(LetterKind::CoverLetter),
            "noc" => Some(LetterKind::Noc),
            "sponsorship" => Some(LetterKind::Sponsorship),
            _ => None,
        }
    }
}

/// A submitted letter template (cover letter, NOC, sponsorship letter).
#[derive(Debug, Clone)]
pub struct LetterTemplate {
    pub id: Uuid,
    pub kind: LetterKind,
    pub fields: BTreeMap<String, String>,
    pub letter_body: String,
    pub created_at: DateTime<Utc>,
}
