//! crates/axe_visa_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Applicant, ApplicationKind, ApplicationRecord, Credentials, ExpertProfile, LetterKind,
    LetterTemplate, PlatformDocument, Role,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Credentials ---
    async fn get_admin_by_email(&self, email: &str) -> PortResult<Credentials>;

    async fn get_expert_credentials_by_email(&self, email: &str) -> PortResult<Credentials>;

    async fn create_expert(
        &self,
        profile: ExpertProfile,
        hashed_password: &str,
    ) -> PortResult<ExpertProfile>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        token: &str,
        subject_id: Uuid,
        role: Role,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session token to the subject it was issued for.
    /// Expired or unknown tokens fail with `Unauthorized`.
    async fn validate_auth_session(&self, token: &str) -> PortResult<(Uuid, Role)>;

    async fn delete_auth_session(&self, token: &str) -> PortResult<()>;

    // --- Application Records ---
    async fn list_applications(&self, kind: ApplicationKind) -> PortResult<Vec<ApplicationRecord>>;

    /// Server-side ownership scoping for expert listings.
    async fn list_applications_for_expert(
        &self,
        kind: ApplicationKind,
        expert_id: Uuid,
    ) -> PortResult<Vec<ApplicationRecord>>;

    async fn get_application(
        &self,
        kind: ApplicationKind,
        id: Uuid,
    ) -> PortResult<ApplicationRecord>;

    async fn update_application(&self, record: &ApplicationRecord) -> PortResult<()>;

    async fn delete_application(&self, kind: ApplicationKind, id: Uuid) -> PortResult<()>;

    // --- Expert Directory ---
    async fn list_experts(&self) -> PortResult<Vec<ExpertProfile>>;

    async fn get_expert(&self, id: Uuid) -> PortResult<ExpertProfile>;

    async fn delete_expert(&self, id: Uuid) -> PortResult<()>;

    // --- Applicants ---
    async fn list_applicants(&self) -> PortResult<Vec<Applicant>>;

    async fn delete_applicant(&self, id: Uuid) -> PortResult<()>;

    // --- Platform Documents ---
    async fn list_documents(&self) -> PortResult<Vec<PlatformDocument>>;

    async fn create_document(&self, title: &str, file_ref: &str) -> PortResult<PlatformDocument>;

    async fn delete_document(&self, id: Uuid) -> PortResult<()>;

    // --- Letter Templates ---
    async fn list_letters(&self, kind: LetterKind) -> PortResult<Vec<LetterTemplate>>;

    async fn create_letter(&self, template: LetterTemplate) -> PortResult<LetterTemplate>;
}
