//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

use axe_visa_core::domain::{
    Applicant, ApplicationKind, ApplicationRecord, ApplicationStatus, Credentials, ExpertProfile,
    LetterKind, LetterTemplate, PlatformDocument, Role,
};
use axe_visa_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn not_found(e: sqlx::Error, what: &str) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what.to_string()),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> Credentials {
        Credentials {
            subject_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    subject_id: Uuid,
    role: String,
    expires_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ApplicationRow {
    id: Uuid,
    kind: String,
    applicant_fields: Json<BTreeMap<String, String>>,
    status: String,
    assigned_expert_id: Option<Uuid>,
    reason: Option<String>,
    admin_reason: Option<String>,
    attached_documents: Json<BTreeMap<String, String>>,
    created_at: DateTime<Utc>,
}
impl ApplicationRow {
    fn to_domain(self) -> PortResult<ApplicationRecord> {
        let kind = ApplicationKind::parse(&self.kind)
            .ok_or_else(|| PortError::Unexpected(format!("bad kind column: {}", self.kind)))?;
        let status = ApplicationStatus::parse(&self.status)
            .ok_or_else(|| PortError::Unexpected(format!("bad status column: {}", self.status)))?;
        Ok(ApplicationRecord {
            id: self.id,
            kind,
            applicant_fields: self.applicant_fields.0,
            status,
            assigned_expert_id: self.assigned_expert_id,
            reason: self.reason,
            admin_reason: self.admin_reason,
            attached_documents: self.attached_documents.0,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ExpertRecord {
    id: Uuid,
    full_name: String,
    email: String,
    phone: String,
    experience_years: i32,
    expertise: String,
    countries: String,
    company_name: String,
    office_address: String,
    working_hours: String,
    terms_accepted: bool,
    created_at: DateTime<Utc>,
}
impl ExpertRecord {
    fn to_domain(self) -> ExpertProfile {
        ExpertProfile {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            experience_years: self.experience_years,
            expertise: self.expertise,
            countries: self.countries,
            company_name: self.company_name,
            office_address: self.office_address,
            working_hours: self.working_hours,
            terms_accepted: self.terms_accepted,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ApplicantRecord {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}
impl ApplicantRecord {
    fn to_domain(self) -> Applicant {
        Applicant {
            id: self.id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: Uuid,
    title: String,
    file_ref: String,
    created_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> PlatformDocument {
        PlatformDocument {
            id: self.id,
            title: self.title,
            file_ref: self.file_ref,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LetterRecord {
    id: Uuid,
    kind: String,
    fields: Json<BTreeMap<String, String>>,
    letter_body: String,
    created_at: DateTime<Utc>,
}
impl LetterRecord {
    fn to_domain(self) -> PortResult<LetterTemplate> {
        let kind = LetterKind::parse(&self.kind)
            .ok_or_else(|| PortError::Unexpected(format!("bad letter kind: {}", self.kind)))?;
        Ok(LetterTemplate {
            id: self.id,
            kind,
            fields: self.fields.0,
            letter_body: self.letter_body,
            created_at: self.created_at,
        })
    }
}

const APPLICATION_COLUMNS: &str = "id, kind, applicant_fields, status, assigned_expert_id, \
     reason, admin_reason, attached_documents, created_at";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_admin_by_email(&self, email: &str) -> PortResult<Credentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM admins WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, "admin account"))?;
        Ok(record.to_domain())
    }

    async fn get_expert_credentials_by_email(&self, email: &str) -> PortResult<Credentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM experts WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, "expert account"))?;
        Ok(record.to_domain())
    }

    async fn create_expert(
        &self,
        profile: ExpertProfile,
        hashed_password: &str,
    ) -> PortResult<ExpertProfile> {
        sqlx::query(
            "INSERT INTO experts (id, full_name, email, phone, experience_years, expertise, \
             countries, company_name, office_address, working_hours, terms_accepted, \
             hashed_password, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.experience_years)
        .bind(&profile.expertise)
        .bind(&profile.countries)
        .bind(&profile.company_name)
        .bind(&profile.office_address)
        .bind(&profile.working_hours)
        .bind(profile.terms_accepted)
        .bind(hashed_password)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(profile)
    }

    async fn create_auth_session(
        &self,
        token: &str,
        subject_id: Uuid,
        role: Role,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (token, subject_id, role, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(token)
        .bind(subject_id)
        .bind(role.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<(Uuid, Role)> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT subject_id, role, expires_at FROM auth_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;

        if record.expires_at <= Utc::now() {
            return Err(PortError::Unauthorized);
        }
        let role = Role::parse(&record.role)
            .ok_or_else(|| PortError::Unexpected(format!("bad role column: {}", record.role)))?;
        Ok((record.subject_id, role))
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn list_applications(&self, kind: ApplicationKind) -> PortResult<Vec<ApplicationRecord>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE kind = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_applications_for_expert(
        &self,
        kind: ApplicationKind,
        expert_id: Uuid,
    ) -> PortResult<Vec<ApplicationRecord>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE kind = $1 AND assigned_expert_id = $2 \
             ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(expert_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        rows.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_application(
        &self,
        kind: ApplicationKind,
        id: Uuid,
    ) -> PortResult<ApplicationRecord> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE kind = $1 AND id = $2",
            APPLICATION_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, "application record"))?;
        row.to_domain()
    }

    async fn update_application(&self, record: &ApplicationRecord) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE applications SET status = $1, reason = $2, admin_reason = $3, \
             assigned_expert_id = $4 WHERE id = $5 AND kind = $6",
        )
        .bind(record.status.as_str())
        .bind(&record.reason)
        .bind(&record.admin_reason)
        .bind(record.assigned_expert_id)
        .bind(record.id)
        .bind(record.kind.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("application record".to_string()));
        }
        Ok(())
    }

    async fn delete_application(&self, kind: ApplicationKind, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM applications WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("application record".to_string()));
        }
        Ok(())
    }

    async fn list_experts(&self) -> PortResult<Vec<ExpertProfile>> {
        let records = sqlx::query_as::<_, ExpertRecord>(
            "SELECT id, full_name, email, phone, experience_years, expertise, countries, \
             company_name, office_address, working_hours, terms_accepted, created_at \
             FROM experts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_expert(&self, id: Uuid) -> PortResult<ExpertProfile> {
        let record = sqlx::query_as::<_, ExpertRecord>(
            "SELECT id, full_name, email, phone, experience_years, expertise, countries, \
             company_name, office_address, working_hours, terms_accepted, created_at \
             FROM experts WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, "expert"))?;
        Ok(record.to_domain())
    }

    async fn delete_expert(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM experts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("expert".to_string()));
        }
        Ok(())
    }

    async fn list_applicants(&self) -> PortResult<Vec<Applicant>> {
        let records = sqlx::query_as::<_, ApplicantRecord>(
            "SELECT id, name, email, created_at FROM applicants ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_applicant(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM applicants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("applicant".to_string()));
        }
        Ok(())
    }

    async fn list_documents(&self) -> PortResult<Vec<PlatformDocument>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, title, file_ref, created_at FROM platform_documents \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_document(&self, title: &str, file_ref: &str) -> PortResult<PlatformDocument> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO platform_documents (id, title, file_ref) VALUES ($1, $2, $3) \
             RETURNING id, title, file_ref, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(file_ref)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn delete_document(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM platform_documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("platform document".to_string()));
        }
        Ok(())
    }

    async fn list_letters(&self, kind: LetterKind) -> PortResult<Vec<LetterTemplate>> {
        let records = sqlx::query_as::<_, LetterRecord>(
            "SELECT id, kind, fields, letter_body, created_at FROM letter_templates \
             WHERE kind = $1 ORDER BY created_at DESC",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn create_letter(&self, template: LetterTemplate) -> PortResult<LetterTemplate> {
        sqlx::query(
            "INSERT INTO letter_templates (id, kind, fields, letter_body, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(template.id)
        .bind(template.kind.as_str())
        .bind(Json(&template.fields))
        .bind(&template.letter_body)
        .bind(template.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(template)
    }
}
