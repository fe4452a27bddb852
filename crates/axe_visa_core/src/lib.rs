pub mod domain;
pub mod policy;
pub mod ports;

pub use domain::{
    Applicant, ApplicationKind, ApplicationRecord, ApplicationStatus, Credentials, ExpertProfile,
    LetterKind, LetterTemplate, PlatformDocument, Role, Session,
};
pub use policy::{PolicyError, PolicyResult};
pub use ports::{DatabaseService, PortError, PortResult};
