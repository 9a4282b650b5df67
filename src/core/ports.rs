// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the assignment store, the reference data store and the identity service as traits.
//
// Responsibilities
// - The assignment store owns the (session, student) uniqueness guarantee. `insert` must check
//   and claim every pair in one atomic step.
// - `save` is optimistic: it only succeeds when the stored version equals the expected version.
//
// Testing guidance
// - In memory implementations live in the adapters layer and double as local development
//   backends.

use crate::core::assignment::Assignment;
use crate::core::reference::{Actor, ExamSession, Hall, Invigilator, Student, StudentFilter};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("student {student_id} already has an assignment for exam {session_id}")]
    Duplicate {
        session_id: String,
        student_id: String,
    },

    #[error("assignment {0} does not exist")]
    Missing(String),

    #[error("version mismatch: expected {expected}, actual {actual}")]
    VersionMismatch { expected: u64, actual: u64 },

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    async fn insert(&self, assignment: Assignment) -> Result<Assignment, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Assignment>, StoreError>;

    /// Replaces the stored assignment and returns it with its version bumped.
    async fn save(
        &self,
        assignment: Assignment,
        expected_version: u64,
    ) -> Result<Assignment, StoreError>;

    async fn remove(&self, id: &str) -> Result<Option<Assignment>, StoreError>;

    /// Every assignment, oldest first.
    async fn list(&self) -> Result<Vec<Assignment>, StoreError>;

    /// Assignments of one invigilator, oldest first.
    async fn list_by_invigilator(&self, invigilator_id: &str)
    -> Result<Vec<Assignment>, StoreError>;

    async fn is_assigned(&self, session_id: &str, student_id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceDataError {
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ReferenceData: Send + Sync {
    async fn session(&self, id: &str) -> Result<Option<ExamSession>, ReferenceDataError>;
    async fn hall(&self, id: &str) -> Result<Option<Hall>, ReferenceDataError>;
    async fn invigilator(&self, id: &str) -> Result<Option<Invigilator>, ReferenceDataError>;
    async fn student(&self, id: &str) -> Result<Option<Student>, ReferenceDataError>;
    async fn students(&self, filter: &StudentFilter) -> Result<Vec<Student>, ReferenceDataError>;
    /// Every exam session, earliest date first.
    async fn sessions(&self) -> Result<Vec<ExamSession>, ReferenceDataError>;
    /// Every hall, by name.
    async fn halls(&self) -> Result<Vec<Hall>, ReferenceDataError>;
    /// Every invigilator, by name.
    async fn invigilators(&self) -> Result<Vec<Invigilator>, ReferenceDataError>;
}

/// Write side of the reference data store. Rejects records that break a uniqueness rule with
/// `ReferenceDataError::Duplicate`.
#[async_trait]
pub trait ReferenceRegistry: Send + Sync {
    async fn add_session(&self, session: ExamSession) -> Result<(), ReferenceDataError>;
    async fn add_hall(&self, hall: Hall) -> Result<(), ReferenceDataError>;
    async fn add_invigilator(&self, invigilator: Invigilator) -> Result<(), ReferenceDataError>;
    async fn add_student(&self, student: Student) -> Result<(), ReferenceDataError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves a bearer credential to the acting user, `None` when it is unknown.
    async fn resolve(&self, credential: &str) -> Result<Option<Actor>, IdentityError>;
}
