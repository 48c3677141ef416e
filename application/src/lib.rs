use async_trait::async_trait;
use domain::{DomainError, Student, StudentId, StudentRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Student not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError), // Propagate domain errors cleanly
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

// --- Infrastructure Interface (Trait) ---

/// Interface for storing and retrieving students, backed by a document store
/// that assigns identifiers on first save.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Persists a transient record, assigning a fresh unique id.
    /// Returns the persisted student with its id populated.
    async fn insert(&self, record: StudentRecord) -> Result<Student, ApplicationError>;
    /// Atomically replaces name/email of an existing student, keeping its id.
    /// Returns `None` when no student with that id exists.
    async fn update(
        &self,
        id: &StudentId,
        record: StudentRecord,
    ) -> Result<Option<Student>, ApplicationError>;
    /// Retrieves a student by id. Absence is not an error.
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, ApplicationError>;
    /// Lists all persisted students in store-defined order.
    async fn find_all(&self) -> Result<Vec<Student>, ApplicationError>;
    /// Removes a student by id. Returns whether a record was removed;
    /// deleting an absent id is not an error.
    async fn delete_by_id(&self, id: &StudentId) -> Result<bool, ApplicationError>;
}

// --- Request/Response Models (DTOs) ---

/// Incoming body for create and update operations. Fields are optional at
/// the wire level so that an absent or null field reaches validation instead
/// of being rejected by the body extractor.
#[derive(Deserialize, Debug)]
pub struct StudentPayload {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl StudentPayload {
    /// Resolves the optional wire fields into a validated record. Absent and
    /// null values fail the same required-field check as empty ones.
    pub fn into_record(self) -> Result<StudentRecord, DomainError> {
        StudentRecord::new(
            self.name.as_deref().unwrap_or(""),
            self.email.as_deref().unwrap_or(""),
        )
    }
}

/// Body of the health endpoint.
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub stage: String,
}

/// JSON error body returned for all failure responses.
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

// --- Application Services (Use Cases) ---

/// Service owning the student CRUD use cases. All validation runs here,
/// before any store call.
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: StudentPayload) -> Result<Student, ApplicationError> {
        info!("Attempting to create student");
        let record = payload.into_record()?;
        let student = self.repo.insert(record).await?;
        info!(student_id = %student.id().as_str(), "Student created successfully");
        Ok(student)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Student, ApplicationError> {
        debug!(student_id = %id, "Fetching student by id");
        let student_id = StudentId::new(id.to_string());
        self.repo.find_by_id(&student_id).await?.ok_or_else(|| {
            warn!(student_id = %id, "Student not found");
            ApplicationError::NotFound(id.to_string())
        })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Student>, ApplicationError> {
        debug!("Fetching all students");
        self.repo.find_all().await
    }

    #[instrument(skip(self, payload))]
    pub async fn update(
        &self,
        id: &str,
        payload: StudentPayload,
    ) -> Result<Student, ApplicationError> {
        info!(student_id = %id, "Attempting to update student");
        let record = payload.into_record()?;
        let student_id = StudentId::new(id.to_string());
        // Single update-if-exists round trip; no separate lookup.
        match self.repo.update(&student_id, record).await? {
            Some(student) => {
                info!(student_id = %id, "Student updated successfully");
                Ok(student)
            }
            None => {
                warn!(student_id = %id, "Update failed: student not found");
                Err(ApplicationError::NotFound(id.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApplicationError> {
        info!(student_id = %id, "Attempting to delete student");
        let student_id = StudentId::new(id.to_string());
        let removed = self.repo.delete_by_id(&student_id).await?;
        if removed {
            info!(student_id = %id, "Student deleted successfully");
        } else {
            // Idempotent: deleting an absent id is still a success.
            info!(student_id = %id, "Student not found for deletion (already deleted or never existed)");
        }
        Ok(())
    }
}

/// Service reporting process liveness and the deployment stage. The stage is
/// fixed at startup and injected here rather than read from ambient state.
pub struct HealthService {
    stage: String,
}

impl HealthService {
    pub fn new(stage: String) -> Self {
        Self { stage }
    }

    pub fn health(&self) -> HealthResponse {
        debug!(stage = %self.stage, "Health check requested");
        HealthResponse {
            status: "UP",
            stage: self.stage.clone(),
        }
    }
}
