use application::{ApplicationError, StudentRepository};
use async_trait::async_trait;
use dashmap::DashMap;
use domain::{Student, StudentId, StudentRecord};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Document-store-style student repository held in process memory.
/// Identifiers are UUID v4 strings assigned on first save, never reused.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStudentRepository {
    // Student ID -> Student
    store: Arc<DashMap<StudentId, Student>>,
}

impl InMemoryStudentRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepository {
    #[instrument(skip(self, record))]
    async fn insert(&self, record: StudentRecord) -> Result<Student, ApplicationError> {
        let id = StudentId::new(Uuid::new_v4().to_string());
        debug!(student_id = %id.as_str(), "Inserting student into in-memory store");
        let student = Student::new(id.clone(), record);
        self.store.insert(id, student.clone());
        Ok(student)
    }

    #[instrument(skip(self, record))]
    async fn update(
        &self,
        id: &StudentId,
        record: StudentRecord,
    ) -> Result<Option<Student>, ApplicationError> {
        debug!(student_id = %id.as_str(), "Updating student in in-memory store");
        // get_mut holds the shard lock, making replace-if-exists atomic per key.
        match self.store.get_mut(id) {
            Some(mut entry) => {
                let updated = Student::new(id.clone(), record);
                *entry = updated.clone();
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, ApplicationError> {
        debug!(student_id = %id.as_str(), "Getting student from in-memory store");
        let student = self.store.get(id).map(|entry| entry.value().clone());
        Ok(student)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Student>, ApplicationError> {
        debug!("Listing all students from in-memory store");
        let students = self
            .store
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        Ok(students)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &StudentId) -> Result<bool, ApplicationError> {
        debug!(student_id = %id.as_str(), "Deleting student from in-memory store");
        Ok(self.store.remove(id).is_some())
    }
}
