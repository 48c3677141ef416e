// Module declarations
pub mod persistence;

// Re-export the repository implementation
pub use persistence::InMemoryStudentRepository;
