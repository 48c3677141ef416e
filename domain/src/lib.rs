use serde::{Deserialize, Serialize};
use thiserror::Error; // For domain-specific errors

// --- Domain Errors ---
#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    #[error("Missing required field '{0}'")]
    MissingField(String),
    #[error("Field '{field}' exceeds the maximum length of {max} characters")]
    FieldTooLong { field: String, max: usize },
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },
}

// --- Student ID ---
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: String) -> Self {
        Self(id)
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<String> for StudentId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}
impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

// --- Validation bounds ---

/// Maximum accepted length for the name field.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum accepted length for the email field (RFC 5321 upper bound).
pub const MAX_EMAIL_LEN: usize = 254;

// Characters treated as structural delimiters (statement terminators,
// stored-procedure markup). Input containing any of these is rejected.
const STRUCTURAL_CHARS: [char; 4] = [';', '$', '{', '}'];

// --- Transient record ---

/// A validated `{name, email}` pair that has not been persisted yet.
/// Construction is the single validation gate: a `StudentRecord` that exists
/// is well-formed by definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    name: String,
    email: String,
}

impl StudentRecord {
    /// Validates and builds a transient record. Fields are trimmed before
    /// validation; the trimmed values are what gets stored.
    pub fn new(name: &str, email: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        let email = email.trim();

        if name.is_empty() {
            return Err(DomainError::MissingField("name".to_string()));
        }
        if email.is_empty() {
            return Err(DomainError::MissingField("email".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::FieldTooLong {
                field: "name".to_string(),
                max: MAX_NAME_LEN,
            });
        }
        if email.chars().count() > MAX_EMAIL_LEN {
            return Err(DomainError::FieldTooLong {
                field: "email".to_string(),
                max: MAX_EMAIL_LEN,
            });
        }
        check_structural_chars("name", name)?;
        check_structural_chars("email", email)?;
        check_email_shape(email)?;

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

fn check_structural_chars(field: &str, value: &str) -> Result<(), DomainError> {
    if let Some(c) = value.chars().find(|c| STRUCTURAL_CHARS.contains(c)) {
        return Err(DomainError::InvalidFieldValue {
            field: field.to_string(),
            reason: format!("contains forbidden character '{}'", c),
        });
    }
    Ok(())
}

fn check_email_shape(email: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidFieldValue {
        field: "email".to_string(),
        reason: reason.to_string(),
    };
    let mut parts = email.split('@');
    let local = parts.next().unwrap_or("");
    let domain = match parts.next() {
        Some(d) => d,
        None => return Err(invalid("missing '@'")),
    };
    if parts.next().is_some() {
        return Err(invalid("more than one '@'"));
    }
    if local.is_empty() || domain.is_empty() {
        return Err(invalid("empty local or domain part"));
    }
    if local.chars().any(char::is_whitespace) || domain.chars().any(char::is_whitespace) {
        return Err(invalid("contains whitespace"));
    }
    Ok(())
}

// --- Persisted entity ---

/// A student as it exists in the store: the record plus its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    name: String,
    email: String,
}

impl Student {
    /// Binds a transient record to its store-assigned identifier. The same
    /// constructor serves updates: a new record replaces name/email while the
    /// id is carried over unchanged.
    pub fn new(id: StudentId, record: StudentRecord) -> Self {
        Self {
            id,
            name: record.name,
            email: record.email,
        }
    }

    pub fn id(&self) -> &StudentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_creation_success() {
        let record = StudentRecord::new("John Doe", "john@example.com").unwrap();
        assert_eq!(record.name(), "John Doe");
        assert_eq!(record.email(), "john@example.com");
    }

    #[test]
    fn record_trims_surrounding_whitespace() {
        let record = StudentRecord::new("  John Doe  ", " john@example.com ").unwrap();
        assert_eq!(record.name(), "John Doe");
        assert_eq!(record.email(), "john@example.com");
    }

    #[test]
    fn record_creation_fails_empty_name() {
        let result = StudentRecord::new("", "john@example.com");
        assert!(matches!(result, Err(DomainError::MissingField(f)) if f == "name"));
    }

    #[test]
    fn record_creation_fails_blank_email() {
        let result = StudentRecord::new("John Doe", "   ");
        assert!(matches!(result, Err(DomainError::MissingField(f)) if f == "email"));
    }

    #[test]
    fn record_creation_fails_oversized_name() {
        let long_name = "a".repeat(MAX_NAME_LEN + 1);
        let result = StudentRecord::new(&long_name, "john@example.com");
        assert!(matches!(result, Err(DomainError::FieldTooLong { field, .. }) if field == "name"));
    }

    #[test]
    fn record_creation_fails_oversized_email() {
        let long_email = format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN));
        let result = StudentRecord::new("John Doe", &long_email);
        assert!(matches!(result, Err(DomainError::FieldTooLong { field, .. }) if field == "email"));
    }

    #[test]
    fn record_creation_fails_structural_characters() {
        for bad in ["Robert; DROP", "Robert$", "Robert{", "Robert}"] {
            let result = StudentRecord::new(bad, "john@example.com");
            assert!(
                matches!(result, Err(DomainError::InvalidFieldValue { ref field, .. }) if field == "name"),
                "expected rejection for input {:?}",
                bad
            );
        }
    }

    #[test]
    fn record_creation_fails_structural_characters_in_email() {
        let result = StudentRecord::new("John Doe", "john$doe@example.com");
        assert!(
            matches!(result, Err(DomainError::InvalidFieldValue { field, .. }) if field == "email")
        );
    }

    #[test]
    fn record_creation_fails_email_without_at() {
        let result = StudentRecord::new("John Doe", "john.example.com");
        assert!(
            matches!(result, Err(DomainError::InvalidFieldValue { field, reason }) if field == "email" && reason.contains('@'))
        );
    }

    #[test]
    fn record_creation_fails_email_with_empty_domain() {
        let result = StudentRecord::new("John Doe", "john@");
        assert!(
            matches!(result, Err(DomainError::InvalidFieldValue { field, .. }) if field == "email")
        );
    }

    #[test]
    fn record_creation_fails_email_with_two_ats() {
        let result = StudentRecord::new("John Doe", "john@doe@example.com");
        assert!(
            matches!(result, Err(DomainError::InvalidFieldValue { field, .. }) if field == "email")
        );
    }

    #[test]
    fn student_binds_id_to_record() {
        let record = StudentRecord::new("John Doe", "john@example.com").unwrap();
        let id = StudentId::new("abc-123".to_string());
        let student = Student::new(id.clone(), record);
        assert_eq!(student.id(), &id);
        assert_eq!(student.name(), "John Doe");
        assert_eq!(student.email(), "john@example.com");
    }

    #[test]
    fn update_replaces_fields_and_keeps_id() {
        let id = StudentId::new("abc-123".to_string());
        let original = Student::new(
            id.clone(),
            StudentRecord::new("John Doe", "john@example.com").unwrap(),
        );
        let updated = Student::new(
            original.id().clone(),
            StudentRecord::new("Jane Doe", "jane@example.com").unwrap(),
        );
        assert_eq!(updated.id(), &id);
        assert_eq!(updated.name(), "Jane Doe");
        assert_eq!(updated.email(), "jane@example.com");
    }
}
