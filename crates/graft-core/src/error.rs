//! Error types for the save path.
//!
//! Every error is fatal to the transaction that raised it: the remaining
//! phases are skipped and the error is surfaced to the caller, who owns
//! rollback of the enclosing store-level transaction. Nothing is caught
//! and continued, nothing is retried, nothing is logged-and-swallowed.

use std::fmt;

/// Convenience alias for write-path results.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for save operations.
#[derive(Debug)]
pub enum Error {
    /// An entity type was encountered with no registered mapper.
    UnmappedType(UnmappedTypeError),
    /// The graph cannot produce valid rows (e.g. a required foreign key
    /// resolved to no id).
    InvalidData(InvalidDataError),
    /// A batch statement failed in the store.
    Store(StoreError),
}

/// No metadata registered for an encountered entity type.
#[derive(Debug)]
pub struct UnmappedTypeError {
    /// Name of the unregistered type.
    pub type_name: String,
}

/// The in-memory graph violates a persistence constraint.
#[derive(Debug)]
pub struct InvalidDataError {
    /// The entity type the offending instance belongs to.
    pub entity_type: String,
    /// The field that failed, when one is identifiable.
    pub field: Option<&'static str>,
    /// What went wrong.
    pub message: String,
}

/// A failure reported by the store collaborator.
#[derive(Debug)]
pub struct StoreError {
    /// What went wrong.
    pub message: String,
    /// Underlying driver error, when available.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Build an [`Error::UnmappedType`].
    #[must_use]
    pub fn unmapped_type(type_name: impl Into<String>) -> Self {
        Error::UnmappedType(UnmappedTypeError {
            type_name: type_name.into(),
        })
    }

    /// Build an [`Error::InvalidData`] scoped to one field.
    #[must_use]
    pub fn invalid_data(
        entity_type: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidData(InvalidDataError {
            entity_type: entity_type.into(),
            field: Some(field),
            message: message.into(),
        })
    }

    /// Build an [`Error::InvalidData`] with no field context.
    #[must_use]
    pub fn invalid_entity(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidData(InvalidDataError {
            entity_type: entity_type.into(),
            field: None,
            message: message.into(),
        })
    }

    /// Build an [`Error::Store`] from a message.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Error::Store(StoreError {
            message: message.into(),
            source: None,
        })
    }

    /// Build an [`Error::Store`] wrapping a driver error.
    #[must_use]
    pub fn store_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Error::Store(StoreError {
            message: message.into(),
            source: Some(source),
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnmappedType(e) => {
                write!(f, "no mapper registered for entity type {}", e.type_name)
            }
            Error::InvalidData(e) => match e.field {
                Some(field) => write!(f, "invalid data on {}.{}: {}", e.entity_type, field, e.message),
                None => write!(f, "invalid data on {}: {}", e.entity_type, e.message),
            },
            Error::Store(e) => write!(f, "store error: {}", e.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(e) => e
                .source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_type_display() {
        let err = Error::unmapped_type("Order");
        assert_eq!(
            err.to_string(),
            "no mapper registered for entity type Order"
        );
    }

    #[test]
    fn test_invalid_data_display_with_field() {
        let err = Error::invalid_data("Item", "order", "required foreign key has no id");
        assert_eq!(
            err.to_string(),
            "invalid data on Item.order: required foreign key has no id"
        );
    }

    #[test]
    fn test_invalid_data_display_without_field() {
        let err = Error::invalid_entity("Tag", "caller-assigned id is missing");
        assert_eq!(
            err.to_string(),
            "invalid data on Tag: caller-assigned id is missing"
        );
    }

    #[test]
    fn test_store_error_carries_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset");
        let err = Error::store_with_source("batch insert failed", Box::new(io));

        assert_eq!(err.to_string(), "store error: batch insert failed");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("connection reset"));
    }

    #[test]
    fn test_store_error_without_source() {
        let err = Error::store("misaligned id vector");
        assert!(std::error::Error::source(&err).is_none());
    }
}
