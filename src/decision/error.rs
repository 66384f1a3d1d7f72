//! Error types for acceptance rules.

use thiserror::Error;

use crate::ports::CollaboratorError;

/// A rule could not reach a verdict.
///
/// The engine logs these and records a temporary rejection, so one faulty
/// rule never aborts evaluation of the remaining candidates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpecificationError {
    /// Candidate data the rule depends on is missing.
    #[error("missing {field} on candidate '{title}'")]
    MissingData { field: &'static str, title: String },

    /// A collaborator consulted by the rule failed.
    #[error("collaborator failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Any other internal failure.
    #[error("{message}")]
    Other { message: String },
}

impl SpecificationError {
    pub fn missing_data(field: &'static str, title: impl Into<String>) -> Self {
        Self::MissingData {
            field,
            title: title.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_message() {
        let err = SpecificationError::missing_data("parsed info", "Artist - Album");
        assert_eq!(
            err.to_string(),
            "missing parsed info on candidate 'Artist - Album'"
        );
    }

    #[test]
    fn test_from_collaborator_error() {
        let err: SpecificationError = CollaboratorError::unavailable("library", "timeout").into();
        assert!(matches!(err, SpecificationError::Collaborator(_)));
        assert!(err.to_string().contains("library unavailable"));
    }
}
