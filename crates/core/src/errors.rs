use thiserror::Error;

/// Rejection of an agent configuration. This is the only failure that stops a
/// session from being created; it is not retryable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported {field} `{value}` (expected {expected})")]
    UnknownValue { field: &'static str, value: String, expected: &'static str },
    #[error("`{field}` must be {expected}")]
    InvalidType { field: &'static str, expected: &'static str },
    #[error("job metadata is not a valid configuration object: {0}")]
    MalformedMetadata(String),
}

/// Problems a tool hit while handling a call. These never reach the dispatcher
/// as errors: every variant is rendered into the text the tool returns.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolFailure {
    #[error("invalid {field} `{value}` (expected {expected_format})")]
    Format { field: &'static str, value: String, expected_format: &'static str },
    #[error("lookup miss: {0}")]
    LookupMiss(String),
}

impl ToolFailure {
    /// Sentence spoken back to the caller for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Format { field, expected_format, .. } => {
                format!(
                    "Invalid {field} format. Please provide {field} in {expected_format} format."
                )
            }
            Self::LookupMiss(message) => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ToolFailure, ValidationError};

    #[test]
    fn unknown_value_names_field_and_domain() {
        let error = ValidationError::UnknownValue {
            field: "tone",
            value: "sarcastic".to_owned(),
            expected: "formal|casual|friendly|empathetic",
        };

        assert_eq!(
            error.to_string(),
            "unsupported tone `sarcastic` (expected formal|casual|friendly|empathetic)"
        );
    }

    #[test]
    fn format_failure_renders_natural_language() {
        let failure = ToolFailure::Format {
            field: "date",
            value: "13/13/2024".to_owned(),
            expected_format: "YYYY-MM-DD",
        };

        assert_eq!(
            failure.user_message(),
            "Invalid date format. Please provide date in YYYY-MM-DD format."
        );
    }

    #[test]
    fn lookup_miss_is_passed_through_verbatim() {
        let failure = ToolFailure::LookupMiss("No slots available for 2024-05-01.".to_owned());
        assert_eq!(failure.user_message(), "No slots available for 2024-05-01.");
    }
}
