use thiserror::Error;

/// Coarse classification of a [`LayoutError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDate,
    MissingField,
    Configuration,
}

/// Layout error types for roadmap pages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A record's date could not be parsed or is outside the supported range
    #[error("Invalid date '{value}' on row {row} ({category} / {workstream})")]
    InvalidDate {
        row: usize,
        category: String,
        workstream: String,
        value: String,
    },

    /// A required field is absent or blank
    #[error("Missing required field '{field}' on row {row}")]
    MissingField { row: usize, field: &'static str },

    /// Layout constants that cannot produce a usable page
    #[error("Invalid layout configuration: {message}")]
    Configuration { message: String },
}

impl LayoutError {
    /// Build a configuration error from any message.
    pub fn configuration(message: impl Into<String>) -> Self {
        LayoutError::Configuration {
            message: message.into(),
        }
    }

    /// Get the kind of this error without its payload.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LayoutError::InvalidDate { .. } => ErrorKind::InvalidDate,
            LayoutError::MissingField { .. } => ErrorKind::MissingField,
            LayoutError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Get the full error message for display to users.
    ///
    /// Input errors carry a hint that the whole run was stopped, since no
    /// partial pages are written for a year containing a bad record.
    pub fn full_message(&self) -> String {
        match self {
            LayoutError::InvalidDate { .. } | LayoutError::MissingField { .. } => {
                format!("{} (no pages were produced)", self)
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;
