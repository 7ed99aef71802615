//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors raised when input is rejected before it touches any session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("'{role}' is not a valid role. Available roles: {}", .valid.join(", "))]
    UnknownRole { role: String, valid: Vec<String> },

    #[error("Role '{0}' is listed more than once")]
    DuplicateRole(String),

    #[error("Participant '{0}' is listed more than once")]
    DuplicateParticipant(String),

    #[error("{participants} participants cannot share {roles} roles")]
    TooManyParticipants { participants: usize, roles: usize },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: usize, max: usize, actual: usize) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unknown role error listing the keys that would have been accepted.
    pub fn unknown_role<I, S>(role: impl Into<String>, valid: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationError::UnknownRole {
            role: role.into(),
            valid: valid.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the matching error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::EmptyField { .. } => ErrorCode::EmptyField,
            ValidationError::OutOfRange { .. } => ErrorCode::OutOfRange,
            ValidationError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            ValidationError::UnknownRole { .. } => ErrorCode::UnknownRole,
            ValidationError::DuplicateRole(_) | ValidationError::DuplicateParticipant(_) => {
                ErrorCode::Duplicate
            }
            ValidationError::TooManyParticipants { .. } => ErrorCode::ValidationFailed,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    OutOfRange,
    InvalidFormat,
    UnknownRole,
    Duplicate,

    // Session errors
    SessionNotFound,
    SessionExists,
    SessionClosed,
    InvalidStateTransition,
    NotParticipant,
    AffordanceClaimed,
    SessionFull,
    UnsupportedAction,

    // Outcome errors
    AssignmentInfeasible,

    // Collaborator errors
    NoVoiceScope,
    PresentationError,
    DirectoryError,
    WorkspaceError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::UnknownRole => "UNKNOWN_ROLE",
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::SessionExists => "SESSION_EXISTS",
            ErrorCode::SessionClosed => "SESSION_CLOSED",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::NotParticipant => "NOT_PARTICIPANT",
            ErrorCode::AffordanceClaimed => "AFFORDANCE_CLAIMED",
            ErrorCode::SessionFull => "SESSION_FULL",
            ErrorCode::UnsupportedAction => "UNSUPPORTED_ACTION",
            ErrorCode::AssignmentInfeasible => "ASSIGNMENT_INFEASIBLE",
            ErrorCode::NoVoiceScope => "NO_VOICE_SCOPE",
            ErrorCode::PresentationError => "PRESENTATION_ERROR",
            ErrorCode::DirectoryError => "DIRECTORY_ERROR",
            ErrorCode::WorkspaceError => "WORKSPACE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Ports report collaborator failures with this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
