use crate::store::StoreError;
use std::fmt;

/// Failure category, the error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any remote call was made; zero side effects.
    Validation,
    /// The target vanished between read and act; nothing was changed.
    NotFound,
    /// The operation conflicts with existing state.
    Conflict,
    /// Caller lacks the rights for the operation.
    Forbidden,
    /// Network or backend failure; local state is intact, retry is safe.
    Transient,
    /// Unexpected internal failure.
    Internal,
}

pub struct AppError {
    kind: ErrorKind,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn validation(message: &'static str) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn transient(message: &'static str) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn internal(message: &'static str) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found("Resource not found"),

            StoreError::Backend(details) => {
                Self::transient("Store backend error").with_details(details)
            }

            StoreError::Closed => Self::transient("Store connection closed"),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation("Validation error").with_details(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal("Malformed document").with_details(err.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({})", self.message, details),
            None => f.write_str(self.message),
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AppError[{:?}]: {}", self.kind, self)
    }
}

impl std::error::Error for AppError {}
