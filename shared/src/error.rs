use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Authentication,
    Validation,
    Subscription,
    NotFound,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Authentication => "AUTH_REQUIRED",
            Self::Validation => "VALIDATION_ERROR",
            Self::Subscription => "SUBSCRIPTION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Subscription)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Authentication => "Please sign in to share a post.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Subscription => {
                "We lost track of your post's review. Please try again.".into()
            }
            ErrorKind::NotFound => "The requested item could not be found.".into(),
            ErrorKind::Internal => {
                "Something went wrong. Please try again.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Failures reported by the shell's post store.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum StoreError {
    #[error("no signed-in user")]
    AuthenticationRequired,

    #[error("rejected by the store: {reason}")]
    ValidationFailed { reason: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("record not found")]
    NotFound,

    #[error("unexpected store response: {message}")]
    Protocol { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let kind = match &e {
            StoreError::AuthenticationRequired => ErrorKind::Authentication,
            StoreError::ValidationFailed { .. } => ErrorKind::Validation,
            StoreError::Network { .. } => ErrorKind::Network,
            StoreError::NotFound => ErrorKind::NotFound,
            StoreError::Protocol { .. } => ErrorKind::Internal,
        };
        let message = match &e {
            StoreError::ValidationFailed { reason } => reason.clone(),
            other => other.to_string(),
        };
        AppError::new(kind, message)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Please add a title.")]
    EmptyTitle,
    #[error("Please write something to share.")]
    EmptyBody,
    #[error("The {field} is too long ({len} > {max} characters).")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a signed-in user is required to post")]
    AuthenticationRequired,
    #[error(transparent)]
    InvalidDraft(#[from] DraftError),
}

impl From<SubmitError> for AppError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::AuthenticationRequired => {
                AppError::new(ErrorKind::Authentication, e.to_string())
            }
            SubmitError::InvalidDraft(draft) => draft.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("{0} must allow at least one item")]
    ZeroLimit(&'static str),
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_kinds() {
        let auth: AppError = StoreError::AuthenticationRequired.into();
        assert_eq!(auth.kind, ErrorKind::Authentication);

        let validation: AppError = StoreError::ValidationFailed {
            reason: "Title contains blocked words".into(),
        }
        .into();
        assert_eq!(validation.kind, ErrorKind::Validation);
        assert_eq!(validation.user_facing_message(), "Title contains blocked words");

        let network: AppError = StoreError::Network {
            message: "offline".into(),
        }
        .into();
        assert!(network.is_retryable());
        assert_eq!(network.code(), "NETWORK_ERROR");
    }

    #[test]
    fn draft_errors_are_validation_errors() {
        let err: AppError = SubmitError::from(DraftError::EmptyTitle).into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.user_facing_message(), "Please add a title.");
    }

    #[test]
    fn display_includes_code() {
        let err = AppError::new(ErrorKind::Subscription, "listener detached")
            .with_context("post_id", "p1");
        assert_eq!(err.to_string(), "[SUBSCRIPTION_ERROR] listener detached");
        assert_eq!(err.context.get("post_id").map(String::as_str), Some("p1"));
    }

    #[test]
    fn store_error_round_trips_through_json() {
        let err = StoreError::Network {
            message: "timeout".into(),
        };
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(serde_json::from_str::<StoreError>(&json).unwrap(), err);
    }
}
