//! Action error types.
//!
//! Errors fall into two groups. Protocol errors (malformed payloads, unknown
//! action types, bad REST input, authentication) are returned out-of-band as
//! a non-200 HTTP response. Business errors (credentials, local I/O, store
//! failures) are carried in-band on the action envelope with HTTP 200, so
//! callers must inspect `actionStatus` rather than the HTTP status.

use std::fmt;

/// Well-known action error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ActionErrorCode {
    /// The body is not valid JSON, not an object, or lacks `@type`.
    #[default]
    MalformedPayload,
    /// The `@type` discriminator names an action this service does not handle.
    UnsupportedActionType,
    /// A REST convenience request failed validation.
    InvalidRequest,
    /// The API key is missing or wrong.
    Unauthorized,
    /// No route matches the request path.
    NotFound,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// Unexpected internal failure.
    InternalError,

    /// The target descriptor lacks a required credential field.
    MissingCredentials,
    /// Neither `identifier` nor `name` gives an object key.
    MissingObjectKey,
    /// An upload has neither a local content path nor inline content.
    MissingContentPath,
    /// The store rejected or failed the upload.
    UploadFailure,
    /// The store failed to return the object.
    DownloadFailure,
    /// The downloaded bytes could not be written locally.
    LocalWriteFailure,
    /// The store failed to delete the object.
    DeleteFailure,
    /// The store failed to list objects or buckets.
    ListFailure,
    /// The action is understood but not implemented against the store.
    UnsupportedOperation,
}

impl ActionErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedPayload => "MalformedPayload",
            Self::UnsupportedActionType => "UnsupportedActionType",
            Self::InvalidRequest => "InvalidRequest",
            Self::Unauthorized => "Unauthorized",
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::InternalError => "InternalError",
            Self::MissingCredentials => "MissingCredentials",
            Self::MissingObjectKey => "MissingObjectKey",
            Self::MissingContentPath => "MissingContentPath",
            Self::UploadFailure => "UploadFailure",
            Self::DownloadFailure => "DownloadFailure",
            Self::LocalWriteFailure => "LocalWriteFailure",
            Self::DeleteFailure => "DeleteFailure",
            Self::ListFailure => "ListFailure",
            Self::UnsupportedOperation => "UnsupportedOperation",
        }
    }

    /// Whether this error is reported on the envelope with HTTP 200.
    #[must_use]
    pub fn is_in_band(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::MissingObjectKey
                | Self::MissingContentPath
                | Self::UploadFailure
                | Self::DownloadFailure
                | Self::LocalWriteFailure
                | Self::DeleteFailure
                | Self::ListFailure
                | Self::UnsupportedOperation
        )
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::MalformedPayload | Self::UnsupportedActionType | Self::InvalidRequest => {
                http::StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => http::StatusCode::UNAUTHORIZED,
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::OK,
        }
    }
}

impl fmt::Display for ActionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action error.
#[derive(Debug)]
pub struct ActionError {
    /// The error code.
    pub code: ActionErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl ActionError {
    /// Create a new `ActionError` from an error code.
    #[must_use]
    pub fn new(code: ActionErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.as_str().to_owned(),
            code,
            source: None,
        }
    }

    /// Create a new `ActionError` with a custom message.
    #[must_use]
    pub fn with_message(code: ActionErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether this error belongs on the envelope rather than the HTTP status.
    #[must_use]
    pub fn is_in_band(&self) -> bool {
        self.code.is_in_band()
    }

    // -- Convenience constructors --

    #[must_use]
    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::MalformedPayload, message)
    }

    #[must_use]
    pub fn unsupported_action_type(action_type: &str) -> Self {
        Self::with_message(
            ActionErrorCode::UnsupportedActionType,
            format!("Unsupported action type: {action_type}"),
        )
    }

    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::InvalidRequest, message)
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::with_message(ActionErrorCode::Unauthorized, "invalid or missing API key")
    }

    #[must_use]
    pub fn not_found(path: &str) -> Self {
        Self::with_message(ActionErrorCode::NotFound, format!("No route for {path}"))
    }

    #[must_use]
    pub fn method_not_allowed(method: &http::Method, path: &str) -> Self {
        Self::with_message(
            ActionErrorCode::MethodNotAllowed,
            format!("Method {method} not allowed on {path}"),
        )
    }

    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::InternalError, message)
    }

    #[must_use]
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::MissingCredentials, message)
    }

    #[must_use]
    pub fn missing_object_key() -> Self {
        Self::with_message(
            ActionErrorCode::MissingObjectKey,
            "Object identifier (S3 key) is required",
        )
    }

    #[must_use]
    pub fn missing_content_path() -> Self {
        Self::with_message(
            ActionErrorCode::MissingContentPath,
            "Object contentUrl (file path) is required",
        )
    }

    #[must_use]
    pub fn upload_failure(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::UploadFailure, message)
    }

    #[must_use]
    pub fn download_failure(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::DownloadFailure, message)
    }

    #[must_use]
    pub fn local_write_failure(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::LocalWriteFailure, message)
    }

    #[must_use]
    pub fn delete_failure(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::DeleteFailure, message)
    }

    #[must_use]
    pub fn list_failure(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::ListFailure, message)
    }

    #[must_use]
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::with_message(ActionErrorCode::UnsupportedOperation, message)
    }
}

/// Create an `ActionError` from an error code.
///
/// # Examples
///
/// ```
/// use s3action_model::action_error;
/// use s3action_model::error::ActionErrorCode;
///
/// let err = action_error!(MissingObjectKey);
/// assert_eq!(err.code, ActionErrorCode::MissingObjectKey);
///
/// let err = action_error!(ListFailure, "bucket not reachable");
/// assert_eq!(err.message, "bucket not reachable");
/// ```
#[macro_export]
macro_rules! action_error {
    ($code:ident) => {
        $crate::error::ActionError::new($crate::error::ActionErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::ActionError::with_message($crate::error::ActionErrorCode::$code, $msg)
    };
}
