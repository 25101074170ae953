//! Failures surfaced by the controller.
//!
//! Every remote failure is converted into a `ControllerError` at the call
//! site, logged, stored in the controller's single error slot and returned.

use crate::api::ApiError;

/// Which operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Fetch,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// Initial load or reload failed; the previous collection is kept.
    #[error("{message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    /// An item update failed; the local record is unchanged.
    #[error("{message}")]
    Update {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    /// An item delete failed; the local record is unchanged.
    #[error("{message}")]
    Delete {
        message: String,
        #[source]
        source: Option<ApiError>,
    },
}

impl ControllerError {
    pub fn fetch(source: ApiError) -> Self {
        Self::Fetch {
            message: "Failed to fetch inventory items".to_string(),
            source: Some(source),
        }
    }

    pub fn update(message: impl Into<String>, source: Option<ApiError>) -> Self {
        Self::Update {
            message: message.into(),
            source,
        }
    }

    pub fn delete(message: impl Into<String>, source: Option<ApiError>) -> Self {
        Self::Delete {
            message: message.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Update { .. } => ErrorKind::Update,
            Self::Delete { .. } => ErrorKind::Delete,
        }
    }

    /// Human-readable message shown to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Fetch { message, .. }
            | Self::Update { message, .. }
            | Self::Delete { message, .. } => message,
        }
    }

    /// The transport failure behind this error, when there was one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Fetch { source, .. } | Self::Update { source, .. } | Self::Delete { source, .. } => {
                source.as_ref()
            }
        }
    }
}
