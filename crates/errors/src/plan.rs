//! Operation plan error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanError {
    #[error("unknown operation mode: {mode}")]
    UnknownMode { mode: String },

    #[error("malformed operation plan: {message}")]
    Malformed { message: String },

    #[error("operation plan not found: {path}")]
    NotFound { path: String },
}

impl UserFacingError for PlanError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownMode { .. } => Some(
                "Valid modes are install, localinstall, remove, try_install and try_remove.",
            ),
            Self::Malformed { .. } => {
                Some("Each mode must map to a list of records with a `package` field.")
            }
            Self::NotFound { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnknownMode { .. } => "plan.unknown_mode",
            Self::Malformed { .. } => "plan.malformed",
            Self::NotFound { .. } => "plan.not_found",
        };
        Some(code)
    }
}
