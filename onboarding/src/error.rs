// Error taxonomy for the onboarding controller
//
// LocalValidation never reaches the network; RemoteValidation is field-attributable;
// everything else is a transport-level failure that the caller recovers from by
// re-enabling the form. No variant is fatal to the process.

use thiserror::Error;

pub type WizardResult<T> = Result<T, WizardError>;

/// Failures raised by the HTTP seam before a status code is available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("invalid request url: {url}")]
    InvalidUrl { url: String },

    #[error("no scripted response for {method} {path}")]
    Unscripted { method: String, path: String },
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("{invalid} field(s) failed local validation")]
    LocalValidation { invalid: usize },

    #[error("server rejected field(s): {}", fields.join(", "))]
    RemoteValidation { fields: Vec<String> },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected HTTP {status} from {path}")]
    UnexpectedStatus { status: u16, path: String },

    #[error("could not decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("a submission is already in flight for {target}")]
    SubmissionInFlight { target: String },

    #[error("{target} is locked and not accepting submissions")]
    FormLocked { target: String },

    #[error("rollback incomplete: {attached} of {expected} handlers reattached")]
    Rollback { attached: usize, expected: usize },
}

impl WizardError {
    pub fn decode(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        WizardError::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the user can fix the failure by editing fields and resubmitting.
    pub fn is_user_fixable(&self) -> bool {
        matches!(
            self,
            WizardError::LocalValidation { .. } | WizardError::RemoteValidation { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_validation_lists_field_names() {
        let err = WizardError::RemoteValidation {
            fields: vec!["email".to_string(), "name".to_string()],
        };
        assert_eq!(err.to_string(), "server rejected field(s): email, name");
        assert!(err.is_user_fixable());
    }

    #[test]
    fn transport_errors_convert_and_are_not_user_fixable() {
        let err: WizardError = TransportError::Timeout.into();
        assert_eq!(err.to_string(), "request timed out");
        assert!(!err.is_user_fixable());
    }

    #[test]
    fn wizard_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WizardError>();
    }
}
