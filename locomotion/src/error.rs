use std::fmt;

use crate::config::ConfigError;

/// Wiring errors caught when a controller is built. Ticking never fails.
#[derive(Debug)]
pub enum LocomotionError {
    /// No camera / orientation source was supplied.
    MissingOrientation,
    InvalidConfig(ConfigError),
}

impl fmt::Display for LocomotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocomotionError::MissingOrientation => {
                write!(f, "locomotion controller needs an orientation source")
            }
            LocomotionError::InvalidConfig(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LocomotionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LocomotionError::MissingOrientation => None,
            LocomotionError::InvalidConfig(e) => Some(e),
        }
    }
}

impl From<ConfigError> for LocomotionError {
    fn from(e: ConfigError) -> Self {
        LocomotionError::InvalidConfig(e)
    }
}
