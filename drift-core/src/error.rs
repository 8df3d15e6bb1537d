use core::fmt;

/// Reasons an [`AutopilotConfig`](crate::AutopilotConfig) is unusable.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    EmptyGrid,
    NonFiniteValue { field: &'static str },
    NonPositive { field: &'static str, value: f32 },
    InvalidWindow { near: f32, far: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "candidate grid must have at least one x and one y step"),
            Self::NonFiniteValue { field } => write!(f, "{field} must be finite"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be greater than zero (got {value})")
            }
            Self::InvalidWindow { near, far } => write!(
                f,
                "look-ahead window is empty: far ({far}) must be below near ({near})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
