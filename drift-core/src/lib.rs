pub mod autopilot;
pub mod constants;
pub mod error;
pub mod obstacle;
pub mod pace;
pub mod rng;
pub mod sim;
pub mod state;

pub use autopilot::{Autopilot, AutopilotConfig, Candidate};
pub use error::ConfigError;
pub use obstacle::Obstacle;
pub use pace::{check_pace, PaceVerdict};
pub use sim::{FrameOutcome, Steering, World};
pub use state::GameStore;
