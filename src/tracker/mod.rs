pub mod controller;
pub mod state;

pub use controller::{ActivePause, PauseToggle, Tracker};
pub use state::TrackerStatus;
