//! Session state machine and the UI state around it

pub mod coordinator;
pub mod phase;
pub mod session;

pub use coordinator::{AppCoordinator, MenuOption, SetupField};
pub use phase::Phase;
pub use session::Session;
