pub mod catalog;
pub mod config;
pub mod error;
pub mod kernel;
pub mod media;
pub mod memory;
pub mod outputs;

// Re-export specific items for convenient access
pub use error::SessionError;
pub use kernel::reactor::Reactor;
pub use kernel::session::{ConversionSession, SessionState};
