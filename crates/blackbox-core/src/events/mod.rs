//! Scan lifecycle events and their dispatcher.

pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::BlackboxEventHandler;
pub use types::*;
