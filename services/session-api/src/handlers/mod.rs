//! HTTP handlers

mod health;
mod sections;
mod session;

pub use health::{health, ready};
pub use sections::{consumer, workspace};
pub use session::{landing, sync, validate};
