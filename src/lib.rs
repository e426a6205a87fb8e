//! Secure intake API library.
//!
//! Intake of sensitive personal records behind four concerns: token-based
//! identity, role-based authorization, field-level encryption and redacted
//! audit logging.

pub mod audit;
pub mod config;
pub mod error;
pub mod http;
pub mod intake;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::IntakeConfig;
pub use error::IntakeError;
pub use http::IntakeServer;
pub use lifecycle::{AppContext, Shutdown};
