//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id assigned and propagated)
//!     → audit middleware → access guard → intake handler
//!     → response.rs (errors shaped into safe JSON bodies)
//!     → headers.rs (no-store, nosniff)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::{build_router, IntakeServer};
