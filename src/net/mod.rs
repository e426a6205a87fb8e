//! Network layer.
//!
//! Plain TCP listeners are bound directly with tokio in `main`; this module
//! only holds the optional TLS setup for `axum-server`.

pub mod tls;
