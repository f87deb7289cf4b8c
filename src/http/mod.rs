//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, body field extraction)
//!     → handlers.rs (REST) | rpc.rs (JSON-RPC on /)
//!     → blockchain subsystem
//!     → response.rs (status mapping, JSON bodies)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod rpc;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
