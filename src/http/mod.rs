//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned / propagated)
//!     → handlers.rs (/healthz, /version shaped by chaos mode)
//!       chaos.rs    (/chaos/start, /chaos/stop, /chaos)
//!     → response.rs (errors mapped to JSON bodies)
//!     → Send to client
//! ```

pub mod chaos;
pub mod clock;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, HttpServer};
