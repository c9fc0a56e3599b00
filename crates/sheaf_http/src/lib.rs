//! Serving compiled bundles over HTTP with conditional-request support.
//!
//! [`Responder`] is the per-request state machine: it decides between
//! compiling, serving the cached artifact, and answering `304 Not Modified`.
//! [`server`] wraps it in a hyper HTTP/1.1 server that maps request paths to
//! configured bundles.

#![warn(missing_docs)]

pub mod conditional;
pub mod error;
pub mod responder;
pub mod server;

pub use conditional::{ValidationContext, Validators};
pub use error::ServeError;
pub use responder::{Outcome, Responder, CONTENT_TYPE_CSS};
pub use server::{handle, serve, ServerState};
