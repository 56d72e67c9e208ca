//! Tubely API Library
//!
//! HTTP handlers, bearer-token authentication and application setup for the
//! video upload service.

mod api_doc;
pub mod constants;
mod handlers;
mod services;
pub mod setup;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{HttpAppError, ValidatedJson};
pub use state::AppState;
pub use tubely_infra::ErrorResponse;
