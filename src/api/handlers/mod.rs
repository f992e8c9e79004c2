//! API request handlers.

/// Question answering handlers.
pub mod generate;
/// Health check handler.
pub mod health;
