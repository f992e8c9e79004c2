//! HTTP API Handlers and Routes
//!
//! # API Endpoints
//!
//! - `POST /generate` - Answer a question, `{"question"}` -> `{"answer"}`
//! - `POST /generate/trace` - Answer plus the pipeline trace
//! - `GET /health` - Health check endpoint
//!
//! Pipeline failures are returned as `{"error", "step"}` with a 5xx status.
//! Blank questions and malformed bodies are a `400 {"error"}`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// JSON body extractor.
pub mod json;
/// Router configuration and route definitions.
pub mod routes;
