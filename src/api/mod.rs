//! Web front door
//!
//! A single HTML form, built on Axum, that submits a question to the shared
//! research pipeline.
//!
//! # Endpoints
//!
//! - `GET /` - Render the empty question form
//! - `POST /` - Run the pipeline and render the answer or the error
//! - `GET /health` - Liveness check, returns `OK`
//!
//! Requests share one immutable [`Pipeline`](crate::pipeline::Pipeline);
//! nothing is kept between requests.

/// Request handlers.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
