//! Typed API client core for the food-log backend.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for every
//! backend operation (`FoodLogClient`), executes them through a pluggable
//! `Transport`, and classifies every failure into one `ApiError`. The
//! `merge` module reconciles backend weight records with device health
//! samples into one daily series.
//!
//! # Design
//! - `FoodLogClient` is stateless; it holds only the API base URL.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and both halves are testable without a network.
//! - `ApiService` glues client and transport together for hosts that want a
//!   single call per operation.
//! - The session store is the host's; the core reads the current user id
//!   through the `SessionStore` trait.

pub mod client;
pub mod config;
pub mod encoding;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod merge;
pub mod service;
pub mod session;
pub mod transport;
pub mod types;

pub use client::FoodLogClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{BodyKind, Endpoint, HttpMethod, HttpRequest, HttpResponse};
pub use merge::{merge_weight_series, HealthSample, WeightPoint, WeightSource};
pub use service::ApiService;
pub use session::{MemorySessionStore, Session, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use types::*;
