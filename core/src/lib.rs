//! Domain core for the todo service.
//!
//! # Overview
//! Holds the `Todo` record, the `KeyValueStore` contract every persistence
//! backend implements, and `TodoHandler`, which maps the four REST verbs onto
//! store calls. Also ships `TodoClient`, a host-does-IO client that builds
//! `HttpRequest` values and parses `HttpResponse` values for the same API.
//!
//! # Design
//! - The handler is stateless; the only shared resource is the injected store.
//! - Create and update are one operation (`TodoHandler::write`). An id of `0`
//!   asks the store for a fresh sequence id; anything else is an upsert.
//! - `KeyValueStore` is generic over the entity type, so the record type is
//!   fixed at compile time by the concrete store.
//! - Nothing in this crate opens a socket. Network backends live in their own
//!   crates.

pub mod client;
pub mod entity;
pub mod error;
pub mod handler;
pub mod http;
pub mod memory;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use entity::{Entity, UNASSIGNED_ID};
pub use error::{ApiError, StoreError, StoreResult};
pub use handler::{Read, TodoHandler};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use memory::MemoryStore;
pub use store::KeyValueStore;
pub use types::Todo;
