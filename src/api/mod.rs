//! Remote feed adapter.
//!
//! This module provides the `ApiClient` for fetching pages of raw user
//! records from the public user feed. `UserSource` is the seam the
//! directory controller consumes, so tests can substitute a stub feed.

pub mod client;
pub mod error;

pub use client::{ApiClient, UserSource};
pub use error::ApiError;
