//! Offline-first user directory core.
//!
//! rolocache reconciles a remote user feed with a locally cached copy
//! and publishes derived, presentation-ready state: the visible page of
//! users after search, sort, and pagination, plus the favorites index
//! and the persisted offline toggle.
//!
//! The crate is the state layer only. An embedding application renders
//! the fields published by [`Directory`] and calls its operations on
//! user interaction; this crate never draws anything and never installs
//! a logging subscriber.

pub mod api;
pub mod config;
pub mod directory;
pub mod models;
pub mod store;
pub mod utils;
pub mod view;

pub use api::{ApiClient, ApiError, UserSource};
pub use config::Config;
pub use directory::Directory;
pub use models::{SortDirection, SortField, UserRecord};
pub use store::{JsonStore, MemoryStore, StoreError, UserStore};
