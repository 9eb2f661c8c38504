//! Data models for the user directory.
//!
//! - `UserRecord`: the stored directory record, keyed by uuid
//! - `SortField`, `SortDirection`: ordering settings for the list view
//! - `FeedResponse` and friends: raw shapes returned by the remote feed,
//!   shape-mapped into `UserRecord` on fetch

pub mod user;

pub use user::{
    FeedLogin, FeedName, FeedPicture, FeedResponse, FeedUser, SortDirection, SortField, UserRecord,
};
