use serde::{Deserialize, Serialize};

/// A user in the directory.
///
/// `uuid` is the stable identity. The favorite flag is the only field
/// mutated in place; everything else is replaced wholesale when the
/// record is re-fetched from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub uuid: String,
    pub first: String,
    pub last: String,
    pub email: String,
    pub thumbnail: String,
    /// Feed page this record was fetched from.
    pub page: usize,
    #[serde(default)]
    pub favorite: bool,
}

/// Sort field for the directory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    First,
    Last,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

// Raw feed response shapes. Field names mirror the feed's JSON; fields
// the mapping ignores are kept for completeness.

#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub results: Vec<FeedUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedUser {
    pub login: FeedLogin,
    pub name: FeedName,
    pub email: String,
    pub picture: FeedPicture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedLogin {
    pub uuid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedName {
    pub title: Option<String>,
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedPicture {
    pub large: Option<String>,
    pub medium: Option<String>,
    pub thumbnail: String,
}

impl FeedUser {
    /// Shape-map a raw feed entry into a stored record.
    pub fn into_record(self, page: usize) -> UserRecord {
        UserRecord {
            uuid: self.login.uuid,
            first: self.name.first,
            last: self.name.last,
            email: self.email,
            thumbnail: self.picture.thumbnail,
            page,
            favorite: false,
        }
    }
}
