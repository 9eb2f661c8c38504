//! Pure view derivation: filter -> sort -> paginate.
//!
//! These functions are stateless and deterministic. The directory
//! controller composes them in fixed order after every state change;
//! nothing here touches the store or the network.

use crate::models::{SortDirection, SortField, UserRecord};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

/// Users shown per page.
pub const PAGE_SIZE: usize = 3;

/// One visible page sliced out of the derived list.
#[derive(Debug, Clone)]
pub struct PageView {
    pub users: Vec<UserRecord>,
    pub total_pages: usize,
}

/// Keep records where the term matches first name, last name, or email.
/// An empty term keeps everything. No other fields are searched.
pub fn filter_users(users: &[UserRecord], term: &str) -> Vec<UserRecord> {
    if term.is_empty() {
        return users.to_vec();
    }
    let query = term.to_lowercase();
    users
        .iter()
        .filter(|u| {
            contains_ignore_case(&u.first, &query)
                || contains_ignore_case(&u.last, &query)
                || contains_ignore_case(&u.email, &query)
        })
        .cloned()
        .collect()
}

/// Sort by the chosen field, case-insensitively. Equal keys may appear
/// in any order.
pub fn order_users(
    mut users: Vec<UserRecord>,
    field: SortField,
    direction: SortDirection,
) -> Vec<UserRecord> {
    users.sort_by(|a, b| {
        let cmp = match field {
            SortField::First => cmp_ignore_case(&a.first, &b.first),
            SortField::Last => cmp_ignore_case(&a.last, &b.last),
            SortField::Email => cmp_ignore_case(&a.email, &b.email),
        };
        match direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    });
    users
}

/// Slice out one page. `page` is 1-based and is not clamped: a page
/// outside `[1, total_pages]` yields an empty slice, never a panic.
pub fn paginate(users: &[UserRecord], page: usize) -> PageView {
    let total_pages = users.len().div_ceil(PAGE_SIZE).max(1);
    if page == 0 {
        return PageView {
            users: Vec::new(),
            total_pages,
        };
    }
    let start = (page - 1) * PAGE_SIZE;
    let users = users.iter().skip(start).take(PAGE_SIZE).cloned().collect();
    PageView { users, total_pages }
}
