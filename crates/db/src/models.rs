use serde::{Deserialize, Serialize};

/// Catalog entry owned by the book store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

/// A user's reading-progress record for one book.
///
/// At most one list item exists per `(owner_id, book_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub owner_id: String,
    pub book_id: String,
    /// `-1` until the owner rates the book
    pub rating: i8,
    pub notes: String,
    /// Milliseconds since the Unix epoch
    pub start_date: Option<i64>,
    pub finish_date: Option<i64>,
}

/// Fields supplied when creating a list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListItem {
    pub owner_id: String,
    pub book_id: String,
}

/// Conjunctive filter for [`crate::ListItemStore::query`]; `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemFilter {
    pub owner_id: Option<String>,
    pub book_id: Option<String>,
}

impl ListItemFilter {
    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            book_id: None,
        }
    }

    pub fn with_book(mut self, book_id: impl Into<String>) -> Self {
        self.book_id = Some(book_id.into());
        self
    }

    pub fn matches(&self, item: &ListItem) -> bool {
        self.owner_id.as_deref().map_or(true, |id| id == item.owner_id)
            && self.book_id.as_deref().map_or(true, |id| id == item.book_id)
    }
}
