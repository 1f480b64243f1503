use serde::{Deserialize, Serialize};
use shelf_db::{Book, ListItem};

/// A list item joined with its book for a single response. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedListItem {
    #[serde(flatten)]
    pub list_item: ListItem,
    /// Absent only when the catalog no longer knows the book
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<Book>,
}

impl ExpandedListItem {
    pub fn new(list_item: ListItem, book: Option<Book>) -> Self {
        Self { list_item, book }
    }
}

/// `{listItem}` envelope returned by the single-item endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemResponse {
    pub list_item: ExpandedListItem,
}

/// `{listItems}` envelope returned by the collection endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsResponse {
    pub list_items: Vec<ExpandedListItem>,
}

/// Request model for creating a list item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListItem {
    #[serde(default)]
    pub book_id: Option<String>,
}
