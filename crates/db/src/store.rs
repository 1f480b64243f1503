use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{Book, ListItem, ListItemFilter, NewListItem};

/// Read access to the book catalog
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Fetch one book; a missing book is [`crate::StoreError::NotFound`]
    async fn read_by_id(&self, id: &str) -> StoreResult<Book>;

    /// Fetch every known book among `ids` in one round trip.
    ///
    /// Unknown ids are skipped and the result order is unspecified.
    async fn read_many_by_id(&self, ids: &[String]) -> StoreResult<Vec<Book>>;
}

/// Key-addressed list item persistence
#[async_trait]
pub trait ListItemStore: Send + Sync {
    async fn read_by_id(&self, id: &str) -> StoreResult<Option<ListItem>>;

    /// Items matching `filter`, in creation order
    async fn query(&self, filter: ListItemFilter) -> StoreResult<Vec<ListItem>>;

    /// Persist a new item owned by `fields.owner_id`.
    ///
    /// Implementations should reject a duplicate `(owner_id, book_id)` pair with
    /// [`crate::StoreError::Conflict`].
    async fn create(&self, fields: NewListItem) -> StoreResult<ListItem>;
}
