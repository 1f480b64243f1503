use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Book, ListItem, ListItemFilter, NewListItem};
use crate::store::{BookStore, ListItemStore};

/// In-memory book catalog (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryBookStore {
    books: Arc<RwLock<HashMap<String, Book>>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let books = books
            .into_iter()
            .map(|book| (book.id.clone(), book))
            .collect();

        Self {
            books: Arc::new(RwLock::new(books)),
        }
    }

    /// Insert or replace a book
    pub async fn insert(&self, book: Book) {
        self.books.write().await.insert(book.id.clone(), book);
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn read_by_id(&self, id: &str) -> StoreResult<Book> {
        let books = self.books.read().await;
        books
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("book", id))
    }

    async fn read_many_by_id(&self, ids: &[String]) -> StoreResult<Vec<Book>> {
        let books = self.books.read().await;
        Ok(ids.iter().filter_map(|id| books.get(id).cloned()).collect())
    }
}

/// In-memory list item store (for development/testing)
///
/// Uniqueness of `(owner_id, book_id)` is checked under the write lock, so two
/// concurrent creates for the same pair cannot both succeed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryListItemStore {
    items: Arc<RwLock<Vec<ListItem>>>,
}

impl InMemoryListItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully formed item, keeping its id
    pub async fn insert(&self, item: ListItem) -> StoreResult<ListItem> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(StoreError::DuplicateId { id: item.id });
        }
        Self::ensure_unique(&items, &item.owner_id, &item.book_id)?;
        items.push(item.clone());
        Ok(item)
    }

    fn ensure_unique(items: &[ListItem], owner_id: &str, book_id: &str) -> StoreResult<()> {
        let taken = items
            .iter()
            .any(|item| item.owner_id == owner_id && item.book_id == book_id);

        if taken {
            return Err(StoreError::Conflict {
                owner_id: owner_id.to_string(),
                book_id: book_id.to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ListItemStore for InMemoryListItemStore {
    async fn read_by_id(&self, id: &str) -> StoreResult<Option<ListItem>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    async fn query(&self, filter: ListItemFilter) -> StoreResult<Vec<ListItem>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }

    async fn create(&self, fields: NewListItem) -> StoreResult<ListItem> {
        let mut items = self.items.write().await;
        Self::ensure_unique(&items, &fields.owner_id, &fields.book_id)?;

        let item = ListItem {
            id: Uuid::now_v7().to_string(),
            owner_id: fields.owner_id,
            book_id: fields.book_id,
            rating: -1,
            notes: String::new(),
            start_date: None,
            finish_date: None,
        };
        items.push(item.clone());

        tracing::info!(
            list_item_id = %item.id,
            owner_id = %item.owner_id,
            book_id = %item.book_id,
            "created list item"
        );
        Ok(item)
    }
}
