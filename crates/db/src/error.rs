use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} '{id}' was not found")]
    NotFound { entity: &'static str, id: String },

    /// A write would break the one-item-per-(owner, book) rule
    #[error("list item for owner '{owner_id}' and book '{book_id}' already exists")]
    Conflict { owner_id: String, book_id: String },

    /// An item with this id is already stored
    #[error("list item '{id}' already exists")]
    DuplicateId { id: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
