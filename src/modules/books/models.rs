use serde::{Deserialize, Serialize};
use shelf_db::Book;

/// `{book}` envelope returned by the lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}
