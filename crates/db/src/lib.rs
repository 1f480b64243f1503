//! Store contracts for books and list items.
//!
//! The service only talks to persistence through [`BookStore`] and
//! [`ListItemStore`]. The in-memory implementations back local runs and tests.

pub mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryBookStore, InMemoryListItemStore};
pub use models::{Book, ListItem, ListItemFilter, NewListItem};
pub use store::{BookStore, ListItemStore};
