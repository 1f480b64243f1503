//! shelf application library
//!
//! Feature modules (books, list items) and the wiring that hands them their
//! stores and token verifier.

pub mod modules;
pub mod utils;

use std::sync::Arc;

use shelf_authz::{StaticTokenVerifier, TokenVerifier, User};
use shelf_db::{Book, BookStore, InMemoryBookStore, InMemoryListItemStore, ListItemStore};
use shelf_kernel::{settings::Settings, ModuleRegistry};

/// Collaborators shared by the feature modules
#[derive(Clone)]
pub struct AppDeps {
    pub books: Arc<dyn BookStore>,
    pub list_items: Arc<dyn ListItemStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppDeps {
    /// In-memory stores seeded from `store.books`, tokens from `auth.users`
    pub fn in_memory(settings: &Settings) -> Self {
        let books = settings.store.books.iter().cloned().map(|seed| Book {
            id: seed.id,
            title: seed.title,
            author: seed.author,
            cover_image_url: seed.cover_image_url,
            page_count: seed.page_count,
            publisher: seed.publisher,
            synopsis: seed.synopsis,
        });

        let users = settings.auth.users.iter().cloned().map(|seed| {
            (
                seed.token,
                User {
                    id: seed.id,
                    username: seed.username,
                },
            )
        });
        let verifier = StaticTokenVerifier::new(users);
        if verifier.is_empty() {
            tracing::warn!("no users configured under [auth]; every request will be rejected");
        } else {
            tracing::info!(users = verifier.len(), "static token verifier ready");
        }

        Self {
            books: Arc::new(InMemoryBookStore::with_books(books)),
            list_items: Arc::new(InMemoryListItemStore::new()),
            verifier: Arc::new(verifier),
        }
    }
}

/// Registry with every feature module registered against `deps`
pub fn build_registry(deps: &AppDeps) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, deps)?;
    Ok(registry)
}
