pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Json, Router,
};
use shelf_authz::{require_auth, TokenVerifier};
use shelf_db::{BookStore, StoreError};
use shelf_http::error::AppError;
use shelf_kernel::{InitCtx, Module};

use models::BookResponse;

/// Read-only view of the book catalog
pub struct BooksModule {
    books: Arc<dyn BookStore>,
    verifier: Arc<dyn TokenVerifier>,
}

impl BooksModule {
    pub fn new(books: Arc<dyn BookStore>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { books, verifier }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            seeded = ctx.settings.store.books.len(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/{id}", get(get_book))
            .with_state(self.books.clone())
            .route_layer(middleware::from_fn_with_state(
                self.verifier.clone(),
                require_auth,
            ))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/BookResponse"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No book with this id",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/MessageBody"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "description": "Unique identifier for the book"
                            },
                            "title": {
                                "type": "string",
                                "description": "Title of the book"
                            },
                            "author": {
                                "type": "string",
                                "description": "Author of the book"
                            },
                            "coverImageUrl": { "type": "string" },
                            "pageCount": { "type": "integer" },
                            "publisher": { "type": "string" },
                            "synopsis": { "type": "string" }
                        },
                        "required": ["id", "title", "author"]
                    },
                    "BookResponse": {
                        "type": "object",
                        "properties": {
                            "book": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["book"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Look up a single book by id
async fn get_book(
    State(books): State<Arc<dyn BookStore>>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    match books.read_by_id(&id).await {
        Ok(book) => Ok(Json(BookResponse { book })),
        Err(StoreError::NotFound { .. }) => Err(AppError::not_found(format!(
            "No book was found with the id of {}",
            id
        ))),
        Err(err) => Err(anyhow::Error::new(err)
            .context(format!("failed to read book '{}'", id))
            .into()),
    }
}

/// Create a new instance of the books module
pub fn create_module(
    books: Arc<dyn BookStore>,
    verifier: Arc<dyn TokenVerifier>,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(books, verifier))
}
