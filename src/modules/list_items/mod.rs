pub mod controller;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{middleware, routing::get, Router};
use shelf_authz::{require_auth, TokenVerifier};
use shelf_db::{BookStore, ListItemStore};
use shelf_kernel::{InitCtx, Module};

use controller::{
    create_list_item, get_list_item, get_list_items, set_list_item, ListItemsState,
};

/// Reading-list items: one per user and book, visible only to their owner
pub struct ListItemsModule {
    state: ListItemsState,
    verifier: Arc<dyn TokenVerifier>,
}

impl ListItemsModule {
    pub fn new(
        books: Arc<dyn BookStore>,
        list_items: Arc<dyn ListItemStore>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            state: ListItemsState::new(books, list_items),
            verifier,
        }
    }
}

#[async_trait]
impl Module for ListItemsModule {
    fn name(&self) -> &'static str {
        "list-items"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "list-items module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        // authentication wraps every route; the ownership gate only `/{id}`
        Router::new()
            .route("/", get(get_list_items).post(create_list_item))
            .route(
                "/{id}",
                get(get_list_item).route_layer(middleware::from_fn_with_state(
                    self.state.clone(),
                    set_list_item,
                )),
            )
            .with_state(self.state.clone())
            .route_layer(middleware::from_fn_with_state(
                self.verifier.clone(),
                require_auth,
            ))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List the caller's list items",
                        "tags": ["ListItems"],
                        "responses": {
                            "200": {
                                "description": "List items expanded with their books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ListItemsResponse"
                                        }
                                    }
                                }
                            },
                            "401": {
                                "description": "Missing or invalid token",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/UnauthorizedBody"
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a list item for a book",
                        "tags": ["ListItems"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "$ref": "#/components/schemas/CreateListItem"
                                    }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Created list item expanded with its book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ListItemResponse"
                                        }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing bookId or duplicate list item",
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
                },
                "/{id}": {
                    "get": {
                        "summary": "Get one of the caller's list items",
                        "tags": ["ListItems"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "List item expanded with its book",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/ListItemResponse"
                                        }
                                    }
                                }
                            },
                            "403": {
                                "description": "List item belongs to another user",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "$ref": "#/components/schemas/MessageBody"
                                        }
                                    }
                                }
                            },
                            "404": {
                                "description": "No list item with this id",
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
                    "ListItem": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "ownerId": { "type": "string" },
                            "bookId": { "type": "string" },
                            "rating": { "type": "integer" },
                            "notes": { "type": "string" },
                            "startDate": { "type": ["integer", "null"] },
                            "finishDate": { "type": ["integer", "null"] },
                            "book": { "$ref": "#/components/schemas/Book" }
                        },
                        "required": ["id", "ownerId", "bookId", "rating", "notes"]
                    },
                    "ListItemResponse": {
                        "type": "object",
                        "properties": {
                            "listItem": { "$ref": "#/components/schemas/ListItem" }
                        },
                        "required": ["listItem"]
                    },
                    "ListItemsResponse": {
                        "type": "object",
                        "properties": {
                            "listItems": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/ListItem" }
                            }
                        },
                        "required": ["listItems"]
                    },
                    "CreateListItem": {
                        "type": "object",
                        "properties": {
                            "bookId": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "list-items module stopped");
        Ok(())
    }
}

/// Create a new instance of the list-items module
pub fn create_module(
    books: Arc<dyn BookStore>,
    list_items: Arc<dyn ListItemStore>,
    verifier: Arc<dyn TokenVerifier>,
) -> Arc<dyn Module> {
    Arc::new(ListItemsModule::new(books, list_items, verifier))
}
