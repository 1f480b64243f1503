//! List item handlers and the ownership gate in front of item-scoped routes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::{header::CONTENT_TYPE, HeaderMap},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use shelf_authz::{AuthenticatedUser, User};
use shelf_db::{
    Book, BookStore, ListItem, ListItemFilter, ListItemStore, NewListItem, StoreError,
};
use shelf_http::error::AppError;

use super::models::{CreateListItem, ExpandedListItem, ListItemResponse, ListItemsResponse};

/// Stores injected into every list item handler
#[derive(Clone)]
pub struct ListItemsState {
    pub books: Arc<dyn BookStore>,
    pub list_items: Arc<dyn ListItemStore>,
}

impl ListItemsState {
    pub fn new(books: Arc<dyn BookStore>, list_items: Arc<dyn ListItemStore>) -> Self {
        Self { books, list_items }
    }
}

fn duplicate_item(owner_id: &str, book_id: &str) -> AppError {
    AppError::bad_request(format!(
        "User {} already has a list item for the book with the ID {}",
        owner_id, book_id
    ))
}

/// Load list item `id` and check that `user` owns it.
pub async fn authorize_list_item(
    list_items: &dyn ListItemStore,
    user: &User,
    id: &str,
) -> Result<ListItem, AppError> {
    let item = list_items
        .read_by_id(id)
        .await
        .with_context(|| format!("failed to read list item '{}'", id))?
        .ok_or_else(|| {
            AppError::not_found(format!("No list item was found with the id of {}", id))
        })?;

    if item.owner_id != user.id {
        tracing::info!(
            user_id = %user.id,
            list_item_id = %item.id,
            "list item access denied"
        );
        return Err(AppError::forbidden(format!(
            "User with id {} is not authorized to access the list item {}",
            user.id, item.id
        )));
    }

    Ok(item)
}

/// Gate for `/{id}` routes: attaches the authorized [`ListItem`] to the request
/// and only then runs the downstream handler.
pub async fn set_list_item(
    State(state): State<ListItemsState>,
    Path(id): Path<String>,
    AuthenticatedUser(user): AuthenticatedUser,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let item = authorize_list_item(state.list_items.as_ref(), &user, &id).await?;

    request.extensions_mut().insert(item);
    Ok(next.run(request).await)
}

async fn expand_book_data(
    books: &dyn BookStore,
    list_item: ListItem,
) -> anyhow::Result<ExpandedListItem> {
    let book = books
        .read_by_id(&list_item.book_id)
        .await
        .with_context(|| format!("failed to read book '{}'", list_item.book_id))?;

    Ok(ExpandedListItem::new(list_item, Some(book)))
}

/// Returns the list item attached by [`set_list_item`], expanded with its book
pub async fn get_list_item(
    State(state): State<ListItemsState>,
    Extension(list_item): Extension<ListItem>,
) -> Result<Json<ListItemResponse>, AppError> {
    let list_item = expand_book_data(state.books.as_ref(), list_item).await?;

    Ok(Json(ListItemResponse { list_item }))
}

/// Distinct book ids in first-seen order
fn distinct_book_ids(items: &[ListItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.book_id.as_str()))
        .map(|item| item.book_id.clone())
        .collect()
}

/// Pair each item with its book by id, keeping the order of `items`
fn join_books(items: Vec<ListItem>, books: Vec<Book>) -> Vec<ExpandedListItem> {
    let by_id: HashMap<String, Book> = books
        .into_iter()
        .map(|book| (book.id.clone(), book))
        .collect();

    items
        .into_iter()
        .map(|item| {
            let book = by_id.get(&item.book_id).cloned();
            if book.is_none() {
                tracing::warn!(
                    list_item_id = %item.id,
                    book_id = %item.book_id,
                    "book missing from catalog"
                );
            }
            ExpandedListItem::new(item, book)
        })
        .collect()
}

/// Every list item owned by the caller, each expanded with its book
pub async fn get_list_items(
    State(state): State<ListItemsState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<ListItemsResponse>, AppError> {
    let items = state
        .list_items
        .query(ListItemFilter::owned_by(&user.id))
        .await
        .with_context(|| format!("failed to query list items of user '{}'", user.id))?;

    let book_ids = distinct_book_ids(&items);
    let books = state
        .books
        .read_many_by_id(&book_ids)
        .await
        .context("failed to read books for list items")?;

    Ok(Json(ListItemsResponse {
        list_items: join_books(items, books),
    }))
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Body of `POST /`
///
/// A request without a JSON body reads as `{}`, so it reaches the handler's
/// own `bookId` check. Malformed JSON is a 400 with a `{message}` body.
#[derive(Debug, Clone, Default)]
pub struct CreateListItemBody(pub CreateListItem);

impl<S> FromRequest<S> for CreateListItemBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(request.headers());
        let bytes = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        if !is_json || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let Json(input) = Json::<CreateListItem>::from_bytes(&bytes)?;
        Ok(Self(input))
    }
}

/// Create the caller's list item for `bookId`; one item per user and book
pub async fn create_list_item(
    State(state): State<ListItemsState>,
    AuthenticatedUser(user): AuthenticatedUser,
    CreateListItemBody(input): CreateListItemBody,
) -> Result<Json<ListItemResponse>, AppError> {
    let Some(book_id) = input.book_id.filter(|id| !id.is_empty()) else {
        return Err(AppError::bad_request("No bookId provided"));
    };
    let owner_id = user.id;

    let existing = state
        .list_items
        .query(ListItemFilter::owned_by(&owner_id).with_book(&book_id))
        .await
        .context("failed to check for an existing list item")?;
    if !existing.is_empty() {
        return Err(duplicate_item(&owner_id, &book_id));
    }

    let created = match state
        .list_items
        .create(NewListItem {
            owner_id: owner_id.clone(),
            book_id: book_id.clone(),
        })
        .await
    {
        Ok(item) => item,
        // lost a race with a concurrent create for the same pair
        Err(StoreError::Conflict { .. }) => return Err(duplicate_item(&owner_id, &book_id)),
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context("failed to create list item")
                .into())
        }
    };

    let book = state
        .books
        .read_by_id(&book_id)
        .await
        .with_context(|| format!("failed to read book '{}'", book_id))?;

    Ok(Json(ListItemResponse {
        list_item: ExpandedListItem::new(created, Some(book)),
    }))
}
