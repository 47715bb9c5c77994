use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, UpdateCartRequest},
    error::AppResult,
    i18n::Locale,
    middleware::auth::CartOwner,
    models::CartItem,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cart_list).post(add_to_cart))
        .route("/{id}", patch(update_cart_item).delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/cart",
    params(
        ("x-session-id" = Option<String>, Header, description = "Anonymous cart session"),
        ("locale" = Option<String>, Query, description = "en or id")
    ),
    responses(
        (status = 200, description = "Cart rows with a regular-shipping summary", body = ApiResponse<CartView>)
    ),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    owner: CartOwner,
    locale: Locale,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::list_items(&state, &owner, locale).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/cart",
    params(
        ("x-session-id" = Option<String>, Header, description = "Anonymous cart session")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Row added or merged", body = ApiResponse<CartItem>),
        (status = 404, description = "Product or variant not available"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    owner: CartOwner,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_item(&state, &owner, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart row ID"),
        ("x-session-id" = Option<String>, Header, description = "Anonymous cart session")
    ),
    request_body = UpdateCartRequest,
    responses(
        (status = 200, description = "Quantity replaced", body = ApiResponse<CartItem>),
        (status = 404, description = "Not in the caller's cart"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "Cart"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    owner: CartOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_quantity(&state, &owner, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart row ID"),
        ("x-session-id" = Option<String>, Header, description = "Anonymous cart session")
    ),
    responses(
        (status = 200, description = "Row removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not in the caller's cart"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    owner: CartOwner,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_item(&state, &owner, id).await?;
    Ok(Json(resp))
}
