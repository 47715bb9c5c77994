use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::catalog::{HomePage, ProductDetail, ProductIndex},
    error::AppResult,
    i18n::Locale,
    response::ApiResponse,
    routes::params::CatalogQuery,
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/products", get(list_products))
        .route("/products/{slug}", get(show_product))
}

#[utoipa::path(
    get,
    path = "/",
    params(
        ("locale" = Option<String>, Query, description = "en or id; falls back to Accept-Language")
    ),
    responses(
        (status = 200, description = "Featured products", body = ApiResponse<HomePage>)
    ),
    tag = "Catalog"
)]
pub async fn home(
    State(state): State<AppState>,
    locale: Locale,
) -> AppResult<Json<ApiResponse<HomePage>>> {
    let resp = catalog_service::home(&state, locale).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/products",
    params(
        CatalogQuery,
        ("locale" = Option<String>, Query, description = "en or id")
    ),
    responses(
        (status = 200, description = "Active products, featured first", body = ApiResponse<ProductIndex>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    locale: Locale,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<ApiResponse<ProductIndex>>> {
    let resp = catalog_service::list_products(&state, locale, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/products/{slug}",
    params(
        ("slug" = String, Path, description = "Product slug"),
        ("locale" = Option<String>, Query, description = "en or id")
    ),
    responses(
        (status = 200, description = "Product with variants and related products", body = ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Catalog"
)]
pub async fn show_product(
    State(state): State<AppState>,
    locale: Locale,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = catalog_service::show_product(&state, locale, &slug).await?;
    Ok(Json(resp))
}
