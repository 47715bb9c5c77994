use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    audit::{self, AuditAction},
    dto::products::{
        AdminProductDetail, CreateProductRequest, CreateVariantRequest, ProductList,
        UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        product_variants::{
            ActiveModel as VariantActive, Column as VariantCol, Entity as ProductVariants,
        },
        products::{ActiveModel, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, ImageList, Product, ProductVariant},
    response::{ApiResponse, Meta},
    routes::params::{ADMIN_PRODUCTS_PER_PAGE, AdminProductQuery, ProductStatus},
    state::AppState,
};

fn add_field_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: &'static str,
) {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    errors.add(field, err);
}

/// Shape checks from the request plus the checks that need the database.
/// `exclude` is the product being updated, so it does not collide with itself.
async fn check_product_fields(
    state: &AppState,
    shape: Result<(), ValidationErrors>,
    category_id: Option<Uuid>,
    slug: Option<&str>,
    sku: Option<&str>,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let mut errors = shape.err().unwrap_or_default();

    if let Some(category_id) = category_id {
        if Categories::find_by_id(category_id)
            .one(&state.orm)
            .await?
            .is_none()
        {
            add_field_error(
                &mut errors,
                "category_id",
                "exists",
                "The selected category does not exist.",
            );
        }
    }

    let others = || match exclude {
        Some(id) => Condition::all().add(Column::Id.ne(id)),
        None => Condition::all(),
    };

    if let Some(slug) = slug {
        let taken = Products::find()
            .filter(others().add(Column::Slug.eq(slug)))
            .count(&state.orm)
            .await?;
        if taken > 0 {
            add_field_error(&mut errors, "slug", "unique", "The slug has already been taken.");
        }
    }

    if let Some(sku) = sku {
        let taken = Products::find()
            .filter(others().add(Column::Sku.eq(sku)))
            .count(&state.orm)
            .await?;
        if taken > 0 {
            add_field_error(&mut errors, "sku", "unique", "The sku has already been taken.");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: AdminProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize(ADMIN_PRODUCTS_PER_PAGE);
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::NameEn).ilike(pattern.clone()))
                .add(Expr::col(Column::NameId).ilike(pattern.clone()))
                .add(Expr::col(Column::Sku).ilike(pattern)),
        );
    }

    if let Some(category_id) = query.category {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(status) = query.status {
        condition = condition.add(Column::IsActive.eq(status == ProductStatus::Active));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<AdminProductDetail>> {
    ensure_admin(user)?;
    let (product, category) = Products::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let variants = ProductVariants::find()
        .filter(VariantCol::ProductId.eq(product.id))
        .order_by_asc(VariantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductVariant::from)
        .collect();

    Ok(ApiResponse::success(
        "Product",
        AdminProductDetail {
            product: Product::from(product),
            category: category.map(Category::from),
            variants,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    check_product_fields(
        state,
        payload.validate(),
        Some(payload.category_id),
        Some(&payload.slug),
        Some(&payload.sku),
        None,
    )
    .await?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(payload.category_id),
        name_en: Set(payload.name_en),
        name_id: Set(payload.name_id),
        slug: Set(payload.slug),
        description_en: Set(payload.description_en),
        description_id: Set(payload.description_id),
        short_description_en: Set(payload.short_description_en),
        short_description_id: Set(payload.short_description_id),
        base_price: Set(payload.base_price),
        sku: Set(payload.sku),
        stock_quantity: Set(payload.stock_quantity),
        weight: Set(payload.weight),
        images: Set(ImageList(payload.images.unwrap_or_default())),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, sku = %product.sku, "product created");
    audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::ProductCreate,
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created successfully.",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    check_product_fields(
        state,
        payload.validate(),
        payload.category_id,
        payload.slug.as_deref(),
        payload.sku.as_deref(),
        Some(existing.id),
    )
    .await?;

    let mut active: ActiveModel = existing.into();
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(category_id);
    }
    if let Some(name_en) = payload.name_en {
        active.name_en = Set(name_en);
    }
    if let Some(name_id) = payload.name_id {
        active.name_id = Set(name_id);
    }
    if let Some(slug) = payload.slug {
        active.slug = Set(slug);
    }
    if let Some(description_en) = payload.description_en {
        active.description_en = Set(Some(description_en));
    }
    if let Some(description_id) = payload.description_id {
        active.description_id = Set(Some(description_id));
    }
    if let Some(short) = payload.short_description_en {
        active.short_description_en = Set(Some(short));
    }
    if let Some(short) = payload.short_description_id {
        active.short_description_id = Set(Some(short));
    }
    if let Some(base_price) = payload.base_price {
        active.base_price = Set(base_price);
    }
    if let Some(sku) = payload.sku {
        active.sku = Set(sku);
    }
    if let Some(stock_quantity) = payload.stock_quantity {
        active.stock_quantity = Set(stock_quantity);
    }
    if let Some(weight) = payload.weight {
        active.weight = Set(Some(weight));
    }
    if let Some(images) = payload.images {
        active.images = Set(ImageList(images));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::ProductUpdate,
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated successfully.",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(product_id = %id, "product deleted");
    audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::ProductDelete,
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted successfully.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn add_variant(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateVariantRequest,
) -> AppResult<ApiResponse<ProductVariant>> {
    ensure_admin(user)?;
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut errors = payload.validate().err().unwrap_or_default();
    let taken = ProductVariants::find()
        .filter(VariantCol::Sku.eq(payload.sku.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        add_field_error(&mut errors, "sku", "unique", "The sku has already been taken.");
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        size: Set(payload.size),
        color: Set(payload.color),
        sku: Set(payload.sku),
        price_adjustment: Set(payload.price_adjustment.unwrap_or(Decimal::ZERO)),
        stock_quantity: Set(payload.stock_quantity.unwrap_or(0)),
        image: Set(payload.image),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::VariantCreate,
        serde_json::json!({ "product_id": product.id, "variant_id": variant.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Variant created successfully.",
        ProductVariant::from(variant),
        Some(Meta::empty()),
    ))
}
