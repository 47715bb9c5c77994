use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::{self, AuditAction},
    dto::cart::{AddToCartRequest, CartLineDto, CartView, UpdateCartRequest},
    entity::{
        cart_items::{self, ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        product_variants::{self, Column as VariantCol, Entity as ProductVariants},
        products::{self, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    i18n::Locale,
    middleware::auth::CartOwner,
    models::{CartItem, ShippingMethod, variant_label},
    pricing::{PriceLine, line_total, summarize, unit_price},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Merges into the existing row for the same owner, product and variant. The
/// conflict target mirrors the `uq_carts_owner_key_product_variant` index.
const UPSERT_CART_ROW: &str = r#"
    INSERT INTO carts (id, user_id, session_id, product_id, product_variant_id, quantity, price)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (
        (COALESCE('u:' || user_id::text, 's:' || session_id)),
        product_id,
        (COALESCE(product_variant_id, '00000000-0000-0000-0000-000000000000'::uuid))
    )
    DO UPDATE SET quantity = carts.quantity + EXCLUDED.quantity, updated_at = now()
    RETURNING *
"#;

/// A cart row together with the catalog rows it points at.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: cart_items::Model,
    pub product: products::Model,
    pub variant: Option<product_variants::Model>,
}

impl CartLine {
    pub fn price_line(&self) -> PriceLine {
        PriceLine::new(self.item.quantity, self.item.price)
    }

    pub fn to_dto(&self, locale: Locale) -> CartLineDto {
        let product = &self.product;
        CartLineDto {
            id: self.item.id,
            product_id: product.id,
            product_variant_id: self.item.product_variant_id,
            slug: product.slug.clone(),
            name: locale.pick(&product.name_en, &product.name_id).to_string(),
            sku: self
                .variant
                .as_ref()
                .map_or_else(|| product.sku.clone(), |v| v.sku.clone()),
            variant_name: self
                .variant
                .as_ref()
                .map(|v| variant_label(v.size.as_deref(), v.color.as_deref())),
            image: self
                .variant
                .as_ref()
                .and_then(|v| v.image.clone())
                .or_else(|| product.images.0.first().cloned()),
            quantity: self.item.quantity,
            price: self.item.price,
            line_total: line_total(self.item.quantity, self.item.price),
        }
    }
}

pub(crate) fn owner_condition(owner: &CartOwner) -> Condition {
    match owner {
        CartOwner::User(user_id) => Condition::all().add(CartCol::UserId.eq(*user_id)),
        CartOwner::Session(session_id) => Condition::all()
            .add(CartCol::UserId.is_null())
            .add(CartCol::SessionId.eq(session_id.as_str())),
    }
}

/// Every cart row of `owner`, oldest first. With `lock` the cart rows are
/// selected `FOR UPDATE`; catalog rows are read without locks.
pub(crate) async fn load_cart_lines<C>(
    conn: &C,
    owner: &CartOwner,
    lock: bool,
) -> AppResult<Vec<CartLine>>
where
    C: ConnectionTrait,
{
    let mut finder = CartItems::find()
        .filter(owner_condition(owner))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id);
    if lock {
        finder = finder.lock(LockType::Update);
    }
    let items = finder.all(conn).await?;
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let product_map: HashMap<Uuid, products::Model> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let variant_ids: Vec<Uuid> = items
        .iter()
        .filter_map(|item| item.product_variant_id)
        .collect();
    let variant_map: HashMap<Uuid, product_variants::Model> = if variant_ids.is_empty() {
        HashMap::new()
    } else {
        ProductVariants::find()
            .filter(VariantCol::Id.is_in(variant_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect()
    };

    items
        .into_iter()
        .map(|item| {
            let product = product_map.get(&item.product_id).cloned().ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "cart row {} references missing product {}",
                    item.id,
                    item.product_id
                ))
            })?;
            let variant = item
                .product_variant_id
                .and_then(|id| variant_map.get(&id).cloned());
            Ok(CartLine {
                item,
                product,
                variant,
            })
        })
        .collect()
}

pub async fn list_items(
    state: &AppState,
    owner: &CartOwner,
    locale: Locale,
) -> AppResult<ApiResponse<CartView>> {
    let lines = load_cart_lines(&state.orm, owner, false).await?;
    let summary = summarize(lines.iter().map(CartLine::price_line), ShippingMethod::Regular);
    let items = lines.iter().map(|line| line.to_dto(locale)).collect();

    Ok(ApiResponse::success(
        "OK",
        CartView {
            session_id: owner.session_id().map(str::to_owned),
            items,
            summary,
        },
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    state: &AppState,
    owner: &CartOwner,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    payload.validate()?;

    let product = Products::find_by_id(payload.product_id)
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let variant = match payload.product_variant_id {
        Some(variant_id) => Some(
            ProductVariants::find_by_id(variant_id)
                .filter(VariantCol::ProductId.eq(product.id))
                .filter(VariantCol::IsActive.eq(true))
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?,
        ),
        None => None,
    };

    let price = unit_price(
        product.base_price,
        variant.as_ref().map(|v| v.price_adjustment),
    );

    let statement = Statement::from_sql_and_values(
        DbBackend::Postgres,
        UPSERT_CART_ROW,
        [
            Uuid::new_v4().into(),
            owner.user_id().into(),
            owner.session_id().map(str::to_owned).into(),
            product.id.into(),
            variant.as_ref().map(|v| v.id).into(),
            payload.quantity.into(),
            price.into(),
        ],
    );
    let row = CartItems::find()
        .from_raw_sql(statement)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("cart upsert returned no row")))?;

    tracing::info!(
        cart_id = %row.id,
        product_id = %product.id,
        quantity = row.quantity,
        "cart item added"
    );
    audit::record(
        &state.pool,
        owner.user_id(),
        AuditAction::CartAdd,
        serde_json::json!({
            "cart_id": row.id,
            "product_id": product.id,
            "product_variant_id": row.product_variant_id,
            "quantity": payload.quantity,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product added to cart successfully.",
        CartItem::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn update_quantity(
    state: &AppState,
    owner: &CartOwner,
    id: Uuid,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    payload.validate()?;

    let existing = CartItems::find_by_id(id)
        .filter(owner_condition(owner))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CartActive = existing.into();
    active.quantity = Set(payload.quantity);
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        owner.user_id(),
        AuditAction::CartUpdate,
        serde_json::json!({ "cart_id": row.id, "quantity": row.quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Cart updated successfully.",
        CartItem::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn remove_item(
    state: &AppState,
    owner: &CartOwner,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(owner_condition(owner).add(CartCol::Id.eq(id)))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        owner.user_id(),
        AuditAction::CartRemove,
        serde_json::json!({ "cart_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Item removed from cart.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
