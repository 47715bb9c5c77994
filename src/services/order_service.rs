use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction},
    dto::orders::{CheckoutPreview, CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    i18n::Locale,
    middleware::auth::{AuthUser, CartOwner},
    models::{CURRENCY, Order, OrderItem, OrderStatus, PaymentStatus, ProductDetails, ShippingMethod},
    pricing::{OrderSummary, generate_order_number, summarize},
    response::{ApiResponse, Meta},
    routes::params::{ORDERS_PER_PAGE, Pagination},
    services::cart_service::{CartLine, load_cart_lines, owner_condition},
    state::AppState,
};

const ORDER_NUMBER_ATTEMPTS: usize = 5;

/// What an order item records about the product at purchase time.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSnapshot {
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
    pub product_name: String,
    pub product_sku: String,
    pub product_details: ProductDetails,
}

impl ItemSnapshot {
    pub fn from_line(line: &CartLine, locale: Locale) -> Self {
        let variant = line.variant.as_ref();
        let price_line = line.price_line();
        ItemSnapshot {
            product_id: line.product.id,
            product_variant_id: line.item.product_variant_id,
            quantity: price_line.quantity,
            price: price_line.price,
            total: price_line.total(),
            product_name: locale
                .pick(&line.product.name_en, &line.product.name_id)
                .to_string(),
            product_sku: variant.map_or_else(|| line.product.sku.clone(), |v| v.sku.clone()),
            product_details: ProductDetails {
                size: variant.and_then(|v| v.size.clone()),
                color: variant.and_then(|v| v.color.clone()),
                variant_sku: variant.map(|v| v.sku.clone()),
            },
        }
    }
}

pub async fn checkout_preview(
    state: &AppState,
    user: &AuthUser,
    locale: Locale,
    shipping_method: ShippingMethod,
) -> AppResult<ApiResponse<CheckoutPreview>> {
    let lines = load_cart_lines(&state.orm, &CartOwner::from(user), false).await?;
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let summary = summarize(lines.iter().map(CartLine::price_line), shipping_method);
    Ok(ApiResponse::success(
        "OK",
        CheckoutPreview {
            items: lines.iter().map(|line| line.to_dto(locale)).collect(),
            shipping_method,
            summary,
        },
        Some(Meta::empty()),
    ))
}

/// Turn the caller's cart into an order. Everything from locking the cart rows
/// to clearing them happens in one transaction; an early return drops `txn`
/// and rolls it back.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    locale: Locale,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let (payment_method, shipping_method) = payload.methods()?;
    let owner = CartOwner::from(user);

    let txn = state.orm.begin().await?;

    let lines = load_cart_lines(&txn, &owner, true).await?;
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let summary: OrderSummary = summarize(lines.iter().map(CartLine::price_line), shipping_method);
    let order_number = unique_order_number(&txn).await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        order_number: Set(order_number),
        user_id: Set(Some(user.user_id)),
        status: Set(OrderStatus::Pending),
        subtotal: Set(summary.subtotal),
        tax_amount: Set(summary.tax_amount),
        shipping_cost: Set(summary.shipping_cost),
        total: Set(summary.total),
        currency: Set(CURRENCY.to_string()),
        billing_address: Set(payload.billing_address.clone()),
        shipping_address: Set(payload.shipping_address.clone()),
        payment_method: Set(payment_method),
        payment_status: Set(PaymentStatus::Pending),
        shipping_method: Set(shipping_method),
        notes: Set(payload.notes()),
        shipped_at: Set(None),
        delivered_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let snapshot = ItemSnapshot::from_line(line, locale);
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(snapshot.product_id)),
            product_variant_id: Set(snapshot.product_variant_id),
            quantity: Set(snapshot.quantity),
            price: Set(snapshot.price),
            total: Set(snapshot.total),
            product_name: Set(snapshot.product_name),
            product_sku: Set(snapshot.product_sku),
            product_details: Set(Some(snapshot.product_details)),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));
    }

    let locked_ids: Vec<Uuid> = lines.iter().map(|line| line.item.id).collect();
    CartItems::delete_many()
        .filter(owner_condition(&owner).add(CartCol::Id.is_in(locked_ids)))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        items = items.len(),
        total = %order.total,
        "order placed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        AuditAction::OrderPlaced,
        serde_json::json!({
            "order_id": order.id,
            "order_number": order.order_number,
            "total": order.total,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed successfully!",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

async fn unique_order_number<C>(conn: &C) -> AppResult<String>
where
    C: ConnectionTrait,
{
    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let candidate = generate_order_number(Utc::now());
        let taken = Orders::find()
            .filter(OrderCol::OrderNumber.eq(candidate.as_str()))
            .count(conn)
            .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        tracing::debug!(order_number = %candidate, "order number collision, retrying");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique order number after {ORDER_NUMBER_ATTEMPTS} attempts"
    )))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize(ORDERS_PER_PAGE);
    let finder = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{cart_items, product_variants, products};
    use crate::models::ImageList;

    fn line(with_variant: bool) -> CartLine {
        let now = Utc::now().into();
        let product = products::Model {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name_en: "Linen Shirt".into(),
            name_id: "Kemeja Linen".into(),
            slug: "linen-shirt".into(),
            description_en: None,
            description_id: None,
            short_description_en: None,
            short_description_id: None,
            base_price: Decimal::new(150_000, 0),
            sku: "LN-001".into(),
            stock_quantity: 0,
            weight: None,
            images: ImageList::default(),
            is_active: true,
            is_featured: false,
            created_at: now,
            updated_at: now,
        };
        let variant = with_variant.then(|| product_variants::Model {
            id: Uuid::new_v4(),
            product_id: product.id,
            size: Some("L".into()),
            color: Some("Black".into()),
            sku: "LN-001-L-BLK".into(),
            price_adjustment: Decimal::new(25_000, 0),
            stock_quantity: 0,
            image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        });
        let item = cart_items::Model {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            session_id: None,
            product_id: product.id,
            product_variant_id: variant.as_ref().map(|v| v.id),
            quantity: 3,
            price: Decimal::new(175_000, 0),
            created_at: now,
            updated_at: now,
        };
        CartLine {
            item,
            product,
            variant,
        }
    }

    #[test]
    fn snapshot_uses_stored_price_and_locale_name() {
        let line = line(true);
        let snapshot = ItemSnapshot::from_line(&line, Locale::Id);
        assert_eq!(snapshot.product_name, "Kemeja Linen");
        assert_eq!(snapshot.price, Decimal::new(175_000, 0));
        assert_eq!(snapshot.total, Decimal::new(525_000, 0));
        assert_eq!(snapshot.quantity, 3);
    }

    #[test]
    fn snapshot_prefers_variant_sku_and_records_attributes() {
        let snapshot = ItemSnapshot::from_line(&line(true), Locale::En);
        assert_eq!(snapshot.product_sku, "LN-001-L-BLK");
        assert_eq!(snapshot.product_details.size.as_deref(), Some("L"));
        assert_eq!(snapshot.product_details.color.as_deref(), Some("Black"));
        assert_eq!(
            snapshot.product_details.variant_sku.as_deref(),
            Some("LN-001-L-BLK")
        );
    }

    #[test]
    fn snapshot_without_variant_falls_back_to_product_sku() {
        let snapshot = ItemSnapshot::from_line(&line(false), Locale::En);
        assert_eq!(snapshot.product_name, "Linen Shirt");
        assert_eq!(snapshot.product_sku, "LN-001");
        assert_eq!(snapshot.product_details, ProductDetails::default());
        assert_eq!(snapshot.product_variant_id, None);
    }
}
