use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use toko_api::{
    db::{create_pool, run_migrations},
    dto::{
        cart::{AddToCartRequest, UpdateCartRequest},
        orders::CheckoutRequest,
    },
    entity::{
        categories::ActiveModel as CategoryActive, product_variants::ActiveModel as VariantActive,
        products::ActiveModel as ProductActive, users::ActiveModel as UserActive,
    },
    error::AppError,
    i18n::Locale,
    middleware::auth::{AuthUser, CartOwner},
    models::{Address, ImageList, OrderStatus, PaymentStatus, ShippingMethod},
    services::{cart_service, order_service},
    state::AppState,
};
use uuid::Uuid;

fn idr(amount: i64) -> Decimal {
    Decimal::new(amount, 0)
}

// Both scenarios share one database, so they run in sequence from a single test.
#[tokio::test]
async fn cart_and_checkout_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    checkout_flow(&state).await?;
    session_flow(&state).await?;
    session_key_cannot_reach_user_cart(&state).await?;
    failed_placement_leaves_no_trace(&state).await?;
    Ok(())
}

// Cart -> checkout against a real database.
async fn checkout_flow(state: &AppState) -> anyhow::Result<()> {
    let user_id = create_user(state, "customer", "shopper@example.com").await?;
    let customer = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let owner = CartOwner::from(&customer);

    let category_id = create_category(state, "clothing").await?;
    let shirt = create_product(state, category_id, "cotton-t-shirt", "TS-001", 150_000).await?;
    let variant_id = create_variant(state, shirt, "TS-001-XL-NVY", 25_000).await?;

    // Adding the same product twice merges into one row at the first price.
    for _ in 0..2 {
        cart_service::add_item(
            state,
            &owner,
            AddToCartRequest {
                product_id: shirt,
                product_variant_id: None,
                quantity: 1,
            },
        )
        .await?;
    }

    let cart = cart_service::list_items(state, &owner, Locale::En)
        .await?
        .data
        .expect("cart view");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].price, idr(150_000));
    assert_eq!(cart.summary.subtotal, idr(300_000));
    assert_eq!(cart.summary.tax_amount, idr(30_000));
    assert_eq!(cart.summary.shipping_cost, idr(25_000));
    assert_eq!(cart.summary.total, idr(355_000));

    let preview = order_service::checkout_preview(state, &customer, Locale::En, ShippingMethod::Express)
        .await?
        .data
        .expect("preview");
    assert_eq!(preview.summary.shipping_cost, idr(50_000));
    assert_eq!(preview.summary.total, idr(380_000));

    // Variant rows are priced at base + adjustment.
    let variant_row = cart_service::add_item(
        state,
        &owner,
        AddToCartRequest {
            product_id: shirt,
            product_variant_id: Some(variant_id),
            quantity: 1,
        },
    )
    .await?
    .data
    .expect("cart row");
    assert_eq!(variant_row.price, idr(175_000));

    // Rows are scoped to their owner.
    let stranger = CartOwner::Session("someone-else".into());
    let err = cart_service::update_quantity(
        state,
        &stranger,
        variant_row.id,
        UpdateCartRequest { quantity: 9 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    let err = cart_service::remove_item(state, &stranger, variant_row.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let before = cart_service::list_items(state, &owner, Locale::Id)
        .await?
        .data
        .expect("cart view");

    let placed = order_service::place_order(state, &customer, Locale::Id, checkout_request("regular"))
        .await?
        .data
        .expect("order");
    let order = placed.order;
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.currency, "IDR");
    assert_eq!(order.subtotal, before.summary.subtotal);
    assert_eq!(order.total, before.summary.total);
    assert_eq!(order.total, idr(475_000) + idr(47_500) + idr(25_000));
    assert_eq!(placed.items.len(), 2);

    let variant_item = placed
        .items
        .iter()
        .find(|item| item.product_variant_id == Some(variant_id))
        .expect("variant item");
    assert_eq!(variant_item.product_name, "Kaos cotton-t-shirt");
    assert_eq!(variant_item.product_sku, "TS-001-XL-NVY");
    assert_eq!(variant_item.total, idr(175_000));

    let cart = cart_service::list_items(state, &owner, Locale::En)
        .await?
        .data
        .expect("cart view");
    assert!(cart.items.is_empty());

    // A second submit finds nothing to order.
    let err = order_service::place_order(state, &customer, Locale::En, checkout_request("express"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    let history = order_service::list_orders(state, &customer, Default::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(history.items.len(), 1);

    let other = AuthUser {
        user_id: create_user(state, "customer", "other@example.com").await?,
        role: "customer".into(),
    };
    let err = order_service::get_order(state, &other, order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

// Anonymous carts live under the session id and stay apart from user carts.
async fn session_flow(state: &AppState) -> anyhow::Result<()> {
    let category_id = create_category(state, "home").await?;
    let mug = create_product(state, category_id, "ceramic-mug", "MG-001", 65_000).await?;

    let guest = CartOwner::Session("guest-a".into());
    cart_service::add_item(
        state,
        &guest,
        AddToCartRequest {
            product_id: mug,
            product_variant_id: None,
            quantity: 3,
        },
    )
    .await?;

    let guest_cart = cart_service::list_items(state, &guest, Locale::En)
        .await?
        .data
        .expect("cart view");
    assert_eq!(guest_cart.session_id.as_deref(), Some("guest-a"));
    assert_eq!(guest_cart.items.len(), 1);

    let other = cart_service::list_items(state, &CartOwner::Session("guest-b".into()), Locale::En)
        .await?
        .data
        .expect("cart view");
    assert!(other.items.is_empty());

    // Inactive or mismatched catalog rows cannot be added.
    let err = cart_service::add_item(
        state,
        &guest,
        AddToCartRequest {
            product_id: mug,
            product_variant_id: Some(Uuid::new_v4()),
            quantity: 1,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

// A session id spelled like a user id is still a separate cart.
async fn session_key_cannot_reach_user_cart(state: &AppState) -> anyhow::Result<()> {
    let user_id = create_user(state, "customer", "tote-owner@example.com").await?;
    let customer = CartOwner::User(user_id);
    let category_id = create_category(state, "bags").await?;
    let tote = create_product(state, category_id, "canvas-tote", "TT-001", 90_000).await?;

    cart_service::add_item(
        state,
        &customer,
        AddToCartRequest {
            product_id: tote,
            product_variant_id: None,
            quantity: 1,
        },
    )
    .await?;

    let lookalike = CartOwner::Session(user_id.to_string());
    let row = cart_service::add_item(
        state,
        &lookalike,
        AddToCartRequest {
            product_id: tote,
            product_variant_id: None,
            quantity: 5,
        },
    )
    .await?
    .data
    .expect("cart row");
    assert_eq!(row.user_id, None);
    assert_eq!(row.session_id, Some(user_id.to_string()));
    assert_eq!(row.quantity, 5);

    let customer_cart = cart_service::list_items(state, &customer, Locale::En)
        .await?
        .data
        .expect("cart view");
    assert_eq!(customer_cart.items.len(), 1);
    assert_eq!(customer_cart.items[0].quantity, 1);

    let lookalike_cart = cart_service::list_items(state, &lookalike, Locale::En)
        .await?
        .data
        .expect("cart view");
    assert_eq!(lookalike_cart.items.len(), 1);
    assert_eq!(lookalike_cart.items[0].quantity, 5);

    Ok(())
}

const REJECT_ORDER_ITEMS_FN: &str = r#"
    CREATE OR REPLACE FUNCTION reject_order_items() RETURNS trigger AS $$
    BEGIN
        RAISE EXCEPTION 'order items are not accepted';
    END;
    $$ LANGUAGE plpgsql
"#;

const REJECT_ORDER_ITEMS_TRIGGER: &str = "CREATE TRIGGER reject_order_items BEFORE INSERT ON order_items \
     FOR EACH ROW EXECUTE FUNCTION reject_order_items()";

async fn drop_item_rejection(state: &AppState) -> anyhow::Result<()> {
    let backend = state.orm.get_database_backend();
    for sql in [
        "DROP TRIGGER IF EXISTS reject_order_items ON order_items",
        "DROP FUNCTION IF EXISTS reject_order_items()",
    ] {
        state.orm.execute(Statement::from_string(backend, sql)).await?;
    }
    Ok(())
}

// An item insert failing after the order header is written undoes the whole placement.
async fn failed_placement_leaves_no_trace(state: &AppState) -> anyhow::Result<()> {
    let user_id = create_user(state, "customer", "scarf-buyer@example.com").await?;
    let customer = AuthUser {
        user_id,
        role: "customer".into(),
    };
    let owner = CartOwner::from(&customer);
    let category_id = create_category(state, "scarves").await?;
    let scarf = create_product(state, category_id, "batik-scarf", "SC-001", 120_000).await?;

    cart_service::add_item(
        state,
        &owner,
        AddToCartRequest {
            product_id: scarf,
            product_variant_id: None,
            quantity: 2,
        },
    )
    .await?;
    let before = cart_service::list_items(state, &owner, Locale::En)
        .await?
        .data
        .expect("cart view");

    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(backend, REJECT_ORDER_ITEMS_FN))
        .await?;
    state
        .orm
        .execute(Statement::from_string(backend, REJECT_ORDER_ITEMS_TRIGGER))
        .await?;

    let result = order_service::place_order(state, &customer, Locale::En, checkout_request("regular")).await;
    drop_item_rejection(state).await?;
    let err = result.unwrap_err();
    assert!(matches!(err, AppError::OrmError(_)), "unexpected error: {err:?}");

    let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(orders, 0);

    let after = cart_service::list_items(state, &owner, Locale::En)
        .await?
        .data
        .expect("cart view");
    assert_eq!(after.items.len(), 1);
    assert_eq!(after.items[0].id, before.items[0].id);
    assert_eq!(after.items[0].quantity, 2);
    assert_eq!(after.summary, before.summary);

    // The untouched cart can still be checked out.
    let placed = order_service::place_order(state, &customer, Locale::En, checkout_request("regular"))
        .await?
        .data
        .expect("order");
    assert_eq!(placed.order.total, before.summary.total);
    assert_eq!(placed.items.len(), 1);

    Ok(())
}

fn checkout_request(shipping: &str) -> CheckoutRequest {
    let address = Address {
        name: "Budi Santoso".into(),
        phone: "081234567890".into(),
        address: "Jl. Merdeka No. 1".into(),
        city: "Jakarta".into(),
        postal_code: "10110".into(),
    };
    CheckoutRequest {
        billing_address: address.clone(),
        shipping_address: address,
        payment_method: "bank_transfer".into(),
        shipping_method: shipping.into(),
        notes: Some("Leave at the front desk".into()),
    }
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    let state = AppState::new(pool, "flow-test-secret");
    run_migrations(&state.orm).await?;
    drop_item_rejection(&state).await?;

    let backend = state.orm.get_database_backend();
    state
        .orm
        .execute(Statement::from_string(
            backend,
            "TRUNCATE TABLE order_items, orders, carts, product_variants, products, categories, audit_logs, users CASCADE",
        ))
        .await?;

    Ok(Some(state))
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set("Test User".into()),
        email: Set(email.into()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(user.id)
}

async fn create_category(state: &AppState, slug: &str) -> anyhow::Result<Uuid> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name_en: Set(format!("Category {slug}")),
        name_id: Set(format!("Kategori {slug}")),
        slug: Set(slug.into()),
        description_en: Set(None),
        description_id: Set(None),
        image: Set(None),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(category.id)
}

async fn create_product(
    state: &AppState,
    category_id: Uuid,
    slug: &str,
    sku: &str,
    price: i64,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name_en: Set(format!("Shirt {slug}")),
        name_id: Set(format!("Kaos {slug}")),
        slug: Set(slug.into()),
        description_en: Set(None),
        description_id: Set(None),
        short_description_en: Set(None),
        short_description_id: Set(None),
        base_price: Set(idr(price)),
        sku: Set(sku.into()),
        stock_quantity: Set(5),
        weight: Set(None),
        images: Set(ImageList::default()),
        is_active: Set(true),
        is_featured: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

async fn create_variant(
    state: &AppState,
    product_id: Uuid,
    sku: &str,
    adjustment: i64,
) -> anyhow::Result<Uuid> {
    let variant = VariantActive {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        size: Set(Some("XL".into())),
        color: Set(Some("Navy".into())),
        sku: Set(sku.into()),
        price_adjustment: Set(idr(adjustment)),
        stock_quantity: Set(1),
        image: Set(None),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(variant.id)
}
