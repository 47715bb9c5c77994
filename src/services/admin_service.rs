use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sqlx::FromRow;

use crate::{
    dto::admin::{Dashboard, DashboardQuery, DashboardStats, SalesPeriod, SalesSeries, TopProduct},
    entity::{
        categories::Entity as Categories,
        orders::{Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus, PaymentStatus, Role},
    response::{ApiResponse, Meta},
    state::AppState,
};

const RECENT_ORDERS: u64 = 5;
const TOP_PRODUCTS: i64 = 5;

impl SalesPeriod {
    /// Unknown or missing values fall back to daily.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("weekly") => SalesPeriod::Weekly,
            Some("monthly") => SalesPeriod::Monthly,
            Some("yearly") => SalesPeriod::Yearly,
            _ => SalesPeriod::Daily,
        }
    }

    /// Postgres `to_char` pattern for the bucket label.
    pub fn bucket_format(&self) -> &'static str {
        match self {
            SalesPeriod::Daily => "YYYY-MM-DD",
            SalesPeriod::Weekly => "IYYY-IW",
            SalesPeriod::Monthly => "YYYY-MM",
            SalesPeriod::Yearly => "YYYY",
        }
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            SalesPeriod::Daily => now - Duration::days(30),
            SalesPeriod::Weekly => now - Duration::weeks(12),
            SalesPeriod::Monthly => now.checked_sub_months(Months::new(12)).unwrap_or(now),
            SalesPeriod::Yearly => now.checked_sub_months(Months::new(60)).unwrap_or(now),
        }
    }
}

#[derive(Debug, FromRow)]
struct SalesBucket {
    period: String,
    orders_count: i64,
    total_sales: Decimal,
    average_order_value: Decimal,
}

fn into_series(buckets: Vec<SalesBucket>) -> SalesSeries {
    let mut series = SalesSeries::default();
    for bucket in buckets {
        series.labels.push(bucket.period);
        series.orders.push(bucket.orders_count);
        series.sales.push(bucket.total_sales);
        series.average_order_value.push(bucket.average_order_value);
    }
    series
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
    query: DashboardQuery,
) -> AppResult<ApiResponse<Dashboard>> {
    ensure_admin(user)?;
    let period = SalesPeriod::parse(query.period.as_deref());

    let stats = stats(state).await?;
    let sales_data = sales_series(state, period, Utc::now()).await?;

    let recent_orders = Orders::find()
        .order_by_desc(OrderCol::CreatedAt)
        .limit(RECENT_ORDERS)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let top_products = top_products(state).await?;

    Ok(ApiResponse::success(
        "Dashboard",
        Dashboard {
            stats,
            sales_data,
            recent_orders,
            top_products,
            period,
        },
        Some(Meta::empty()),
    ))
}

async fn stats(state: &AppState) -> AppResult<DashboardStats> {
    let db = &state.orm;
    Ok(DashboardStats {
        total_products: Products::find().count(db).await? as i64,
        active_products: Products::find()
            .filter(ProdCol::IsActive.eq(true))
            .count(db)
            .await? as i64,
        total_categories: Categories::find().count(db).await? as i64,
        total_customers: Users::find()
            .filter(UserCol::Role.eq(Role::Customer.as_str()))
            .count(db)
            .await? as i64,
        total_orders: Orders::find().count(db).await? as i64,
        pending_orders: Orders::find()
            .filter(OrderCol::Status.eq(OrderStatus::Pending))
            .count(db)
            .await? as i64,
    })
}

/// Paid orders only, bucketed in UTC.
async fn sales_series(
    state: &AppState,
    period: SalesPeriod,
    now: DateTime<Utc>,
) -> AppResult<SalesSeries> {
    let buckets = sqlx::query_as::<_, SalesBucket>(
        r#"
        SELECT to_char(created_at AT TIME ZONE 'UTC', $1) AS period,
               COUNT(*)::BIGINT AS orders_count,
               COALESCE(SUM(total), 0) AS total_sales,
               ROUND(AVG(total), 2) AS average_order_value
        FROM orders
        WHERE created_at >= $2 AND payment_status = $3
        GROUP BY period
        ORDER BY period
        "#,
    )
    .bind(period.bucket_format())
    .bind(period.window_start(now))
    .bind(PaymentStatus::Paid.to_value())
    .fetch_all(&state.pool)
    .await?;

    Ok(into_series(buckets))
}

async fn top_products(state: &AppState) -> AppResult<Vec<TopProduct>> {
    let rows = sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT p.id, p.name_en, p.name_id, p.sku,
               COALESCE(SUM(oi.quantity), 0)::BIGINT AS total_sold
        FROM products p
        LEFT JOIN order_items oi ON oi.product_id = p.id
        GROUP BY p.id
        ORDER BY total_sold DESC
        LIMIT $1
        "#,
    )
    .bind(TOP_PRODUCTS)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows)
}
