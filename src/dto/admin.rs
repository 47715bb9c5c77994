use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Order;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DashboardQuery {
    /// `daily`, `weekly`, `monthly` or `yearly`; anything else means daily.
    pub period: Option<String>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_products: i64,
    pub active_products: i64,
    pub total_categories: i64,
    pub total_customers: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
}

/// Parallel arrays, one entry per bucket, ready for a chart.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct SalesSeries {
    pub labels: Vec<String>,
    pub orders: Vec<i64>,
    #[schema(value_type = Vec<String>)]
    pub sales: Vec<Decimal>,
    #[schema(value_type = Vec<String>)]
    pub average_order_value: Vec<Decimal>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TopProduct {
    pub id: Uuid,
    pub name_en: String,
    pub name_id: String,
    pub sku: String,
    pub total_sold: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub sales_data: SalesSeries,
    pub recent_orders: Vec<Order>,
    pub top_products: Vec<TopProduct>,
    pub period: SalesPeriod,
}
