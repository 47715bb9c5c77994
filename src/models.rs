use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entity::{cart_items, categories, order_items, orders, product_variants, products, users},
    i18n::{Locale, format_idr},
};

pub const CURRENCY: &str = "IDR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    #[sea_orm(string_value = "e_wallet")]
    EWallet,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    #[sea_orm(string_value = "regular")]
    Regular,
    #[sea_orm(string_value = "express")]
    Express,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "e_wallet" => Ok(PaymentMethod::EWallet),
            other => Err(format!("unknown payment method `{other}`")),
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "regular" => Ok(ShippingMethod::Regular),
            "express" => Ok(ShippingMethod::Express),
            other => Err(format!("unknown shipping method `{other}`")),
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShippingMethod::Regular => "regular",
            ShippingMethod::Express => "express",
        })
    }
}

/// Rejects empty and whitespace-only input.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required.".into());
        return Err(err);
    }
    Ok(())
}

/// Postal address captured on an order, stored as a JSON blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate, FromJsonQueryResult)]
pub struct Address {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub name: String,
    #[validate(custom(function = "not_blank"), length(max = 20))]
    pub phone: String,
    #[validate(custom(function = "not_blank"))]
    pub address: String,
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub city: String,
    #[validate(custom(function = "not_blank"), length(max = 10))]
    pub postal_code: String,
}

/// Variant attributes copied onto an order item at purchase time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromJsonQueryResult)]
pub struct ProductDetails {
    pub size: Option<String>,
    pub color: Option<String>,
    pub variant_sku: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ImageList(pub Vec<String>);

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name_en: String,
    pub name_id: String,
    pub slug: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_en, &self.name_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name_en: String,
    pub name_id: String,
    pub slug: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    pub short_description_en: Option<String>,
    pub short_description_id: Option<String>,
    #[schema(value_type = String, example = "150000.00")]
    pub base_price: Decimal,
    pub sku: String,
    pub stock_quantity: i32,
    #[schema(value_type = Option<String>)]
    pub weight: Option<Decimal>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_en, &self.name_id)
    }

    pub fn description(&self, locale: Locale) -> Option<&str> {
        locale.pick_opt(self.description_en.as_deref(), self.description_id.as_deref())
    }

    pub fn short_description(&self, locale: Locale) -> Option<&str> {
        locale.pick_opt(
            self.short_description_en.as_deref(),
            self.short_description_id.as_deref(),
        )
    }

    pub fn formatted_price(&self) -> String {
        format_idr(self.base_price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub size: Option<String>,
    pub color: Option<String>,
    pub sku: String,
    #[schema(value_type = String, example = "25000.00")]
    pub price_adjustment: Decimal,
    pub stock_quantity: i32,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductVariant {
    /// `"L / Black"`, or whichever of size/color is present.
    pub fn display_name(&self) -> String {
        variant_label(self.size.as_deref(), self.color.as_deref())
    }
}

pub fn variant_label(size: Option<&str>, color: Option<&str>) -> String {
    [size, color]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub product_id: Uuid,
    pub product_variant_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String, example = "150000.00")]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Option<Uuid>,
    pub status: OrderStatus,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub tax_amount: Decimal,
    #[schema(value_type = String)]
    pub shipping_cost: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub currency: String,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping_method: ShippingMethod,
    pub notes: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_variant_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    #[schema(value_type = String)]
    pub total: Decimal,
    pub product_name: String,
    pub product_sku: String,
    pub product_details: Option<ProductDetails>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Category {
            id: model.id,
            name_en: model.name_en,
            name_id: model.name_id,
            slug: model.slug,
            description_en: model.description_en,
            description_id: model.description_id,
            image: model.image,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Product {
            id: model.id,
            category_id: model.category_id,
            name_en: model.name_en,
            name_id: model.name_id,
            slug: model.slug,
            description_en: model.description_en,
            description_id: model.description_id,
            short_description_en: model.short_description_en,
            short_description_id: model.short_description_id,
            base_price: model.base_price,
            sku: model.sku,
            stock_quantity: model.stock_quantity,
            weight: model.weight,
            images: model.images.0,
            is_active: model.is_active,
            is_featured: model.is_featured,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<product_variants::Model> for ProductVariant {
    fn from(model: product_variants::Model) -> Self {
        ProductVariant {
            id: model.id,
            product_id: model.product_id,
            size: model.size,
            color: model.color,
            sku: model.sku,
            price_adjustment: model.price_adjustment,
            stock_quantity: model.stock_quantity,
            image: model.image,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        CartItem {
            id: model.id,
            user_id: model.user_id,
            session_id: model.session_id,
            product_id: model.product_id,
            product_variant_id: model.product_variant_id,
            quantity: model.quantity,
            price: model.price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Order {
            id: model.id,
            order_number: model.order_number,
            user_id: model.user_id,
            status: model.status,
            subtotal: model.subtotal,
            tax_amount: model.tax_amount,
            shipping_cost: model.shipping_cost,
            total: model.total,
            currency: model.currency,
            billing_address: model.billing_address,
            shipping_address: model.shipping_address,
            payment_method: model.payment_method,
            payment_status: model.payment_status,
            shipping_method: model.shipping_method,
            notes: model.notes,
            shipped_at: model.shipped_at.map(|dt| dt.with_timezone(&Utc)),
            delivered_at: model.delivered_at.map(|dt| dt.with_timezone(&Utc)),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        OrderItem {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_variant_id: model.product_variant_id,
            quantity: model.quantity,
            price: model.price,
            total: model.total,
            product_name: model.product_name,
            product_sku: model.product_sku,
            product_details: model.product_details,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(size: Option<&str>, color: Option<&str>) -> ProductVariant {
        ProductVariant {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            size: size.map(Into::into),
            color: color.map(Into::into),
            sku: "TSHIRT-L-BLK".into(),
            price_adjustment: Decimal::ZERO,
            stock_quantity: 3,
            image: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn variant_display_name_skips_missing_parts() {
        assert_eq!(variant(Some("L"), Some("Black")).display_name(), "L / Black");
        assert_eq!(variant(None, Some("Black")).display_name(), "Black");
        assert_eq!(variant(Some("42"), None).display_name(), "42");
        assert_eq!(variant(None, None).display_name(), "");
    }

    #[test]
    fn methods_parse_from_wire_names() {
        assert_eq!("e_wallet".parse::<PaymentMethod>(), Ok(PaymentMethod::EWallet));
        assert_eq!("express".parse::<ShippingMethod>(), Ok(ShippingMethod::Express));
        assert!("cash".parse::<PaymentMethod>().is_err());
        assert!("overnight".parse::<ShippingMethod>().is_err());
    }

    #[test]
    fn address_requires_every_field() {
        let address = Address {
            name: "Budi".into(),
            phone: "".into(),
            address: "Jl. Merdeka 1".into(),
            city: "Jakarta".into(),
            postal_code: "12345678901".into(),
        };
        let errors = address.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("postal_code"));
        assert!(!fields.contains_key("name"));
    }
}
