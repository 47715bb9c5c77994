use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    i18n::{Locale, format_idr},
    models::{Category, Product, ProductVariant},
    pricing::unit_price,
};

/// Category with its strings resolved for one locale.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryView {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl CategoryView {
    pub fn new(category: &Category, locale: Locale) -> Self {
        Self {
            id: category.id,
            slug: category.slug.clone(),
            name: category.name(locale).to_string(),
            description: locale
                .pick_opt(
                    category.description_en.as_deref(),
                    category.description_id.as_deref(),
                )
                .map(str::to_owned),
            image: category.image.clone(),
        }
    }
}

/// Storefront product card / detail header.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub category_id: Uuid,
    pub slug: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    #[schema(value_type = String)]
    pub base_price: Decimal,
    pub formatted_price: String,
    pub stock_quantity: i32,
    pub images: Vec<String>,
    pub is_featured: bool,
    pub category: Option<CategoryView>,
}

impl ProductView {
    pub fn new(product: &Product, category: Option<&Category>, locale: Locale) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            slug: product.slug.clone(),
            sku: product.sku.clone(),
            name: product.name(locale).to_string(),
            description: product.description(locale).map(str::to_owned),
            short_description: product.short_description(locale).map(str::to_owned),
            base_price: product.base_price,
            formatted_price: product.formatted_price(),
            stock_quantity: product.stock_quantity,
            images: product.images.clone(),
            is_featured: product.is_featured,
            category: category.map(|c| CategoryView::new(c, locale)),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VariantView {
    pub id: Uuid,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub display_name: String,
    #[schema(value_type = String)]
    pub price_adjustment: Decimal,
    #[schema(value_type = String)]
    pub final_price: Decimal,
    pub formatted_price: String,
    pub stock_quantity: i32,
    pub image: Option<String>,
}

impl VariantView {
    pub fn new(variant: &ProductVariant, base_price: Decimal) -> Self {
        let final_price = unit_price(base_price, Some(variant.price_adjustment));
        Self {
            id: variant.id,
            sku: variant.sku.clone(),
            size: variant.size.clone(),
            color: variant.color.clone(),
            display_name: variant.display_name(),
            price_adjustment: variant.price_adjustment,
            final_price,
            formatted_price: format_idr(final_price),
            stock_quantity: variant.stock_quantity,
            image: variant.image.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomePage {
    pub featured_products: Vec<ProductView>,
    pub locale: Locale,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ProductFilters {
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductIndex {
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub filters: ProductFilters,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductView,
    pub variants: Vec<VariantView>,
    pub related_products: Vec<ProductView>,
}
