use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateUrl, ValidationError};

use crate::models::{Category, Product, ProductVariant};

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("Must be zero or greater.".into());
        return Err(err);
    }
    Ok(())
}

fn image_urls(images: &Vec<String>) -> Result<(), ValidationError> {
    if images.iter().all(|url| url.validate_url()) {
        return Ok(());
    }
    let mut err = ValidationError::new("url");
    err.message = Some("Every image must be a valid URL.".into());
    Err(err)
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name_en: String,
    #[validate(length(min = 1, max = 255))]
    pub name_id: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    #[validate(length(max = 500))]
    pub short_description_en: Option<String>,
    #[validate(length(max = 500))]
    pub short_description_id: Option<String>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = String, example = "150000")]
    pub base_price: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub weight: Option<Decimal>,
    #[validate(custom(function = "image_urls"))]
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub name_en: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    pub description_en: Option<String>,
    pub description_id: Option<String>,
    #[validate(length(max = 500))]
    pub short_description_en: Option<String>,
    #[validate(length(max = 500))]
    pub short_description_id: Option<String>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub base_price: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub sku: Option<String>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = Option<String>)]
    pub weight: Option<Decimal>,
    #[validate(custom(function = "image_urls"))]
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateVariantRequest {
    #[validate(length(max = 50))]
    pub size: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    /// May be negative for discounted variants.
    #[schema(value_type = Option<String>, example = "25000")]
    pub price_adjustment: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(url)]
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub variants: Vec<ProductVariant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateProductRequest {
        CreateProductRequest {
            category_id: Uuid::new_v4(),
            name_en: "Batik Shirt".into(),
            name_id: "Kemeja Batik".into(),
            slug: "batik-shirt".into(),
            description_en: None,
            description_id: None,
            short_description_en: None,
            short_description_id: None,
            base_price: Decimal::new(275_000, 0),
            sku: "BTK-001".into(),
            stock_quantity: 12,
            weight: Some(Decimal::new(35, 2)),
            images: Some(vec!["https://cdn.example.com/btk-001.jpg".into()]),
            is_active: None,
            is_featured: None,
        }
    }

    #[test]
    fn well_formed_product_passes() {
        assert!(create_request().validate().is_ok());
    }

    #[test]
    fn negative_amounts_and_bad_urls_are_field_errors() {
        let mut req = create_request();
        req.base_price = Decimal::new(-1, 0);
        req.stock_quantity = -3;
        req.weight = Some(Decimal::new(-5, 1));
        req.images = Some(vec!["not a url".into()]);
        req.name_en = String::new();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["base_price", "stock_quantity", "weight", "images", "name_en"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateProductRequest::default().validate().is_ok());
    }

    #[test]
    fn variant_needs_sku() {
        let req = CreateVariantRequest {
            size: Some("M".into()),
            color: None,
            sku: String::new(),
            price_adjustment: Some(Decimal::new(-10_000, 0)),
            stock_quantity: Some(2),
            image: None,
            is_active: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sku"));
        assert!(!errors.field_errors().contains_key("price_adjustment"));
    }
}
