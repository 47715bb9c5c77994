use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    dto::cart::CartLineDto,
    error::{AppError, AppResult},
    models::{Address, Order, OrderItem, PaymentMethod, ShippingMethod},
    pricing::OrderSummary,
};

fn validate_payment_method(value: &str) -> Result<(), ValidationError> {
    value.parse::<PaymentMethod>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("in");
        err.message = Some("Payment method must be bank_transfer, credit_card or e_wallet.".into());
        err
    })
}

fn validate_shipping_method(value: &str) -> Result<(), ValidationError> {
    value.parse::<ShippingMethod>().map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("in");
        err.message = Some("Shipping method must be regular or express.".into());
        err
    })
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CheckoutRequest {
    #[validate(nested)]
    pub billing_address: Address,
    #[validate(nested)]
    pub shipping_address: Address,
    #[validate(custom(function = "validate_payment_method"))]
    pub payment_method: String,
    #[validate(custom(function = "validate_shipping_method"))]
    pub shipping_method: String,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Validate and return the typed payment and shipping methods.
    pub fn methods(&self) -> AppResult<(PaymentMethod, ShippingMethod)> {
        self.validate()?;
        let payment = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(AppError::BadRequest)?;
        let shipping = self
            .shipping_method
            .parse::<ShippingMethod>()
            .map_err(AppError::BadRequest)?;
        Ok((payment, shipping))
    }

    /// Blank notes are stored as absent.
    pub fn notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutQuery {
    pub shipping_method: Option<ShippingMethod>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPreview {
    pub items: Vec<CartLineDto>,
    pub shipping_method: ShippingMethod,
    pub summary: OrderSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
