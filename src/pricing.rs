//! Cart and order totals.
//!
//! The same [`summarize`] runs for the cart page, the checkout preview and order
//! placement, so the amount a shopper sees is the amount that gets recorded.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ShippingMethod;

/// Flat 10% tax.
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Prices are stored with two decimal places.
pub const MONEY_SCALE: u32 = 2;

const ORDER_NUMBER_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;
// Largest multiple of the alphabet size that fits in a byte.
const UNBIASED_BYTE_LIMIT: u8 = (256 / ORDER_NUMBER_ALPHABET.len() * ORDER_NUMBER_ALPHABET.len()) as u8;

impl ShippingMethod {
    pub fn cost(&self) -> Decimal {
        match self {
            ShippingMethod::Regular => Decimal::new(25_000, 0),
            ShippingMethod::Express => Decimal::new(50_000, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLine {
    pub quantity: i32,
    pub price: Decimal,
}

impl PriceLine {
    pub fn new(quantity: i32, price: Decimal) -> Self {
        Self { quantity, price }
    }

    pub fn total(&self) -> Decimal {
        line_total(self.quantity, self.price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderSummary {
    #[schema(value_type = String, example = "300000.00")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "30000.00")]
    pub tax_amount: Decimal,
    #[schema(value_type = String, example = "25000")]
    pub shipping_cost: Decimal,
    #[schema(value_type = String, example = "355000.00")]
    pub total: Decimal,
}

pub fn line_total(quantity: i32, price: Decimal) -> Decimal {
    Decimal::from(quantity) * price
}

/// Unit price of a product, or of one of its variants when given.
/// A negative adjustment is applied as-is; nothing floors the result at zero.
pub fn unit_price(base_price: Decimal, price_adjustment: Option<Decimal>) -> Decimal {
    match price_adjustment {
        Some(adjustment) => base_price + adjustment,
        None => base_price,
    }
}

pub fn tax_for(subtotal: Decimal) -> Decimal {
    (subtotal * TAX_RATE).round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn summarize<I>(lines: I, shipping: ShippingMethod) -> OrderSummary
where
    I: IntoIterator<Item = PriceLine>,
{
    let subtotal: Decimal = lines.into_iter().map(|line| line.total()).sum();
    let tax_amount = tax_for(subtotal);
    let shipping_cost = shipping.cost();
    OrderSummary {
        subtotal,
        tax_amount,
        shipping_cost,
        total: subtotal + tax_amount + shipping_cost,
    }
}

/// `ORD-YYYYMMDD-XXXXXX` where the suffix is six random uppercase alphanumerics.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let mut suffix = String::with_capacity(ORDER_NUMBER_SUFFIX_LEN);
    while suffix.len() < ORDER_NUMBER_SUFFIX_LEN {
        let random = Uuid::new_v4();
        let bytes = random
            .as_bytes()
            .iter()
            .enumerate()
            // Bytes 6 and 8 carry the UUID version and variant bits.
            .filter(|(index, _)| *index != 6 && *index != 8)
            .map(|(_, byte)| *byte)
            // Bytes at or above 252 would skew `% 36` toward the first letters.
            .filter(|byte| *byte < UNBIASED_BYTE_LIMIT);
        for byte in bytes {
            suffix.push(ORDER_NUMBER_ALPHABET[usize::from(byte) % ORDER_NUMBER_ALPHABET.len()] as char);
            if suffix.len() == ORDER_NUMBER_SUFFIX_LEN {
                break;
            }
        }
    }
    format!("ORD-{}-{}", now.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn idr(amount: i64) -> Decimal {
        Decimal::new(amount, 0)
    }

    #[test]
    fn regular_shipping_example() {
        let summary = summarize([PriceLine::new(2, idr(150_000))], ShippingMethod::Regular);
        assert_eq!(summary.subtotal, idr(300_000));
        assert_eq!(summary.tax_amount, idr(30_000));
        assert_eq!(summary.shipping_cost, idr(25_000));
        assert_eq!(summary.total, idr(355_000));
    }

    #[test]
    fn express_shipping_example() {
        let summary = summarize([PriceLine::new(2, idr(150_000))], ShippingMethod::Express);
        assert_eq!(summary.shipping_cost, idr(50_000));
        assert_eq!(summary.total, idr(380_000));
    }

    #[test]
    fn variant_adjustment_is_added_to_base_price() {
        assert_eq!(unit_price(idr(150_000), Some(idr(25_000))), idr(175_000));
        assert_eq!(unit_price(idr(150_000), None), idr(150_000));
        assert_eq!(unit_price(idr(10_000), Some(idr(-15_000))), idr(-5_000));
    }

    #[test]
    fn total_is_sum_of_parts_and_tax_is_rounded() {
        let lines = [
            PriceLine::new(3, Decimal::new(33_333, 2)),
            PriceLine::new(1, Decimal::new(1_005, 2)),
            PriceLine::new(7, Decimal::new(12_345_67, 2)),
        ];
        let summary = summarize(lines, ShippingMethod::Regular);
        assert_eq!(
            summary.total,
            summary.subtotal + summary.tax_amount + summary.shipping_cost
        );
        assert_eq!(summary.tax_amount, (summary.subtotal * TAX_RATE).round_dp(2));
        assert!(summary.tax_amount.scale() <= MONEY_SCALE);
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 0.05 * 0.10 = 0.005
        assert_eq!(tax_for(Decimal::new(5, 2)), Decimal::new(1, 2));
    }

    #[test]
    fn empty_cart_only_carries_shipping() {
        let summary = summarize(Vec::new(), ShippingMethod::Regular);
        assert_eq!(summary.subtotal, Decimal::ZERO);
        assert_eq!(summary.tax_amount, Decimal::ZERO);
        assert_eq!(summary.total, idr(25_000));
    }

    #[test]
    fn order_number_has_date_and_random_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap();
        let number = generate_order_number(now);
        assert_eq!(number.len(), "ORD-20260309-XXXXXX".len());
        assert!(number.starts_with("ORD-20260309-"));
        let suffix = &number["ORD-20260309-".len()..];
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn unbiased_limit_is_a_multiple_of_the_alphabet() {
        assert_eq!(UNBIASED_BYTE_LIMIT, 252);
        assert_eq!(usize::from(UNBIASED_BYTE_LIMIT) % ORDER_NUMBER_ALPHABET.len(), 0);
    }

    #[test]
    fn suffix_characters_are_evenly_spread() {
        let now = Utc::now();
        let mut counts = std::collections::HashMap::new();
        for _ in 0..2_000 {
            let number = generate_order_number(now);
            for c in number["ORD-YYYYMMDD-".len()..].chars() {
                *counts.entry(c).or_insert(0u32) += 1;
            }
        }
        // 12 000 draws over 36 symbols, about 333 each.
        assert_eq!(counts.len(), ORDER_NUMBER_ALPHABET.len());
        assert!(counts.values().all(|&n| (200..=470).contains(&n)), "{counts:?}");
    }

    #[test]
    fn order_numbers_differ_between_calls() {
        let now = Utc::now();
        let numbers: std::collections::HashSet<_> =
            (0..50).map(|_| generate_order_number(now)).collect();
        assert!(numbers.len() > 45);
    }
}
