//! Request locale and locale-aware formatting.
//!
//! The locale is resolved per request and passed explicitly to every call that picks a
//! bilingual string, so nothing leaks between concurrent requests.

use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    /// Lenient parse: anything that is not Indonesian falls back to English.
    pub fn parse(tag: &str) -> Self {
        let primary = tag
            .split([',', ';', '-', '_'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match primary.as_str() {
            "id" | "in" => Locale::Id,
            _ => Locale::En,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Id => "id",
        }
    }

    /// Pick the string for this locale out of an (english, indonesian) pair.
    pub fn pick<'a>(&self, en: &'a str, id: &'a str) -> &'a str {
        match self {
            Locale::En => en,
            Locale::Id => id,
        }
    }

    pub fn pick_opt<'a>(&self, en: Option<&'a str>, id: Option<&'a str>) -> Option<&'a str> {
        match self {
            Locale::En => en,
            Locale::Id => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Ok(Query(query)) = Query::<LocaleQuery>::try_from_uri(&parts.uri) {
            if let Some(locale) = query.locale.as_deref().filter(|l| !l.is_empty()) {
                return Ok(Locale::parse(locale));
            }
        }

        let from_header = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::parse)
            .unwrap_or_default();
        Ok(from_header)
    }
}

/// Format an IDR amount the way the storefront displays it, e.g. `Rp 150.000`.
pub fn format_idr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().normalize().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn parses_indonesian_tags() {
        assert_eq!(Locale::parse("id"), Locale::Id);
        assert_eq!(Locale::parse("id-ID,id;q=0.9,en;q=0.8"), Locale::Id);
        assert_eq!(Locale::parse("en-US"), Locale::En);
        assert_eq!(Locale::parse("fr"), Locale::En);
        assert_eq!(Locale::parse(""), Locale::En);
    }

    #[test]
    fn formats_rupiah_with_dot_grouping() {
        assert_eq!(format_idr(Decimal::new(150_000, 0)), "Rp 150.000");
        assert_eq!(format_idr(Decimal::new(35_500_000, 2)), "Rp 355.000");
        assert_eq!(format_idr(Decimal::new(999, 0)), "Rp 999");
        assert_eq!(format_idr(Decimal::new(1_234_567_89, 2)), "Rp 1.234.568");
        assert_eq!(format_idr(Decimal::ZERO), "Rp 0");
        assert_eq!(format_idr(Decimal::new(-25_000, 0)), "-Rp 25.000");
    }

    #[tokio::test]
    async fn query_parameter_wins_over_accept_language() {
        let request = Request::builder()
            .uri("/products?locale=id&search=kaos")
            .header(header::ACCEPT_LANGUAGE, "en-US")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let locale = Locale::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(locale, Locale::Id);
    }

    #[tokio::test]
    async fn falls_back_to_accept_language_then_english() {
        let request = Request::builder()
            .uri("/products")
            .header(header::ACCEPT_LANGUAGE, "id-ID")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        assert_eq!(
            Locale::from_request_parts(&mut parts, &()).await.unwrap(),
            Locale::Id
        );

        let request = Request::builder().uri("/").body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        assert_eq!(
            Locale::from_request_parts(&mut parts, &()).await.unwrap(),
            Locale::En
        );
    }
}
