//! Offer pricing engine.
//!
//! Each product computes a scalar base premium from an additive rule ladder,
//! then derives one offer per insurer by applying that insurer's base
//! multiplier and, when the risk-reducing feature (tracker or alarm) is
//! present, its discount factor. Coverage schedules are fixed per insurer.
//!
//! The engine is a pure function of its input and the reference year, which is
//! injected so results are reproducible:
//!
//! ```rust
//! use quote_flow::PricingEngine;
//! use serde_json::json;
//!
//! let engine = PricingEngine::for_year(2024);
//! let offers = engine
//!     .compute_offers_raw("auto", json!({ "year": "2024", "brand": "Toyota" }))
//!     .unwrap();
//! assert_eq!(offers.len(), 3);
//! ```

pub mod auto;
pub mod residential;

use chrono::Datelike;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::PricingError,
    offer::{Coverage, Discount, Offer},
    product::{ProductData, ProductType},
};

/// Pricing parameters for one simulated insurer.
#[derive(Debug, Clone, Copy)]
pub struct InsurerProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub multiplier: f64,
    /// Applied on top of `multiplier` when the discount feature is present.
    pub discount_factor: f64,
    pub discount_percentage: f64,
    pub coverages: &'static [(&'static str, f64)],
}

impl InsurerProfile {
    fn offer(&self, base_premium: f64, discount_name: &str, discounted: bool) -> Offer {
        let factor = if discounted { self.discount_factor } else { 1.0 };
        let premium = base_premium * self.multiplier * factor;

        let coverages = self
            .coverages
            .iter()
            .map(|(name, value)| Coverage {
                name: (*name).to_string(),
                value: *value,
            })
            .collect();

        let discounts = discounted.then(|| {
            vec![Discount {
                name: discount_name.to_string(),
                percentage: self.discount_percentage,
            }]
        });

        Offer::new(self.id, self.name, premium, coverages, discounts)
    }
}

fn build_offers(
    profiles: &[InsurerProfile],
    base_premium: f64,
    discount_name: &str,
    discounted: bool,
) -> Vec<Offer> {
    profiles
        .iter()
        .map(|profile| profile.offer(base_premium, discount_name, discounted))
        .collect()
}

/// Stateless offer calculator pinned to a reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingEngine {
    reference_year: i32,
}

impl PricingEngine {
    pub fn for_year(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// Engine using the local clock's current year.
    pub fn current() -> Self {
        Self::for_year(chrono::Local::now().year())
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn base_premium(&self, data: &ProductData) -> f64 {
        match data {
            ProductData::Auto(auto) => auto::base_premium(auto, self.reference_year),
            ProductData::Residential(home) => residential::base_premium(home),
        }
    }

    /// Computes the three insurer offers for `data`.
    ///
    /// Fails only when `data` belongs to a different product than `product_type`.
    pub fn compute_offers(
        &self,
        product_type: ProductType,
        data: &ProductData,
    ) -> Result<Vec<Offer>, PricingError> {
        if data.product_type() != product_type {
            return Err(PricingError::DataMismatch {
                expected: product_type,
            });
        }

        let base_premium = self.base_premium(data);
        let offers = match data {
            ProductData::Auto(auto) => build_offers(
                &auto::INSURERS,
                base_premium,
                auto::DISCOUNT_NAME,
                auto.has_tracker == Some(true),
            ),
            ProductData::Residential(home) => build_offers(
                &residential::INSURERS,
                base_premium,
                residential::DISCOUNT_NAME,
                home.has_alarm == Some(true),
            ),
        };

        debug!(
            product_type = %product_type,
            reference_year = self.reference_year,
            base_premium,
            "Computed offers"
        );

        Ok(offers)
    }

    /// Entry point for loosely-typed callers: a path segment and a JSON data object.
    pub fn compute_offers_raw(
        &self,
        product_type: &str,
        data: Value,
    ) -> Result<Vec<Offer>, PricingError> {
        let product_type: ProductType = product_type.parse()?;
        let data = ProductData::from_value(product_type, data)?;
        self.compute_offers(product_type, &data)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::current()
    }
}

/// Leading-integer parse: optional sign then digits, ignoring any trailing text.
pub(crate) fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Leading-decimal parse: the longest prefix that forms a number, e.g. `"120m2"` is 120.
pub(crate) fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("2024"), Some(2024));
        assert_eq!(parse_int_prefix(" 2019abc"), Some(2019));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("120.5"), Some(120.5));
        assert_eq!(parse_float_prefix("250m2"), Some(250.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn test_unsupported_product_is_rejected() {
        let engine = PricingEngine::for_year(2024);
        let err = engine.compute_offers_raw("vida", json!({})).unwrap_err();
        assert_eq!(err, PricingError::UnsupportedProduct("vida".to_string()));
    }

    #[test]
    fn test_mismatched_data_is_rejected() {
        let engine = PricingEngine::for_year(2024);
        let data = ProductData::Auto(Default::default());
        let err = engine
            .compute_offers(ProductType::Residential, &data)
            .unwrap_err();
        assert_eq!(
            err,
            PricingError::DataMismatch {
                expected: ProductType::Residential
            }
        );
    }

    #[test]
    fn test_compute_offers_is_idempotent() {
        let engine = PricingEngine::for_year(2024);
        let data = json!({ "year": "2015", "brand": "BMW", "birthDate": "10/05/1990", "hasTracker": "sim" });
        let first = engine.compute_offers_raw("auto", data.clone()).unwrap();
        let second = engine.compute_offers_raw("auto", data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_discount_requires_exact_sim() {
        let engine = PricingEngine::for_year(2024);
        let base = engine
            .compute_offers_raw("auto", json!({ "year": "2020", "hasTracker": "nao" }))
            .unwrap();
        for flag in [json!("SIM"), json!("yes"), json!(true)] {
            let offers = engine
                .compute_offers_raw("auto", json!({ "year": "2020", "hasTracker": flag }))
                .unwrap();
            assert_eq!(offers, base);
        }
        let discounted = engine
            .compute_offers_raw("residencial", json!({ "totalArea": "75", "hasAlarm": "sim" }))
            .unwrap();
        assert!(discounted.iter().all(|offer| offer.discounts.is_some()));
    }

    #[test]
    fn test_monthly_payment_is_twelfth_of_premium() {
        let engine = PricingEngine::for_year(2024);
        for (product, data) in [
            ("auto", json!({ "year": "2010", "hasTracker": "sim" })),
            ("residencial", json!({ "totalArea": "75", "hasAlarm": "sim" })),
        ] {
            let offers = engine.compute_offers_raw(product, data).unwrap();
            assert_eq!(offers.len(), 3);
            for offer in offers {
                assert_eq!(offer.monthly_payment, offer.premium / 12.0);
            }
        }
    }
}
