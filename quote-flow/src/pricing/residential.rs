use super::{InsurerProfile, parse_float_prefix};
use crate::product::{PropertyType, ResidentialData};

pub const BASE_PREMIUM: f64 = 800.0;
pub const DISCOUNT_NAME: &str = "Alarme Monitorado";
/// Five-digit CEP prefixes priced as premium zones.
pub const PREMIUM_ZONES: [&str; 4] = ["01310", "01311", "04551", "05411"];

pub const INSURERS: [InsurerProfile; 3] = [
    InsurerProfile {
        id: "residencial-offer-1",
        name: "Porto Seguro Residência",
        multiplier: 1.0,
        discount_factor: 0.85,
        discount_percentage: 15.0,
        coverages: &[
            ("Incêndio", 300_000.0),
            ("Danos Elétricos", 15_000.0),
            ("RC Familiar", 50_000.0),
            ("Roubo de Bens", 20_000.0),
        ],
    },
    InsurerProfile {
        id: "residencial-offer-2",
        name: "Bradesco Residência",
        multiplier: 1.15,
        discount_factor: 0.9,
        discount_percentage: 10.0,
        coverages: &[
            ("Incêndio", 350_000.0),
            ("Danos Elétricos", 20_000.0),
            ("RC Familiar", 80_000.0),
            ("Roubo de Bens", 30_000.0),
            ("Vendaval", 50_000.0),
            ("Assistência Residencial", 0.0),
        ],
    },
    InsurerProfile {
        id: "residencial-offer-3",
        name: "Itaú Residência",
        multiplier: 0.92,
        discount_factor: 0.87,
        discount_percentage: 13.0,
        coverages: &[
            ("Incêndio", 320_000.0),
            ("Danos Elétricos", 18_000.0),
            ("RC Familiar", 60_000.0),
            ("Roubo de Bens", 25_000.0),
            ("Quebra de Vidros", 5_000.0),
        ],
    },
];

pub fn base_premium(data: &ResidentialData) -> f64 {
    let mut premium = BASE_PREMIUM;

    // An empty area reads as 0 m²; text that is not a number leaves the premium alone.
    let area = if data.total_area.is_empty() {
        Some(0.0)
    } else {
        parse_float_prefix(&data.total_area)
    };
    if let Some(area) = area {
        premium += area_adjustment(area);
    }

    if data.property_type == Some(PropertyType::House) {
        premium += 200.0;
    }

    if is_premium_zone(&data.postal_code) {
        premium += 400.0;
    }

    premium
}

fn area_adjustment(area: f64) -> f64 {
    if area > 200.0 {
        600.0
    } else if area > 100.0 {
        300.0
    } else if area < 50.0 {
        -100.0
    } else {
        0.0
    }
}

fn is_premium_zone(postal_code: &str) -> bool {
    let prefix: String = postal_code
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(5)
        .collect();
    PREMIUM_ZONES.contains(&prefix.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PricingEngine, ProductData, ProductType};

    fn home(area: &str, property_type: Option<PropertyType>, postal_code: &str, alarm: bool) -> ResidentialData {
        ResidentialData {
            total_area: area.to_string(),
            property_type,
            postal_code: postal_code.to_string(),
            has_alarm: Some(alarm),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let data = home("250", Some(PropertyType::House), "01310-100", false);
        assert_eq!(base_premium(&data), 2000.0);

        let offers = PricingEngine::for_year(2024)
            .compute_offers(ProductType::Residential, &ProductData::Residential(data))
            .unwrap();
        assert_eq!(offers.len(), 3);
        assert_eq!(offers[1].id, "residencial-offer-2");
        assert_eq!(offers[1].insurer_name, "Bradesco Residência");
        assert!((offers[1].premium - 2300.0).abs() < 1e-9);
        assert!(offers.iter().all(|offer| offer.discounts.is_none()));
    }

    #[test]
    fn test_area_brackets() {
        let premium = |area: &str| base_premium(&home(area, Some(PropertyType::Apartment), "", false));

        assert_eq!(premium("201"), 1400.0);
        assert_eq!(premium("200"), 1100.0);
        assert_eq!(premium("101"), 1100.0);
        assert_eq!(premium("100"), 800.0);
        assert_eq!(premium("50"), 800.0);
        assert_eq!(premium("49.5"), 700.0);
        assert_eq!(premium(""), 700.0);
        assert_eq!(premium("large"), 800.0);
    }

    #[test]
    fn test_postal_code_zones() {
        assert!(is_premium_zone("01310-100"));
        assert!(is_premium_zone("05411000"));
        assert!(is_premium_zone("04551-9"));
        assert!(!is_premium_zone("01312-000"));
        assert!(!is_premium_zone("0131"));
        assert!(!is_premium_zone(""));
    }

    #[test]
    fn test_alarm_discounts() {
        let engine = PricingEngine::for_year(2024);
        let data = |alarm| ProductData::Residential(home("80", None, "20000-000", alarm));

        let with = engine.compute_offers(ProductType::Residential, &data(true)).unwrap();
        let without = engine.compute_offers(ProductType::Residential, &data(false)).unwrap();

        let percentages: Vec<f64> = with
            .iter()
            .map(|offer| offer.discounts.as_ref().unwrap()[0].percentage)
            .collect();
        assert_eq!(percentages, vec![15.0, 10.0, 13.0]);

        for (discounted, full) in with.iter().zip(&without) {
            assert!(discounted.premium < full.premium);
            assert_eq!(discounted.discounts.as_ref().unwrap()[0].name, "Alarme Monitorado");
        }
        assert!((with[2].premium - 800.0 * 0.92 * 0.87).abs() < 1e-9);
    }
}
