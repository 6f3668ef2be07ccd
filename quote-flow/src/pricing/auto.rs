use chrono::{Datelike, NaiveDate, TimeDelta};

use super::{InsurerProfile, parse_int_prefix};
use crate::product::AutoData;

pub const BASE_PREMIUM: f64 = 2500.0;
pub const DISCOUNT_NAME: &str = "Rastreador";
pub const PREMIUM_BRANDS: [&str; 4] = ["Toyota", "Honda", "BMW", "Mercedes"];

pub const INSURERS: [InsurerProfile; 3] = [
    InsurerProfile {
        id: "auto-offer-1",
        name: "Porto Seguro Auto",
        multiplier: 1.0,
        discount_factor: 0.85,
        discount_percentage: 15.0,
        coverages: &[
            ("Colisão", 50_000.0),
            ("Roubo e Furto", 50_000.0),
            ("Incêndio", 50_000.0),
            ("Terceiros - Danos Materiais", 100_000.0),
            ("Terceiros - Danos Corporais", 100_000.0),
        ],
    },
    InsurerProfile {
        id: "auto-offer-2",
        name: "Bradesco Auto",
        multiplier: 1.1,
        discount_factor: 0.9,
        discount_percentage: 10.0,
        coverages: &[
            ("Colisão", 60_000.0),
            ("Roubo e Furto", 60_000.0),
            ("Incêndio", 60_000.0),
            ("Terceiros - Danos Materiais", 150_000.0),
            ("Terceiros - Danos Corporais", 150_000.0),
            ("Vidros", 2_000.0),
        ],
    },
    InsurerProfile {
        id: "auto-offer-3",
        name: "Itaú Auto",
        multiplier: 0.95,
        discount_factor: 0.88,
        discount_percentage: 12.0,
        coverages: &[
            ("Colisão", 55_000.0),
            ("Roubo e Furto", 55_000.0),
            ("Incêndio", 55_000.0),
            ("Terceiros - Danos Materiais", 120_000.0),
            ("Terceiros - Danos Corporais", 120_000.0),
            ("Assistência 24h", 0.0),
        ],
    },
];

pub fn base_premium(data: &AutoData, current_year: i32) -> f64 {
    let mut premium = BASE_PREMIUM;

    premium += vehicle_age_adjustment(vehicle_age(&data.year, current_year));

    if let Some(birth_year) = birth_year(&data.birth_date) {
        premium += driver_age_adjustment(i64::from(current_year) - i64::from(birth_year));
    }

    if PREMIUM_BRANDS.contains(&data.brand.as_str()) {
        premium += 500.0;
    }

    premium
}

/// Unparseable (or zero) model years count as brand new.
fn vehicle_age(year: &str, current_year: i32) -> i64 {
    let current_year = i64::from(current_year);
    let vehicle_year = parse_int_prefix(year)
        .filter(|year| *year != 0)
        .unwrap_or(current_year);
    current_year - vehicle_year
}

fn vehicle_age_adjustment(age: i64) -> f64 {
    if age <= 2 {
        800.0
    } else if age <= 5 {
        400.0
    } else if age > 10 {
        -300.0
    } else {
        0.0
    }
}

fn driver_age_adjustment(age: i64) -> f64 {
    if age < 25 {
        600.0
    } else if age > 60 {
        300.0
    } else {
        0.0
    }
}

/// Year of a `DD/MM/YYYY` birth date.
///
/// Out-of-range days and months roll over into the following period, and
/// two-digit years are read as 19xx. `None` when any component is missing.
pub(crate) fn birth_year(birth_date: &str) -> Option<i32> {
    let parts: Vec<&str> = birth_date.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day = parse_int_prefix(day)?;
    let month = parse_int_prefix(month)?;
    let mut year = parse_int_prefix(year)?;
    if (0..=99).contains(&year) {
        year += 1900;
    }

    let month_index = month.checked_sub(1)?;
    let year = i32::try_from(year.checked_add(month_index.div_euclid(12))?).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12) + 1).ok()?;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first_of_month.checked_add_signed(TimeDelta::try_days(day.checked_sub(1)?)?)?;
    Some(date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PricingEngine, ProductData, ProductType};

    const YEAR: i32 = 2024;

    fn auto(year: &str, birth_date: &str, brand: &str, tracker: bool) -> AutoData {
        AutoData {
            year: year.to_string(),
            birth_date: birth_date.to_string(),
            brand: brand.to_string(),
            has_tracker: Some(tracker),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_example() {
        let data = auto("2024", "01/01/2000", "Toyota", true);
        assert_eq!(base_premium(&data, YEAR), 3900.0);

        let offers = PricingEngine::for_year(YEAR)
            .compute_offers(ProductType::Auto, &ProductData::Auto(data))
            .unwrap();
        assert_eq!(offers.len(), 3);
        assert_eq!(offers[0].id, "auto-offer-1");
        assert_eq!(offers[0].insurer_name, "Porto Seguro Auto");
        assert!((offers[0].premium - 3315.0).abs() < 1e-9);
        assert_eq!(
            offers[0].discounts.as_ref().unwrap()[0].name,
            "Rastreador"
        );
        assert_eq!(offers[0].discounts.as_ref().unwrap()[0].percentage, 15.0);
        assert!((offers[1].premium - 3900.0 * 1.1 * 0.9).abs() < 1e-9);
        assert!((offers[2].premium - 3900.0 * 0.95 * 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_vehicle_age_brackets() {
        // driver age unknown, non-premium brand: only the vehicle rule applies
        let premium = |year: i32| base_premium(&auto(&year.to_string(), "", "Fiat", false), YEAR);

        assert_eq!(premium(YEAR - 2), 3300.0);
        assert_eq!(premium(YEAR - 3), 2900.0);
        assert_eq!(premium(YEAR - 5), 2900.0);
        assert_eq!(premium(YEAR - 6), 2500.0);
        assert_eq!(premium(YEAR - 10), 2500.0);
        assert_eq!(premium(YEAR - 11), 2200.0);
        assert_eq!(premium(YEAR + 1), 3300.0);
    }

    #[test]
    fn test_unparseable_year_counts_as_new_vehicle() {
        assert_eq!(base_premium(&auto("", "", "Fiat", false), YEAR), 3300.0);
        assert_eq!(base_premium(&auto("abcd", "", "Fiat", false), YEAR), 3300.0);
        assert_eq!(base_premium(&auto("0", "", "Fiat", false), YEAR), 3300.0);
    }

    #[test]
    fn test_driver_age_brackets() {
        let premium = |birth: &str| base_premium(&auto("2018", birth, "Fiat", false), YEAR);

        // vehicle age 6: no vehicle adjustment
        assert_eq!(premium("15/03/2000"), 3100.0);
        assert_eq!(premium("15/03/1999"), 2500.0);
        assert_eq!(premium("15/03/1964"), 2500.0);
        assert_eq!(premium("15/03/1963"), 2800.0);
        assert_eq!(premium("1990-03-15"), 2500.0);
        assert_eq!(premium("xx/03/1950"), 2500.0);
    }

    #[test]
    fn test_birth_year_rollover() {
        assert_eq!(birth_year("01/01/2000"), Some(2000));
        assert_eq!(birth_year("01/13/1999"), Some(2000));
        assert_eq!(birth_year("32/12/1999"), Some(2000));
        assert_eq!(birth_year("01/01/85"), Some(1985));
        assert_eq!(birth_year("01/01"), None);
        assert_eq!(birth_year(""), None);
    }

    #[test]
    fn test_premium_brand_is_case_sensitive() {
        let toyota = base_premium(&auto("2018", "", "Toyota", false), YEAR);
        let lowercase = base_premium(&auto("2018", "", "toyota", false), YEAR);
        assert_eq!(toyota, 3000.0);
        assert_eq!(lowercase, 2500.0);
    }

    #[test]
    fn test_tracker_lowers_every_premium() {
        let engine = PricingEngine::for_year(YEAR);
        for year in ["2024", "2019", "2016", "2001"] {
            let with = engine
                .compute_offers(
                    ProductType::Auto,
                    &ProductData::Auto(auto(year, "20/07/1970", "Honda", true)),
                )
                .unwrap();
            let without = engine
                .compute_offers(
                    ProductType::Auto,
                    &ProductData::Auto(auto(year, "20/07/1970", "Honda", false)),
                )
                .unwrap();

            for (discounted, full) in with.iter().zip(&without) {
                assert!(discounted.premium < full.premium);
                assert!(discounted.discounts.is_some());
                assert!(full.discounts.is_none());
                assert_eq!(discounted.coverages, full.coverages);
            }
        }
    }

    #[test]
    fn test_coverage_schedules_are_fixed() {
        let offers = PricingEngine::for_year(YEAR)
            .compute_offers(ProductType::Auto, &ProductData::Auto(AutoData::default()))
            .unwrap();
        assert_eq!(offers[0].coverages.len(), 5);
        assert_eq!(offers[1].coverages.len(), 6);
        assert_eq!(offers[1].coverages[5].name, "Vidros");
        assert_eq!(offers[2].coverages[5].name, "Assistência 24h");
        assert_eq!(offers[2].coverages[5].value, 0.0);
    }
}
