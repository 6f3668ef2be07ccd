/// Vehicle brands offered by the auto form, each with its models.
pub const VEHICLES: [(&str, &[&str]); 10] = [
    ("Fiat", &["Uno", "Argo", "Mobi", "Cronos", "Toro", "Strada"]),
    ("Volkswagen", &["Gol", "Polo", "T-Cross", "Virtus", "Nivus", "Saveiro"]),
    ("Chevrolet", &["Onix", "Tracker", "S10", "Spin", "Montana"]),
    ("Ford", &["Ka", "EcoSport", "Ranger", "Territory"]),
    ("Toyota", &["Corolla", "Hilux", "SW4", "Yaris", "Corolla Cross"]),
    ("Honda", &["Civic", "City", "HR-V", "WR-V", "CR-V"]),
    ("Hyundai", &["HB20", "Creta", "Tucson", "ix35", "Santa Fe"]),
    ("Nissan", &["Versa", "Kicks", "Frontier", "Sentra"]),
    ("Renault", &["Kwid", "Sandero", "Duster", "Oroch", "Captur"]),
    ("Jeep", &["Renegade", "Compass", "Commander", "Wrangler"]),
];

pub fn brands() -> impl Iterator<Item = &'static str> {
    VEHICLES.iter().map(|(brand, _)| *brand)
}

/// Models for `brand`; empty for brands outside the catalog.
pub fn models_for(brand: &str) -> &'static [&'static str] {
    VEHICLES
        .iter()
        .find(|(name, _)| *name == brand)
        .map(|(_, models)| *models)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_for_brand() {
        assert_eq!(brands().count(), 10);
        assert!(models_for("Toyota").contains(&"Corolla Cross"));
        assert_eq!(models_for("Jeep").len(), 4);
        assert!(models_for("BMW").is_empty());
    }
}
