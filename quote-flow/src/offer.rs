use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub name: String,
    pub percentage: f64,
}

/// A computed quote from one insurer. Built once by the pricing engine and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub insurer_name: String,
    pub premium: f64,
    pub monthly_payment: f64,
    pub coverages: Vec<Coverage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Vec<Discount>>,
}

impl Offer {
    /// Builds an offer whose monthly payment is the premium spread over twelve months.
    pub fn new(
        id: impl Into<String>,
        insurer_name: impl Into<String>,
        premium: f64,
        coverages: Vec<Coverage>,
        discounts: Option<Vec<Discount>>,
    ) -> Self {
        Self {
            id: id.into(),
            insurer_name: insurer_name.into(),
            premium,
            monthly_payment: premium / 12.0,
            coverages,
            discounts,
        }
    }
}
