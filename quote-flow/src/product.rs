use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::PricingError;

/// Insurance products the wizard can quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "residencial")]
    Residential,
}

impl ProductType {
    /// Path segment used by the quote endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Residential => "residencial",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "residencial" => Ok(Self::Residential),
            other => Err(PricingError::UnsupportedProduct(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "casa")]
    House,
    #[serde(rename = "apartamento")]
    Apartment,
}

impl PropertyType {
    /// Accepts the wire values and their English names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "casa" | "house" => Some(Self::House),
            "apartamento" | "apartment" => Some(Self::Apartment),
            _ => None,
        }
    }
}

/// Parses a typed yes/no answer. Wire payloads are stricter, see `lenient::flag`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "sim" | "yes" | "true" => Some(true),
        "nao" | "não" | "no" | "false" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoData {
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub birth_date: String,
    /// Driver licence number.
    #[serde(default, deserialize_with = "lenient::text")]
    pub cnh: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub plate: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub year: String,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        serialize_with = "lenient::serialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_tracker: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentialData {
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub birth_date: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub postal_code: String,
    #[serde(
        default,
        deserialize_with = "lenient::property_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub property_type: Option<PropertyType>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub total_area: String,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        serialize_with = "lenient::serialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_alarm: Option<bool>,
}

/// Product-specific wizard data, one record shape per product type.
///
/// Serializes as the bare data object; the product type travels separately
/// (in the quote URL), so decoding goes through [`ProductData::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProductData {
    Auto(AutoData),
    Residential(ResidentialData),
}

impl ProductData {
    pub fn product_type(&self) -> ProductType {
        match self {
            Self::Auto(_) => ProductType::Auto,
            Self::Residential(_) => ProductType::Residential,
        }
    }

    /// Decodes a loosely-typed data object for the given product.
    ///
    /// Only a non-object payload is rejected; absent or oddly-typed fields
    /// fall back to empty values.
    pub fn from_value(product_type: ProductType, value: Value) -> Result<Self, PricingError> {
        if !value.is_object() {
            return Err(PricingError::InvalidData(
                "data must be a JSON object".to_string(),
            ));
        }

        let data = match product_type {
            ProductType::Auto => Self::Auto(
                serde_json::from_value(value)
                    .map_err(|e| PricingError::InvalidData(e.to_string()))?,
            ),
            ProductType::Residential => Self::Residential(
                serde_json::from_value(value)
                    .map_err(|e| PricingError::InvalidData(e.to_string()))?,
            ),
        };
        Ok(data)
    }
}

impl From<AutoData> for ProductData {
    fn from(data: AutoData) -> Self {
        Self::Auto(data)
    }
}

impl From<ResidentialData> for ProductData {
    fn from(data: ResidentialData) -> Self {
        Self::Residential(data)
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::PropertyType;

    pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only the exact wire values count; anything else is "not chosen"
        // and never earns a discount.
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) if s == "sim" => Some(true),
            Value::String(s) if s == "nao" || s == "não" => Some(false),
            _ => None,
        })
    }

    pub fn serialize_flag<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(true) => serializer.serialize_str("sim"),
            Some(false) => serializer.serialize_str("nao"),
            None => serializer.serialize_none(),
        }
    }

    pub fn property_type<'de, D>(deserializer: D) -> Result<Option<PropertyType>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => PropertyType::parse(&s),
            _ => None,
        })
    }
}
