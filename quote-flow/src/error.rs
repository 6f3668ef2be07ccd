use thiserror::Error;

use crate::product::ProductType;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Quote client error: {0}")]
    Client(#[from] ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Request-level errors raised by the pricing engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unsupported product type: {0}")]
    UnsupportedProduct(String),

    #[error("Product data does not match product type {expected}")]
    DataMismatch { expected: ProductType },

    #[error("Invalid product data: {0}")]
    InvalidData(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Offer {0} is not among the current offers")]
    OfferNotAvailable(String),

    #[error("Product data for {actual} cannot be stored while {expected} is chosen")]
    ProductMismatch {
        expected: ProductType,
        actual: ProductType,
    },

    #[error("No product type chosen")]
    ProductTypeMissing,

    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<crate::validation::FieldError>),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Quote request failed: {0}")]
    RequestFailed(String),

    #[error("Quote service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response from quote service: {0}")]
    InvalidResponse(String),

    #[error("Quote request incomplete: {0}")]
    Incomplete(String),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
