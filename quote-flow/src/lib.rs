pub mod catalog;
pub mod client;
pub mod error;
pub mod format;
pub mod offer;
pub mod pricing;
pub mod product;
pub mod runner;
pub mod validation;
pub mod wizard;

// Re-export commonly used types
#[cfg(feature = "http")]
pub use client::HttpQuoteClient;
pub use client::{ErrorResponse, LocalQuoteClient, QuoteClient, QuoteRequest, QuoteResponse};
pub use error::{ClientError, PricingError, QuoteError, Result, WizardError};
pub use offer::{Coverage, Discount, Offer};
pub use pricing::PricingEngine;
pub use product::{AutoData, ProductData, ProductType, PropertyType, ResidentialData};
pub use runner::QuoteRunner;
pub use validation::{FieldError, FieldErrorKind};
pub use wizard::{OfferFetch, OfferView, QuoteSummary, Step, WizardState};
