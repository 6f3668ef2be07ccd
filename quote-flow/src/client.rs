use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::ClientError,
    offer::Offer,
    pricing::PricingEngine,
    product::{ProductData, ProductType},
};

/// Body of `POST /api/quotes/{productType}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteRequest {
    /// Carried in the URL rather than the body.
    #[serde(skip)]
    pub product_type: ProductType,
    pub identity: String,
    pub data: ProductData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub offers: Vec<Offer>,
}

/// Error body returned by the quote service on 4xx/5xx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Source of offers for the wizard.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    async fn fetch_offers(&self, request: &QuoteRequest) -> Result<Vec<Offer>, ClientError>;
}

/// Prices quotes in-process, without a network hop.
#[derive(Debug, Clone, Default)]
pub struct LocalQuoteClient {
    engine: PricingEngine,
}

impl LocalQuoteClient {
    pub fn new(engine: PricingEngine) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl QuoteClient for LocalQuoteClient {
    async fn fetch_offers(&self, request: &QuoteRequest) -> Result<Vec<Offer>, ClientError> {
        if request.identity.is_empty() {
            return Err(ClientError::Incomplete("identity is required".to_string()));
        }
        Ok(self
            .engine
            .compute_offers(request.product_type, &request.data)?)
    }
}

#[cfg(feature = "http")]
pub use http::HttpQuoteClient;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use tracing::{error, info};

    use super::{ErrorResponse, QuoteClient, QuoteRequest, QuoteResponse};
    use crate::{error::ClientError, offer::Offer};

    /// Talks to a running quote service over HTTP.
    #[derive(Debug, Clone)]
    pub struct HttpQuoteClient {
        base_url: String,
        http: reqwest::Client,
    }

    impl HttpQuoteClient {
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                http: reqwest::Client::new(),
            }
        }

        pub fn quote_url(&self, request: &QuoteRequest) -> String {
            format!("{}/api/quotes/{}", self.base_url, request.product_type)
        }
    }

    #[async_trait]
    impl QuoteClient for HttpQuoteClient {
        async fn fetch_offers(&self, request: &QuoteRequest) -> Result<Vec<Offer>, ClientError> {
            let url = self.quote_url(request);
            info!(url = %url, "Requesting offers");

            let response = self
                .http
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let message = match response.json::<ErrorResponse>().await {
                    Ok(body) => body.error,
                    Err(_) => status.to_string(),
                };
                error!(status = status.as_u16(), message = %message, "Quote request rejected");
                return Err(ClientError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }

            let body: QuoteResponse = response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            Ok(body.offers)
        }
    }

}
