//! QuoteRunner – drives a [`WizardState`] and performs the one asynchronous
//! step of the flow: fetching offers when the wizard enters offer selection.
//!
//! The wizard itself never does I/O. Hosts (a terminal UI, a test) call
//! [`QuoteRunner::advance`] instead of [`WizardState::advance`] so that the
//! offer request is issued exactly when step 3 is reached:
//!
//! ```rust
//! use std::sync::Arc;
//! use quote_flow::{LocalQuoteClient, QuoteRunner, WizardState};
//!
//! # async fn demo() {
//! let runner = QuoteRunner::new(Arc::new(LocalQuoteClient::default()));
//! let mut wizard = WizardState::new();
//! // ... fill steps 1 and 2 ...
//! runner.advance(&mut wizard).await;
//! # }
//! ```
//!
//! A failed request leaves the wizard on step 3 with `OfferFetch::Failed` and
//! all collected data intact; call [`QuoteRunner::load_offers`] again to retry.

use std::sync::Arc;
use tracing::{error, info};

use crate::{
    client::QuoteClient,
    error::{ClientError, Result},
    wizard::{Step, WizardState},
};

#[derive(Clone)]
pub struct QuoteRunner {
    client: Arc<dyn QuoteClient>,
}

impl QuoteRunner {
    pub fn new(client: Arc<dyn QuoteClient>) -> Self {
        Self { client }
    }

    /// Advances the wizard and, on arrival at offer selection, loads offers.
    ///
    /// Returns whether the wizard moved. A failed offer request does not undo
    /// the move; it is recorded in the wizard's fetch status.
    pub async fn advance(&self, state: &mut WizardState) -> bool {
        if !state.advance() {
            return false;
        }
        if state.current_step() == Step::OfferSelection {
            if let Err(e) = self.load_offers(state).await {
                error!(error = %e, "Failed to load offers");
            }
        }
        true
    }

    /// Requests offers for the wizard's current data. Returns how many offers arrived.
    pub async fn load_offers(&self, state: &mut WizardState) -> Result<usize> {
        let Some(request) = state.quote_request() else {
            let err =
                ClientError::Incomplete("product type and product data are required".to_string());
            state.finish_offer_fetch(Err(err.to_string()));
            return Err(err.into());
        };

        state.begin_offer_fetch();
        match self.client.fetch_offers(&request).await {
            Ok(offers) => {
                let count = offers.len();
                info!(
                    product_type = %request.product_type,
                    offers = count,
                    "Offers loaded"
                );
                state.finish_offer_fetch(Ok(offers));
                Ok(count)
            }
            Err(e) => {
                state.finish_offer_fetch(Err(e.to_string()));
                Err(e.into())
            }
        }
    }
}
