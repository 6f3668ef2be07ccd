//! The four-step quote wizard.
//!
//! `WizardState` owns everything collected so far and only changes through
//! the transition methods below. Forward navigation is gated per step;
//! a closed gate is not an error, `advance` simply reports that nothing moved.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::{
    client::QuoteRequest,
    error::WizardError,
    offer::Offer,
    product::{ProductData, ProductType},
    validation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Intake,
    ProductDetails,
    OfferSelection,
    Summary,
}

impl Step {
    pub const COUNT: u8 = 4;

    /// One-based position shown to the user.
    pub fn number(&self) -> u8 {
        match self {
            Self::Intake => 1,
            Self::ProductDetails => 2,
            Self::OfferSelection => 3,
            Self::Summary => 4,
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Self::Intake => Some(Self::ProductDetails),
            Self::ProductDetails => Some(Self::OfferSelection),
            Self::OfferSelection => Some(Self::Summary),
            Self::Summary => None,
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Self::Intake => None,
            Self::ProductDetails => Some(Self::Intake),
            Self::OfferSelection => Some(Self::ProductDetails),
            Self::Summary => Some(Self::OfferSelection),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Summary)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Intake => "intake",
            Self::ProductDetails => "product_details",
            Self::OfferSelection => "offer_selection",
            Self::Summary => "summary",
        };
        write!(f, "{s}")
    }
}

/// Progress of the offer request issued on entering step 3.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum OfferFetch {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// What step 3 should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfferView<'a> {
    Idle,
    Loading,
    Failed(&'a str),
    /// The request succeeded but no insurer returned an offer.
    Empty,
    Available(&'a [Offer]),
}

/// Everything step 4 displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuoteSummary<'a> {
    pub identity: &'a str,
    pub product_type: ProductType,
    pub product_data: Option<&'a ProductData>,
    pub offer: &'a Offer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WizardState {
    current_step: Step,
    identity: String,
    product_type: Option<ProductType>,
    product_data: Option<ProductData>,
    step2_valid: bool,
    offers: Vec<Offer>,
    /// Always a member of `offers` when set.
    selected_offer: Option<Offer>,
    offer_fetch: OfferFetch,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn product_type(&self) -> Option<ProductType> {
        self.product_type
    }

    pub fn product_data(&self) -> Option<&ProductData> {
        self.product_data.as_ref()
    }

    pub fn is_step2_valid(&self) -> bool {
        self.step2_valid
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    pub fn selected_offer(&self) -> Option<&Offer> {
        self.selected_offer.as_ref()
    }

    pub fn offer_fetch(&self) -> &OfferFetch {
        &self.offer_fetch
    }

    pub fn is_step3_valid(&self) -> bool {
        self.selected_offer.is_some()
    }

    /// Whether the gate out of the current step is open.
    pub fn can_advance(&self) -> bool {
        match self.current_step {
            Step::Intake => !self.identity.is_empty() && self.product_type.is_some(),
            Step::ProductDetails => self.step2_valid,
            Step::OfferSelection => self.is_step3_valid(),
            Step::Summary => false,
        }
    }

    /// Moves one step forward. Returns `false` and leaves the state untouched
    /// when the gate is closed or the wizard is on its last step.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            debug!(step = %self.current_step, "Forward navigation blocked");
            return false;
        }
        match self.current_step.next() {
            Some(next) => {
                debug!(from = %self.current_step, to = %next, "Advancing wizard");
                self.current_step = next;
                true
            }
            None => false,
        }
    }

    /// Moves one step back; always allowed except on the first step.
    pub fn retreat(&mut self) -> bool {
        match self.current_step.previous() {
            Some(previous) => {
                debug!(from = %self.current_step, to = %previous, "Retreating wizard");
                self.current_step = previous;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        info!("Resetting wizard");
        *self = Self::default();
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.identity = identity.into();
    }

    /// Choosing a different product discards data collected for the previous one.
    pub fn set_product_type(&mut self, product_type: ProductType) {
        if self.product_type != Some(product_type) {
            self.product_data = None;
            self.step2_valid = false;
        }
        self.product_type = Some(product_type);
    }

    pub fn set_product_data(&mut self, data: ProductData) -> Result<(), WizardError> {
        let expected = self.product_type.ok_or(WizardError::ProductTypeMissing)?;
        let actual = data.product_type();
        if actual != expected {
            return Err(WizardError::ProductMismatch { expected, actual });
        }
        self.product_data = Some(data);
        Ok(())
    }

    pub fn set_step2_valid(&mut self, valid: bool) {
        self.step2_valid = valid;
    }

    /// Validates the product form and, when every field passes, stores it and
    /// opens the step-2 gate. Any failure closes the gate.
    pub fn submit_product_form(
        &mut self,
        data: ProductData,
        current_year: i32,
    ) -> Result<(), WizardError> {
        if let Err(errors) = validation::validate_product(&data, current_year) {
            self.step2_valid = false;
            return Err(WizardError::Validation(errors));
        }
        if let Err(e) = self.set_product_data(data) {
            self.step2_valid = false;
            return Err(e);
        }
        self.step2_valid = true;
        Ok(())
    }

    /// Replaces the offers, dropping a selection that is not part of the new list.
    pub fn set_offers(&mut self, offers: Vec<Offer>) {
        if let Some(selected) = &self.selected_offer {
            if !offers.contains(selected) {
                debug!(offer_id = %selected.id, "Clearing stale offer selection");
                self.selected_offer = None;
            }
        }
        self.offers = offers;
    }

    /// Selects one of the current offers, which opens the step-3 gate.
    pub fn select_offer(&mut self, offer: &Offer) -> Result<(), WizardError> {
        if !self.offers.contains(offer) {
            return Err(WizardError::OfferNotAvailable(offer.id.clone()));
        }
        self.selected_offer = Some(offer.clone());
        Ok(())
    }

    /// Convenience for hosts that only track offer ids.
    pub fn select_offer_by_id(&mut self, offer_id: &str) -> Result<(), WizardError> {
        let offer = self
            .offers
            .iter()
            .find(|offer| offer.id == offer_id)
            .cloned()
            .ok_or_else(|| WizardError::OfferNotAvailable(offer_id.to_string()))?;
        self.select_offer(&offer)
    }

    /// Marks the offer request as in flight. Previous offers are dropped so the
    /// step-3 gate stays closed until the new result arrives.
    pub fn begin_offer_fetch(&mut self) {
        self.set_offers(Vec::new());
        self.offer_fetch = OfferFetch::Loading;
    }

    /// Records the outcome of the offer request. A failure keeps every other
    /// field so the request can be retried without re-entering data.
    pub fn finish_offer_fetch(&mut self, result: Result<Vec<Offer>, String>) {
        match result {
            Ok(offers) => {
                self.set_offers(offers);
                self.offer_fetch = OfferFetch::Loaded;
            }
            Err(message) => {
                self.set_offers(Vec::new());
                self.offer_fetch = OfferFetch::Failed(message);
            }
        }
    }

    pub fn offer_view(&self) -> OfferView<'_> {
        match &self.offer_fetch {
            OfferFetch::Idle => OfferView::Idle,
            OfferFetch::Loading => OfferView::Loading,
            OfferFetch::Failed(message) => OfferView::Failed(message),
            OfferFetch::Loaded if self.offers.is_empty() => OfferView::Empty,
            OfferFetch::Loaded => OfferView::Available(&self.offers),
        }
    }

    /// The request sent to the pricing service, once steps 1 and 2 hold data.
    pub fn quote_request(&self) -> Option<QuoteRequest> {
        let product_type = self.product_type?;
        let data = self.product_data.clone()?;
        Some(QuoteRequest {
            product_type,
            identity: self.identity.clone(),
            data,
        })
    }

    pub fn summary(&self) -> Option<QuoteSummary<'_>> {
        Some(QuoteSummary {
            identity: &self.identity,
            product_type: self.product_type?,
            product_data: self.product_data.as_ref(),
            offer: self.selected_offer.as_ref()?,
        })
    }
}
