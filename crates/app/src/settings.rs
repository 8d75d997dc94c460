//! Commerce Settings

use std::sync::Arc;

use binary_craft::{
    money::{Currency, UnknownCurrency, currency},
    orders::TransitionPolicy,
    promo_codes::PromoCodes,
};

use crate::retry::ReadRetryPolicy;

/// Settings shared by the cart and order services.
#[derive(Debug, Clone)]
pub struct CommerceSettings {
    /// Currency every amount is expressed in.
    pub currency: &'static Currency,

    /// Promo code table used when pricing carts and orders.
    pub promo_codes: Arc<PromoCodes>,

    /// Which status changes an admin may make.
    pub transition_policy: TransitionPolicy,

    /// Timeout and retry schedule for reads.
    pub read_retry: ReadRetryPolicy,
}

impl CommerceSettings {
    /// Settings in the given currency with the reference promo codes.
    ///
    /// # Errors
    ///
    /// Returns an error if `currency_code` is not an ISO-4217 code.
    pub fn for_currency(currency_code: &str) -> Result<Self, UnknownCurrency> {
        Ok(Self {
            currency: currency(currency_code)?,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_promo_codes(mut self, promo_codes: PromoCodes) -> Self {
        self.promo_codes = Arc::new(promo_codes);
        self
    }

    #[must_use]
    pub fn with_transition_policy(mut self, transition_policy: TransitionPolicy) -> Self {
        self.transition_policy = transition_policy;
        self
    }

    #[must_use]
    pub fn with_read_retry(mut self, read_retry: ReadRetryPolicy) -> Self {
        self.read_retry = read_retry;
        self
    }
}

impl Default for CommerceSettings {
    fn default() -> Self {
        Self {
            currency: rusty_money::iso::USD,
            promo_codes: Arc::new(PromoCodes::reference()),
            transition_policy: TransitionPolicy::default(),
            read_retry: ReadRetryPolicy::default(),
        }
    }
}
