//! Commerce Config

use std::{path::PathBuf, sync::Arc};

use clap::Args;
use thiserror::Error;
use tracing::info;

use binary_craft::{
    money::UnknownCurrency,
    orders::TransitionPolicy,
    promo_codes::{PromoCodes, PromoCodesError},
};
use binary_craft_app::{
    notifications::{LogNotifier, NotifyError, OrderNotifier, WebhookNotifier},
    settings::CommerceSettings,
};

/// Errors raised while turning commerce configuration into settings.
#[derive(Debug, Error)]
pub(crate) enum CommerceConfigError {
    /// The configured currency is not an ISO-4217 code.
    #[error(transparent)]
    Currency(#[from] UnknownCurrency),

    /// The promo code file could not be loaded.
    #[error("failed to load promo codes: {0}")]
    PromoCodes(#[from] PromoCodesError),

    /// The webhook notifier could not be built.
    #[error("failed to build webhook notifier: {0}")]
    Notifier(#[from] NotifyError),
}

/// Currency, promo code, order and notification settings.
#[derive(Debug, Args)]
pub struct CommerceConfig {
    /// ISO-4217 currency every amount is expressed in
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,

    /// YAML file of promo code rules; the built-in table is used when unset
    #[arg(long, env = "PROMO_CODES_FILE")]
    pub promo_codes_file: Option<PathBuf>,

    /// Only allow forward order status changes
    #[arg(long, env = "STRICT_STATUS_TRANSITIONS", default_value_t = false)]
    pub strict_status_transitions: bool,

    /// Webhook receiving order confirmations; confirmations are logged when unset
    #[arg(long, env = "NOTIFY_WEBHOOK_URL")]
    pub notify_webhook_url: Option<String>,

    /// Requests allowed per client IP per minute
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = 100)]
    pub rate_limit_per_minute: usize,
}

impl CommerceConfig {
    /// Build the settings shared by the cart and order services.
    pub(crate) fn settings(&self) -> Result<CommerceSettings, CommerceConfigError> {
        let mut settings = CommerceSettings::for_currency(&self.currency)?;

        if let Some(path) = &self.promo_codes_file {
            let promo_codes = PromoCodes::from_path(path, settings.currency)?;

            info!(
                path = %path.display(),
                codes = promo_codes.len(),
                "loaded promo codes"
            );

            settings = settings.with_promo_codes(promo_codes);
        }

        if self.strict_status_transitions {
            settings = settings.with_transition_policy(TransitionPolicy::ForwardOnly);
        }

        Ok(settings)
    }

    /// Build the order confirmation notifier.
    pub(crate) fn notifier(&self) -> Result<Arc<dyn OrderNotifier>, CommerceConfigError> {
        Ok(match &self.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())?),
            None => Arc::new(LogNotifier),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        commerce: CommerceConfig,
    }

    fn parse(args: &[&str]) -> Result<CommerceConfig, clap::Error> {
        Cli::try_parse_from(std::iter::once("binary-craft-json").chain(args.iter().copied()))
            .map(|cli| cli.commerce)
    }

    #[test]
    fn test_strict_flag_selects_forward_only_policy() -> TestResult {
        let config = parse(&["--currency", "EUR", "--strict-status-transitions"])?;
        let settings = config.settings()?;

        assert_eq!(settings.currency.iso_alpha_code, "EUR");
        assert_eq!(settings.transition_policy, TransitionPolicy::ForwardOnly);

        Ok(())
    }

    #[test]
    fn test_unknown_currency_is_rejected() -> TestResult {
        let config = parse(&["--currency", "ZZZ"])?;
        let result = config.settings();

        assert!(
            matches!(result, Err(CommerceConfigError::Currency(_))),
            "expected Currency error, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn test_missing_promo_code_file_is_rejected() -> TestResult {
        let config = parse(&["--promo-codes-file", "/nonexistent/promo_codes.yml"])?;
        let result = config.settings();

        assert!(
            matches!(result, Err(CommerceConfigError::PromoCodes(_))),
            "expected PromoCodes error, got {result:?}"
        );

        Ok(())
    }
}
