//! Store configuration

use std::path::PathBuf;

use clap::Args;

use crate::{
    delivery::DeliveryRate,
    fixtures::{Fixture, FixtureError, products::parse_price},
};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "MEG_STORE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Store settings shared by every command.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Directory holding `products/` and `coupons/` fixture files
    #[arg(long, env = "MEG_STORE_FIXTURES", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set name, e.g. `meg-store` for `products/meg-store.yml`
    #[arg(long, env = "MEG_STORE_FIXTURE_SET", default_value = "meg-store")]
    pub fixture_set: String,

    /// Delivery charge per item (e.g., "200 NGN")
    #[arg(long, env = "MEG_STORE_DELIVERY_RATE", default_value = "200 NGN")]
    pub delivery_rate: String,

    /// File the cart is persisted to between runs
    #[arg(long, env = "MEG_STORE_CART_FILE", default_value = ".meg-store/cart.json")]
    pub cart_file: PathBuf,

    /// Directory order logs are written to
    #[arg(long, env = "MEG_STORE_ORDERS_DIR", default_value = ".meg-store/orders")]
    pub orders_dir: PathBuf,

    /// Signed-in user id; omit to act as a guest
    #[arg(long, env = "MEG_STORE_USER")]
    pub user: Option<String>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// Load the configured catalog and coupon fixtures.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the fixture set cannot be loaded.
    pub fn load_fixture(&self) -> Result<Fixture<'static>, FixtureError> {
        Fixture::from_set_in(&self.fixtures_dir, &self.fixture_set)
    }

    /// Parse the configured delivery rate.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the rate is not in the format "AMOUNT CURRENCY".
    pub fn delivery_rate(&self) -> Result<DeliveryRate<'static>, FixtureError> {
        parse_price(&self.delivery_rate).map(DeliveryRate::per_item)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rusty_money::{Money, iso::NGN};
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: StoreConfig,
    }

    #[test]
    fn flags_override_defaults() -> TestResult {
        let cli = TestCli::try_parse_from([
            "meg-store",
            "--delivery-rate",
            "150 NGN",
            "--fixture-set",
            "weekend",
            "--user",
            "u1",
            "--log-format",
            "json",
        ])?;

        assert_eq!(cli.config.fixture_set, "weekend");
        assert_eq!(cli.config.user.as_deref(), Some("u1"));
        assert_eq!(cli.config.logging.log_format, LogFormat::Json);
        assert_eq!(
            *cli.config.delivery_rate()?.rate(),
            Money::from_minor(150_00, NGN)
        );

        Ok(())
    }

    #[test]
    fn invalid_delivery_rate_is_reported() -> TestResult {
        let cli = TestCli::try_parse_from(["meg-store", "--delivery-rate", "two hundred"])?;

        assert!(matches!(
            cli.config.delivery_rate(),
            Err(FixtureError::InvalidPrice(_))
        ));

        Ok(())
    }
}
