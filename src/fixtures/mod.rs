//! Fixtures
//!
//! Catalog and coupon configuration loaded from YAML files laid out as
//! `{base}/products/{name}.yml` and `{base}/coupons/{name}.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponTable},
    fixtures::{coupons::CouponsFixture, products::ProductsFixture},
    products::{Product, StaticCatalog},
};

pub mod coupons;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid coupon definition
    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products in catalog order
    products: Vec<Product<'a>>,

    /// Coupon table entries
    coupons: Vec<Coupon<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: Vec::new(),
            coupons: Vec::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for product_fixture in fixture.products {
            let product = Product::try_from(product_fixture)?;
            let currency = product.price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.push(product);
        }

        Ok(self)
    }

    /// Load coupons from a YAML fixture file
    ///
    /// Must be called after [`Fixture::load_products`]: fixed-amount coupons
    /// are checked against the catalog currency and target products.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a coupon
    /// refers to an unknown product or another currency.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency()?;

        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CouponsFixture = serde_norway::from_str(&contents)?;

        for coupon_fixture in fixture.coupons {
            let coupon = Coupon::try_from(coupon_fixture)?;

            if let Coupon::ProductFixed {
                product, amount, ..
            } = &coupon
            {
                if !self.products.iter().any(|p| &p.id == product) {
                    return Err(FixtureError::ProductNotFound(product.to_string()));
                }

                if amount.currency() != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        currency.iso_alpha_code.to_string(),
                        amount.currency().iso_alpha_code.to_string(),
                    ));
                }
            }

            self.coupons.push(coupon);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products and coupons with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture.load_products(name)?.load_coupons(name)?;

        Ok(fixture)
    }

    /// Build the catalog from the loaded products
    pub fn catalog(&self) -> StaticCatalog<'a> {
        StaticCatalog::new(self.products.iter().cloned())
    }

    /// Build the coupon table from the loaded coupons
    pub fn coupon_table(&self) -> CouponTable<'a> {
        CouponTable::new(self.coupons.iter().cloned())
    }

    /// Currency shared by every loaded product
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] if no products have been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Loaded products, in file order
    pub fn products(&self) -> &[Product<'a>] {
        &self.products
    }

    /// Loaded coupons, in file order
    pub fn coupons(&self) -> &[Coupon<'a>] {
        &self.coupons
    }
}
