//! Product Fixtures

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    money::{find_currency, from_decimal},
    products::Product,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Marketing description
    #[serde(default)]
    pub description: String,

    /// Image path
    #[serde(default)]
    pub image: Option<String>,

    /// Product price (e.g., "120 NGN")
    pub price: String,

    /// Category tag
    pub category: String,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,

    /// Promotional discount (e.g., "10%")
    #[serde(default)]
    pub discount: Option<String>,

    /// Featured as a best seller
    #[serde(default)]
    pub best_seller: bool,

    /// Listing time (RFC 3339)
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl TryFrom<ProductFixture> for Product<'static> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_price(&fixture.price)?;
        let discount = fixture
            .discount
            .as_deref()
            .map(parse_percentage)
            .transpose()?;

        Ok(Product {
            id: fixture.id.into(),
            name: fixture.name,
            description: fixture.description,
            image: fixture.image,
            price,
            category: fixture.category,
            stock: fixture.stock,
            discount,
            best_seller: fixture.best_seller,
            created_at: fixture.created_at,
        })
    }
}

/// Parse price string (e.g., "1250.50 NGN") into money
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency = find_currency(currency_code)
        .map_err(|_err| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    from_decimal(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the value cannot be parsed or lies outside 0% to 100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();
    let invalid = || FixtureError::InvalidPercentage(s.to_string());

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?
    } else {
        trimmed.parse::<Decimal>().map_err(|_err| invalid())?
    };

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(invalid());
    }

    Ok(Percentage::from(fraction))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{NGN, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("120NGN");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        assert!(matches!(
            parse_price("-1 NGN"),
            Err(FixtureError::InvalidPrice(_))
        ));
    }

    #[test]
    fn parse_price_uses_currency_minor_units() -> TestResult {
        assert_eq!(parse_price("120 NGN")?, Money::from_minor(120_00, NGN));
        assert_eq!(parse_price("1250.50 NGN")?, Money::from_minor(1250_50, NGN));
        assert_eq!(parse_price("2.5 USD")?, Money::from_minor(2_50, USD));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(
            parse_percentage("15%")?,
            Percentage::from(Decimal::new(15, 2))
        );
        assert_eq!(
            parse_percentage("0.15")?,
            Percentage::from(Decimal::new(15, 2))
        );

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_out_of_range() {
        assert!(parse_percentage("150%").is_err());
        assert!(parse_percentage("-5%").is_err());
        assert!(parse_percentage("ten").is_err());
    }

    #[test]
    fn product_fixture_converts_optional_fields() -> TestResult {
        let yaml = r#"
id: "1"
name: Wireless Headphones
price: 120 NGN
category: Electronics
discount: 10%
best_seller: true
created_at: 2025-09-22T14:30:00Z
"#;

        let fixture: ProductFixture = serde_norway::from_str(yaml)?;
        let product = Product::try_from(fixture)?;

        assert_eq!(product.id.as_str(), "1");
        assert_eq!(product.price, Money::from_minor(120_00, NGN));
        assert_eq!(product.discount, Some(Percentage::from(Decimal::new(10, 2))));
        assert!(product.best_seller);
        assert_eq!(product.stock, 0);
        assert!(product.created_at.is_some());

        Ok(())
    }
}
