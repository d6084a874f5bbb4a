//! Coupon Fixtures

use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponCode},
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
    products::ProductId,
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Coupon table entries
    pub coupons: Vec<CouponFixture>,
}

/// Coupon fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponFixture {
    /// Percentage off the order after product discounts
    OrderPercent {
        /// Coupon code
        code: String,
        /// Percentage (e.g., "10%")
        percent: String,
    },

    /// Percentage off one category's raw line totals
    CategoryPercent {
        /// Coupon code
        code: String,
        /// Target category
        category: String,
        /// Percentage (e.g., "15%")
        percent: String,
    },

    /// Fixed amount off every unit of one product
    ProductFixed {
        /// Coupon code
        code: String,
        /// Target product id
        product: String,
        /// Amount per unit (e.g., "500 NGN")
        amount: String,
    },
}

impl TryFrom<CouponFixture> for Coupon<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CouponFixture) -> Result<Self, Self::Error> {
        match fixture {
            CouponFixture::OrderPercent { code, percent } => Ok(Coupon::OrderPercent {
                code: coupon_code(&code)?,
                percent: parse_percentage(&percent)?,
            }),
            CouponFixture::CategoryPercent {
                code,
                category,
                percent,
            } => Ok(Coupon::CategoryPercent {
                code: coupon_code(&code)?,
                category,
                percent: parse_percentage(&percent)?,
            }),
            CouponFixture::ProductFixed {
                code,
                product,
                amount,
            } => Ok(Coupon::ProductFixed {
                code: coupon_code(&code)?,
                product: ProductId::from(product),
                amount: parse_price(&amount)?,
            }),
        }
    }
}

fn coupon_code(code: &str) -> Result<CouponCode, FixtureError> {
    let code = CouponCode::new(code);

    if code.as_str().is_empty() {
        return Err(FixtureError::InvalidCoupon("coupon code is blank".to_string()));
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rusty_money::{Money, iso::NGN};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_parse_category_coupon() -> TestResult {
        let yaml = r"
type: category_percent
code: fresh15
category: Fruit
percent: 15%
";

        let fixture: CouponFixture = serde_norway::from_str(yaml)?;
        let coupon = Coupon::try_from(fixture)?;

        assert_eq!(
            coupon,
            Coupon::CategoryPercent {
                code: CouponCode::new("FRESH15"),
                category: "Fruit".to_string(),
                percent: Percentage::from(Decimal::new(15, 2)),
            }
        );

        Ok(())
    }

    #[test]
    fn test_parse_product_fixed_coupon() -> TestResult {
        let yaml = r#"
type: product_fixed
code: SHOES5
product: "2"
amount: 5 NGN
"#;

        let fixture: CouponFixture = serde_norway::from_str(yaml)?;
        let coupon = Coupon::try_from(fixture)?;

        assert!(matches!(
            coupon,
            Coupon::ProductFixed { ref product, amount, .. }
                if product.as_str() == "2" && amount == Money::from_minor(5_00, NGN)
        ));

        Ok(())
    }

    #[test]
    fn test_unknown_coupon_type_fails() {
        let yaml = r"
type: buy_one_get_one
code: BOGO
";

        let result: Result<CouponFixture, _> = serde_norway::from_str(yaml);

        assert!(result.is_err());
    }

    #[test]
    fn test_blank_code_is_rejected() {
        let fixture = CouponFixture::OrderPercent {
            code: "   ".to_string(),
            percent: "10%".to_string(),
        };

        assert!(matches!(
            Coupon::try_from(fixture),
            Err(FixtureError::InvalidCoupon(_))
        ));
    }
}
