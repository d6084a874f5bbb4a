//! Products

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Catalog product identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Marketing description
    pub description: String,

    /// Image path, relative to the storefront's public assets
    pub image: Option<String>,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Category tag
    pub category: String,

    /// Units in stock
    pub stock: u32,

    /// Promotional discount applied to every unit, if any
    pub discount: Option<Percentage>,

    /// Featured as a best seller
    pub best_seller: bool,

    /// When the product was listed
    pub created_at: Option<Timestamp>,
}

impl<'a> Product<'a> {
    /// Create a product with the required fields; everything else is empty.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            image: None,
            price,
            category: category.into(),
            stock: 0,
            discount: None,
            best_seller: false,
            created_at: None,
        }
    }

    /// Set the promotional discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Percentage) -> Self {
        self.discount = Some(discount);
        self
    }
}

/// Read-only product lookup consumed by the pricing core.
pub trait Catalog<'a> {
    /// Look up a single product.
    fn product(&self, id: &ProductId) -> Option<&Product<'a>>;

    /// All products, in catalog order.
    fn products(&self) -> &[Product<'a>];
}

/// Catalog held entirely in memory, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog<'a> {
    products: Vec<Product<'a>>,
    index: FxHashMap<ProductId, usize>,
}

impl<'a> StaticCatalog<'a> {
    /// Build a catalog. A later product with a repeated id replaces the earlier one.
    pub fn new(products: impl IntoIterator<Item = Product<'a>>) -> Self {
        let mut catalog = Self::default();

        for product in products {
            catalog.insert(product);
        }

        catalog
    }

    fn insert(&mut self, product: Product<'a>) {
        if let Some(slot) = self
            .index
            .get(&product.id)
            .and_then(|&idx| self.products.get_mut(idx))
        {
            *slot = product;
            return;
        }

        self.index.insert(product.id.clone(), self.products.len());
        self.products.push(product);
    }

    /// Products whose name or category contains `term`, ignoring case.
    ///
    /// A blank term matches nothing.
    pub fn search(&self, term: &str) -> Vec<&Product<'a>> {
        let term = term.trim();

        if term.is_empty() {
            return Vec::new();
        }

        let needle = term.to_lowercase();

        self.products
            .iter()
            .filter(|product| {
                product.name.to_lowercase().contains(&needle)
                    || product.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Products flagged as best sellers.
    pub fn best_sellers(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.iter().filter(|product| product.best_seller)
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl<'a> Catalog<'a> for StaticCatalog<'a> {
    fn product(&self, id: &ProductId) -> Option<&Product<'a>> {
        self.index.get(id).and_then(|&idx| self.products.get(idx))
    }

    fn products(&self) -> &[Product<'a>] {
        &self.products
    }
}
