//! Dynamic product filter.
//!
//! A [`ProductFilter`] is the logical AND of the criteria that were actually
//! supplied; omitted criteria impose no constraint, and an empty filter matches
//! every product. Storage adapters that cannot evaluate [`ProductFilter::matches`]
//! directly (SQL) translate [`ProductFilter::criteria`] one criterion at a time.

use chrono::NaiveDate;

use crate::product::{CategoryId, Product};

/// One supplied filter criterion.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Case-sensitive substring of the product code.
    CodeContains(String),
    /// Case-sensitive substring of the designation.
    DesignationContains(String),
    PriceAtLeast(f64),
    PriceAtMost(f64),
    QuantityAtLeast(u32),
    QuantityAtMost(u32),
    PurchasedOn(NaiveDate),
    InCategory(CategoryId),
}

impl Criterion {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Criterion::CodeContains(needle) => product
                .code
                .as_deref()
                .is_some_and(|code| code.contains(needle.as_str())),
            Criterion::DesignationContains(needle) => {
                product.designation.contains(needle.as_str())
            }
            Criterion::PriceAtLeast(min) => product.price >= *min,
            Criterion::PriceAtMost(max) => product.price <= *max,
            Criterion::QuantityAtLeast(min) => product.quantity >= *min,
            Criterion::QuantityAtMost(max) => product.quantity <= *max,
            Criterion::PurchasedOn(date) => product.purchase_date == Some(*date),
            Criterion::InCategory(id) => product.category_id() == Some(*id),
        }
    }
}

/// Conjunction of supplied criteria.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductFilter {
    criteria: Vec<Criterion>,
}

impl ProductFilter {
    /// The identity filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Add a criterion only when a value was supplied.
    fn with_opt<T>(self, value: Option<T>, make: impl FnOnce(T) -> Criterion) -> Self {
        match value {
            Some(v) => self.with(make(v)),
            None => self,
        }
    }

    pub fn with_code(self, code: Option<impl Into<String>>) -> Self {
        self.with_opt(code.map(Into::into), Criterion::CodeContains)
    }

    pub fn with_designation(self, designation: Option<impl Into<String>>) -> Self {
        self.with_opt(designation.map(Into::into), Criterion::DesignationContains)
    }

    pub fn with_price_min(self, min: Option<f64>) -> Self {
        self.with_opt(min, Criterion::PriceAtLeast)
    }

    pub fn with_price_max(self, max: Option<f64>) -> Self {
        self.with_opt(max, Criterion::PriceAtMost)
    }

    pub fn with_quantity_min(self, min: Option<u32>) -> Self {
        self.with_opt(min, Criterion::QuantityAtLeast)
    }

    pub fn with_quantity_max(self, max: Option<u32>) -> Self {
        self.with_opt(max, Criterion::QuantityAtMost)
    }

    pub fn with_purchase_date(self, date: Option<NaiveDate>) -> Self {
        self.with_opt(date, Criterion::PurchasedOn)
    }

    pub fn with_category(self, category: Option<CategoryId>) -> Self {
        self.with_opt(category, Criterion::InCategory)
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.criteria.iter().all(|c| c.matches(product))
    }

    /// Keep the matching products, preserving their order.
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}
