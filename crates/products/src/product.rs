use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use catalog_core::{Entity, record_id};

record_id!(
    /// Product identifier (storage-assigned).
    ProductId
);

record_id!(
    /// Category identifier (storage-assigned).
    CategoryId
);

record_id!(
    /// Stock identifier (storage-assigned).
    StockId
);

/// Classification referenced by products. Descriptive fields are opaque to the
/// catalog rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<CategoryId>,
    pub code: Option<String>,
    pub label: Option<String>,
}

impl Category {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: None,
            code: Some(code.into()),
            label: Some(label.into()),
        }
    }

    /// A bare reference to an already persisted category.
    pub fn reference(id: CategoryId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// Stock location associated with products (many-to-many).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stock {
    pub id: Option<StockId>,
    pub label: Option<String>,
}

impl Stock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: Some(label.into()),
        }
    }
}

/// Catalog product.
///
/// A plain data holder: validation of the category reference and of payload
/// values happens at the command surface, not here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub code: Option<String>,
    pub designation: String,
    pub price: f64,
    pub quantity: u32,
    pub purchase_date: Option<NaiveDate>,
    pub on_promotion: bool,
    pub category: Option<Category>,
    pub stocks: Vec<Stock>,
}

impl Product {
    pub fn new(
        designation: impl Into<String>,
        price: f64,
        quantity: u32,
        purchase_date: Option<NaiveDate>,
        category: Option<Category>,
    ) -> Self {
        Self {
            designation: designation.into(),
            price,
            quantity,
            purchase_date,
            category,
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().and_then(|c| c.id)
    }

    /// Whether the product was bought strictly before `cutoff`.
    ///
    /// Products without a purchase date are never eligible.
    pub fn purchased_before(&self, cutoff: NaiveDate) -> bool {
        self.purchase_date.is_some_and(|d| d < cutoff)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}

impl Entity for Stock {
    type Id = StockId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}
