//! Catalog storage abstractions.
//!
//! Both stores follow create-or-update-on-save semantics: a record whose id is
//! already stored is updated in place; a record without an id, or with an id the
//! store has never assigned, receives a fresh id. Saving a product also persists
//! the stocks it carries, and requires its category (if any) to be stored already.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use catalog_products::{Category, CategoryId, Product, ProductFilter, ProductId};

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

/// Storage operation error.
///
/// Infrastructure failures only; "record not found" is reported as `None` /
/// `false` by the repositories and turned into domain errors by the callers.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A saved record points at something the store does not hold.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Product persistence.
///
/// Listing operations return products in identifier order.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Persist the product (and any new stocks it carries), returning it with
    /// every identifier assigned and its category fully resolved.
    async fn save(&self, product: Product) -> Result<Product, StoreError>;

    /// Returns `false` when no product had this id.
    async fn delete_by_id(&self, id: ProductId) -> Result<bool, StoreError>;

    async fn find_all_where(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Products whose purchase date is strictly before `cutoff`.
    async fn find_all_purchased_before(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<Product>, StoreError>;
}

/// Category persistence.
#[async_trait::async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Category>, StoreError>;

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    async fn save(&self, category: Category) -> Result<Category, StoreError>;
}

#[async_trait::async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        (**self).save(product).await
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete_by_id(id).await
    }

    async fn find_all_where(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        (**self).find_all_where(filter).await
    }

    async fn find_all_purchased_before(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<Product>, StoreError> {
        (**self).find_all_purchased_before(cutoff).await
    }
}

#[async_trait::async_trait]
impl<S> CategoryRepository for Arc<S>
where
    S: CategoryRepository + ?Sized,
{
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        (**self).find_all().await
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn save(&self, category: Category) -> Result<Category, StoreError> {
        (**self).save(category).await
    }
}

/// A store holding the whole catalog (products, categories and their stocks).
pub trait CatalogStore: ProductRepository + CategoryRepository {}

impl<T> CatalogStore for T where T: ProductRepository + CategoryRepository + ?Sized {}

/// Type-erased store handle shared by the services.
pub type SharedStore = Arc<dyn CatalogStore>;
