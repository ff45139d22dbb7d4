use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use catalog_core::Entity;
use catalog_products::{Category, CategoryId, Product, ProductFilter, ProductId, Stock};

use super::{CategoryRepository, ProductRepository, StoreError};

/// Id-ordered table with sequence-style id assignment.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<E> Table<E>
where
    E: Entity + Clone,
    E::Id: From<i64>,
{
    fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    fn upsert(&mut self, mut row: E) -> E {
        let id = match row.id() {
            Some(id) if self.rows.contains_key(&id) => id,
            _ => {
                self.last_id += 1;
                let id = E::Id::from(self.last_id);
                row.assign_id(id);
                id
            }
        };
        self.rows.insert(id, row.clone());
        row
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    products: Table<Product>,
    categories: Table<Category>,
    stocks: Table<Stock>,
}

impl CatalogState {
    /// Rebuild the embedded category and stocks from their tables. Product rows
    /// only contribute the referenced ids.
    fn hydrate(&self, mut product: Product) -> Product {
        if let Some(category) = product.category_id().and_then(|id| self.categories.get(id)) {
            product.category = Some(category.clone());
        }
        for stock in &mut product.stocks {
            if let Some(stored) = stock.id.and_then(|id| self.stocks.get(id)) {
                *stock = stored.clone();
            }
        }
        product
    }

    fn products_where(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        self.products
            .rows
            .values()
            .map(|p| self.hydrate(p.clone()))
            .filter(|p| keep(p))
            .collect()
    }
}

/// In-memory catalog store.
///
/// Intended for tests/dev. All tables live behind a single lock so a product
/// save (category check, stock cascade, product row) is atomic.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CatalogState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryCatalogStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products_where(|_| true))
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.read()?;
        Ok(state.products.get(id).cloned().map(|p| state.hydrate(p)))
    }

    async fn save(&self, mut product: Product) -> Result<Product, StoreError> {
        let mut state = self.write()?;

        if let Some(category) = &product.category {
            let id = category.id.ok_or_else(|| {
                StoreError::MissingReference("product references an unsaved category".to_string())
            })?;
            let stored = state.categories.get(id).cloned().ok_or_else(|| {
                StoreError::MissingReference(format!("category {id} does not exist"))
            })?;
            product.category = Some(stored);
        }

        let stocks = std::mem::take(&mut product.stocks);
        product.stocks = stocks
            .into_iter()
            .map(|stock| state.stocks.upsert(stock))
            .collect();

        Ok(state.products.upsert(product))
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.write()?.products.rows.remove(&id).is_some())
    }

    async fn find_all_where(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        Ok(filter.apply(self.read()?.products_where(|_| true)))
    }

    async fn find_all_purchased_before(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<Product>, StoreError> {
        Ok(self.read()?.products_where(|p| p.purchased_before(cutoff)))
    }
}

#[async_trait::async_trait]
impl CategoryRepository for InMemoryCatalogStore {
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.read()?.categories.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.read()?.categories.get(id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, StoreError> {
        Ok(self.write()?.categories.upsert(category))
    }
}
