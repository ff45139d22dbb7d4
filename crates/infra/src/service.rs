//! Catalog service: category reassignment, product creation variants,
//! promotion batch and discounted sale cost.
//!
//! Unlike [`crate::commands::CatalogCommands`], lookups that miss are not errors
//! here: `change_category` reports them as `Ok(false)`.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use catalog_products::{
    Category, CategoryId, DiscountPercent, Product, ProductId, Stock, discounted_sale_cost,
};

use crate::repository::{CatalogStore, CategoryRepository, ProductRepository, StoreError};

#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reassign a product to another category.
    ///
    /// Returns `false` without touching storage when either side is unknown.
    #[instrument(skip(self))]
    pub async fn change_category(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> Result<bool, StoreError> {
        let Some(mut product) = ProductRepository::find_by_id(&self.store, product_id).await? else {
            debug!("product not found; category unchanged");
            return Ok(false);
        };
        let Some(category) = CategoryRepository::find_by_id(&self.store, category_id).await? else {
            debug!("category not found; category unchanged");
            return Ok(false);
        };

        product.category = Some(category);
        ProductRepository::save(&self.store, product).await?;
        Ok(true)
    }

    /// Persist the product as given.
    pub async fn add_product(&self, product: Product) -> Result<Product, StoreError> {
        ProductRepository::save(&self.store, product).await
    }

    /// Persist `category`, attach it to the product, then persist the product.
    pub async fn add_product_with_category(
        &self,
        mut product: Product,
        category: Category,
    ) -> Result<Product, StoreError> {
        let category = CategoryRepository::save(&self.store, category).await?;
        product.category = Some(category);
        ProductRepository::save(&self.store, product).await
    }

    pub async fn add_product_with_category_and_stock(
        &self,
        mut product: Product,
        category: Category,
        stock: Stock,
    ) -> Result<Product, StoreError> {
        product.stocks.push(stock);
        self.add_product_with_category(product, category).await
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        ProductRepository::find_all(&self.store).await
    }

    /// Mark every product bought strictly before `cutoff` as on promotion.
    ///
    /// Returns how many products were marked. Products already on promotion are
    /// counted again; running the batch twice leaves the same state.
    #[instrument(skip(self))]
    pub async fn apply_promotion_before(&self, cutoff: NaiveDate) -> Result<usize, StoreError> {
        let eligible = self.store.find_all_purchased_before(cutoff).await?;
        let count = eligible.len();
        for mut product in eligible {
            product.on_promotion = true;
            ProductRepository::save(&self.store, product).await?;
        }
        info!(count, %cutoff, "promotion applied");
        Ok(count)
    }

    /// Aggregate sale value of the whole catalog, discounting promoted products.
    pub async fn compute_discounted_sale_cost(
        &self,
        discount: DiscountPercent,
    ) -> Result<f64, StoreError> {
        let products = ProductRepository::find_all(&self.store).await?;
        Ok(discounted_sale_cost(&products, discount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryCatalogStore;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn service() -> (CatalogService<Arc<InMemoryCatalogStore>>, Arc<InMemoryCatalogStore>) {
        let store = Arc::new(InMemoryCatalogStore::new());
        (CatalogService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn change_category_reassigns_when_both_exist() {
        let (service, store) = service();
        let first = CategoryRepository::save(&store, Category::new("A", "Alpha")).await.unwrap();
        let second = CategoryRepository::save(&store, Category::new("B", "Beta")).await.unwrap();
        let product = service
            .add_product(Product::new("Clavier", 25.0, 3, None, Some(first)))
            .await
            .unwrap();

        let changed = service
            .change_category(product.id.unwrap(), second.id.unwrap())
            .await
            .unwrap();
        assert!(changed);

        let reloaded = ProductRepository::find_by_id(&store, product.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.category, Some(second));
    }

    #[tokio::test]
    async fn change_category_with_unknown_product_is_false_and_mutates_nothing() {
        let (service, store) = service();
        let category = CategoryRepository::save(&store, Category::new("A", "Alpha")).await.unwrap();

        let changed = service
            .change_category(ProductId::new(404), category.id.unwrap())
            .await
            .unwrap();
        assert!(!changed);
        assert!(service.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn change_category_with_unknown_category_keeps_the_old_one() {
        let (service, store) = service();
        let category = CategoryRepository::save(&store, Category::new("A", "Alpha")).await.unwrap();
        let product = service
            .add_product(Product::new("Souris", 10.0, 1, None, Some(category.clone())))
            .await
            .unwrap();

        let changed = service
            .change_category(product.id.unwrap(), CategoryId::new(404))
            .await
            .unwrap();
        assert!(!changed);
        let reloaded = ProductRepository::find_by_id(&store, product.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.category, Some(category));
    }

    #[tokio::test]
    async fn add_product_with_category_persists_the_category_first() {
        let (service, store) = service();
        let product = service
            .add_product_with_category(
                Product::new("Ecran", 150.0, 2, None, None),
                Category::new("MON", "Moniteurs"),
            )
            .await
            .unwrap();

        let category = product.category.clone().unwrap();
        assert!(category.id.is_some());
        assert_eq!(CategoryRepository::find_all(&store).await.unwrap(), vec![category]);
    }

    #[tokio::test]
    async fn add_product_with_category_and_stock_links_the_stock() {
        let (service, _) = service();
        let product = service
            .add_product_with_category_and_stock(
                Product::new("Cable", 5.0, 40, None, None),
                Category::new("ACC", "Accessoires"),
                Stock::new("Depot Sud"),
            )
            .await
            .unwrap();

        assert_eq!(product.stocks.len(), 1);
        assert!(product.stocks[0].id.is_some());
        assert_eq!(product.stocks[0].label.as_deref(), Some("Depot Sud"));
    }

    #[tokio::test]
    async fn promotion_marks_only_products_bought_strictly_before_cutoff() {
        let (service, _) = service();
        let cutoff = date(2024, 1, 1);
        for (name, bought) in [
            ("before", Some(date(2023, 12, 31))),
            ("on", Some(cutoff)),
            ("after", Some(date(2024, 2, 1))),
            ("undated", None),
        ] {
            service
                .add_product(Product::new(name, 10.0, 1, bought, None))
                .await
                .unwrap();
        }

        assert_eq!(service.apply_promotion_before(cutoff).await.unwrap(), 1);
        // idempotent
        assert_eq!(service.apply_promotion_before(cutoff).await.unwrap(), 1);

        let promoted: Vec<_> = service
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.on_promotion)
            .map(|p| p.designation)
            .collect();
        assert_eq!(promoted, vec!["before"]);
    }

    #[tokio::test]
    async fn discounted_sale_cost_discounts_promoted_lines_only() {
        let (service, _) = service();
        let regular = Product::new("regular", 100.0, 5, None, None);
        let mut promoted = Product::new("promoted", 200.0, 3, None, None);
        promoted.on_promotion = true;
        service.add_product(regular).await.unwrap();
        service.add_product(promoted).await.unwrap();

        let cost = service
            .compute_discounted_sale_cost(DiscountPercent::new(10.0).unwrap())
            .await
            .unwrap();
        assert!((cost - 1040.0).abs() < 0.01);
    }
}
