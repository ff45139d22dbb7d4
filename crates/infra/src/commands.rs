//! Query/command surface over the catalog.
//!
//! Every lookup that misses is reported as [`DomainError::NotFound`], and malformed
//! payloads as [`DomainError::InvalidArgument`]. Listings are sorted by id.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use catalog_core::DomainError;
use catalog_products::{Category, CategoryId, Product, ProductFilter, ProductId};

use crate::repository::{CatalogStore, CategoryRepository, ProductRepository, StoreError};

/// Error returned by [`CatalogCommands`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone)]
pub struct CatalogCommands<S> {
    store: S,
}

impl<S> CatalogCommands<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn fetch_all(&self) -> CatalogResult<Vec<Product>> {
        let mut products = ProductRepository::find_all(&self.store).await?;
        sort_by_id(&mut products);
        debug!(count = products.len(), "fetched all products");
        Ok(products)
    }

    pub async fn fetch_by_id(&self, id: ProductId) -> CatalogResult<Product> {
        Ok(self.product(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: ProductId) -> CatalogResult<()> {
        if !self.store.delete_by_id(id).await? {
            warn!("delete of unknown product");
            return Err(DomainError::not_found("Product", id).into());
        }
        info!("product deleted");
        Ok(())
    }

    /// Create a new product; any id carried by `input` is ignored.
    #[instrument(skip(self, input), fields(designation = %input.designation))]
    pub async fn create(&self, mut input: Product) -> CatalogResult<Product> {
        validate_price(input.price)?;
        input.category = Some(self.resolve_category(&input).await?);
        input.id = None;

        let created = ProductRepository::save(&self.store, input).await?;
        info!(product_id = ?created.id, "product created");
        Ok(created)
    }

    /// Overwrite the scalar fields and category of an existing product.
    ///
    /// The stocks already linked to the product are kept.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: ProductId, input: Product) -> CatalogResult<Product> {
        let mut product = self.product(id).await?;
        validate_price(input.price)?;
        let category = self.resolve_category(&input).await?;

        product.code = input.code;
        product.designation = input.designation;
        product.price = input.price;
        product.quantity = input.quantity;
        product.purchase_date = input.purchase_date;
        product.on_promotion = input.on_promotion;
        product.category = Some(category);

        let updated = ProductRepository::save(&self.store, product).await?;
        info!("product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn update_category_of_product(
        &self,
        product_id: ProductId,
        category_id: CategoryId,
    ) -> CatalogResult<Product> {
        let mut product = self.product(product_id).await?;
        let category = self.category(category_id).await?;
        product.category = Some(category);
        Ok(ProductRepository::save(&self.store, product).await?)
    }

    #[instrument(skip(self))]
    pub async fn filter(&self, filter: &ProductFilter) -> CatalogResult<Vec<Product>> {
        let mut products = self.store.find_all_where(filter).await?;
        sort_by_id(&mut products);
        debug!(count = products.len(), "filtered products");
        Ok(products)
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let mut categories = CategoryRepository::find_all(&self.store).await?;
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    pub async fn create_category(&self, category: Category) -> CatalogResult<Category> {
        let created = CategoryRepository::save(&self.store, category).await?;
        info!(category_id = ?created.id, "category saved");
        Ok(created)
    }

    async fn product(&self, id: ProductId) -> CatalogResult<Product> {
        ProductRepository::find_by_id(&self.store, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Product", id).into())
    }

    async fn category(&self, id: CategoryId) -> CatalogResult<Category> {
        CategoryRepository::find_by_id(&self.store, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id).into())
    }

    /// The payload must reference a stored category by id.
    async fn resolve_category(&self, input: &Product) -> CatalogResult<Category> {
        let id = input
            .category_id()
            .ok_or_else(|| DomainError::invalid_argument("Category ID must be provided"))?;
        self.category(id).await
    }
}

fn validate_price(price: f64) -> Result<(), DomainError> {
    if !price.is_finite() || price < 0.0 {
        return Err(DomainError::invalid_argument(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    Ok(())
}

fn sort_by_id(products: &mut [Product]) {
    products.sort_by_key(|p| p.id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryCatalogStore, SharedStore};
    use catalog_products::Stock;
    use std::sync::Arc;

    fn commands() -> CatalogCommands<SharedStore> {
        let store: SharedStore = Arc::new(InMemoryCatalogStore::new());
        CatalogCommands::new(store)
    }

    fn assert_not_found<T: std::fmt::Debug>(result: CatalogResult<T>) {
        match result {
            Err(CatalogError::Domain(e)) if e.is_not_found() => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    fn assert_invalid<T: std::fmt::Debug>(result: CatalogResult<T>) {
        match result {
            Err(CatalogError::Domain(DomainError::InvalidArgument(_))) => {}
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    async fn seeded() -> (CatalogCommands<SharedStore>, Category) {
        let commands = commands();
        let category = commands
            .create_category(Category::new("INF", "Informatique"))
            .await
            .unwrap();
        (commands, category)
    }

    fn payload(designation: &str, price: f64, category: Option<Category>) -> Product {
        Product::new(designation, price, 2, None, category)
    }

    #[tokio::test]
    async fn create_resolves_category_and_ignores_input_id() {
        let (commands, category) = seeded().await;
        let mut input = payload("Clavier", 30.0, Some(Category::reference(category.id.unwrap())));
        input.id = Some(ProductId::new(77));

        let created = commands.create(input).await.unwrap();
        assert_eq!(created.id, Some(ProductId::new(1)));
        assert_eq!(created.category, Some(category));
    }

    #[tokio::test]
    async fn create_without_category_id_is_invalid() {
        let (commands, _) = seeded().await;
        assert_invalid(commands.create(payload("a", 1.0, None)).await);
        assert_invalid(
            commands
                .create(payload("b", 1.0, Some(Category::new("X", "no id"))))
                .await,
        );
        assert!(commands.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_unknown_category_is_not_found() {
        let (commands, _) = seeded().await;
        let input = payload("a", 1.0, Some(Category::reference(CategoryId::new(42))));
        assert_not_found(commands.create(input).await);
    }

    #[tokio::test]
    async fn create_rejects_negative_or_non_finite_price() {
        let (commands, category) = seeded().await;
        let reference = Some(Category::reference(category.id.unwrap()));
        assert_invalid(commands.create(payload("a", -1.0, reference.clone())).await);
        assert_invalid(commands.create(payload("b", f64::NAN, reference)).await);
    }

    #[tokio::test]
    async fn update_unknown_product_is_not_found() {
        let (commands, category) = seeded().await;
        let input = payload("a", 1.0, Some(Category::reference(category.id.unwrap())));
        assert_not_found(commands.update(ProductId::new(9), input).await);
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_keeps_stocks() {
        let (commands, category) = seeded().await;
        let mut input = payload("Clavier", 30.0, Some(Category::reference(category.id.unwrap())));
        input.stocks.push(Stock::new("Depot"));
        let created = commands.create(input).await.unwrap();
        let id = created.id.unwrap();

        let other = commands
            .create_category(Category::new("BUR", "Bureautique"))
            .await
            .unwrap();
        let other_ref = Some(Category::reference(other.id.unwrap()));
        let mut change = payload("Clavier sans fil", 45.0, other_ref);
        change.code = Some("CLV-2".to_string());
        change.on_promotion = true;

        let updated = commands.update(id, change).await.unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.designation, "Clavier sans fil");
        assert_eq!(updated.price, 45.0);
        assert!(updated.on_promotion);
        assert_eq!(updated.category, Some(other));
        assert_eq!(updated.stocks, created.stocks);
    }

    #[tokio::test]
    async fn update_category_of_product_requires_both_sides() {
        let (commands, category) = seeded().await;
        let created = commands
            .create(payload("a", 1.0, Some(Category::reference(category.id.unwrap()))))
            .await
            .unwrap();
        let id = created.id.unwrap();

        assert_not_found(commands.update_category_of_product(id, CategoryId::new(50)).await);
        assert_not_found(
            commands
                .update_category_of_product(ProductId::new(50), category.id.unwrap())
                .await,
        );

        let other = commands
            .create_category(Category::new("NEW", "Nouveau"))
            .await
            .unwrap();
        let moved = commands
            .update_category_of_product(id, other.id.unwrap())
            .await
            .unwrap();
        assert_eq!(moved.category, Some(other));
    }

    #[tokio::test]
    async fn delete_then_fetch_is_not_found() {
        let (commands, category) = seeded().await;
        let created = commands
            .create(payload("a", 1.0, Some(Category::reference(category.id.unwrap()))))
            .await
            .unwrap();
        let id = created.id.unwrap();

        commands.delete_by_id(id).await.unwrap();
        assert_not_found(commands.fetch_by_id(id).await);
        assert_not_found(commands.delete_by_id(id).await);
    }

    #[tokio::test]
    async fn filter_by_price_range_returns_matching_products_in_id_order() {
        let (commands, category) = seeded().await;
        for (name, price) in [("a", 40.0), ("b", 100.0), ("c", 200.0), ("d", 120.0)] {
            commands
                .create(payload(name, price, Some(Category::reference(category.id.unwrap()))))
                .await
                .unwrap();
        }

        let filter = ProductFilter::new()
            .with_price_min(Some(50.0))
            .with_price_max(Some(150.0));
        let names: Vec<_> = commands
            .filter(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.designation)
            .collect();
        assert_eq!(names, vec!["b", "d"]);

        let everything = commands.filter(&ProductFilter::new()).await.unwrap();
        assert_eq!(everything, commands.fetch_all().await.unwrap());
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn list_categories_returns_saved_categories() {
        let (commands, category) = seeded().await;
        let second = commands
            .create_category(Category::new("ACC", "Accessoires"))
            .await
            .unwrap();
        assert_eq!(commands.list_categories().await.unwrap(), vec![category, second]);
    }
}
