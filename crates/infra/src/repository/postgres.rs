//! Postgres-backed catalog store.
//!
//! Schema lives in `migrations/0001_catalog.sql` and is applied by
//! [`PostgresCatalogStore::ensure_schema`].
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (foreign key violation) | `23503` | `MissingReference` |
//! | Any other | any | `Database { operation, source }` |
//!
//! Row values that do not fit the domain types (negative quantity) surface as
//! `Corrupt`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::{debug, instrument};

use catalog_products::{
    Category, CategoryId, Criterion, Product, ProductFilter, ProductId, Stock, StockId,
};

use super::{CategoryRepository, ProductRepository, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const SELECT_PRODUCTS: &str = r#"
    SELECT
        p.id,
        p.code,
        p.designation,
        p.prix,
        p.quantite,
        p.date_achat,
        p.en_promotion,
        c.id AS categorie_id,
        c.code AS categorie_code,
        c.libelle AS categorie_libelle
    FROM produit p
    LEFT JOIN categorie c ON c.id = p.categorie_id
"#;

/// Postgres-backed catalog store.
///
/// Cheap to clone; all clones share the same connection pool. Product saves run
/// in a single transaction (category check, product row, stock cascade, links).
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the catalog tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn fetch_products(
        &self,
        operation: &'static str,
        mut query: QueryBuilder<'_, Postgres>,
    ) -> Result<Vec<Product>, StoreError> {
        query.push(" ORDER BY p.id");
        let rows = query
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        let rows = rows
            .iter()
            .map(ProductRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Corrupt(format!("failed to decode product row: {e}")))?;

        self.attach_stocks(rows).await
    }

    async fn attach_stocks(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, StoreError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let stock_rows = sqlx::query(
            r#"
            SELECT ps.produit_id, s.id, s.libelle
            FROM produit_stocks ps
            JOIN stock s ON s.id = ps.stock_id
            WHERE ps.produit_id = ANY($1)
            ORDER BY s.id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_stocks", e))?;

        let mut stocks: HashMap<i64, Vec<Stock>> = HashMap::new();
        for row in stock_rows {
            let decode =
                |e: sqlx::Error| StoreError::Corrupt(format!("failed to decode stock row: {e}"));
            let product_id: i64 = row.try_get("produit_id").map_err(decode)?;
            let stock = Stock {
                id: Some(StockId::new(row.try_get("id").map_err(decode)?)),
                label: row.try_get("libelle").map_err(decode)?,
            };
            stocks.entry(product_id).or_default().push(stock);
        }

        rows.into_iter()
            .map(|row| {
                let own = stocks.remove(&row.id).unwrap_or_default();
                row.into_product(own)
            })
            .collect()
    }

    async fn upsert_category(
        tx: &mut Transaction<'_, Postgres>,
        category: &Category,
    ) -> Result<CategoryId, StoreError> {
        if let Some(id) = category.id {
            let updated = sqlx::query("UPDATE categorie SET code = $2, libelle = $3 WHERE id = $1")
                .bind(id.value())
                .bind(&category.code)
                .bind(&category.label)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("save_category", e))?;
            if updated.rows_affected() > 0 {
                return Ok(id);
            }
        }

        let id: i64 =
            sqlx::query_scalar("INSERT INTO categorie (code, libelle) VALUES ($1, $2) RETURNING id")
                .bind(&category.code)
                .bind(&category.label)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("save_category", e))?;
        Ok(CategoryId::new(id))
    }

    async fn upsert_stock(
        tx: &mut Transaction<'_, Postgres>,
        stock: &Stock,
    ) -> Result<StockId, StoreError> {
        if let Some(id) = stock.id {
            let updated = sqlx::query("UPDATE stock SET libelle = $2 WHERE id = $1")
                .bind(id.value())
                .bind(&stock.label)
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("save_stock", e))?;
            if updated.rows_affected() > 0 {
                return Ok(id);
            }
        }

        let id: i64 = sqlx::query_scalar("INSERT INTO stock (libelle) VALUES ($1) RETURNING id")
            .bind(&stock.label)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("save_stock", e))?;
        Ok(StockId::new(id))
    }
}

#[async_trait::async_trait]
impl ProductRepository for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        self.fetch_products("find_all_products", QueryBuilder::<Postgres>::new(SELECT_PRODUCTS))
            .await
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_PRODUCTS);
        query.push(" WHERE p.id = ").push_bind(id.value());
        let mut found = self.fetch_products("find_product", query).await?;
        Ok(found.pop())
    }

    #[instrument(skip(self, product), fields(product_id = ?product.id), err)]
    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let category_id = match &product.category {
            Some(category) => {
                let id = category.id.ok_or_else(|| {
                    StoreError::MissingReference(
                        "product references an unsaved category".to_string(),
                    )
                })?;
                let exists: Option<i64> =
                    sqlx::query_scalar("SELECT id FROM categorie WHERE id = $1")
                        .bind(id.value())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("save_product", e))?;
                if exists.is_none() {
                    return Err(StoreError::MissingReference(format!(
                        "category {id} does not exist"
                    )));
                }
                Some(id.value())
            }
            None => None,
        };
        let quantity = i64::from(product.quantity);

        let mut product_id = None;
        if let Some(id) = product.id {
            let updated = sqlx::query(
                r#"
                UPDATE produit
                SET code = $2,
                    designation = $3,
                    prix = $4,
                    quantite = $5,
                    date_achat = $6,
                    en_promotion = $7,
                    categorie_id = $8
                WHERE id = $1
                "#,
            )
            .bind(id.value())
            .bind(&product.code)
            .bind(&product.designation)
            .bind(product.price)
            .bind(quantity)
            .bind(product.purchase_date)
            .bind(product.on_promotion)
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_product", e))?;
            if updated.rows_affected() > 0 {
                product_id = Some(id.value());
            }
        }

        let product_id = match product_id {
            Some(id) => id,
            None => sqlx::query_scalar(
                r#"
                INSERT INTO produit (
                    code, designation, prix, quantite, date_achat, en_promotion, categorie_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(&product.code)
            .bind(&product.designation)
            .bind(product.price)
            .bind(quantity)
            .bind(product.purchase_date)
            .bind(product.on_promotion)
            .bind(category_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_product", e))?,
        };

        sqlx::query("DELETE FROM produit_stocks WHERE produit_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_product", e))?;

        for stock in &product.stocks {
            let stock_id = Self::upsert_stock(&mut tx, stock).await?;
            sqlx::query(
                "INSERT INTO produit_stocks (produit_id, stock_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(product_id)
            .bind(stock_id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("save_product", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        debug!(product_id, "product saved");

        let id = ProductId::new(product_id);
        ProductRepository::find_by_id(self, id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("product {id} vanished after save")))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete_by_id(&self, id: ProductId) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM produit WHERE id = $1")
            .bind(id.value())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(deleted.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn find_all_where(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        if filter.is_empty() {
            return ProductRepository::find_all(self).await;
        }
        let mut query = QueryBuilder::<Postgres>::new(SELECT_PRODUCTS);
        query.push(" WHERE TRUE");
        for criterion in filter.criteria() {
            match criterion {
                Criterion::CodeContains(needle) => {
                    query.push(" AND p.code LIKE ").push_bind(like_pattern(needle));
                    query.push(" ESCAPE '\\'");
                }
                Criterion::DesignationContains(needle) => {
                    query.push(" AND p.designation LIKE ").push_bind(like_pattern(needle));
                    query.push(" ESCAPE '\\'");
                }
                Criterion::PriceAtLeast(min) => {
                    query.push(" AND p.prix >= ").push_bind(*min);
                }
                Criterion::PriceAtMost(max) => {
                    query.push(" AND p.prix <= ").push_bind(*max);
                }
                Criterion::QuantityAtLeast(min) => {
                    query.push(" AND p.quantite >= ").push_bind(i64::from(*min));
                }
                Criterion::QuantityAtMost(max) => {
                    query.push(" AND p.quantite <= ").push_bind(i64::from(*max));
                }
                Criterion::PurchasedOn(date) => {
                    query.push(" AND p.date_achat = ").push_bind(*date);
                }
                Criterion::InCategory(id) => {
                    query.push(" AND p.categorie_id = ").push_bind(id.value());
                }
            }
        }
        self.fetch_products("filter_products", query).await
    }

    #[instrument(skip(self), err)]
    async fn find_all_purchased_before(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<Product>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_PRODUCTS);
        query.push(" WHERE p.date_achat < ").push_bind(cutoff);
        self.fetch_products("products_purchased_before", query).await
    }
}

#[async_trait::async_trait]
impl CategoryRepository for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, code, libelle FROM categorie ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all_categories", e))?;
        rows.iter().map(category_from_row).collect()
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT id, code, libelle FROM categorie WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_category", e))?;
        row.as_ref().map(category_from_row).transpose()
    }

    #[instrument(skip(self, category), fields(category_id = ?category.id), err)]
    async fn save(&self, mut category: Category) -> Result<Category, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        let id = Self::upsert_category(&mut tx, &category).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        category.id = Some(id);
        Ok(category)
    }
}

/// Product row joined with its category.
struct ProductRow {
    id: i64,
    code: Option<String>,
    designation: String,
    prix: f64,
    quantite: i64,
    date_achat: Option<NaiveDate>,
    en_promotion: bool,
    categorie_id: Option<i64>,
    categorie_code: Option<String>,
    categorie_libelle: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            designation: row.try_get("designation")?,
            prix: row.try_get("prix")?,
            quantite: row.try_get("quantite")?,
            date_achat: row.try_get("date_achat")?,
            en_promotion: row.try_get("en_promotion")?,
            categorie_id: row.try_get("categorie_id")?,
            categorie_code: row.try_get("categorie_code")?,
            categorie_libelle: row.try_get("categorie_libelle")?,
        })
    }
}

impl ProductRow {
    fn into_product(self, stocks: Vec<Stock>) -> Result<Product, StoreError> {
        let quantity = u32::try_from(self.quantite).map_err(|_| {
            StoreError::Corrupt(format!(
                "product {} has out-of-range quantity {}",
                self.id, self.quantite
            ))
        })?;
        let category = self.categorie_id.map(|id| Category {
            id: Some(CategoryId::new(id)),
            code: self.categorie_code,
            label: self.categorie_libelle,
        });

        Ok(Product {
            id: Some(ProductId::new(self.id)),
            code: self.code,
            designation: self.designation,
            price: self.prix,
            quantity,
            purchase_date: self.date_achat,
            on_promotion: self.en_promotion,
            category,
            stocks,
        })
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, StoreError> {
    let decode =
        |e: sqlx::Error| StoreError::Corrupt(format!("failed to decode category row: {e}"));
    Ok(Category {
        id: Some(CategoryId::new(row.try_get("id").map_err(decode)?)),
        code: row.try_get("code").map_err(decode)?,
        label: row.try_get("libelle").map_err(decode)?,
    })
}

/// `LIKE` pattern matching `needle` as a literal substring.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23503") {
            return StoreError::MissingReference(format!(
                "{operation}: {}",
                db_err.message()
            ));
        }
    }
    StoreError::Database {
        operation,
        source: err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn non_database_errors_keep_their_operation() {
        match map_sqlx_error("find_all_products", sqlx::Error::PoolClosed) {
            StoreError::Database { operation, .. } => assert_eq!(operation, "find_all_products"),
            other => panic!("expected Database error, got {other:?}"),
        }
    }

    async fn connect() -> PostgresCatalogStore {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for Postgres tests");
        let store = PostgresCatalogStore::connect(&url, 2).await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_save_and_filter_roundtrip() {
        let store = connect().await;
        let category = CategoryRepository::save(&store, Category::new("PG", "Postgres"))
            .await
            .unwrap();
        let category_id = category.id.unwrap();

        let mut product = Product::new(
            "Disque 50%_promo",
            120.0,
            3,
            NaiveDate::from_ymd_opt(2021, 3, 4),
            Some(Category::reference(category_id)),
        );
        product.stocks.push(Stock::new("Depot PG"));
        let saved = ProductRepository::save(&store, product).await.unwrap();
        assert_eq!(saved.category.as_ref().and_then(|c| c.code.as_deref()), Some("PG"));
        assert_eq!(saved.stocks.len(), 1);

        let filter = ProductFilter::new()
            .with_designation(Some("50%_"))
            .with_category(Some(category_id));
        let found = store.find_all_where(&filter).await.unwrap();
        assert!(found.iter().any(|p| p.id == saved.id));
        assert_eq!(
            store.find_all_where(&ProductFilter::new()).await.unwrap(),
            ProductRepository::find_all(&store).await.unwrap()
        );

        assert!(store.delete_by_id(saved.id.unwrap()).await.unwrap());
        assert_eq!(
            ProductRepository::find_by_id(&store, saved.id.unwrap()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn postgres_rejects_dangling_category() {
        let store = connect().await;
        let product = Product::new(
            "orphan",
            1.0,
            1,
            None,
            Some(Category::reference(CategoryId::new(i64::MAX))),
        );
        assert!(matches!(
            ProductRepository::save(&store, product).await,
            Err(StoreError::MissingReference(_))
        ));
    }
}
