use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use catalog_products::{Category, CategoryId, Product, ProductFilter, ProductId, Stock, StockId};

// -------------------------
// Wire representations
// -------------------------

/// Product as exchanged with clients. Absent fields take their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProduitDto {
    pub id: Option<ProductId>,
    pub code: Option<String>,
    pub designation: String,
    pub prix: f64,
    pub quantite: u32,
    /// `yyyy-MM-dd`
    pub date_achat: Option<NaiveDate>,
    pub en_promotion: bool,
    pub categorie: Option<CategorieDto>,
    pub stocks: Vec<StockDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorieDto {
    pub id: Option<CategoryId>,
    pub code: Option<String>,
    pub libelle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockDto {
    pub id: Option<StockId>,
    pub libelle: Option<String>,
}

impl From<Product> for ProduitDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            code: p.code,
            designation: p.designation,
            prix: p.price,
            quantite: p.quantity,
            date_achat: p.purchase_date,
            en_promotion: p.on_promotion,
            categorie: p.category.map(CategorieDto::from),
            stocks: p.stocks.into_iter().map(StockDto::from).collect(),
        }
    }
}

impl From<ProduitDto> for Product {
    fn from(dto: ProduitDto) -> Self {
        Self {
            id: dto.id,
            code: dto.code,
            designation: dto.designation,
            price: dto.prix,
            quantity: dto.quantite,
            purchase_date: dto.date_achat,
            on_promotion: dto.en_promotion,
            category: dto.categorie.map(Category::from),
            stocks: dto.stocks.into_iter().map(Stock::from).collect(),
        }
    }
}

impl From<Category> for CategorieDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            code: c.code,
            libelle: c.label,
        }
    }
}

impl From<CategorieDto> for Category {
    fn from(dto: CategorieDto) -> Self {
        Self {
            id: dto.id,
            code: dto.code,
            label: dto.libelle,
        }
    }
}

impl From<Stock> for StockDto {
    fn from(s: Stock) -> Self {
        Self {
            id: s.id,
            libelle: s.label,
        }
    }
}

impl From<StockDto> for Stock {
    fn from(dto: StockDto) -> Self {
        Self {
            id: dto.id,
            label: dto.libelle,
        }
    }
}

pub fn products_to_dto(products: Vec<Product>) -> Vec<ProduitDto> {
    products.into_iter().map(ProduitDto::from).collect()
}

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /produits/filter`; every criterion is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    pub code: Option<String>,
    pub designation: Option<String>,
    pub prix_min: Option<f64>,
    pub prix_max: Option<f64>,
    pub quantite_min: Option<u32>,
    pub quantite_max: Option<u32>,
    pub date_achat: Option<NaiveDate>,
    pub categorie: Option<CategoryId>,
}

impl From<FilterQuery> for ProductFilter {
    fn from(q: FilterQuery) -> Self {
        ProductFilter::new()
            .with_code(q.code)
            .with_designation(q.designation)
            .with_price_min(q.prix_min)
            .with_price_max(q.prix_max)
            .with_quantity_min(q.quantite_min)
            .with_quantity_max(q.quantite_max)
            .with_purchase_date(q.date_achat)
            .with_category(q.categorie)
    }
}

#[derive(Debug, Deserialize)]
pub struct PromotionRequest {
    /// Products bought strictly before this date are promoted.
    pub avant: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleCostQuery {
    /// Discount percentage, 0 when omitted.
    pub remise: Option<f64>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PromotionResponse {
    pub promoted: usize,
}

#[derive(Debug, Serialize)]
pub struct SaleCostResponse {
    pub remise: f64,
    #[serde(rename = "coutVente")]
    pub cout_vente: f64,
}
