//! Products domain module (catalog).
//!
//! This crate contains the catalog entities and the rules that operate on them
//! (filtering, promotion eligibility, sale-cost pricing), implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod discount;
pub mod filter;
pub mod pricing;
pub mod product;

pub use discount::DiscountPercent;
pub use filter::{Criterion, ProductFilter};
pub use pricing::{discounted_sale_cost, sale_value};
pub use product::{Category, CategoryId, Product, ProductId, Stock, StockId};
