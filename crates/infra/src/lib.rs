//! Infrastructure layer: catalog storage adapters and the services built on them.

pub mod commands;
pub mod repository;
pub mod service;

pub use commands::{CatalogCommands, CatalogError, CatalogResult};
pub use repository::{
    CatalogStore, CategoryRepository, InMemoryCatalogStore, PostgresCatalogStore,
    ProductRepository, SharedStore, StoreError,
};
pub use service::CatalogService;
