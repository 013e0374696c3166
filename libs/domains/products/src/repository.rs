use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
///
/// Each method maps to a single round trip to the store. Existence checks
/// and validation belong to [`ProductService`](crate::service::ProductService).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product; failures surface as `ProductError::Insertion`
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Products inside the filter's price bounds, oldest first
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    /// Set the fields present in `input` and return the resulting record
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product>;

    /// Delete a product by ID, returning whether a record was removed
    async fn delete(&self, id: Uuid) -> ProductResult<bool>;
}
