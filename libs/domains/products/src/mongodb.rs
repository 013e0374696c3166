//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Decimal128, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{self, CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

/// Default collection name
pub const PRODUCTS_COLLECTION: &str = "products";

/// Stored shape of a product
///
/// `_id` is a binary UUID, `price` a Decimal128 and timestamps native BSON
/// datetimes, so range queries and sorting happen in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    quantity: i32,
    price: Decimal128,
    status: bool,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl ProductDocument {
    fn from_product(product: &Product) -> ProductResult<Self> {
        Ok(Self {
            id: bson_id(product.id),
            name: product.name.clone(),
            quantity: product.quantity,
            price: to_decimal128(product.price)?,
            status: product.status,
            created_at: to_bson_datetime(product.created_at),
            updated_at: to_bson_datetime(product.updated_at),
        })
    }

    fn into_product(self) -> ProductResult<Product> {
        Ok(Product {
            id: Uuid::from_bytes(self.id.bytes()),
            name: self.name,
            quantity: self.quantity,
            price: from_decimal128(&self.price)?,
            status: self.status,
            created_at: from_bson_datetime(self.created_at)?,
            updated_at: from_bson_datetime(self.updated_at)?,
        })
    }
}

fn bson_id(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": bson_id(id) }
}

fn to_decimal128(price: Decimal) -> ProductResult<Decimal128> {
    Decimal128::from_str(&price.to_string())
        .map_err(|e| ProductError::Database(format!("price {price} is not a valid Decimal128: {e}")))
}

fn from_decimal128(value: &Decimal128) -> ProductResult<Decimal> {
    let text = value.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ProductError::Database(format!("stored price {text} is out of range: {e}")))
}

fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_datetime(at: bson::DateTime) -> ProductResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(at.timestamp_millis())
        .ok_or_else(|| ProductError::Database(format!("stored timestamp {at:?} is out of range")))
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    /// Repository over the `products` collection of `db`
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, PRODUCTS_COLLECTION)
    }

    /// Create a new MongoProductRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<ProductDocument>(collection_name);
        Self { collection }
    }

    /// Create the indexes backing price range queries and listing order
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_price".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from ProductFilter
    ///
    /// Bounds are added one at a time so either may appear without the other.
    fn build_filter(filter: &ProductFilter) -> Document {
        let mut price = Document::new();
        if let Some(min) = filter.price_min {
            price.insert("$gt", min);
        }
        if let Some(max) = filter.price_max {
            price.insert("$lt", max);
        }

        if price.is_empty() {
            Document::new()
        } else {
            doc! { "price": price }
        }
    }

    /// `$set` document for the fields present in `input`, plus `updated_at`
    fn build_update(input: UpdateProduct) -> ProductResult<Document> {
        let mut set = doc! { "updated_at": to_bson_datetime(models::now()) };

        if let Some(name) = input.name {
            set.insert("name", name);
        }
        if let Some(quantity) = input.quantity {
            set.insert("quantity", quantity);
        }
        if let Some(price) = input.price {
            set.insert("price", to_decimal128(price)?);
        }
        if let Some(status) = input.status {
            set.insert("status", status);
        }

        Ok(doc! { "$set": set })
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        let document = ProductDocument::from_product(&product)?;

        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| ProductError::Insertion(e.to_string()))?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        self.collection
            .find_one(id_filter(id))
            .await?
            .map(ProductDocument::into_product)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;

        documents.into_iter().map(ProductDocument::into_product).collect()
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateProduct) -> ProductResult<Product> {
        let update = Self::build_update(input)?;

        let updated = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!(product_id = %id, "Product updated successfully");
        updated.into_product()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        let deleted = result.deleted_count > 0;

        if deleted {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(deleted)
    }
}
