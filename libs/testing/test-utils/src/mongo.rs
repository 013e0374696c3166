//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper that creates a MongoDB container for testing.

use database::mongodb::{MongoConfig, connect_from_config_with_retry};
use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
///
/// # Example
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let products = mongo.database().collection::<mongodb::bson::Document>("products");
/// assert_eq!(products.count_documents(mongodb::bson::doc! {}).await.unwrap(), 0);
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    database: Database,
    pub connection_string: String,
}

impl TestMongo {
    /// Start a MongoDB 8 container and connect to its `test` database
    pub async fn new() -> Self {
        Self::with_database("test").await
    }

    /// Same as [`TestMongo::new`] with a custom database name
    pub async fn with_database(name: &str) -> Self {
        let container = Mongo::default()
            .with_tag("8.0")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string =
            format!("mongodb://127.0.0.1:{}/?directConnection=true", host_port);

        let config = MongoConfig::with_database(connection_string.as_str(), name)
            .with_pool_size(10, 1)
            .with_app_name("test-utils");

        // The container may accept TCP before the server answers commands
        let client = connect_from_config_with_retry(&config, None)
            .await
            .expect("Failed to connect to MongoDB");

        let database = client.database(name);

        tracing::info!(port = host_port, database = name, "Test MongoDB ready (mongo 8.0)");

        Self {
            container,
            client,
            database,
            connection_string,
        }
    }

    /// Get a cloned client handle
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Get a handle to the test database (useful for passing to repositories)
    pub fn database(&self) -> Database {
        self.database.clone()
    }

    /// Get the connection string for manual client creation
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

// Container is automatically cleaned up when TestMongo is dropped
impl Drop for TestMongo {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test MongoDB container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::mongodb::check_health;
    use mongodb::bson::doc;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_mongo_health() {
        let mongo = TestMongo::new().await;
        let status = check_health(&mongo.client(), "test").await;
        assert!(status.healthy, "{:?}", status.message);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_mongo_insert_find() {
        let mongo = TestMongo::with_database("scratch").await;
        let collection = mongo
            .database()
            .collection::<mongodb::bson::Document>("items");

        collection
            .insert_one(doc! { "name": "widget", "quantity": 3 })
            .await
            .unwrap();

        let found = collection
            .find_one(doc! { "name": "widget" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_i32("quantity").unwrap(), 3);
    }
}
