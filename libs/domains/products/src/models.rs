use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Product entity as exposed over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier, generated at creation
    pub id: Uuid,
    /// Product name
    pub name: String,
    /// Units in stock
    pub quantity: i32,
    /// Unit price, serialized as a decimal string
    #[schema(value_type = String, example = "8.50")]
    pub price: Decimal,
    /// Whether the product is active
    pub status: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    #[schema(example = "Iphone 14 pro Max")]
    pub name: String,
    #[validate(range(min = 0))]
    #[schema(example = 10)]
    pub quantity: i32,
    /// Accepts a decimal string or a JSON number
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "8.50")]
    pub price: Decimal,
    #[schema(example = true)]
    pub status: bool,
}

/// DTO for a partial update; absent or `null` fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>, example = "9.99")]
    pub price: Option<Decimal>,
    pub status: Option<bool>,
}

/// Query parameters for listing products
///
/// Each bound is strict and applies on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Only products priced strictly above this value
    pub price_min: Option<f64>,
    /// Only products priced strictly below this value
    pub price_max: Option<f64>,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("price must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Current time at the precision the store keeps
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Product {
    /// Create a new product from CreateProduct DTO
    pub fn new(input: CreateProduct) -> Self {
        let now = now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            quantity: input.quantity,
            price: input.price,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the fields present in `update` and refresh `updated_at`
    ///
    /// Timestamps have millisecond precision, so an update landing in the
    /// same millisecond as the previous write keeps an equal `updated_at`.
    /// It never moves backwards.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = now();
    }
}

impl ProductFilter {
    /// Whether `price` passes both bounds
    pub fn matches(&self, price: Decimal) -> bool {
        use rust_decimal::prelude::ToPrimitive;

        let Some(price) = price.to_f64() else {
            return false;
        };
        self.price_min.is_none_or(|min| price > min) && self.price_max.is_none_or(|max| price < max)
    }
}
