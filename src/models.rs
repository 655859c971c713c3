use std::{fmt, str::FromStr};

use anyhow::Context;
use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::encoding;

// Orders

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderEntity {
    pub id: i64,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: String,
    pub items_json: String,
    pub total_cents: i64,
    pub status: String,
    pub meta_json: Option<String>,
    pub created_at: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CreateOrderEntity {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: String,
    pub items_json: String,
    pub total_cents: i64,
    pub status: String,
    pub meta_json: Option<String>,
    pub created_at: String,
}

impl CreateOrderEntity {
    pub fn from_new_order(
        order: NewOrder,
        total_cents: i64,
        created_at: String,
    ) -> Result<Self, encoding::EncodingError> {
        Ok(Self {
            items_json: encoding::encode_items(&order.items)?,
            meta_json: order.meta.as_ref().map(encoding::encode_meta).transpose()?,
            customer_name: order.customer_name,
            phone: order.phone,
            address: order.address,
            city: order.city,
            payment_method: order.payment_method.as_str().to_string(),
            total_cents,
            status: OrderStatus::Pending.as_str().to_string(),
            created_at,
        })
    }
}

/// A single product line of an order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Cod,
    Bank,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Bank => "BANK",
            PaymentMethod::Card => "CARD",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentMethod::Cod),
            "BANK" => Ok(PaymentMethod::Bank),
            "CARD" => Ok(PaymentMethod::Card),
            other => Err(format!("{} is not a valid payment method", other)),
        }
    }
}

/// Stored lifecycle label. Only `pending` is ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }
}

/// An order submission that passed validation and is ready to be priced and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub meta: Option<Value>,
}

/// The full order as returned by `GET /orders/{id}`.
#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct OrderRecord {
    pub id: i64,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub total_cents: i64,
    pub status: String,
    pub meta: Option<Value>,
    pub created_at: String,
}

impl TryFrom<OrderEntity> for OrderRecord {
    type Error = anyhow::Error;

    fn try_from(entity: OrderEntity) -> Result<Self, Self::Error> {
        let payment_method = entity
            .payment_method
            .parse()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Order #{} has a corrupt payment method", entity.id))?;
        let items = encoding::decode_items(&entity.items_json)
            .with_context(|| format!("Order #{} has undecodable items", entity.id))?;
        let meta = entity
            .meta_json
            .as_deref()
            .map(encoding::decode_meta)
            .transpose()
            .with_context(|| format!("Order #{} has undecodable meta", entity.id))?;

        Ok(OrderRecord {
            id: entity.id,
            customer_name: entity.customer_name,
            phone: entity.phone,
            address: entity.address,
            city: entity.city,
            payment_method,
            items,
            total_cents: entity.total_cents,
            status: entity.status,
            meta,
            created_at: entity.created_at,
        })
    }
}
