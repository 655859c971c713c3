//! Field-level validation of an order submission.
//!
//! Every rule is checked and all violations are returned together, so a client
//! can fix the whole form in one round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{NewOrder, OrderItem, PaymentMethod};

const MIN_NAME_LEN: usize = 2;
const MIN_PHONE_LEN: usize = 7;
const MIN_ADDRESS_LEN: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of `POST /orders`. Kept loose so that type mismatches surface as field
/// errors instead of a body rejection. Numbers given for text fields are taken
/// in their decimal form.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateOrderReq {
    #[schema(value_type = Option<String>, example = "Ann Lee")]
    pub customer_name: Option<Value>,
    #[schema(value_type = Option<String>, example = "0123456")]
    pub phone: Option<Value>,
    #[schema(value_type = Option<String>, example = "12 Main St")]
    pub address: Option<Value>,
    #[schema(value_type = Option<String>, example = "Hanoi")]
    pub city: Option<Value>,
    #[schema(value_type = Option<String>, example = "COD")]
    pub payment_method: Option<Value>,
    #[schema(value_type = Vec<Object>, example = json!([{"name": "Shirt", "price": 10, "quantity": 2}]))]
    pub items: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub meta: Option<Value>,
}

pub fn validate_create_order(req: CreateOrderReq) -> Result<NewOrder, Vec<FieldError>> {
    let mut errors = Vec::new();

    let customer_name = min_len(
        &mut errors,
        "customer_name",
        req.customer_name,
        MIN_NAME_LEN,
        "customer_name must be at least 2 characters",
    );
    let phone = min_len(
        &mut errors,
        "phone",
        req.phone,
        MIN_PHONE_LEN,
        "phone must be at least 7 characters",
    );
    let address = min_len(
        &mut errors,
        "address",
        req.address,
        MIN_ADDRESS_LEN,
        "address must be at least 5 characters",
    );
    let city = min_len(&mut errors, "city", req.city, 1, "city must not be empty");

    let payment_method = match req
        .payment_method
        .and_then(coerce_text)
        .map(|method| method.parse::<PaymentMethod>())
    {
        Some(Ok(method)) => Some(method),
        _ => {
            errors.push(FieldError::new(
                "payment_method",
                "payment_method must be one of COD, BANK, CARD",
            ));
            None
        }
    };

    let items = validate_items(&mut errors, req.items);

    match (customer_name, phone, address, city, payment_method, items) {
        (Some(customer_name), Some(phone), Some(address), Some(city), Some(payment_method), Some(items))
            if errors.is_empty() =>
        {
            Ok(NewOrder {
                customer_name,
                phone,
                address,
                city,
                payment_method,
                items,
                meta: req.meta.filter(|meta| !meta.is_null()),
            })
        }
        _ => Err(errors),
    }
}

fn min_len(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<Value>,
    min: usize,
    message: &str,
) -> Option<String> {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => match coerce_text(value) {
            Some(text) => text,
            None => {
                errors.push(FieldError::new(field, format!("{} must be a string", field)));
                return None;
            }
        },
    };
    let trimmed = text.trim();
    if trimmed.chars().count() < min {
        errors.push(FieldError::new(field, message));
        return None;
    }
    Some(trimmed.to_string())
}

/// Strings as given, numbers in their decimal form. Any other type is not text.
fn coerce_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn validate_items(errors: &mut Vec<FieldError>, items: Option<Value>) -> Option<Vec<OrderItem>> {
    let entries = match items {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        _ => {
            errors.push(FieldError::new("items", "at least one item is required"));
            return None;
        }
    };

    let before = errors.len();
    let items: Vec<OrderItem> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| validate_item(errors, index, entry))
        .collect();

    (errors.len() == before).then_some(items)
}

fn validate_item(errors: &mut Vec<FieldError>, index: usize, entry: &Value) -> Option<OrderItem> {
    let Some(entry) = entry.as_object() else {
        errors.push(FieldError::new(
            format!("items[{}]", index),
            "item must be an object",
        ));
        return None;
    };

    let name = match entry.get("name").and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            errors.push(FieldError::new(
                format!("items[{}].name", index),
                "item name is required",
            ));
            None
        }
    };

    let price = match entry.get("price").and_then(numeric) {
        Some(price) if price.is_finite() && price >= 0.0 => Some(price),
        _ => {
            errors.push(FieldError::new(
                format!("items[{}].price", index),
                "price must be a finite, non-negative number",
            ));
            None
        }
    };

    let quantity = match entry.get("quantity") {
        None | Some(Value::Null) => Some(1),
        Some(value) => match positive_integer(value) {
            Some(quantity) => Some(quantity),
            None => {
                errors.push(FieldError::new(
                    format!("items[{}].quantity", index),
                    "quantity must be a positive integer no greater than 4294967295",
                ));
                None
            }
        },
    };

    Some(OrderItem {
        name: name?,
        price: price?,
        quantity: quantity?,
    })
}

/// Accepts JSON numbers and numeric strings.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn positive_integer(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => n,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 1.0 || f > u32::MAX as f64 {
                    return None;
                }
                f as u64
            }
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n >= 1)
}
