use serde::Serialize;
use utoipa::ToSchema;

use crate::models::PaymentMethod;

pub const DEMO_PROVIDER: &str = "demo";

/// Placeholder for a payment-provider hand-off. Nothing is charged.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct PaymentDescriptor {
    #[schema(example = "demo")]
    pub provider: String,
    #[schema(example = "https://demo-pay.example.com/pay?order=1&amount=1000")]
    pub payment_url: String,
}

/// Only card orders are redirected to the (synthetic) provider.
pub fn payment_for(
    method: PaymentMethod,
    order_id: i64,
    total_cents: i64,
    base_url: &str,
) -> Option<PaymentDescriptor> {
    match method {
        PaymentMethod::Card => Some(PaymentDescriptor {
            provider: DEMO_PROVIDER.to_string(),
            payment_url: format!("{}?order={}&amount={}", base_url, order_id, total_cents),
        }),
        PaymentMethod::Cod | PaymentMethod::Bank => None,
    }
}
