use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::status::{map_legacy_status, MappedStatus, OrderType};

pub const HANDLER_ADMIN: &str = "admin";
pub const HANDLER_VENDOR: &str = "vendor";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: String,
    pub payment_method: String,
    /// Raw status text; may hold legacy capitalized values on old rows.
    pub status: String,
    pub order_type: String,
    pub total_amount: f64,
    pub payment_status: String,
    pub parent_order_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Order {
    pub fn mapped_status(&self) -> MappedStatus {
        map_legacy_status(&self.status)
    }

    pub fn order_type(&self) -> OrderType {
        OrderType::from_str_or_legacy(&self.order_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderPart {
    pub id: i64,
    pub order_id: i64,
    /// "admin" or "vendor"
    pub handler_kind: String,
    pub vendor_id: Option<i64>,
    pub status: String,
    pub total_amount: f64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl OrderPart {
    pub fn mapped_status(&self) -> MappedStatus {
        map_legacy_status(&self.status)
    }

    pub fn is_vendor_part(&self) -> bool {
        self.handler_kind == HANDLER_VENDOR
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub part_id: Option<i64>,
    pub product_ref: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub handler_kind: String,
    pub vendor_id: Option<i64>,
    pub status: String,
    pub commission_amount: f64,
    pub commission_reversed: bool,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    /// A reversed item contributes nothing regardless of the stored amount.
    pub fn effective_commission(&self) -> f64 {
        if self.commission_reversed {
            0.0
        } else {
            self.commission_amount
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub order_id: i64,
    pub part_id: Option<i64>,
    pub status: String,
    pub actor: String,
    pub note: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub product_ref: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// "admin" or "vendor"
    pub handler_kind: String,
    pub vendor_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: String,
    pub payment_method: String,
    pub items: Vec<CreateOrderItemRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdatePartStatusRequest {
    pub status: super::status::OrderStatus,
    pub role: super::status::ActorRole,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub email: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
