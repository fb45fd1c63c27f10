use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::order::StatusHistoryEntry;
use super::status::OrderStatus;

/// Where a resolved display status came from. `Degraded` marks the safe
/// fallback taken when resolution hit an internal failure, so callers can
/// tell it apart from a normally computed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StatusSource {
    #[serde(rename = "direct")]
    Direct,
    #[serde(rename = "mixed-calculated")]
    MixedCalculated,
    #[serde(rename = "main-order-not-split")]
    MainOrderNotSplit,
    #[serde(rename = "error")]
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartStatusView {
    pub part_id: i64,
    pub vendor_id: Option<i64>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusBreakdown {
    pub admin: Option<PartStatusView>,
    pub vendors: Vec<PartStatusView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResolvedStatus {
    pub status: OrderStatus,
    pub source: StatusSource,
    pub can_customer_cancel: bool,
    pub admin_can_change: bool,
    pub vendor_can_change: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<StatusBreakdown>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: i64,
    pub order_number: String,
    pub order_type: String,
    pub total_amount: f64,
    pub payment_status: String,
    pub resolved: ResolvedStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackOrderResponse {
    pub order_number: String,
    pub current_status: OrderStatus,
    pub status_source: StatusSource,
    pub items: StatusBreakdown,
    pub timeline: Vec<StatusHistoryEntry>,
}
