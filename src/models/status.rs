use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Canonical order status vocabulary. Stored as lowercase snake_case text;
/// historical rows may still carry the old capitalized vocabulary, which
/// goes through [`map_legacy_status`] before any comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    CancelledByCustomer,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::CancelledByCustomer => "cancelled_by_customer",
        }
    }

    pub fn from_canonical(s: &str) -> Option<Self> {
        match s {
            "placed" => Some(OrderStatus::Placed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            "cancelled_by_customer" => Some(OrderStatus::CancelledByCustomer),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::CancelledByCustomer
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::CancelledByCustomer)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    AdminOnly,
    VendorOnly,
    Mixed,
    Legacy,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::AdminOnly => "admin_only",
            OrderType::VendorOnly => "vendor_only",
            OrderType::Mixed => "mixed",
            OrderType::Legacy => "legacy",
        }
    }

    pub fn from_str_or_legacy(s: &str) -> Self {
        match s {
            "admin_only" => OrderType::AdminOnly,
            "vendor_only" => OrderType::VendorOnly,
            "mixed" => OrderType::Mixed,
            _ => OrderType::Legacy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Vendor,
    Customer,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Admin => "admin",
            ActorRole::Vendor => "vendor",
            ActorRole::Customer => "customer",
        }
    }
}

/// Result of mapping a raw status string. Unrecognized strings are kept as
/// an explicit `Unknown` (lowercased) instead of being passed through
/// silently, so callers can decide how to treat them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedStatus {
    Known(OrderStatus),
    Unknown(String),
}

impl MappedStatus {
    pub fn known(&self) -> Option<OrderStatus> {
        match self {
            MappedStatus::Known(s) => Some(*s),
            MappedStatus::Unknown(_) => None,
        }
    }

    /// Display status for an unresolvable raw value falls back to `placed`.
    pub fn or_placed(&self) -> OrderStatus {
        self.known().unwrap_or(OrderStatus::Placed)
    }
}

/// Maps a raw status string (canonical or historical capitalized vocabulary)
/// to the canonical enum. Never fails.
pub fn map_legacy_status(raw: &str) -> MappedStatus {
    let normalized = raw.trim().to_lowercase();
    if let Some(status) = OrderStatus::from_canonical(&normalized) {
        return MappedStatus::Known(status);
    }
    // Pre-standardization vocabulary
    match normalized.as_str() {
        "pending" => MappedStatus::Known(OrderStatus::Placed),
        "confirmed" => MappedStatus::Known(OrderStatus::Processing),
        _ => MappedStatus::Unknown(normalized),
    }
}

/// Statuses a non-terminal status may move to next. Terminal statuses have
/// no outgoing transitions.
pub fn allowed_transitions(current: OrderStatus) -> &'static [OrderStatus] {
    match current {
        OrderStatus::Placed => &[
            OrderStatus::Processing,
            OrderStatus::Cancelled,
            OrderStatus::CancelledByCustomer,
        ],
        OrderStatus::Processing => &[
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
            OrderStatus::CancelledByCustomer,
        ],
        OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
        OrderStatus::Delivered
        | OrderStatus::Cancelled
        | OrderStatus::CancelledByCustomer => &[],
    }
}

pub fn is_valid_status_transition(current: OrderStatus, next: OrderStatus) -> bool {
    allowed_transitions(current).contains(&next)
}

/// A customer may cancel as long as the order is neither delivered nor
/// already cancelled.
pub fn can_customer_cancel_order(status: OrderStatus) -> bool {
    !matches!(
        status,
        OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::CancelledByCustomer
    )
}

/// Whether the given role may still change this status. Customer
/// cancellations are immutable for everyone; the other terminal states can
/// only be touched by an admin.
pub fn can_change_status(status: OrderStatus, role: ActorRole) -> bool {
    match status {
        OrderStatus::CancelledByCustomer => false,
        OrderStatus::Delivered | OrderStatus::Cancelled => role == ActorRole::Admin,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        assert!(is_valid_status_transition(OrderStatus::Placed, OrderStatus::Processing));
        assert!(is_valid_status_transition(OrderStatus::Placed, OrderStatus::Cancelled));
        assert!(is_valid_status_transition(OrderStatus::Processing, OrderStatus::Shipped));
        assert!(is_valid_status_transition(OrderStatus::Shipped, OrderStatus::Delivered));
        assert!(!is_valid_status_transition(OrderStatus::Placed, OrderStatus::Delivered));
        assert!(!is_valid_status_transition(OrderStatus::Shipped, OrderStatus::Processing));
    }

    #[test]
    fn test_terminal_statuses_have_no_transitions() {
        for next in [
            OrderStatus::Placed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::CancelledByCustomer,
        ] {
            assert!(!is_valid_status_transition(OrderStatus::Delivered, next));
            assert!(!is_valid_status_transition(OrderStatus::Cancelled, next));
            assert!(!is_valid_status_transition(OrderStatus::CancelledByCustomer, next));
        }
    }

    #[test]
    fn test_customer_cancel_permission() {
        assert!(can_customer_cancel_order(OrderStatus::Placed));
        assert!(can_customer_cancel_order(OrderStatus::Processing));
        assert!(can_customer_cancel_order(OrderStatus::Shipped));
        assert!(!can_customer_cancel_order(OrderStatus::Delivered));
        assert!(!can_customer_cancel_order(OrderStatus::Cancelled));
        assert!(!can_customer_cancel_order(OrderStatus::CancelledByCustomer));
    }

    #[test]
    fn test_change_permission_by_role() {
        assert!(!can_change_status(OrderStatus::CancelledByCustomer, ActorRole::Admin));
        assert!(!can_change_status(OrderStatus::CancelledByCustomer, ActorRole::Vendor));
        assert!(can_change_status(OrderStatus::Delivered, ActorRole::Admin));
        assert!(!can_change_status(OrderStatus::Delivered, ActorRole::Vendor));
        assert!(can_change_status(OrderStatus::Cancelled, ActorRole::Admin));
        assert!(!can_change_status(OrderStatus::Cancelled, ActorRole::Customer));
        assert!(can_change_status(OrderStatus::Processing, ActorRole::Vendor));
    }

    #[test]
    fn test_legacy_mapping() {
        assert_eq!(map_legacy_status("Pending"), MappedStatus::Known(OrderStatus::Placed));
        assert_eq!(map_legacy_status("Confirmed"), MappedStatus::Known(OrderStatus::Processing));
        assert_eq!(map_legacy_status("Shipped"), MappedStatus::Known(OrderStatus::Shipped));
        assert_eq!(map_legacy_status("Delivered"), MappedStatus::Known(OrderStatus::Delivered));
        assert_eq!(map_legacy_status("Cancelled"), MappedStatus::Known(OrderStatus::Cancelled));
    }

    #[test]
    fn test_canonical_strings_map_to_themselves() {
        assert_eq!(map_legacy_status("placed"), MappedStatus::Known(OrderStatus::Placed));
        assert_eq!(
            map_legacy_status("cancelled_by_customer"),
            MappedStatus::Known(OrderStatus::CancelledByCustomer)
        );
    }

    #[test]
    fn test_unknown_status_is_explicit() {
        assert_eq!(
            map_legacy_status("On Hold"),
            MappedStatus::Unknown("on hold".to_string())
        );
        assert_eq!(map_legacy_status("On Hold").or_placed(), OrderStatus::Placed);
    }
}
