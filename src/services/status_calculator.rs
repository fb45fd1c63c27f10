use crate::models::status::{MappedStatus, OrderStatus};

/// Derives one aggregate status for a split order from its part statuses.
///
/// Rules, first match wins:
/// 1. no parts -> placed
/// 2. every part cancelled -> cancelled (partial cancellations are excluded
///    from the remaining rules instead)
/// 3. every remaining part at least processing -> processing, unless every
///    remaining part is shipped-or-delivered, in which case shipped, unless
///    all are delivered, in which case delivered
/// 4. anything still placed (or unrecognized) -> placed
///
/// The parent can never report further progress than its least-advanced
/// non-cancelled part. Pure function of its input.
pub fn aggregate_part_statuses(statuses: &[MappedStatus]) -> OrderStatus {
    if statuses.is_empty() {
        return OrderStatus::Placed;
    }

    let active: Vec<OrderStatus> = statuses
        .iter()
        .map(|s| s.or_placed())
        .filter(|s| !s.is_cancelled())
        .collect();

    if active.is_empty() {
        return OrderStatus::Cancelled;
    }

    let all_in_progress = active.iter().all(|s| {
        matches!(
            s,
            OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
        )
    });

    if all_in_progress {
        let all_shipped_or_delivered = active
            .iter()
            .all(|s| matches!(s, OrderStatus::Shipped | OrderStatus::Delivered));

        if all_shipped_or_delivered {
            if active.iter().all(|s| *s == OrderStatus::Delivered) {
                return OrderStatus::Delivered;
            }
            return OrderStatus::Shipped;
        }
        return OrderStatus::Processing;
    }

    OrderStatus::Placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::map_legacy_status;

    fn known(statuses: &[OrderStatus]) -> Vec<MappedStatus> {
        statuses.iter().map(|s| MappedStatus::Known(*s)).collect()
    }

    #[test]
    fn test_empty_list_is_placed() {
        assert_eq!(aggregate_part_statuses(&[]), OrderStatus::Placed);
    }

    #[test]
    fn test_all_cancelled_is_cancelled() {
        let statuses = known(&[OrderStatus::Cancelled, OrderStatus::CancelledByCustomer]);
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Cancelled);
    }

    #[test]
    fn test_partial_cancellation_is_excluded() {
        // Cancelled parts do not hold back the rest
        let statuses = known(&[OrderStatus::Cancelled, OrderStatus::Shipped]);
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Shipped);
    }

    #[test]
    fn test_any_placed_part_keeps_parent_placed() {
        let statuses = known(&[OrderStatus::Delivered, OrderStatus::Placed]);
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Placed);
    }

    #[test]
    fn test_processing_is_weakest_link() {
        // A delivered part does not advance the parent past processing
        let statuses = known(&[OrderStatus::Delivered, OrderStatus::Processing]);
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Processing);
    }

    #[test]
    fn test_shipped_and_delivered_mix_is_shipped() {
        let statuses = known(&[
            OrderStatus::Delivered,
            OrderStatus::Shipped,
            OrderStatus::Shipped,
        ]);
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Shipped);
    }

    #[test]
    fn test_all_delivered_is_delivered() {
        let statuses = known(&[OrderStatus::Delivered, OrderStatus::Delivered]);
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Delivered);
    }

    #[test]
    fn test_single_part() {
        assert_eq!(
            aggregate_part_statuses(&known(&[OrderStatus::Processing])),
            OrderStatus::Processing
        );
        assert_eq!(
            aggregate_part_statuses(&known(&[OrderStatus::Delivered])),
            OrderStatus::Delivered
        );
    }

    #[test]
    fn test_unknown_status_counts_as_placed() {
        let statuses = vec![
            map_legacy_status("awaiting warehouse"),
            MappedStatus::Known(OrderStatus::Shipped),
        ];
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Placed);
    }

    #[test]
    fn test_legacy_inputs_are_mapped_first() {
        let statuses = vec![map_legacy_status("Confirmed"), map_legacy_status("Shipped")];
        assert_eq!(aggregate_part_statuses(&statuses), OrderStatus::Processing);
    }

    #[test]
    fn test_idempotent() {
        let statuses = known(&[OrderStatus::Shipped, OrderStatus::Cancelled]);
        let first = aggregate_part_statuses(&statuses);
        let second = aggregate_part_statuses(&statuses);
        assert_eq!(first, second);
    }
}
