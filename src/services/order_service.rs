use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::status::{
    can_change_status, can_customer_cancel_order, is_valid_status_transition, ActorRole,
    OrderStatus, OrderType,
};
use crate::models::*;
use crate::services::commission_service::{commission_for, CommissionService};
use crate::services::order_status_service::OrderStatusService;
use crate::utils::generate_order_number;

#[derive(Clone)]
pub struct OrderService {
    pool: DbPool,
    commission_service: CommissionService,
    status_service: OrderStatusService,
}

impl OrderService {
    pub fn new(
        pool: DbPool,
        commission_service: CommissionService,
        status_service: OrderStatusService,
    ) -> Self {
        Self {
            pool,
            commission_service,
            status_service,
        }
    }

    /// Creates an order from a checkout cart. The order type is derived
    /// from the handler assignments of the line items.
    pub async fn create_order(&self, req: &CreateOrderRequest) -> AppResult<Order> {
        if req.items.is_empty() {
            return Err(AppError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }
        for item in &req.items {
            if item.quantity <= 0 {
                return Err(AppError::ValidationError(format!(
                    "Invalid quantity for product {}",
                    item.product_ref
                )));
            }
            match item.handler_kind.as_str() {
                HANDLER_ADMIN => {}
                HANDLER_VENDOR => {
                    if item.vendor_id.is_none() {
                        return Err(AppError::ValidationError(format!(
                            "Vendor-handled product {} is missing a vendor id",
                            item.product_ref
                        )));
                    }
                }
                other => {
                    return Err(AppError::ValidationError(format!(
                        "Unknown handler kind: {other}"
                    )));
                }
            }
        }

        let order_type = derive_order_type(&req.items);
        let total: f64 = req
            .items
            .iter()
            .map(|i| i.unit_price * i.quantity as f64)
            .sum();
        let order_number = generate_order_number();

        let mut tx = self.pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders
                (order_number, customer_name, customer_email, customer_phone,
                 shipping_address, payment_method, status, order_type, total_amount)
            VALUES (?, ?, ?, ?, ?, ?, 'placed', ?, ?)
            RETURNING id
            "#,
        )
        .bind(&order_number)
        .bind(&req.customer_name)
        .bind(&req.customer_email)
        .bind(&req.customer_phone)
        .bind(&req.shipping_address)
        .bind(&req.payment_method)
        .bind(order_type.as_str())
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        for item in &req.items {
            sqlx::query(
                r#"
                INSERT INTO order_items
                    (order_id, product_ref, product_name, quantity, unit_price,
                     handler_kind, vendor_id, status)
                VALUES (?, ?, ?, ?, ?, ?, ?, 'placed')
                "#,
            )
            .bind(order_id)
            .bind(&item.product_ref)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(&item.handler_kind)
            .bind(item.vendor_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO status_history (order_id, status, actor, note) VALUES (?, 'placed', 'customer', 'Order placed')",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Created {} order {order_number}", order_type.as_str());
        self.get_order(order_id).await
    }

    pub async fn get_order(&self, order_id: i64) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))
    }

    pub async fn get_order_by_number(&self, order_number: &str) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = ?")
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_number} not found")))
    }

    pub async fn get_part(&self, part_id: i64) -> AppResult<OrderPart> {
        sqlx::query_as::<_, OrderPart>("SELECT * FROM order_parts WHERE id = ?")
            .bind(part_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order part {part_id} not found")))
    }

    /// Splits a mixed order into at most one admin part plus one part per
    /// distinct vendor in the cart. Splitting happens once; after it, the
    /// parent's display status is derived from the parts.
    pub async fn split_mixed_order(&self, order_id: i64) -> AppResult<Vec<OrderPart>> {
        let order = self.get_order(order_id).await?;
        if order.order_type() != OrderType::Mixed {
            return Err(AppError::ValidationError(format!(
                "Order {} is not a mixed order",
                order.order_number
            )));
        }

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_parts WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(AppError::ValidationError(format!(
                "Order {} has already been split",
                order.order_number
            )));
        }

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        // Group item ids by handler; admin items under the None key
        let mut groups: Vec<(Option<i64>, Vec<&OrderItem>)> = Vec::new();
        for item in &items {
            let key = if item.handler_kind == HANDLER_VENDOR {
                item.vendor_id
            } else {
                None
            };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, group)) => group.push(item),
                None => groups.push((key, vec![item])),
            }
        }

        let mut tx = self.pool.begin().await?;
        let mut parts = Vec::new();

        for (vendor_id, group) in &groups {
            let part_total: f64 = group.iter().map(|i| i.line_total()).sum();
            let handler_kind = if vendor_id.is_some() {
                HANDLER_VENDOR
            } else {
                HANDLER_ADMIN
            };

            let part_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO order_parts (order_id, handler_kind, vendor_id, status, total_amount)
                VALUES (?, ?, ?, 'placed', ?)
                RETURNING id
                "#,
            )
            .bind(order_id)
            .bind(handler_kind)
            .bind(vendor_id)
            .bind(part_total)
            .fetch_one(&mut *tx)
            .await?;

            for item in group {
                sqlx::query("UPDATE order_items SET part_id = ? WHERE id = ?")
                    .bind(part_id)
                    .bind(item.id)
                    .execute(&mut *tx)
                    .await?;
            }

            sqlx::query(
                "INSERT INTO status_history (order_id, part_id, status, actor, note) VALUES (?, ?, 'placed', 'admin', ?)",
            )
            .bind(order_id)
            .bind(part_id)
            .bind(match vendor_id {
                Some(v) => format!("Split off vendor {v} part"),
                None => "Split off admin part".to_string(),
            })
            .execute(&mut *tx)
            .await?;

            parts.push(part_id);
        }

        tx.commit().await?;

        log::info!(
            "Split order {} into {} parts",
            order.order_number,
            parts.len()
        );

        let parts = sqlx::query_as::<_, OrderPart>(
            "SELECT * FROM order_parts WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parts)
    }

    /// Applies a status change to one part, enforcing role permission and
    /// the transition table, and records it in the history.
    pub async fn update_part_status(
        &self,
        part_id: i64,
        next: OrderStatus,
        role: ActorRole,
        note: Option<String>,
    ) -> AppResult<OrderPart> {
        let part = self.get_part(part_id).await?;
        let current = part.mapped_status().or_placed();

        if !can_change_status(current, role) {
            return Err(AppError::ValidationError(format!(
                "Role {} may not change a {} part",
                role.as_str(),
                current
            )));
        }
        if !is_valid_status_transition(current, next) {
            return Err(AppError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        self.apply_part_status(&part, next, role, note).await?;
        self.get_part(part_id).await
    }

    /// Forwards a vendor part to its vendor for fulfillment. This is the
    /// trigger point for commission accrual: the amount is computed at the
    /// rate in force right now and stamped on the part's items. A ledger
    /// failure is logged but never fails the forwarding itself.
    pub async fn forward_part(&self, part_id: i64) -> AppResult<OrderPart> {
        let part = self.get_part(part_id).await?;
        let vendor_id = match (part.is_vendor_part(), part.vendor_id) {
            (true, Some(vendor_id)) => vendor_id,
            _ => {
                return Err(AppError::ValidationError(format!(
                    "Part {part_id} is not a vendor part"
                )));
            }
        };

        let current = part.mapped_status().or_placed();
        if !is_valid_status_transition(current, OrderStatus::Processing) {
            return Err(AppError::InvalidTransition {
                from: current.to_string(),
                to: OrderStatus::Processing.to_string(),
            });
        }

        let rate = self.commission_service.get_rate().await?;
        let amount = commission_for(part.total_amount, rate);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE order_items
            SET commission_amount = unit_price * quantity * ? / 100.0,
                status = 'processing'
            WHERE part_id = ? AND commission_reversed = 0
            "#,
        )
        .bind(rate)
        .bind(part_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE order_parts SET status = 'processing', updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(part_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO status_history (order_id, part_id, status, actor, note) VALUES (?, ?, 'processing', 'admin', ?)",
        )
        .bind(part.order_id)
        .bind(part_id)
        .bind(format!("Forwarded to vendor {vendor_id}"))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        // Ledger bookkeeping must not block the customer-visible order flow
        if let Err(e) = self
            .commission_service
            .record_accrual(vendor_id, amount, None)
            .await
        {
            log::error!(
                "Commission accrual failed for vendor {vendor_id} on part {part_id}: {e}"
            );
        }

        self.get_part(part_id).await
    }

    /// Customer cancellation of a top-level order. Permission is checked
    /// against the resolved display status, so a mixed order that already
    /// shipped in full cannot be cancelled. Commission accrued on already
    /// forwarded items is reversed.
    pub async fn cancel_by_customer(&self, order_id: i64) -> AppResult<Order> {
        let order = self.get_order(order_id).await?;
        let resolved = self.status_service.resolve(&order).await;

        if !can_customer_cancel_order(resolved.status) {
            return Err(AppError::ValidationError(format!(
                "Order {} can no longer be cancelled (status: {})",
                order.order_number, resolved.status
            )));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE orders SET status = 'cancelled_by_customer', updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        // Cancel every part that has not reached a terminal state
        sqlx::query(
            r#"
            UPDATE order_parts
            SET status = 'cancelled_by_customer', updated_at = CURRENT_TIMESTAMP
            WHERE order_id = ?
              AND status NOT IN ('delivered', 'cancelled', 'cancelled_by_customer')
            "#,
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE order_items
            SET status = 'cancelled_by_customer',
                commission_reversed = CASE WHEN commission_amount != 0 THEN 1 ELSE commission_reversed END
            WHERE order_id = ?
              AND status NOT IN ('delivered', 'cancelled', 'cancelled_by_customer')
            "#,
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO status_history (order_id, status, actor, note) VALUES (?, 'cancelled_by_customer', 'customer', 'Cancelled by customer')",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        log::info!("Order {} cancelled by customer", order.order_number);
        self.get_order(order_id).await
    }

    pub async fn get_items(&self, order_id: i64) -> AppResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn apply_part_status(
        &self,
        part: &OrderPart,
        next: OrderStatus,
        role: ActorRole,
        note: Option<String>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE order_parts SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(next.as_str())
        .bind(part.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE order_items SET status = ? WHERE part_id = ?")
            .bind(next.as_str())
            .bind(part.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO status_history (order_id, part_id, status, actor, note) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(part.order_id)
        .bind(part.id)
        .bind(next.as_str())
        .bind(role.as_str())
        .bind(note)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Derives the order type from the cart's handler assignments.
fn derive_order_type(items: &[CreateOrderItemRequest]) -> OrderType {
    let has_admin = items.iter().any(|i| i.handler_kind == HANDLER_ADMIN);
    let has_vendor = items.iter().any(|i| i.handler_kind == HANDLER_VENDOR);
    match (has_admin, has_vendor) {
        (true, true) => OrderType::Mixed,
        (true, false) => OrderType::AdminOnly,
        (false, true) => OrderType::VendorOnly,
        // Unreachable for a validated cart, but Legacy is the safe bucket
        (false, false) => OrderType::Legacy,
    }
}
