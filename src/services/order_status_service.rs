use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::status::{
    can_change_status, can_customer_cancel_order, ActorRole, MappedStatus, OrderStatus, OrderType,
};
use crate::models::*;
use crate::services::status_calculator::aggregate_part_statuses;
use crate::utils::PaginationParams;

/// Resolves the display status of any order, simple or mixed. Resolution
/// never fails from the caller's point of view: internal errors degrade to
/// a safe default marked with [`StatusSource::Degraded`].
#[derive(Clone)]
pub struct OrderStatusService {
    pool: DbPool,
}

impl OrderStatusService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn resolve(&self, order: &Order) -> ResolvedStatus {
        match self.try_resolve(order).await {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!(
                    "Status resolution failed for order {}: {e}, degrading to placed",
                    order.order_number
                );
                degraded_default()
            }
        }
    }

    pub async fn resolve_by_id(&self, order_id: i64) -> AppResult<ResolvedStatus> {
        let order = self.find_order(order_id).await?;
        Ok(self.resolve(&order).await)
    }

    async fn try_resolve(&self, order: &Order) -> AppResult<ResolvedStatus> {
        let direct = order.mapped_status().or_placed();

        match order.order_type() {
            OrderType::AdminOnly | OrderType::VendorOnly | OrderType::Legacy => {
                Ok(with_permissions(direct, StatusSource::Direct, None))
            }
            OrderType::Mixed => {
                let parts = self.load_parts(order.id).await?;
                if parts.is_empty() {
                    // Split has not happened yet; the order's own status is
                    // still authoritative.
                    return Ok(with_permissions(
                        direct,
                        StatusSource::MainOrderNotSplit,
                        None,
                    ));
                }

                let statuses: Vec<MappedStatus> =
                    parts.iter().map(|p| p.mapped_status()).collect();
                let aggregate = aggregate_part_statuses(&statuses);

                let mut admin = None;
                let mut vendors = Vec::new();
                for part in &parts {
                    let view = PartStatusView {
                        part_id: part.id,
                        vendor_id: part.vendor_id,
                        status: part.mapped_status().or_placed(),
                    };
                    if part.is_vendor_part() {
                        vendors.push(view);
                    } else {
                        admin = Some(view);
                    }
                }

                Ok(with_permissions(
                    aggregate,
                    StatusSource::MixedCalculated,
                    Some(StatusBreakdown { admin, vendors }),
                ))
            }
        }
    }

    /// Customer-facing listing: top-level orders only, each with its
    /// resolved display status.
    pub async fn list_customer_orders(
        &self,
        query: &OrderQuery,
    ) -> AppResult<PaginatedResponse<OrderSummary>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset() as i64;
        let limit = params.get_limit() as i64;
        let email = query.email.clone().unwrap_or_default();

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE customer_email = ? AND parent_order_id IS NULL",
        )
        .bind(&email)
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE customer_email = ? AND parent_order_id IS NULL
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&email)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(orders.len());
        for order in orders {
            let resolved = self.resolve(&order).await;
            items.push(OrderSummary {
                id: order.id,
                order_number: order.order_number,
                order_type: order.order_type,
                total_amount: order.total_amount,
                payment_status: order.payment_status,
                resolved,
            });
        }

        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Tracking payload for the public tracking endpoint.
    pub async fn track(&self, order_number: &str) -> AppResult<TrackOrderResponse> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE order_number = ?")
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_number} not found")))?;

        let resolved = self.resolve(&order).await;
        let timeline = sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM status_history WHERE order_id = ? ORDER BY created_at, id",
        )
        .bind(order.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TrackOrderResponse {
            order_number: order.order_number,
            current_status: resolved.status,
            status_source: resolved.source,
            items: resolved.breakdown.unwrap_or(StatusBreakdown {
                admin: None,
                vendors: Vec::new(),
            }),
            timeline,
        })
    }

    async fn find_order(&self, order_id: i64) -> AppResult<Order> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))
    }

    async fn load_parts(&self, order_id: i64) -> AppResult<Vec<OrderPart>> {
        let parts = sqlx::query_as::<_, OrderPart>(
            "SELECT * FROM order_parts WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(parts)
    }
}

fn with_permissions(
    status: OrderStatus,
    source: StatusSource,
    breakdown: Option<StatusBreakdown>,
) -> ResolvedStatus {
    ResolvedStatus {
        status,
        source,
        can_customer_cancel: can_customer_cancel_order(status),
        admin_can_change: can_change_status(status, ActorRole::Admin),
        vendor_can_change: can_change_status(status, ActorRole::Vendor),
        breakdown,
    }
}

/// Safe default when resolution itself failed: report `placed` with
/// permissive permissions rather than surface an error to order listings.
fn degraded_default() -> ResolvedStatus {
    ResolvedStatus {
        status: OrderStatus::Placed,
        source: StatusSource::Degraded,
        can_customer_cancel: true,
        admin_can_change: true,
        vendor_can_change: true,
        breakdown: None,
    }
}
