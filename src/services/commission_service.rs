use crate::database::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::PaginationParams;
use chrono::{Datelike, Utc};

/// Slack allowed when comparing a payment against the outstanding balance,
/// so accumulated float error cannot block settling the final cent.
pub const PAYMENT_TOLERANCE: f64 = 0.01;

/// Confirmation string required by the ledger reset endpoint.
pub const RESET_CONFIRMATION: &str = "RESET";

/// Commission amount for one forwarded sub-order at the given rate.
pub fn commission_for(total: f64, rate: f64) -> f64 {
    total * rate / 100.0
}

#[derive(Clone)]
pub struct CommissionService {
    pool: DbPool,
}

impl CommissionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Seeds the settings row on first startup. No-op once it exists, so a
    /// configured default never overwrites an admin-set rate.
    pub async fn ensure_rate_seeded(&self, default_rate: f64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO settings (id, commission_rate) VALUES (1, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(default_rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The current rate, fetched per call rather than cached, so an admin
    /// rate change applies to the next forwarding event and nothing earlier.
    pub async fn get_rate(&self) -> AppResult<f64> {
        let rate: Option<f64> =
            sqlx::query_scalar("SELECT commission_rate FROM settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;
        rate.ok_or_else(|| AppError::InternalError("Commission rate not seeded".to_string()))
    }

    pub async fn set_rate(&self, rate: f64) -> AppResult<()> {
        if !(0.0..=100.0).contains(&rate) {
            return Err(AppError::ValidationError(
                "Commission rate must be between 0 and 100".to_string(),
            ));
        }
        sqlx::query(
            "UPDATE settings SET commission_rate = ?, updated_at = CURRENT_TIMESTAMP WHERE id = 1",
        )
        .bind(rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Accrues a newly computed commission amount onto the (vendor, year,
    /// month) ledger row, creating it if needed. The increment happens in
    /// the database so concurrent forwardings cannot lose updates.
    pub async fn record_accrual(
        &self,
        vendor_id: i64,
        amount: f64,
        period: Option<(i32, u32)>,
    ) -> AppResult<()> {
        let (year, month) = period.unwrap_or_else(|| {
            let now = Utc::now();
            (now.year(), now.month())
        });

        sqlx::query(
            r#"
            INSERT INTO monthly_commissions (vendor_id, year, month, total_commission)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(vendor_id, year, month)
            DO UPDATE SET total_commission = total_commission + ?4
            "#,
        )
        .bind(vendor_id)
        .bind(year)
        .bind(month)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        log::info!(
            "Accrued {:.2} commission for vendor {} in {}-{:02}",
            amount,
            vendor_id,
            year,
            month
        );
        Ok(())
    }

    /// Records an admin payment against one ledger row. Rejects amounts
    /// above the outstanding balance (plus tolerance); the payment status is
    /// recomputed in the same statement as the increment.
    pub async fn record_payment(
        &self,
        vendor_id: i64,
        year: i32,
        month: u32,
        amount: f64,
    ) -> AppResult<MonthlyCommission> {
        if amount <= 0.0 {
            return Err(AppError::ValidationError(
                "Payment amount must be positive".to_string(),
            ));
        }

        let row = self.find_row(vendor_id, year, month).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "No commission record for vendor {} in {}-{:02}",
                vendor_id, year, month
            ))
        })?;

        let remaining = row.remaining();
        if amount > remaining + PAYMENT_TOLERANCE {
            return Err(AppError::OverPayment { amount, remaining });
        }

        sqlx::query(
            r#"
            UPDATE monthly_commissions
            SET paid_commission = paid_commission + ?1,
                payment_status = CASE
                    WHEN paid_commission + ?1 >= total_commission THEN 'paid'
                    WHEN paid_commission + ?1 > 0 THEN 'processing'
                    ELSE 'pending'
                END,
                last_payment_date = CURRENT_TIMESTAMP
            WHERE vendor_id = ?2 AND year = ?3 AND month = ?4
            "#,
        )
        .bind(amount)
        .bind(vendor_id)
        .bind(year)
        .bind(month)
        .execute(&self.pool)
        .await?;

        let updated = self.find_row(vendor_id, year, month).await?.ok_or_else(|| {
            AppError::InternalError("Commission row disappeared during payment".to_string())
        })?;

        log::info!(
            "Recorded {:.2} payment for vendor {} in {}-{:02}, status now {}",
            amount,
            vendor_id,
            year,
            month,
            updated.payment_status
        );
        Ok(updated)
    }

    pub async fn list_monthly(
        &self,
        query: &CommissionQuery,
    ) -> AppResult<PaginatedResponse<MonthlyCommission>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset() as i64;
        let limit = params.get_limit() as i64;

        let (total, rows) = match query.vendor_id {
            Some(vendor_id) => {
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM monthly_commissions WHERE vendor_id = ?",
                )
                .bind(vendor_id)
                .fetch_one(&self.pool)
                .await?;

                let rows = sqlx::query_as::<_, MonthlyCommission>(
                    r#"
                    SELECT * FROM monthly_commissions
                    WHERE vendor_id = ?
                    ORDER BY year DESC, month DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(vendor_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (total, rows)
            }
            None => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM monthly_commissions")
                    .fetch_one(&self.pool)
                    .await?;

                let rows = sqlx::query_as::<_, MonthlyCommission>(
                    r#"
                    SELECT * FROM monthly_commissions
                    ORDER BY year DESC, month DESC, vendor_id
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                (total, rows)
            }
        };

        Ok(PaginatedResponse::new(rows, &params, total))
    }

    /// Deletes every ledger row for a vendor. Irreversible, so the caller
    /// must supply the literal confirmation string.
    pub async fn reset_vendor(&self, vendor_id: i64, confirm: &str) -> AppResult<u64> {
        if confirm != RESET_CONFIRMATION {
            return Err(AppError::ValidationError(format!(
                "Ledger reset requires confirm = \"{RESET_CONFIRMATION}\""
            )));
        }

        let result = sqlx::query("DELETE FROM monthly_commissions WHERE vendor_id = ?")
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No commission records for vendor {vendor_id}"
            )));
        }

        log::warn!(
            "Reset commission ledger for vendor {}: {} rows deleted",
            vendor_id,
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }

    async fn find_row(
        &self,
        vendor_id: i64,
        year: i32,
        month: u32,
    ) -> AppResult<Option<MonthlyCommission>> {
        let row = sqlx::query_as::<_, MonthlyCommission>(
            "SELECT * FROM monthly_commissions WHERE vendor_id = ? AND year = ? AND month = ?",
        )
        .bind(vendor_id)
        .bind(year)
        .bind(month)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_service() -> CommissionService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let service = CommissionService::new(pool);
        service.ensure_rate_seeded(10.0).await.unwrap();
        service
    }

    #[test]
    fn test_commission_for() {
        assert_eq!(commission_for(50.0, 20.0), 10.0);
        assert_eq!(commission_for(100.0, 0.0), 0.0);
    }

    #[tokio::test]
    async fn test_rate_seed_does_not_overwrite() {
        let service = test_service().await;
        service.set_rate(25.0).await.unwrap();
        service.ensure_rate_seeded(10.0).await.unwrap();
        assert_eq!(service.get_rate().await.unwrap(), 25.0);
    }

    #[tokio::test]
    async fn test_set_rate_rejects_out_of_range() {
        let service = test_service().await;
        assert!(service.set_rate(101.0).await.is_err());
        assert!(service.set_rate(-1.0).await.is_err());
        service.set_rate(0.0).await.unwrap();
        service.set_rate(100.0).await.unwrap();
    }

    #[tokio::test]
    async fn test_accrual_upserts_and_accumulates() {
        let service = test_service().await;
        service
            .record_accrual(7, 10.0, Some((2026, 8)))
            .await
            .unwrap();
        service
            .record_accrual(7, 2.5, Some((2026, 8)))
            .await
            .unwrap();

        let row = service.find_row(7, 2026, 8).await.unwrap().unwrap();
        assert_eq!(row.total_commission, 12.5);
        assert_eq!(row.paid_commission, 0.0);
        assert_eq!(row.payment_status, "pending");
    }

    #[tokio::test]
    async fn test_accruals_in_different_months_stay_separate() {
        let service = test_service().await;
        service
            .record_accrual(7, 10.0, Some((2026, 7)))
            .await
            .unwrap();
        service
            .record_accrual(7, 5.0, Some((2026, 8)))
            .await
            .unwrap();

        assert_eq!(
            service
                .find_row(7, 2026, 7)
                .await
                .unwrap()
                .unwrap()
                .total_commission,
            10.0
        );
        assert_eq!(
            service
                .find_row(7, 2026, 8)
                .await
                .unwrap()
                .unwrap()
                .total_commission,
            5.0
        );
    }

    #[tokio::test]
    async fn test_partial_payment_sets_processing() {
        let service = test_service().await;
        service
            .record_accrual(3, 100.0, Some((2026, 8)))
            .await
            .unwrap();

        let row = service.record_payment(3, 2026, 8, 80.0).await.unwrap();
        assert_eq!(row.paid_commission, 80.0);
        assert_eq!(row.payment_state(), Some(CommissionPaymentStatus::Processing));
        assert_eq!(row.remaining(), 20.0);
    }

    #[tokio::test]
    async fn test_full_payment_sets_paid() {
        let service = test_service().await;
        service
            .record_accrual(3, 100.0, Some((2026, 8)))
            .await
            .unwrap();

        let row = service.record_payment(3, 2026, 8, 100.0).await.unwrap();
        assert_eq!(row.payment_status, "paid");
    }

    #[tokio::test]
    async fn test_overpayment_rejected_within_tolerance() {
        let service = test_service().await;
        service
            .record_accrual(3, 100.0, Some((2026, 8)))
            .await
            .unwrap();
        service.record_payment(3, 2026, 8, 80.0).await.unwrap();

        // 25 exceeds the remaining 20 + 0.01 tolerance
        let err = service.record_payment(3, 2026, 8, 25.0).await.unwrap_err();
        assert!(matches!(err, AppError::OverPayment { .. }));

        // 20.005 is within tolerance and settles the row
        let row = service.record_payment(3, 2026, 8, 20.005).await.unwrap();
        assert_eq!(row.payment_status, "paid");
    }

    #[tokio::test]
    async fn test_payment_against_missing_row_is_not_found() {
        let service = test_service().await;
        let err = service.record_payment(99, 2026, 1, 5.0).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let service = test_service().await;
        service
            .record_accrual(4, 10.0, Some((2026, 8)))
            .await
            .unwrap();

        assert!(service.reset_vendor(4, "yes").await.is_err());
        assert_eq!(service.reset_vendor(4, "RESET").await.unwrap(), 1);
        assert!(service.find_row(4, 2026, 8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_unknown_vendor_is_not_found() {
        let service = test_service().await;
        let err = service.reset_vendor(42, "RESET").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_monthly_filters_by_vendor() {
        let service = test_service().await;
        service
            .record_accrual(1, 10.0, Some((2026, 8)))
            .await
            .unwrap();
        service
            .record_accrual(2, 20.0, Some((2026, 8)))
            .await
            .unwrap();

        let all = service
            .list_monthly(&CommissionQuery {
                vendor_id: None,
                page: None,
                per_page: None,
            })
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);

        let one = service
            .list_monthly(&CommissionQuery {
                vendor_id: Some(2),
                page: None,
                per_page: None,
            })
            .await
            .unwrap();
        assert_eq!(one.pagination.total, 1);
        assert_eq!(one.items[0].total_commission, 20.0);
    }
}
