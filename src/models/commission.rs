use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Ledger payment states for one (vendor, year, month) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommissionPaymentStatus {
    Pending,
    Processing,
    Paid,
}

impl CommissionPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionPaymentStatus::Pending => "pending",
            CommissionPaymentStatus::Processing => "processing",
            CommissionPaymentStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(CommissionPaymentStatus::Pending),
            "processing" => Some(CommissionPaymentStatus::Processing),
            "paid" => Some(CommissionPaymentStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MonthlyCommission {
    pub id: i64,
    pub vendor_id: i64,
    pub year: i64,
    pub month: i64,
    pub total_commission: f64,
    pub paid_commission: f64,
    pub payment_status: String,
    pub last_payment_date: Option<NaiveDateTime>,
}

impl MonthlyCommission {
    pub fn remaining(&self) -> f64 {
        self.total_commission - self.paid_commission
    }

    pub fn payment_state(&self) -> Option<CommissionPaymentStatus> {
        CommissionPaymentStatus::from_str(&self.payment_status)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommissionQuery {
    pub vendor_id: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetCommissionRequest {
    /// Must be the literal string "RESET" to confirm the deletion.
    pub confirm: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCommissionRateRequest {
    /// Percentage, 0 to 100.
    pub rate: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommissionRateResponse {
    pub rate: f64,
}
