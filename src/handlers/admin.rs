use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::CommissionService;

#[utoipa::path(
    get,
    path = "/admin/commission-rate",
    tag = "admin",
    responses(
        (status = 200, description = "Current commission rate")
    )
)]
pub async fn get_commission_rate(
    commission_service: web::Data<CommissionService>,
) -> Result<HttpResponse> {
    match commission_service.get_rate().await {
        Ok(rate) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(CommissionRateResponse { rate })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/commission-rate",
    tag = "admin",
    request_body = UpdateCommissionRateRequest,
    responses(
        (status = 200, description = "Commission rate updated"),
        (status = 400, description = "Rate out of range")
    )
)]
pub async fn set_commission_rate(
    commission_service: web::Data<CommissionService>,
    req: web::Json<UpdateCommissionRateRequest>,
) -> Result<HttpResponse> {
    match commission_service.set_rate(req.rate).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            CommissionRateResponse { rate: req.rate },
            "Commission rate updated".to_string(),
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/commissions",
    tag = "admin",
    params(
        ("vendor_id" = Option<i64>, Query, description = "Filter by vendor"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Monthly commission ledger")
    )
)]
pub async fn list_commissions(
    commission_service: web::Data<CommissionService>,
    query: web::Query<CommissionQuery>,
) -> Result<HttpResponse> {
    match commission_service.list_monthly(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/commissions/{vendor_id}/{year}/{month}/payments",
    tag = "admin",
    request_body = RecordPaymentRequest,
    params(
        ("vendor_id" = i64, Path, description = "Vendor id"),
        ("year" = i32, Path, description = "Ledger year"),
        ("month" = u32, Path, description = "Ledger month (1-12)")
    ),
    responses(
        (status = 200, description = "Payment recorded"),
        (status = 400, description = "Payment exceeds outstanding commission"),
        (status = 404, description = "No ledger row for that period")
    )
)]
pub async fn record_payment(
    commission_service: web::Data<CommissionService>,
    path: web::Path<(i64, i32, u32)>,
    req: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse> {
    let (vendor_id, year, month) = path.into_inner();
    match commission_service
        .record_payment(vendor_id, year, month, req.amount)
        .await
    {
        Ok(row) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": row,
            "message": "Payment recorded"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/commissions/{vendor_id}",
    tag = "admin",
    request_body = ResetCommissionRequest,
    params(
        ("vendor_id" = i64, Path, description = "Vendor id")
    ),
    responses(
        (status = 200, description = "Ledger reset"),
        (status = 400, description = "Missing confirmation"),
        (status = 404, description = "No ledger rows for the vendor")
    )
)]
pub async fn reset_commissions(
    commission_service: web::Data<CommissionService>,
    path: web::Path<i64>,
    req: web::Json<ResetCommissionRequest>,
) -> Result<HttpResponse> {
    match commission_service
        .reset_vendor(path.into_inner(), &req.confirm)
        .await
    {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "deleted_rows": deleted },
            "message": "Commission ledger reset"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/commission-rate", web::get().to(get_commission_rate))
            .route("/commission-rate", web::put().to(set_commission_rate))
            .route("/commissions", web::get().to(list_commissions))
            .route(
                "/commissions/{vendor_id}/{year}/{month}/payments",
                web::post().to(record_payment),
            )
            .route("/commissions/{vendor_id}", web::delete().to(reset_commissions)),
    );
}
