use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::OrderService;

#[utoipa::path(
    put,
    path = "/parts/{id}/status",
    tag = "part",
    request_body = UpdatePartStatusRequest,
    params(
        ("id" = i64, Path, description = "Order part id")
    ),
    responses(
        (status = 200, description = "Part status updated"),
        (status = 404, description = "Part not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_part_status(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
    req: web::Json<UpdatePartStatusRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    match order_service
        .update_part_status(path.into_inner(), req.status, req.role, req.note)
        .await
    {
        Ok(part) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": part
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/parts/{id}/forward",
    tag = "part",
    params(
        ("id" = i64, Path, description = "Order part id")
    ),
    responses(
        (status = 200, description = "Part forwarded to its vendor"),
        (status = 400, description = "Not a vendor part"),
        (status = 404, description = "Part not found")
    )
)]
pub async fn forward_part(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.forward_part(path.into_inner()).await {
        Ok(part) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": part,
            "message": "Part forwarded"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn part_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/parts")
            .route("/{id}/status", web::put().to(update_part_status))
            .route("/{id}/forward", web::post().to(forward_part)),
    );
}
