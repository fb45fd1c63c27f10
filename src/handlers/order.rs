use actix_web::{web, HttpResponse, ResponseError, Result};
use serde_json::json;

use crate::models::*;
use crate::services::{OrderService, OrderStatusService};

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created"),
        (status = 400, description = "Invalid cart")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    match order_service.create_order(&req).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("email" = Option<String>, Query, description = "Customer email"),
        ("page" = Option<u32>, Query, description = "Page number"),
        ("per_page" = Option<u32>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Customer order list with resolved statuses")
    )
)]
pub async fn get_orders(
    status_service: web::Data<OrderStatusService>,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    match status_service.list_customer_orders(&query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{order_number}/track",
    tag = "order",
    params(
        ("order_number" = String, Path, description = "Order number")
    ),
    responses(
        (status = 200, description = "Tracking payload"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn track_order(
    status_service: web::Data<OrderStatusService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match status_service.track(&path.into_inner()).await {
        Ok(tracked) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tracked
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 400, description = "Order can no longer be cancelled"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn cancel_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.cancel_by_customer(path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order,
            "message": "Order cancelled"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/split",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order id")
    ),
    responses(
        (status = 200, description = "Order split into parts"),
        (status = 400, description = "Not a mixed order or already split"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn split_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.split_mixed_order(path.into_inner()).await {
        Ok(parts) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": parts
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(get_orders))
            .route("/{order_number}/track", web::get().to(track_order))
            .route("/{id}/cancel", web::post().to(cancel_order))
            .route("/{id}/split", web::post().to(split_order)),
    );
}
