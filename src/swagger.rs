use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::order::create_order,
        handlers::order::get_orders,
        handlers::order::track_order,
        handlers::order::cancel_order,
        handlers::order::split_order,
        handlers::part::update_part_status,
        handlers::part::forward_part,
        handlers::admin::get_commission_rate,
        handlers::admin::set_commission_rate,
        handlers::admin::list_commissions,
        handlers::admin::record_payment,
        handlers::admin::reset_commissions,
    ),
    components(
        schemas(
            Order,
            OrderPart,
            OrderItem,
            OrderQuery,
            OrderStatus,
            OrderType,
            ActorRole,
            StatusSource,
            StatusHistoryEntry,
            CreateOrderRequest,
            CreateOrderItemRequest,
            UpdatePartStatusRequest,
            ResolvedStatus,
            StatusBreakdown,
            PartStatusView,
            OrderSummary,
            TrackOrderResponse,
            MonthlyCommission,
            CommissionPaymentStatus,
            CommissionQuery,
            CommissionRateResponse,
            UpdateCommissionRateRequest,
            RecordPaymentRequest,
            ResetCommissionRequest,
            ApiError,
        )
    ),
    tags(
        (name = "order", description = "Order lifecycle API"),
        (name = "part", description = "Order part fulfillment API"),
        (name = "admin", description = "Commission administration API"),
    ),
    info(
        title = "Marketplace Backend API",
        version = "1.0.0",
        description = "Multi-vendor marketplace order status and commission API",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
