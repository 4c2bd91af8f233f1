use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use super::errors::json_error_handler;
use super::{AppState, CallerIdentity};
use crate::domain::order::{format_timestamp, parse_status, CreateOrder, OrderError, UpdateOrder};
use crate::metrics::metrics_handler;

type HandlerResult = Result<HttpResponse, OrderError>;

/// Register every route. `/orders/me...` comes before `/orders/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .service(
            web::scope("/orders")
                .route("", web::get().to(list_orders))
                .route("", web::post().to(create_order))
                .route("", web::delete().to(delete_all_orders))
                .route("/me", web::get().to(my_orders))
                .route("/me", web::delete().to(delete_my_orders))
                .route("/me/status/{status}", web::get().to(my_orders_by_status))
                .route("/user/{user_id}", web::get().to(orders_by_user))
                .route("/status/{status}", web::get().to(orders_by_status))
                .route("/{id}", web::get().to(get_order))
                .route("/{id}", web::put().to(update_order))
                .route("/{id}", web::delete().to(delete_order)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": format_timestamp(Utc::now()),
    }))
}

// ============================================================================
// Reads
// ============================================================================

async fn list_orders(state: web::Data<AppState>) -> HandlerResult {
    let orders = state.orders.find_all().await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn get_order(state: web::Data<AppState>, id: web::Path<String>) -> HandlerResult {
    let order = state.orders.find_one(&id).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn orders_by_user(state: web::Data<AppState>, user_id: web::Path<String>) -> HandlerResult {
    let orders = state.orders.find_by_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn orders_by_status(state: web::Data<AppState>, status: web::Path<String>) -> HandlerResult {
    let status = parse_status(&status)?;

    let orders = state.orders.find_by_status(status).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn my_orders(state: web::Data<AppState>, caller: CallerIdentity) -> HandlerResult {
    let orders = state.orders.find_by_user(&caller.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

async fn my_orders_by_status(
    state: web::Data<AppState>,
    caller: CallerIdentity,
    status: web::Path<String>,
) -> HandlerResult {
    let status = parse_status(&status)?;

    let orders = state
        .orders
        .find_by_user_and_status(&caller.user_id, status)
        .await?;
    Ok(HttpResponse::Ok().json(orders))
}

// ============================================================================
// Writes
// ============================================================================

async fn create_order(state: web::Data<AppState>, body: web::Json<CreateOrder>) -> HandlerResult {
    let order = state.commands.create_order(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn update_order(
    state: web::Data<AppState>,
    id: web::Path<String>,
    body: web::Json<UpdateOrder>,
) -> HandlerResult {
    let order = state.commands.update_order(&id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn delete_order(state: web::Data<AppState>, id: web::Path<String>) -> HandlerResult {
    let order = state.orders.delete_one(&id).await?;
    state.metrics.record_orders_deleted("one", 1);

    tracing::info!(order_id = %order.id, "Order deleted");
    Ok(HttpResponse::Ok().json(order))
}

async fn delete_all_orders(state: web::Data<AppState>) -> HandlerResult {
    let removed = state.orders.delete_all().await?;
    state.metrics.record_orders_deleted("all", removed);

    tracing::info!(removed, "All orders deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "All orders deleted" })))
}

async fn delete_my_orders(state: web::Data<AppState>, caller: CallerIdentity) -> HandlerResult {
    let removed = state.orders.delete_all_by_user(&caller.user_id).await?;
    state.metrics.record_orders_deleted("user", removed);

    tracing::info!(user_id = %caller.user_id, removed, "Caller orders deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "All orders deleted" })))
}

// ============================================================================
// Unit Tests
// ============================================================================
