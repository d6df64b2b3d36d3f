use crate::database::DocumentStore;
use crate::models::{AdminStats, CategoryStat, PopularTest};
use crate::services::analytics_service;
use crate::utils::AppError;
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/admin-stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Platform totals and revenue", body = AdminStats),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_stats(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    let stats = analytics_service::summary(store.get_ref()).await?;
    log::info!(
        "📊 GET /admin-stats - users: {}, bookings: {}, revenue: {:.2}",
        stats.users,
        stats.bookings,
        stats.revenue
    );
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/category-stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Booking counts and revenue per test category", body = Vec<CategoryStat>)
    )
)]
pub async fn category_stats(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    let stats = analytics_service::category_breakdown(store.get_ref()).await?;
    log::info!("📊 GET /category-stats - {} categories", stats.len());
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/popular-tests",
    tag = "Stats",
    responses(
        (status = 200, description = "The five most booked tests", body = Vec<PopularTest>)
    )
)]
pub async fn popular_tests(store: web::Data<dyn DocumentStore>) -> Result<HttpResponse, AppError> {
    let tests = analytics_service::popular_tests(store.get_ref()).await?;
    log::info!("🏆 GET /popular-tests - {} tests", tests.len());
    Ok(HttpResponse::Ok().json(tests))
}
