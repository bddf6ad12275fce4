//! Route definitions for the Livestock Farm Management API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/barns", barn_routes())
        .nest("/breeds", breed_routes())
        .nest("/foods", food_routes())
        .nest("/medicines", medicine_routes())
        .nest("/circles", circle_routes())
        .nest("/daily-reports", daily_report_routes())
        // Consumption reports move ledger stock
        .nest("/food-reports", food_report_routes())
        .nest("/medicine-reports", medicine_report_routes())
        .nest("/barn-plans", barn_plan_routes())
}

fn barn_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_barns).post(handlers::create_barn))
        .route(
            "/:barn_id",
            get(handlers::get_barn)
                .put(handlers::update_barn)
                .delete(handlers::delete_barn),
        )
}

fn breed_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_breeds).post(handlers::create_breed))
        .route(
            "/:breed_id",
            get(handlers::get_breed)
                .put(handlers::update_breed)
                .delete(handlers::delete_breed),
        )
}

fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_foods).post(handlers::create_food))
        .route(
            "/:food_id",
            get(handlers::get_food)
                .put(handlers::update_food)
                .delete(handlers::delete_food),
        )
}

fn medicine_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_medicines).post(handlers::create_medicine))
        .route(
            "/:medicine_id",
            get(handlers::get_medicine)
                .put(handlers::update_medicine)
                .delete(handlers::delete_medicine),
        )
}

fn circle_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_circles).post(handlers::create_circle))
        .route(
            "/:circle_id",
            get(handlers::get_circle)
                .put(handlers::update_circle)
                .delete(handlers::delete_circle),
        )
        .route("/:circle_id/status", post(handlers::change_circle_status))
        .route(
            "/:circle_id/foods",
            get(handlers::list_circle_foods).post(handlers::provision_circle_food),
        )
        .route(
            "/:circle_id/medicines",
            get(handlers::list_circle_medicines).post(handlers::provision_circle_medicine),
        )
}

fn daily_report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_daily_reports).post(handlers::create_daily_report),
        )
        .route(
            "/:report_id",
            get(handlers::get_daily_report)
                .put(handlers::update_daily_report)
                .delete(handlers::delete_daily_report),
        )
        .route("/:report_id/food-reports", get(handlers::list_food_reports))
        .route(
            "/:report_id/medicine-reports",
            get(handlers::list_medicine_reports),
        )
}

fn food_report_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_food_report))
        .route(
            "/:id",
            get(handlers::get_food_report)
                .put(handlers::update_food_report)
                .delete(handlers::delete_food_report),
        )
}

fn medicine_report_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_medicine_report))
        .route(
            "/:id",
            get(handlers::get_medicine_report)
                .put(handlers::update_medicine_report)
                .delete(handlers::delete_medicine_report),
        )
}

fn barn_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_barn_plans).post(handlers::create_barn_plan))
        .route(
            "/:plan_id",
            get(handlers::get_barn_plan)
                .put(handlers::update_barn_plan)
                .delete(handlers::delete_barn_plan),
        )
}
