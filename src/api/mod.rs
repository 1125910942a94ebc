//! HTTP routes
//!
//! Every collection is reachable both with and without a trailing slash.

mod error;
pub mod extract;
pub mod handlers;
mod state;

use axum::{
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::{ApiError, ApiResult, ErrorBody};
pub use state::{ApiSettings, AppState};

use handlers::{ai, anomalies, backups, budgets, categories, entries, goals, health, reports};

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let routes = Router::new().route("/health", get(health::health));
    let routes = collection(routes, "/expenses", get(entries::list_expenses).post(entries::create_expense));
    let routes = collection(routes, "/income", get(entries::list_income).post(entries::create_income));
    let routes = collection(
        routes,
        "/categories",
        get(categories::list_categories).post(categories::create_category),
    );
    let routes = collection(routes, "/budgets", get(budgets::list_budgets).post(budgets::create_budget));
    let routes = collection(routes, "/goals", get(goals::list_goals).post(goals::create_goal));
    let routes = collection(routes, "/anomalies", get(anomalies::list_anomalies));
    let routes = collection(routes, "/backups", get(backups::list_backups).post(backups::create_backup));

    routes
        .route(
            "/expenses/:id",
            get(entries::get_expense)
                .put(entries::update_expense)
                .delete(entries::delete_expense),
        )
        .route(
            "/income/:id",
            get(entries::get_income)
                .put(entries::update_income)
                .delete(entries::delete_income),
        )
        .route("/categories/merge", post(categories::merge_categories))
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/budgets/status", get(budgets::list_statuses))
        .route(
            "/budgets/:id",
            get(budgets::get_budget)
                .put(budgets::update_budget)
                .delete(budgets::delete_budget),
        )
        .route("/budgets/:id/status", get(budgets::budget_status))
        .route(
            "/goals/:id",
            get(goals::get_goal)
                .put(goals::update_goal)
                .delete(goals::delete_goal),
        )
        .route("/goals/:id/add", post(goals::add_to_goal))
        .route("/goals/:id/progress", get(goals::goal_progress))
        .route("/goals/:id/contributions", get(goals::goal_contributions))
        .route("/reports/summary", get(reports::summary))
        .route("/reports/projected_eom", get(reports::projected_eom))
        .route("/reports/month", get(reports::month))
        .route("/reports/export", get(reports::export))
        .route("/ai/predict_category", post(ai::predict_category))
        .route("/ai/confirm_category", post(ai::confirm_category))
        .route("/ai/recurring_check", post(ai::recurring_check))
        .route("/ai/recurring_confirm", post(ai::recurring_confirm))
        .route("/anomalies/scan", post(anomalies::scan))
        .route("/anomalies/:id/dismiss", post(anomalies::dismiss))
        .route("/anomalies/:id/snooze", post(anomalies::snooze))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn collection(
    routes: Router<AppState>,
    path: &str,
    methods: MethodRouter<AppState>,
) -> Router<AppState> {
    routes
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}
