use crate::models::AppState;
use axum::Router;

pub mod appointment_routes;
pub mod cart_routes;
pub mod doctor_routes;
pub mod medicine_routes;
pub mod user_routes;
pub mod wishlist_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1/users", user_routes::router())
        .nest("/api/v1/doctors", doctor_routes::router())
        .nest("/api/v1/medicines", medicine_routes::router())
        .nest("/api/v1/cart", cart_routes::router())
        .nest("/api/v1/wishlist", wishlist_routes::router())
        .nest("/api/v1/appointments", appointment_routes::router())
        .with_state(state)
}
