use crate::state::AppState;
use axum::Router;

mod dto;
pub mod files;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
