use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod cookie;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
