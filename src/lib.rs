use std::sync::Arc;

use esi::Gateway;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod esi;
pub mod infrastructure;
pub mod middleware;
pub mod result;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}
