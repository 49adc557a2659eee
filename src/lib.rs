pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::path::Path;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::services::data_service::DataService;

/// Opens (or creates) the application data directory and returns a ready
/// orchestrator: logging initialized, database migrated, snapshot loaded
/// and a default workplace seeded on first launch.
pub fn bootstrap(data_dir: impl AsRef<Path>) -> AppResult<DataService> {
    let data_dir = data_dir.as_ref();
    std::fs::create_dir_all(data_dir)?;

    utils::logger::init_logging(data_dir)?;

    let pool = DbPool::new(data_dir.join("mazdoor.sqlite"))?;
    let service = DataService::new(pool);
    service.initialize()?;
    Ok(service)
}
