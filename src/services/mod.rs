mod statistics;

use std::sync::Arc;

pub use statistics::{SortKey, StatisticsReport, StatisticsService, build_report};

use crate::db::DbPool;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub statistics: StatisticsService,
}

impl Services {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            statistics: StatisticsService::new(db),
        }
    }
}
