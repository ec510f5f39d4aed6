use std::sync::Arc;

use crate::config::AppConfig;
use crate::repository::PropertyRepository;

#[derive(Clone)]
pub struct AppState {
    pub properties: Arc<dyn PropertyRepository>,
    pub config: AppConfig,
}
