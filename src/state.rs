use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    config::AppConfig,
    media::{MediaStorage, MediaUrls, RequestOrigin},
};

#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub media: MediaStorage,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: AppConfig) -> Self {
        let media = MediaStorage::new(config.media_root.clone());
        Self {
            orm: Arc::new(orm),
            config: Arc::new(config),
            media,
        }
    }

    pub fn media_urls(&self, origin: RequestOrigin) -> MediaUrls {
        MediaUrls::new(origin, self.config.media_url.clone())
    }
}
