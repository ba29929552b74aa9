use crate::config::AppConfig;
use crate::db::Db;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = Arc::new(Db::open(&config.data_dir).await?);
        tracing::info!(data_dir = %config.data_dir.display(), "data store opened");
        Ok(Self { db, config })
    }

    /// State over a throwaway data directory with fixed JWT settings.
    #[cfg(test)]
    pub async fn fake(dir: &std::path::Path) -> Self {
        let config = Arc::new(AppConfig {
            data_dir: dir.to_path_buf(),
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            reset: crate::config::ResetConfig {
                enabled: true,
                ttl_minutes: 15,
            },
        });
        let db = Arc::new(Db::open(dir).await.expect("open test data dir"));
        Self { db, config }
    }
}
