use hoover_config::SearchEngineConfig;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

/// A connection pool to Manticore's MySQL-protocol listener.
#[derive(Clone)]
pub struct SearchClient {
    pub(crate) pool: MySqlPool,
}

impl SearchClient {
    pub async fn connect(config: &SearchEngineConfig) -> Result<Self, sqlx::Error> {
        let url = format!("mysql://{}:{}/Manticore", config.host, config.port);
        let pool = MySqlPoolOptions::new().max_connections(8).connect(&url).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT CURDATE()").execute(&self.pool).await?;
        Ok(())
    }
}
