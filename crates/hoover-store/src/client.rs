use hoover_config::StorageConfig;

/// A handle to the ClickHouse-backed columnar store, scoped to no particular
/// dataset -- every repository method below takes `dataset` explicitly since
/// rows are always partitioned by it.
#[derive(Clone)]
pub struct StoreClient {
    pub(crate) inner: clickhouse::Client,
    pub(crate) database: String,
}

impl StoreClient {
    pub fn from_config(config: &StorageConfig) -> Self {
        let inner = clickhouse::Client::default()
            .with_url(&config.clickhouse_url)
            .with_database(&config.clickhouse_database);
        Self {
            inner,
            database: config.clickhouse_database.clone(),
        }
    }

    /// A client pointed at an explicit URL/database, for tests against a
    /// disposable ClickHouse instance.
    pub fn new(url: &str, database: &str) -> Self {
        Self {
            inner: clickhouse::Client::default()
                .with_url(url)
                .with_database(database),
            database: database.to_string(),
        }
    }
}
