#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("clickhouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("recursion depth exceeded: {0} (limit {1})")]
    RecursionDepthExceeded(u32, u32),
}
