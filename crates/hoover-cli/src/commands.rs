use crate::context::{build_execute_context, Clients};
use anyhow::{bail, Context};
use hoover_config::Config;
use hoover_scan::ScanInput;
use std::path::Path;

/// Applies the columnar store schema, the search-engine schema, and
/// confirms the configured object-store bucket is reachable. Idempotent:
/// safe to run against an already-provisioned dataset.
pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let clients = Clients::build(config).await?;

    tracing::info!("applying columnar store schema");
    hoover_store::migrate::apply_schema(&clients.store)
        .await
        .context("failed to apply columnar store schema")?;

    tracing::info!("applying search engine schema");
    hoover_search::migrate(&clients.search)
        .await
        .context("failed to apply search engine schema")?;

    tracing::info!("confirming object store bucket is reachable");
    clients
        .cas
        .ensure_bucket()
        .await
        .context("object store bucket is not reachable")?;

    tracing::info!("migrate complete");
    Ok(())
}

/// Registers a new disk-backed dataset and runs the pipeline from scratch:
/// scan (P0), plan (P1), execute (P2, which in turn drives P3 and P4).
/// Exits non-zero (via an `Err`) on a duplicate name, a duplicate path, or
/// a path that is not a directory.
pub async fn add_disk_dataset(config: &Config, name: &str, path: &Path) -> anyhow::Result<()> {
    if !hoover_types::is_valid_dataset_slug(name) {
        bail!("'{name}' is not a valid dataset name (lowercase ascii, digits, underscore only)");
    }
    if !path.is_dir() {
        bail!("'{}' is not a directory", path.display());
    }
    let dataset_path = path
        .canonicalize()
        .with_context(|| format!("failed to canonicalize '{}'", path.display()))?;

    let clients = Clients::build(config).await?;

    let created = hoover_store::dataset::create_dataset_if_absent(
        &clients.store,
        name,
        &dataset_path.to_string_lossy(),
    )
    .await
    .context("failed to create dataset row")?;
    if !created {
        bail!("dataset '{name}' already exists, or '{}' is already registered under another name", dataset_path.display());
    }

    tracing::info!(dataset = name, path = %dataset_path.display(), "dataset created, starting pipeline");

    let execute_ctx = build_execute_context(config, &clients).await?;

    tracing::info!(dataset = name, "running scan (P0)");
    hoover_scan::scan(&execute_ctx.parse.scan, ScanInput::root(name.to_string(), dataset_path.clone()))
        .await
        .context("scan failed")?;

    tracing::info!(dataset = name, "running planner (P1)");
    hoover_plan::compute_plans(&clients.store, name)
        .await
        .context("planning failed")?;

    tracing::info!(dataset = name, "running executor (P2)");
    hoover_execute::execute_plans(&execute_ctx, name, None, 0)
        .await
        .context("execution failed")?;

    tracing::info!(dataset = name, "pipeline complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_invalid_slug() {
        let config = Config::default();
        let err = add_disk_dataset(&config, "Not-Valid", Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a valid dataset name"));
    }

    #[tokio::test]
    async fn rejects_non_directory_path() {
        let config = Config::default();
        let err = add_disk_dataset(&config, "valid_name", Path::new("/no/such/path/at/all"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
