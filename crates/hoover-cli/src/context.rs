use anyhow::Context;
use hoover_cas::ObjectStoreBackend;
use hoover_config::Config;
use hoover_execute::ExecuteContext;
use hoover_index::IndexContext;
use hoover_ner::NerClient;
use hoover_parse::{ParseContext, TikaClient};
use hoover_scan::ScanContext;
use hoover_search::SearchClient;
use hoover_store::StoreClient;
use std::sync::Arc;
use std::time::Duration;

/// Every durable-side client this binary needs, built once from the
/// layered config and threaded into whichever subcommand runs.
pub struct Clients {
    pub store: StoreClient,
    pub cas: ObjectStoreBackend,
    pub search: SearchClient,
}

impl Clients {
    pub async fn build(config: &Config) -> anyhow::Result<Self> {
        let store = StoreClient::from_config(&config.storage);
        let cas = ObjectStoreBackend::from_config(&config.storage.object_store)
            .context("failed to construct object store backend")?;
        let search = SearchClient::connect(&config.storage.search_engine)
            .await
            .context("failed to connect to search engine")?;
        Ok(Self { store, cas, search })
    }
}

/// Builds the full `execute_plans` context, the union of every context the
/// pipeline's later phases (P2-P4) need.
pub async fn build_execute_context(config: &Config, clients: &Clients) -> anyhow::Result<ExecuteContext> {
    let tika = TikaClient::from_config(&config.ai, Duration::from_secs(3000))
        .context("failed to construct tika client")?;
    let ner = Arc::new(NerClient::from_config(&config.ai).context("failed to construct ner client")?);

    let scan = ScanContext {
        store: clients.store.clone(),
        cas: clients.cas.clone(),
        max_recursion_depth: config.ingest.max_recursion_depth,
    };
    let parse = ParseContext {
        store: clients.store.clone(),
        scan,
        tika,
    };
    let index = IndexContext {
        store: clients.store.clone(),
        search: clients.search.clone(),
        ner,
    };

    Ok(ExecuteContext {
        store: clients.store.clone(),
        cas: clients.cas.clone(),
        parse,
        index,
        scratch_base_dir: config.ingest.scratch_base_dir.clone(),
        max_recursion_depth: config.ingest.max_recursion_depth,
    })
}
