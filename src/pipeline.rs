// src/pipeline.rs
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::fetch::{PageSource, PriceSource};
use crate::process::{self, CollectOutcome, EnrichReport};
use crate::table::{LargestTable, TableSelector};

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub collected: usize,
    pub enrichment: EnrichReport,
    pub saved: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Saved(RunReport),
    /// Collection came back empty; nothing was written.
    NothingCollected(String),
}

/// Collect → enrich → finalize → save, once.
pub struct Pipeline<S, P> {
    config: Arc<Config>,
    pages: Arc<S>,
    prices: P,
    selector: Arc<dyn TableSelector + Send + Sync>,
}

impl<S, P> Pipeline<S, P>
where
    S: PageSource + Send + Sync + 'static,
    P: PriceSource + Sync,
{
    pub fn new(config: Config, pages: S, prices: P) -> Self {
        Self {
            config: Arc::new(config),
            pages: Arc::new(pages),
            prices,
            selector: Arc::new(LargestTable),
        }
    }

    /// Swap the rule that picks the report table out of the page.
    pub fn with_selector<T>(mut self, selector: T) -> Self
    where
        T: TableSelector + Send + Sync + 'static,
    {
        self.selector = Arc::new(selector);
        self
    }

    async fn collect(&self) -> Result<CollectOutcome> {
        let url = self.config.report_url()?;
        let config = Arc::clone(&self.config);
        let pages = Arc::clone(&self.pages);
        let selector = Arc::clone(&self.selector);

        // the browser blocks for the whole settle delay
        tokio::task::spawn_blocking(move || {
            process::collect(
                pages.as_ref(),
                &url,
                selector.as_ref(),
                &config.columns,
                &config.exchange_suffix,
            )
        })
        .await
        .context("collection task panicked")
    }

    #[instrument(level = "info", skip(self), fields(year = self.config.report_year))]
    pub async fn run(&self) -> Result<RunOutcome> {
        let records = match self.collect().await? {
            CollectOutcome::Collected(rs) => rs,
            CollectOutcome::Empty(reason) => {
                warn!(%reason, "critical error: no data collected");
                return Ok(RunOutcome::NothingCollected(reason));
            }
        };
        let collected = records.len();
        let rules = &self.config.columns;

        let (records, enrichment) = process::enrich(
            records,
            &self.prices,
            rules,
            self.config.price_lookup_limit,
        )
        .await;

        let records = process::finalize(records, rules);
        let output_path = self.config.output_path.clone();
        let saved = process::save(&records, &output_path)?;
        info!(
            rows = saved,
            priced = enrichment.priced(),
            path = %output_path.display(),
            "preprocessing complete"
        );

        Ok(RunOutcome::Saved(RunReport {
            collected,
            enrichment,
            saved,
            output_path,
        }))
    }
}
