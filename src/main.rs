use anyhow::Result;
use ipo_tracker::{
    config::Config,
    fetch::{ChromePage, YahooPriceSource},
    pipeline::{Pipeline, RunOutcome},
};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) wire collaborators ───────────────────────────────────────
    let config = Config::default();
    let pages = ChromePage::new(config.browser.clone(), config.settle_delay());
    let prices = YahooPriceSource::new(Client::new(), &config.price_api_base)?;

    // ─── 3) collect → enrich → finalize → save ───────────────────────
    match Pipeline::new(config, pages, prices).run().await {
        Ok(RunOutcome::Saved(report)) => info!(
            collected = report.collected,
            priced = report.enrichment.priced(),
            saved = report.saved,
            path = %report.output_path.display(),
            "all done"
        ),
        Ok(RunOutcome::NothingCollected(reason)) => error!(%reason, "no data collected"),
        Err(e) => {
            error!(error = %format!("{:#}", e), "run failed");
            return Err(e);
        }
    }
    Ok(())
}
