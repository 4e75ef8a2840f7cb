//! One complete crawl run: discovery, link tables, downloads and reports.

use anyhow::{Context, Result};
use chrono::Local;
use engine_logging::{engine_info, engine_warn};
use pdfcrawl_core::{ingestion_metadata, CrawlConfig, LAST_UPDATED_FORMAT};
use pdfcrawl_engine::{
    ensure_output_dir, read_download_records, read_link_table, write_download_records,
    write_ingestion_metadata, write_link_table, Discovery, DownloadSettings, FetchSettings,
    Materializer, ReqwestFetcher, PDF_LINK_COLUMN, TRAVERSED_LINK_COLUMN,
};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub visited: usize,
    pub pdf_links: usize,
    pub downloaded: usize,
    pub failed: usize,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pages visited, {} pdf links, {} downloaded, {} failed",
            self.visited, self.pdf_links, self.downloaded, self.failed
        )
    }
}

pub async fn run(config: &CrawlConfig, discover_only: bool) -> Result<RunSummary> {
    config.validate().context("invalid configuration")?;
    let output = &config.output;
    ensure_output_dir(output.dir()).context("output directory unusable")?;
    if !discover_only {
        ensure_output_dir(&config.destination_dir).context("destination directory unusable")?;
    }

    let fetcher = ReqwestFetcher::new(FetchSettings::from(&config.http))
        .context("failed to build http client")?;
    let discovery = Discovery::new(&fetcher, config.scope()?, config.seed()?);
    let outcome = discovery.run().await;

    let pdf_table = write_link_table(
        &output.pdf_links_path(),
        PDF_LINK_COLUMN,
        outcome.pdf_links.iter().map(|url| url.as_str()),
    )?;
    let traversed_table = write_link_table(
        &output.traversed_links_path(),
        TRAVERSED_LINK_COLUMN,
        outcome.visited.iter().map(|url| url.as_str()),
    )?;
    engine_info!("Wrote {:?} and {:?}", pdf_table, traversed_table);

    let mut summary = RunSummary {
        visited: outcome.visited.len(),
        pdf_links: outcome.pdf_links.len(),
        ..RunSummary::default()
    };
    if discover_only {
        return Ok(summary);
    }

    let pdf_links = read_link_table(&pdf_table, PDF_LINK_COLUMN)?;
    let mut materializer =
        Materializer::new(config.destination_dir.clone(), DownloadSettings::from(&config.http))
            .context("failed to build download client")?;
    let records = materializer.download_all(&pdf_links).await;
    let records_path = write_download_records(&output.download_results_path(), &records)?;

    let records = read_download_records(&records_path)?;
    let last_updated = config
        .last_updated
        .clone()
        .unwrap_or_else(|| Local::now().format(LAST_UPDATED_FORMAT).to_string());
    let metadata = ingestion_metadata(&records, &last_updated);
    let metadata_path = write_ingestion_metadata(&output.metadata_path(), &metadata)?;
    engine_info!("Wrote {:?} and {:?}", records_path, metadata_path);

    summary.downloaded = metadata.len();
    summary.failed = records.len() - metadata.len();
    if summary.failed > 0 {
        engine_warn!("{} downloads failed", summary.failed);
    }
    Ok(summary)
}
