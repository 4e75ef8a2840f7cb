use serde::{Deserialize, Serialize};

/// `strftime` layout of the `last_updated` field, e.g. `15-07-2024`.
pub const LAST_UPDATED_FORMAT: &str = "%d-%m-%Y";

/// One attempted download. Field names are part of the `result_dl.json` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub original_url: String,
    pub file_name: String,
    pub dl_status: bool,
}

/// Ingestion entry for a successfully downloaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionMetadata {
    pub link: String,
    pub filename: String,
    pub file_display_name: String,
    pub last_updated: String,
}

/// Keep successful downloads and reshape them for ingestion, preserving order.
pub fn ingestion_metadata(records: &[DownloadRecord], last_updated: &str) -> Vec<IngestionMetadata> {
    records
        .iter()
        .filter(|record| record.dl_status)
        .map(|record| IngestionMetadata {
            link: record.original_url.clone(),
            filename: record.file_name.clone(),
            file_display_name: record.file_name.clone(),
            last_updated: last_updated.to_string(),
        })
        .collect()
}
