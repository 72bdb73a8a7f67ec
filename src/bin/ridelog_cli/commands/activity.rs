// ABOUTME: Activity import command for ridelog-cli
// ABOUTME: Reads provider reports from a JSON file and ingests them one by one

use std::path::Path;

use ridelog::errors::{AppError, AppResult};
use ridelog::services::ActivityReport;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::Engine;
use crate::helpers::output::print_json;

#[derive(Serialize)]
struct ImportFailure {
    provider_activity_id: String,
    message: String,
}

#[derive(Serialize)]
struct ImportSummary {
    imported: Vec<ridelog::services::IngestOutcome>,
    failed: Vec<ImportFailure>,
}

/// Ingest every report in `file`; failures are collected, not fatal
pub async fn import(engine: &Engine, athlete: Uuid, file: &Path) -> AppResult<()> {
    let raw = std::fs::read_to_string(file).map_err(|e| {
        AppError::invalid_input(format!("Cannot read {}: {e}", file.display())).with_source(e)
    })?;
    let reports: Vec<ActivityReport> = serde_json::from_str(&raw)?;
    info!(count = reports.len(), file = %file.display(), "Importing activities");

    let mut summary = ImportSummary {
        imported: Vec::with_capacity(reports.len()),
        failed: Vec::new(),
    };
    for report in reports {
        let provider_activity_id = report.provider_activity_id.clone();
        match engine.ingest.ingest(athlete, report).await {
            Ok(outcome) => summary.imported.push(outcome),
            Err(e) => {
                warn!(provider_activity_id = %provider_activity_id, error = %e, "Import failed");
                summary.failed.push(ImportFailure {
                    provider_activity_id,
                    message: e.to_string(),
                });
            }
        }
    }
    print_json(&summary)
}
