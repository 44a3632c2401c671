use std::path::Path;
use tracing::{debug, info, info_span, Instrument};

use crate::constants::{
    COL_CONFIDENCE, COL_CORPORATE_ADDRESS, COL_CORPORATE_NAME, COL_EMAIL,
    COL_FRANCHISEE, COL_LINKEDIN, COL_OWNER, COL_PHONE, COL_SOURCES, COL_STATE,
};
use crate::enrichment::{RowEnricher, SourceUrls};
use crate::error::Result;
use crate::observability::metrics;
use crate::table::{read_table, write_table, CellValue, Table};
use crate::types::FranchiseRecord;

/// Outcome of one batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub enriched_rows: usize,
    pub skipped_rows: usize,
    pub mean_confidence: f64,
}

/// Column positions of the enrichment outputs within a table
struct OutputColumns {
    corporate_name: usize,
    corporate_address: usize,
    owner: usize,
    phone: usize,
    email: usize,
    linkedin: usize,
    sources: usize,
    confidence: usize,
}

impl OutputColumns {
    /// Missing columns are appended in field order
    fn ensure(table: &mut Table) -> Self {
        Self {
            corporate_name: table.ensure_column(COL_CORPORATE_NAME),
            corporate_address: table.ensure_column(COL_CORPORATE_ADDRESS),
            owner: table.ensure_column(COL_OWNER),
            phone: table.ensure_column(COL_PHONE),
            email: table.ensure_column(COL_EMAIL),
            linkedin: table.ensure_column(COL_LINKEDIN),
            sources: table.ensure_column(COL_SOURCES),
            confidence: table.ensure_column(COL_CONFIDENCE),
        }
    }

    fn write(&self, table: &mut Table, row: usize, record: &FranchiseRecord) {
        table.set(row, self.corporate_name, CellValue::text(record.corporate_name.clone()));
        table.set(row, self.corporate_address, CellValue::text(record.corporate_address.clone()));
        table.set(row, self.owner, CellValue::text(record.owner_name.clone()));
        table.set(row, self.phone, CellValue::text(record.corporate_phone.clone()));
        table.set(row, self.email, CellValue::text(record.corporate_email.clone()));
        table.set(row, self.linkedin, CellValue::text(record.linkedin_url.clone()));
        table.set(row, self.sources, CellValue::text(record.source_urls.to_delimited()));
        table.set(row, self.confidence, CellValue::Number(record.confidence));
    }
}

/// Batch driver: enriches every row of a table in order, one row at a time
pub struct EnrichUseCase {
    enricher: RowEnricher,
}

impl EnrichUseCase {
    pub fn new(enricher: RowEnricher) -> Self {
        Self { enricher }
    }

    /// Read the input spreadsheet, enrich it and write the result.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<BatchSummary> {
        let mut table = read_table(input)?;
        let summary = self.enrich_table(&mut table).await?;
        write_table(&table, output)?;
        Ok(summary)
    }

    /// Enrich a table in place. Fails only when required columns are missing.
    ///
    /// Rows whose name is blank or an error value are skipped and left untouched.
    pub async fn enrich_table(&self, table: &mut Table) -> Result<BatchSummary> {
        let name_col = table.require_column(COL_FRANCHISEE)?;
        let state_col = table.require_column(COL_STATE)?;
        let columns = OutputColumns::ensure(table);

        let mut summary = BatchSummary {
            total_rows: table.row_count(),
            ..Default::default()
        };
        let mut confidence_sum = 0.0;

        for row in 0..table.row_count() {
            let franchise = table.text(row, name_col);
            // Blank names and spreadsheet error values (#N/A, #REF!) are not queryable
            if franchise.is_empty() || table.get(row, name_col).is_error() {
                debug!("Row {}: skipped, no usable franchise name", row + 1);
                summary.skipped_rows += 1;
                metrics::enrich::row_skipped();
                continue;
            }
            let state = table.text(row, state_col);
            let existing_sources = SourceUrls::from_delimited(&table.text(row, columns.sources));

            info!("Row {}: {} ({})", row + 1, franchise, state);
            let record = self
                .enricher
                .enrich_row(&franchise, &state, existing_sources)
                .instrument(info_span!("enrich_row", row = row + 1))
                .await;

            columns.write(table, row, &record);
            confidence_sum += record.confidence;
            summary.enriched_rows += 1;
            metrics::enrich::row_processed();
        }

        if summary.enriched_rows > 0 {
            summary.mean_confidence = confidence_sum / summary.enriched_rows as f64;
        }
        info!(
            "Enriched {} of {} rows ({} skipped), mean confidence {:.2}",
            summary.enriched_rows, summary.total_rows, summary.skipped_rows, summary.mean_confidence
        );
        Ok(summary)
    }
}
