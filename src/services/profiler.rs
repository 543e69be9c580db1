//! Profiler service: search, import, refresh, edit, verify, export.
//!
//! Owns the optional model handle and the record store. Batches run one
//! company at a time; a provider or parse failure for one company is recorded
//! and the batch moves on, anything else aborts it.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::csv::{export_csv, parse_import, single_export_file_name, ALL_EXPORT_FILE_NAME};
use crate::error::ProfilerError;
use crate::gemini::{GeminiClient, GenerativeModel};
use crate::intelligence::{
    fetch_company_data, fetch_company_news, fetch_news_hub, reconcile_cin, CompanyNews,
    NewsDigest,
};
use crate::store::{FileKeyValueStore, RecordStore};
use crate::types::{CompanyData, CompanyRecord, SearchMode};
use crate::util::{company_to_id, now_rfc3339, today};

const MODEL_MISSING: &str = "Gemini API not initialized. API_KEY might be missing.";

/// Outcome of a search or import batch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Ids written to the store, in processing order.
    pub saved: Vec<String>,
    /// Names left alone because the caller declined to overwrite them.
    pub skipped: Vec<String>,
    /// One human-readable line per failed company.
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line outcome for display.
    pub fn summary(&self) -> String {
        match self.saved.len() {
            0 => "No new company data was fetched. Companies may have been skipped or every request failed."
                .to_string(),
            1 => "Successfully fetched/updated data for 1 company.".to_string(),
            n => format!("Successfully fetched/updated data for {} companies.", n),
        }
    }
}

/// A rendered CSV export and the file name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub struct Profiler {
    model: Option<Arc<dyn GenerativeModel>>,
    store: RecordStore,
}

impl Profiler {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, store: RecordStore) -> Self {
        Self { model, store }
    }

    /// Wire up the Gemini client (when a key is configured) and the file store.
    pub fn from_config(config: &Config) -> Result<Self, ProfilerError> {
        let model = GeminiClient::from_config(config)
            .map(|client| Arc::new(client) as Arc<dyn GenerativeModel>);
        let kv = FileKeyValueStore::new(config.resolved_storage_dir()?);
        let store = RecordStore::new(Arc::new(kv), &config.storage_key);
        Ok(Self::new(model, store))
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// `Ok` when AI-backed commands can run.
    pub fn ai_status(&self) -> Result<(), ProfilerError> {
        self.model().map(|_| ())
    }

    fn model(&self) -> Result<&dyn GenerativeModel, ProfilerError> {
        self.model
            .as_deref()
            .ok_or_else(|| ProfilerError::Configuration(MODEL_MISSING.to_string()))
    }

    pub fn records(&self) -> Result<Vec<CompanyRecord>, ProfilerError> {
        self.store.get_all()
    }

    pub fn record(&self, id: &str) -> Result<CompanyRecord, ProfilerError> {
        self.store.require(id)
    }

    /// Fetch one company and build the record to store.
    ///
    /// AI data wins for profile fields; the existing record contributes the
    /// verification flag, the CSV registration number, sources when the new
    /// answer has none, and segmentation/industry when the new answer leaves
    /// them blank.
    pub async fn process_fetch(
        &self,
        company_name: &str,
        mode: SearchMode,
        csv_cin: Option<&str>,
        existing: Option<&CompanyRecord>,
    ) -> Result<CompanyRecord, ProfilerError> {
        let model = self.model()?;
        let fetched = fetch_company_data(model, company_name, mode, today()).await?;
        let previous = existing.map(|r| &r.data);

        let cin_number = reconcile_cin(
            fetched.cin_number.as_deref(),
            previous.and_then(|d| d.cin_number.as_deref()),
            csv_cin,
        );
        let csv_cin_number = csv_cin
            .map(str::to_string)
            .or_else(|| previous.and_then(|d| d.csv_cin_number.clone()));
        let sources = if fetched.sources.is_empty() {
            previous.map(|d| d.sources.clone()).unwrap_or_default()
        } else {
            fetched.sources.clone()
        };
        let segmentation = non_blank(fetched.segmentation.clone())
            .or_else(|| previous.and_then(|d| d.segmentation.clone()));
        let industry_type = non_blank(fetched.industry_type.clone())
            .or_else(|| previous.and_then(|d| d.industry_type.clone()));

        Ok(CompanyRecord {
            id: company_to_id(company_name),
            last_fetched: now_rfc3339(),
            data: CompanyData {
                name_of_company: company_name.to_string(),
                cin_number: Some(cin_number),
                csv_cin_number,
                manually_verified: previous.is_some_and(|d| d.manually_verified),
                sources,
                segmentation,
                industry_type,
                ..fetched
            },
        })
    }

    /// Fetch and store each name in turn.
    ///
    /// `confirm_overwrite` is asked before replacing an existing record;
    /// declining skips that company.
    pub async fn search<F>(
        &self,
        names: &[String],
        mode: SearchMode,
        mut confirm_overwrite: F,
    ) -> Result<BatchReport, ProfilerError>
    where
        F: FnMut(&CompanyRecord) -> bool,
    {
        self.ai_status()?;
        let mut report = BatchReport::default();
        let total = names.len();

        for (i, name) in names.iter().enumerate() {
            log::info!("Fetching data for \"{}\" ({}/{})...", name, i + 1, total);
            let existing = self.store.get(&company_to_id(name))?;
            if let Some(existing) = &existing {
                if !confirm_overwrite(existing) {
                    log::info!("Skipped \"{}\", existing data retained.", name);
                    report.skipped.push(name.clone());
                    continue;
                }
            }

            match self.process_fetch(name, mode, None, existing.as_ref()).await {
                Ok(record) => {
                    report.saved.push(record.id.clone());
                    self.store.upsert(record)?;
                }
                Err(e) if e.is_per_item() => {
                    log::error!("Failed to fetch data for {}: {}", name, e);
                    report.failures.push(format!("Failed for {}: {}", name, e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Import company names (and CSV registration numbers) and fetch each one
    /// in standard mode. A bad file fails before any request is made.
    pub async fn import_csv<F>(
        &self,
        content: &str,
        name_header: &str,
        cin_header: &str,
        mut confirm_overwrite: F,
    ) -> Result<BatchReport, ProfilerError>
    where
        F: FnMut(&CompanyRecord) -> bool,
    {
        self.ai_status()?;
        let rows = parse_import(content, name_header, cin_header)?;
        let mut report = BatchReport::default();
        let total = rows.len();
        log::info!("Starting import for {} companies from CSV...", total);

        for (i, row) in rows.iter().enumerate() {
            log::info!("Importing \"{}\" ({}/{})...", row.name, i + 1, total);
            let existing = self.store.get(&company_to_id(&row.name))?;
            if let Some(existing) = &existing {
                if !confirm_overwrite(existing) {
                    log::info!("Skipped \"{}\", existing data retained.", row.name);
                    report.skipped.push(row.name.clone());
                    continue;
                }
            }

            match self
                .process_fetch(&row.name, SearchMode::Standard, row.cin.as_deref(), existing.as_ref())
                .await
            {
                Ok(record) => {
                    report.saved.push(record.id.clone());
                    self.store.upsert(record)?;
                }
                Err(e) if e.is_per_item() => {
                    log::error!("Failed to fetch/process data for {} from CSV: {}", row.name, e);
                    report
                        .failures
                        .push(format!("Failed for {} (CSV): {}", row.name, e));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Re-fetch one stored company, keeping its CSV registration number.
    pub async fn refresh(&self, id: &str, mode: SearchMode) -> Result<CompanyRecord, ProfilerError> {
        let existing = self.store.require(id)?;
        let record = self
            .process_fetch(
                existing.name(),
                mode,
                existing.data.csv_cin_number.as_deref(),
                Some(&existing),
            )
            .await?;
        self.store.upsert(record.clone())?;
        log::info!("Data for {} refreshed successfully.", record.name());
        Ok(record)
    }

    pub fn toggle_verification(&self, id: &str) -> Result<CompanyRecord, ProfilerError> {
        let mut record = self.store.require(id)?;
        record.data.manually_verified = !record.data.manually_verified;
        record.last_fetched = now_rfc3339();
        self.store.upsert(record.clone())?;
        Ok(record)
    }

    /// Replace a stored record's profile with edited data. The id never changes.
    pub fn save_edits(&self, id: &str, edited: CompanyData) -> Result<CompanyRecord, ProfilerError> {
        self.store.require(id)?;
        let record = CompanyRecord {
            id: id.to_string(),
            last_fetched: now_rfc3339(),
            data: edited,
        };
        self.store.upsert(record.clone())?;
        log::info!("Changes for {} saved successfully.", record.name());
        Ok(record)
    }

    pub fn delete(&self, id: &str) -> Result<(), ProfilerError> {
        if !self.store.delete(id)? {
            return Err(ProfilerError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete_all(&self) -> Result<(), ProfilerError> {
        self.store.delete_all()
    }

    pub fn export_one(&self, id: &str) -> Result<CsvExport, ProfilerError> {
        let record = self.store.require(id)?;
        Ok(CsvExport {
            file_name: single_export_file_name(&record.id),
            content: export_csv(std::slice::from_ref(&record), today()),
        })
    }

    pub fn export_all(&self) -> Result<CsvExport, ProfilerError> {
        let records = self.store.get_all()?;
        if records.is_empty() {
            return Err(ProfilerError::NoData("No company data to export.".to_string()));
        }
        Ok(CsvExport {
            file_name: ALL_EXPORT_FILE_NAME.to_string(),
            content: export_csv(&records, today()),
        })
    }

    pub async fn news_hub(&self) -> Result<NewsDigest, ProfilerError> {
        fetch_news_hub(self.model()?).await
    }

    pub async fn company_news(&self, id: &str) -> Result<CompanyNews, ProfilerError> {
        let model = self.model()?;
        let record = self.store.require(id)?;
        fetch_company_news(model, record.name()).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
