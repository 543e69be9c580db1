//! Command-line surface.
//!
//! Thin layer over `Profiler`: parse arguments, call the service, print.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{create_or_update_config, load_config, Config};
use crate::error::ProfilerError;
use crate::lens::{parse_loose_value, EditBuffer};
use crate::services::{BatchReport, CsvExport, Profiler};
use crate::types::{CompanyRecord, SearchMode};
use crate::util::parse_batch_names;
use crate::view::{count_for_group, filter_records, group_keys, GroupingCriteria, ALL_GROUP};

#[derive(Debug, Parser)]
#[command(
    name = "csr-profiler",
    version,
    about = "Build company CSR profiles from web-grounded AI search"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Standard,
    Deep,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => SearchMode::Standard,
            ModeArg::Deep => SearchMode::Deep,
        }
    }
}

/// What to do when a fetched company already has a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Overwrite {
    Always,
    Never,
    Ask,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and store profiles for one or more companies.
    Search {
        /// Company names.
        names: Vec<String>,
        /// Read additional names from a file, one per line.
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ModeArg::Standard)]
        mode: ModeArg,
        #[arg(long, value_enum, default_value_t = Overwrite::Ask)]
        overwrite: Overwrite,
    },

    /// Re-fetch a stored company.
    Refresh {
        id: String,
        #[arg(long, value_enum, default_value_t = ModeArg::Standard)]
        mode: ModeArg,
    },

    /// Import company names (and CIN numbers) from a CSV file and fetch each.
    Import {
        path: PathBuf,
        /// Name column header (defaults to config `csvNameHeader`).
        #[arg(long)]
        name_header: Option<String>,
        /// CIN column header (defaults to config `csvCinHeader`).
        #[arg(long)]
        cin_header: Option<String>,
        #[arg(long, value_enum, default_value_t = Overwrite::Ask)]
        overwrite: Overwrite,
    },

    /// List stored companies, optionally filtered.
    List {
        /// Case-insensitive substring of the office location.
        #[arg(long)]
        location: Option<String>,
        /// Grouping criteria: segmentation or industry-type.
        #[arg(long, default_value = "segmentation")]
        group_by: GroupingCriteria,
        /// Only show this group.
        #[arg(long, default_value = ALL_GROUP)]
        group: String,
    },

    /// Show group labels with record counts.
    Groups {
        #[arg(long, default_value = "segmentation")]
        group_by: GroupingCriteria,
        #[arg(long)]
        location: Option<String>,
    },

    /// Print one stored record as JSON.
    Show { id: String },

    /// Edit fields of a stored record by path, e.g.
    /// `--set keyContacts.primaryDecisionMaker.name="R. Rao"`.
    Edit {
        id: String,
        /// PATH=VALUE; VALUE is parsed as JSON, else taken as text.
        #[arg(long = "set")]
        sets: Vec<String>,
        /// PATH=VALUE to append to the list at PATH.
        #[arg(long = "push")]
        pushes: Vec<String>,
        /// PATH=INDEX to remove from the list at PATH.
        #[arg(long = "remove")]
        removes: Vec<String>,
    },

    /// Toggle the manually-verified flag.
    Verify { id: String },

    /// Delete one stored company.
    Delete { id: String },

    /// Delete every stored company.
    DeleteAll {
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Export one company (or all, without an id) to CSV.
    Export {
        id: Option<String>,
        /// Directory to write the file into.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },

    /// Fetch the general CSR news, events, and awards digest.
    News,

    /// Fetch recent CSR news for one stored company.
    CompanyNews { id: String },

    /// Show or change configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (API key masked).
    Show,
    /// Set one key in config.json.
    Set { key: String, value: String },
}

pub async fn run(cli: Cli) -> Result<(), ProfilerError> {
    if let Command::Config { action } = &cli.command {
        return run_config(action);
    }

    let config = load_config()?;
    let profiler = Profiler::from_config(&config)?;

    match cli.command {
        Command::Search {
            names,
            file,
            mode,
            overwrite,
        } => {
            let mut all = names;
            if let Some(path) = file {
                all.extend(parse_batch_names(&fs::read_to_string(path)?));
            }
            if all.is_empty() {
                return Err(ProfilerError::NoData(
                    "Please enter at least one company name.".to_string(),
                ));
            }
            let report = profiler
                .search(&all, mode.into(), confirm_with(overwrite))
                .await?;
            print_report(&report);
        }
        Command::Refresh { id, mode } => {
            let record = profiler.refresh(&id, mode.into()).await?;
            println!("Data for {} refreshed successfully.", record.name());
        }
        Command::Import {
            path,
            name_header,
            cin_header,
            overwrite,
        } => {
            let content = fs::read_to_string(&path)?;
            let name_header = name_header.unwrap_or_else(|| config.csv_name_header.clone());
            let cin_header = cin_header.unwrap_or_else(|| config.csv_cin_header.clone());
            let report = profiler
                .import_csv(&content, &name_header, &cin_header, confirm_with(overwrite))
                .await?;
            print_report(&report);
        }
        Command::List {
            location,
            group_by,
            group,
        } => {
            let records = profiler.records()?;
            let location = location.unwrap_or_default();
            let shown = filter_records(&records, &location, group_by, &group);
            if shown.is_empty() {
                println!("No companies found matching your current filter criteria.");
            }
            for record in shown {
                print_summary_line(record, group_by);
            }
        }
        Command::Groups { group_by, location } => {
            let records = profiler.records()?;
            let location = location.unwrap_or_default();
            for key in group_keys(&records, group_by) {
                let count = count_for_group(&records, &location, group_by, &key);
                println!("{} ({})", key, count);
            }
        }
        Command::Show { id } => {
            let record = profiler.record(&id)?;
            println!("{}", to_pretty_json(&record)?);
        }
        Command::Edit {
            id,
            sets,
            pushes,
            removes,
        } => {
            let mut buffer = EditBuffer::begin(profiler.record(&id)?)?;
            for arg in &sets {
                let (path, value) = split_assignment(arg)?;
                buffer.set(path, parse_loose_value(value))?;
            }
            for arg in &pushes {
                let (path, value) = split_assignment(arg)?;
                buffer.push(path, parse_loose_value(value))?;
            }
            for arg in &removes {
                let (path, index) = split_assignment(arg)?;
                let index: usize = index.trim().parse().map_err(|_| {
                    ProfilerError::Edit(format!("Invalid list index '{}'", index))
                })?;
                buffer.remove_at(path, index)?;
            }
            let changed = changed_fields(&buffer)?;
            if changed.is_empty() {
                println!("No changes for {}.", buffer.original().name());
                return Ok(());
            }
            println!("Changed: {}", changed.join(", "));
            let edited = buffer.commit()?;
            let saved = profiler.save_edits(&id, edited.data)?;
            println!("Changes for {} saved successfully.", saved.name());
        }
        Command::Verify { id } => {
            let record = profiler.toggle_verification(&id)?;
            let state = if record.data.manually_verified {
                "verified"
            } else {
                "unverified"
            };
            println!("{} marked {}.", record.name(), state);
        }
        Command::Delete { id } => {
            profiler.delete(&id)?;
            println!("Deleted {}.", id);
        }
        Command::DeleteAll { yes } => {
            if profiler.records()?.is_empty() {
                println!("No data to delete.");
                return Ok(());
            }
            if !yes && !confirm("Delete ALL stored company data? This cannot be undone.") {
                println!("Nothing deleted.");
                return Ok(());
            }
            profiler.delete_all()?;
            println!("All company data has been deleted.");
        }
        Command::Export { id, output } => {
            let export = match id {
                Some(id) => profiler.export_one(&id)?,
                None => profiler.export_all()?,
            };
            let path = write_export(&export, output)?;
            println!("Exported to {}", path.display());
        }
        Command::News => {
            let digest = profiler.news_hub().await?;
            let content = &digest.content;
            println!("LATEST CSR NEWS:\n{}\n", content.news);
            println!("UPCOMING CSR & EDUCATION EVENTS:\n{}\n", content.events);
            println!("CSR & EDUCATION AWARDS:\n{}\n", content.awards);
            println!("SPECIFIC EDUCATION CSR INITIATIVES:\n{}\n", content.education_csr);
            print_sources(&digest.sources);
            println!("Fetched at {}", digest.fetched_at);
        }
        Command::CompanyNews { id } => {
            let news = profiler.company_news(&id).await?;
            println!("{}\n", news.text);
            print_sources(&news.sources);
            println!("Fetched at {}", news.fetched_at);
        }
        Command::Config { .. } => {}
    }
    Ok(())
}

fn run_config(action: &ConfigAction) -> Result<(), ProfilerError> {
    match action {
        ConfigAction::Show => {
            let mut config = load_config()?;
            if config.api_key.is_some() {
                config.api_key = Some("********".to_string());
            }
            println!("{}", to_pretty_json(&config)?);
        }
        ConfigAction::Set { key, value } => {
            // Reject unknown keys before touching the file.
            apply_config_value(&mut Config::default(), key, value)?;
            create_or_update_config(|config| {
                let _ = apply_config_value(config, key, value);
            })?;
            println!("Updated {}.", key);
        }
    }
    Ok(())
}

fn apply_config_value(config: &mut Config, key: &str, value: &str) -> Result<(), ProfilerError> {
    match key {
        "apiKey" => config.api_key = Some(value.to_string()),
        "model" => config.model = value.to_string(),
        "apiBaseUrl" => config.api_base_url = value.to_string(),
        "storageDir" => config.storage_dir = Some(PathBuf::from(value)),
        "storageKey" => config.storage_key = value.to_string(),
        "csvNameHeader" => config.csv_name_header = value.to_string(),
        "csvCinHeader" => config.csv_cin_header = value.to_string(),
        other => {
            return Err(ProfilerError::Configuration(format!(
                "Unknown config key: {}",
                other
            )))
        }
    }
    Ok(())
}

/// Top-level fields whose draft value differs from the original record.
fn changed_fields(buffer: &EditBuffer) -> Result<Vec<String>, ProfilerError> {
    let original = serde_json::to_value(buffer.original())
        .map_err(|e| ProfilerError::Edit(format!("Failed to copy record: {}", e)))?;
    let (Some(before), Some(after)) = (original.as_object(), buffer.draft().as_object()) else {
        return Ok(Vec::new());
    };
    let mut changed: Vec<String> = after
        .iter()
        .filter(|(key, value)| before.get(key.as_str()) != Some(*value))
        .map(|(key, _)| key.clone())
        .collect();
    changed.sort();
    Ok(changed)
}

fn split_assignment(arg: &str) -> Result<(&str, &str), ProfilerError> {
    arg.split_once('=')
        .ok_or_else(|| ProfilerError::Edit(format!("Expected PATH=VALUE, got '{}'", arg)))
}

fn confirm_with(policy: Overwrite) -> impl FnMut(&CompanyRecord) -> bool {
    move |existing| match policy {
        Overwrite::Always => true,
        Overwrite::Never => false,
        Overwrite::Ask => confirm(&format!(
            "Data for \"{}\" already exists (last fetched: {}). Overwrite with new data from AI? \
             Verification status and CSV CIN No. are kept.",
            existing.name(),
            fetched_date(&existing.last_fetched)
        )),
    }
}

fn fetched_date(last_fetched: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(last_fetched)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| last_fetched.to_string())
}

/// Prompt on stdout, read y/N from stdin. Anything but yes declines.
fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    let trimmed = input.trim().to_lowercase();
    trimmed == "y" || trimmed == "yes"
}

fn print_report(report: &BatchReport) {
    for name in &report.skipped {
        println!("Skipped \"{}\", existing data retained.", name);
    }
    for line in &report.failures {
        eprintln!("{}", line);
    }
    println!("{}", report.summary());
}

fn print_summary_line(record: &CompanyRecord, group_by: GroupingCriteria) {
    let verified = if record.data.manually_verified { " [verified]" } else { "" };
    let education = if record.data.has_education_focus() { " [education]" } else { "" };
    println!(
        "{}\t{}\t{}\t{}{}{}",
        record.id,
        record.name(),
        group_by.group_of(record),
        record.data.office_location.as_deref().unwrap_or("N/A"),
        verified,
        education
    );
}

fn print_sources(sources: &[crate::types::Source]) {
    if sources.is_empty() {
        return;
    }
    println!("Sources:");
    for source in sources {
        println!("  - {} ({})", source.title, source.uri);
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ProfilerError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ProfilerError::Io(format!("Failed to serialize output: {}", e)))
}

fn write_export(export: &CsvExport, dir: PathBuf) -> Result<PathBuf, ProfilerError> {
    fs::create_dir_all(&dir)?;
    let path = dir.join(&export.file_name);
    fs::write(&path, &export.content)?;
    Ok(path)
}
