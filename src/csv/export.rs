//! CSV export of company records.
//!
//! Every cell is double-quoted with internal quotes doubled, rows are joined
//! with CRLF. Missing values render as "N/A", booleans as Yes/No, string lists
//! joined with "; ", and object lists or nested objects as compact JSON.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{BudgetItem, CompanyRecord, FIXED_BUDGET_YEARS};
use crate::util::{fiscal_year_label, NOT_AVAILABLE};

/// File name for a single-record export.
pub fn single_export_file_name(id: &str) -> String {
    format!("{}_data.csv", id)
}

/// File name for a whole-store export.
pub const ALL_EXPORT_FILE_NAME: &str = "all_companies_data.csv";

const LEADING_HEADERS: [&str; 16] = [
    "Name of Company",
    "LinkedIn URL",
    "CIN No.",
    "CSV CIN No.",
    "Segmentation",
    "Priority",
    "SPOC",
    "Promoter Led",
    "Name of Promoter",
    "Industry Type",
    "Entity Type",
    "Office Location",
    "Project Locations",
    "Domain",
    "Data Retrieval Date",
    "Manually Verified",
];

const TRAILING_HEADERS: [&str; 18] = [
    "Does Education Focus",
    "Education Spend",
    "Is Corporate Foundation",
    "Current NGO Partners",
    "Program Type",
    "CSR Amount (INR cr)",
    "CSR Committee Members (JSON)",
    "Primary Decision Maker (JSON)",
    "Secondary Decision Maker (JSON)",
    "Alternative Decision Maker (JSON)",
    "POCs (JSON)",
    "Proposed Approach",
    "Comments/Status",
    "Week of Outreach",
    "Primary Location Finance/Office",
    "Other Info",
    "Notes Overall",
    "Sources (JSON)",
];

/// Budget years exported as column pairs: the fixed years plus the current one.
fn budget_years(today: NaiveDate) -> Vec<String> {
    FIXED_BUDGET_YEARS
        .iter()
        .map(|y| y.to_string())
        .chain(std::iter::once(fiscal_year_label(today)))
        .collect()
}

pub fn export_headers(today: NaiveDate) -> Vec<String> {
    let mut headers: Vec<String> = LEADING_HEADERS.iter().map(|h| h.to_string()).collect();
    for year in budget_years(today) {
        headers.push(format!("Budget {} Total", year));
        headers.push(format!("Budget {} Education", year));
    }
    headers.extend(TRAILING_HEADERS.iter().map(|h| h.to_string()));
    headers
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "Yes".to_string(),
        Some(false) => "No".to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn joined(values: &[String]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        values.join("; ")
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| NOT_AVAILABLE.to_string())
}

fn json_list<T: Serialize>(values: &[T]) -> String {
    if values.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        json(values)
    }
}

fn budget_cells(items: &[BudgetItem], year: &str) -> [String; 2] {
    match items.iter().find(|b| b.year == year) {
        Some(b) => [text(&b.total_budget), text(&b.education_budget)],
        None => [NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()],
    }
}

fn record_row(record: &CompanyRecord, years: &[String]) -> Vec<String> {
    let d = &record.data;
    let focus = &d.csr_education_focus;
    let contacts = &d.key_contacts;
    let strategic = &d.strategic_operational_info;

    let mut row = vec![
        d.name_of_company.clone(),
        text(&d.company_linked_in_url),
        text(&d.cin_number),
        text(&d.csv_cin_number),
        text(&d.segmentation),
        text(&d.priority),
        text(&d.spoc),
        yes_no(d.promoter_led),
        text(&d.name_of_promoter),
        text(&d.industry_type),
        text(&d.entity_type),
        text(&d.office_location),
        joined(&d.project_locations),
        text(&d.domain),
        d.data_retrieval_date.clone(),
        yes_no(Some(d.manually_verified)),
    ];
    for year in years {
        row.extend(budget_cells(&d.budget_information, year));
    }
    row.extend([
        yes_no(focus.does_education),
        text(&focus.education_spend),
        yes_no(focus.is_corporate_foundation),
        joined(&focus.current_ngo_partners),
        joined(&focus.program_type),
        text(&focus.csr_amount_inr_cr),
        json_list(&focus.csr_committee_members),
        json(&contacts.primary_decision_maker),
        json(&contacts.secondary_decision_maker),
        json(&contacts.alternative_decision_maker),
        json_list(&d.points_of_contact),
        text(&strategic.proposed_approach),
        text(&strategic.comments_status),
        text(&strategic.week_of_outreach),
        text(&strategic.primary_location_finance_or_office),
        text(&strategic.other_info),
        text(&strategic.notes_overall),
        json_list(&d.sources),
    ]);
    row
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn csv_line(cells: &[String]) -> String {
    cells.iter().map(|c| quote(c)).collect::<Vec<_>>().join(",")
}

/// Render records as CSV text: one header row, then one row per record.
pub fn export_csv(records: &[CompanyRecord], today: NaiveDate) -> String {
    let years = budget_years(today);
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(csv_line(&export_headers(today)));
    for record in records {
        lines.push(csv_line(&record_row(record, &years)));
    }
    lines.join("\r\n")
}
