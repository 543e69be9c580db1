//! Company profile record shapes.
//!
//! Field names serialize in camelCase so the stored JSON matches the
//! original storage format key for key. Every field carries a serde default
//! so older or partial stored shapes still load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::fiscal_year_label;

/// Fiscal years always present in a fresh record's budget table, before the
/// rolling current-year row.
pub const FIXED_BUDGET_YEARS: [&str; 4] = ["2020-21", "2021-22", "2022-23", "2023-24"];

/// Search thoroughness requested from the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Standard,
    Deep,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub total_budget: Option<String>,
    #[serde(default)]
    pub education_budget: Option<String>,
}

impl BudgetItem {
    pub fn empty(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            total_budget: None,
            education_budget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrCommitteeMember {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub linked_in_profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPerson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A numbered point of contact.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poc_number: Option<u32>,
    #[serde(flatten)]
    pub contact: ContactPerson,
}

/// A web source the AI provider cites as grounding for its answer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrEducationFocus {
    #[serde(default)]
    pub does_education: Option<bool>,
    #[serde(default)]
    pub education_spend: Option<String>,
    #[serde(default)]
    pub is_corporate_foundation: Option<bool>,
    #[serde(default)]
    pub current_ngo_partners: Vec<String>,
    #[serde(default)]
    pub program_type: Vec<String>,
    #[serde(default, rename = "csrAmountINRcr")]
    pub csr_amount_inr_cr: Option<String>,
    #[serde(default)]
    pub csr_committee_members: Vec<CsrCommitteeMember>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyContacts {
    #[serde(default)]
    pub primary_decision_maker: ContactPerson,
    #[serde(default)]
    pub secondary_decision_maker: ContactPerson,
    #[serde(default)]
    pub alternative_decision_maker: ContactPerson,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicOperationalInfo {
    #[serde(default)]
    pub proposed_approach: Option<String>,
    #[serde(default)]
    pub comments_status: Option<String>,
    #[serde(default)]
    pub week_of_outreach: Option<String>,
    #[serde(default)]
    pub primary_location_finance_or_office: Option<String>,
    #[serde(default)]
    pub other_info: Option<String>,
    #[serde(default)]
    pub notes_overall: Option<String>,
}

/// The profile body of a company: everything except storage bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    #[serde(default)]
    pub name_of_company: String,
    #[serde(default, rename = "companyLinkedInURL")]
    pub company_linked_in_url: Option<String>,
    /// Registration number found by the AI.
    #[serde(default)]
    pub cin_number: Option<String>,
    /// Registration number supplied by a CSV import; never set by the AI.
    #[serde(default)]
    pub csv_cin_number: Option<String>,
    #[serde(default)]
    pub segmentation: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub spoc: Option<String>,
    #[serde(default)]
    pub promoter_led: Option<bool>,
    #[serde(default)]
    pub name_of_promoter: Option<String>,
    #[serde(default)]
    pub industry_type: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(default)]
    pub project_locations: Vec<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub data_retrieval_date: String,

    #[serde(default)]
    pub budget_information: Vec<BudgetItem>,
    #[serde(default)]
    pub csr_education_focus: CsrEducationFocus,
    #[serde(default)]
    pub key_contacts: KeyContacts,
    #[serde(default)]
    pub points_of_contact: Vec<Poc>,
    #[serde(default)]
    pub strategic_operational_info: StrategicOperationalInfo,

    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub manually_verified: bool,
}

impl CompanyData {
    /// A fully-populated record with every field at its documented empty value.
    pub fn empty(company_name: &str, today: NaiveDate) -> Self {
        let mut budget_information: Vec<BudgetItem> =
            FIXED_BUDGET_YEARS.iter().map(|y| BudgetItem::empty(*y)).collect();
        budget_information.push(BudgetItem::empty(fiscal_year_label(today)));

        Self {
            name_of_company: company_name.to_string(),
            data_retrieval_date: today.format("%Y-%m-%d").to_string(),
            budget_information,
            ..Self::default()
        }
    }

    /// Whether the record flags education as a CSR focus.
    pub fn has_education_focus(&self) -> bool {
        self.csr_education_focus.does_education == Some(true)
    }
}

/// A persisted company record: profile body plus storage bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub last_fetched: String,
    #[serde(flatten)]
    pub data: CompanyData,
}

impl CompanyRecord {
    pub fn name(&self) -> &str {
        &self.data.name_of_company
    }
}

/// Sectioned CSR news hub content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredNewsContent {
    pub news: String,
    pub events: String,
    pub awards: String,
    pub education_csr: String,
}
