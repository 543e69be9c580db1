//! AI response parsing and merge onto the default company record.
//!
//! The model is asked for one JSON object (see `prompts.rs`) but routinely
//! wraps it in a code fence, drops keys, or puts the wrong type in a field.
//! Parsing is strict about the outer JSON (no repair) and lenient about
//! everything inside it: a field that is missing, null, or of the wrong type
//! keeps the default value, so the merge always produces a complete record.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ProfilerError;
use crate::gemini::GenerativeModel;
use crate::types::{
    BudgetItem, CompanyData, CsrCommitteeMember, CsrEducationFocus, KeyContacts, Poc,
    SearchMode, StrategicOperationalInfo,
};
use crate::util::{is_empty_sentinel, NOT_AVAILABLE};

use super::prompts::company_profile_prompt;

/// Note stored on the record when the provider answered with no text.
pub const EMPTY_RESPONSE_NOTE: &str = "Received empty response from AI. No data retrieved.";

/// Strip a surrounding ```` ``` ```` or ```` ```json ```` fence, if the whole
/// (trimmed) text is one fenced block.
pub(crate) fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```") {
        let inner = &trimmed[3..trimmed.len() - 3];
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        return inner.trim();
    }
    trimmed
}

/// Parse a profile answer and merge it onto the empty record for `company_name`.
///
/// `nameOfCompany` is always the requested name. `sources`,
/// `manuallyVerified` and `csvCinNumber` are never taken from the JSON body.
pub fn parse_company_response(
    response: &str,
    company_name: &str,
    today: NaiveDate,
) -> Result<CompanyData, ProfilerError> {
    let json_str = strip_code_fence(response);
    let parsed: Value = serde_json::from_str(json_str).map_err(|e| {
        log::error!("Failed to parse JSON response from AI: {}", e);
        log::debug!("Problematic JSON string: {}", json_str);
        ProfilerError::malformed(json_str)
    })?;

    let Some(partial) = parsed.as_object() else {
        log::error!("AI response is JSON but not an object");
        return Err(ProfilerError::malformed(json_str));
    };

    let mut data = merge_partial(CompanyData::empty(company_name, today), partial);
    data.name_of_company = company_name.to_string();
    Ok(data)
}

/// Merge a parsed partial record onto `base`.
///
/// Total: any object is accepted. Idempotent: merging the same partial twice
/// gives the same record as merging it once.
pub fn merge_partial(base: CompanyData, partial: &Map<String, Value>) -> CompanyData {
    CompanyData {
        name_of_company: base.name_of_company,
        company_linked_in_url: string_field(partial, "companyLinkedInURL")
            .or(base.company_linked_in_url),
        cin_number: string_field(partial, "cinNumber").or(base.cin_number),
        csv_cin_number: base.csv_cin_number,
        segmentation: string_field(partial, "segmentation").or(base.segmentation),
        priority: string_field(partial, "priority").or(base.priority),
        spoc: string_field(partial, "spoc").or(base.spoc),
        promoter_led: bool_field(partial, "promoterLed").or(base.promoter_led),
        name_of_promoter: string_field(partial, "nameOfPromoter").or(base.name_of_promoter),
        industry_type: string_field(partial, "industryType").or(base.industry_type),
        entity_type: string_field(partial, "entityType").or(base.entity_type),
        office_location: string_field(partial, "officeLocation").or(base.office_location),
        project_locations: string_list_field(partial, "projectLocations")
            .unwrap_or(base.project_locations),
        domain: string_field(partial, "domain").or(base.domain),
        data_retrieval_date: string_field(partial, "dataRetrievalDate")
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(base.data_retrieval_date),
        budget_information: object_list_field::<BudgetItem>(partial, "budgetInformation")
            .unwrap_or(base.budget_information),
        csr_education_focus: merge_education_focus(
            base.csr_education_focus,
            partial.get("csrEducationFocus"),
        ),
        key_contacts: merge_key_contacts(base.key_contacts, partial.get("keyContacts")),
        points_of_contact: object_list_field::<Poc>(partial, "pointsOfContact")
            .unwrap_or(base.points_of_contact),
        strategic_operational_info: merge_object::<StrategicOperationalInfo>(
            base.strategic_operational_info,
            partial.get("strategicOperationalInfo"),
        ),
        sources: base.sources,
        manually_verified: base.manually_verified,
    }
}

fn merge_education_focus(base: CsrEducationFocus, value: Option<&Value>) -> CsrEducationFocus {
    let Some(partial) = value.and_then(Value::as_object) else {
        return base;
    };
    CsrEducationFocus {
        does_education: bool_field(partial, "doesEducation").or(base.does_education),
        education_spend: string_field(partial, "educationSpend").or(base.education_spend),
        is_corporate_foundation: bool_field(partial, "isCorporateFoundation")
            .or(base.is_corporate_foundation),
        current_ngo_partners: string_list_field(partial, "currentNgoPartners")
            .unwrap_or(base.current_ngo_partners),
        program_type: string_list_field(partial, "programType").unwrap_or(base.program_type),
        csr_amount_inr_cr: string_field(partial, "csrAmountINRcr").or(base.csr_amount_inr_cr),
        csr_committee_members: object_list_field::<CsrCommitteeMember>(
            partial,
            "csrCommitteeMembers",
        )
        .unwrap_or(base.csr_committee_members),
    }
}

fn merge_key_contacts(base: KeyContacts, value: Option<&Value>) -> KeyContacts {
    let Some(partial) = value.and_then(Value::as_object) else {
        return base;
    };
    KeyContacts {
        primary_decision_maker: merge_object(
            base.primary_decision_maker,
            partial.get("primaryDecisionMaker"),
        ),
        secondary_decision_maker: merge_object(
            base.secondary_decision_maker,
            partial.get("secondaryDecisionMaker"),
        ),
        alternative_decision_maker: merge_object(
            base.alternative_decision_maker,
            partial.get("alternativeDecisionMaker"),
        ),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

/// A string list; non-string items are dropped. `None` when absent or empty.
fn string_list_field(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = obj
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// A list of objects, each merged key by key onto `T::default()`; non-object
/// items are dropped. `None` when absent or empty.
fn object_list_field<T>(obj: &Map<String, Value>, key: &str) -> Option<Vec<T>>
where
    T: Default + Serialize + DeserializeOwned,
{
    let items: Vec<T> = obj
        .get(key)?
        .as_array()?
        .iter()
        .filter(|item| item.is_object())
        .map(|item| merge_object(T::default(), Some(item)))
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Merge an arbitrary JSON object onto `base` one key at a time.
///
/// Each non-null key is kept only if the result still deserializes as `T`,
/// so a wrong-typed field leaves the base value in place.
fn merge_object<T>(base: T, value: Option<&Value>) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Some(partial) = value.and_then(Value::as_object) else {
        return base;
    };
    let Ok(Value::Object(mut current)) = serde_json::to_value(&base) else {
        return base;
    };

    for (key, field) in partial {
        if field.is_null() {
            continue;
        }
        let previous = current.insert(key.clone(), field.clone());
        if serde_json::from_value::<T>(Value::Object(current.clone())).is_err() {
            match previous {
                Some(old) => current.insert(key.clone(), old),
                None => current.remove(key),
            };
        }
    }

    serde_json::from_value(Value::Object(current)).unwrap_or(base)
}

/// Pick the registration number to keep after a fetch.
///
/// AI value unless it is an empty sentinel (absent, blank, "N/A"), else the
/// previously stored value, else the externally supplied (CSV) value, else
/// "N/A".
pub fn reconcile_cin(ai: Option<&str>, previous: Option<&str>, external: Option<&str>) -> String {
    [ai, previous, external]
        .into_iter()
        .find(|candidate| !is_empty_sentinel(*candidate))
        .flatten()
        .map(str::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Prompt the model for one company and return the merged record.
///
/// An empty answer is not an error: it yields the empty record with a note
/// in `notesOverall`. Grounding citations become `sources`.
pub async fn fetch_company_data(
    model: &dyn GenerativeModel,
    company_name: &str,
    mode: SearchMode,
    today: NaiveDate,
) -> Result<CompanyData, ProfilerError> {
    let prompt = company_profile_prompt(company_name, mode, today);
    let generation = model.generate(&prompt).await?;

    if generation.text.trim().is_empty() {
        log::warn!("Empty AI response for \"{}\"", company_name);
        let mut data = CompanyData::empty(company_name, today);
        data.strategic_operational_info.notes_overall = Some(EMPTY_RESPONSE_NOTE.to_string());
        return Ok(data);
    }

    let mut data = parse_company_response(&generation.text, company_name, today)?;
    data.sources = generation.sources;
    Ok(data)
}
