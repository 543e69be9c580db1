//! Typed paths into a record's JSON form, and the edit buffer built on them.
//!
//! Paths look like `csrEducationFocus.csrCommitteeMembers.0.name`; the
//! bracket form `csrCommitteeMembers[0].name` is accepted too. Every write
//! returns a new value and leaves the input untouched, so earlier snapshots
//! stay valid.

use serde_json::{Map, Value};

use crate::error::ProfilerError;
use crate::types::CompanyRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lens {
    steps: Vec<PathStep>,
}

impl Lens {
    /// Parse a dotted path. A segment that parses as an integer is an index.
    pub fn parse(path: &str) -> Result<Self, ProfilerError> {
        let mut steps = Vec::new();
        for part in path.split('.') {
            let (name, indices) = match part.find('[') {
                Some(bracket_pos) => (&part[..bracket_pos], &part[bracket_pos..]),
                None => (part, ""),
            };

            if name.is_empty() && indices.is_empty() {
                return Err(ProfilerError::Edit(format!("Empty segment in path '{}'", path)));
            }
            if !name.is_empty() {
                steps.push(match name.parse::<usize>() {
                    Ok(idx) => PathStep::Index(idx),
                    Err(_) => PathStep::Field(name.to_string()),
                });
            }

            for idx_str in indices.split('[').skip(1) {
                let idx = idx_str
                    .strip_suffix(']')
                    .and_then(|s| s.parse::<usize>().ok())
                    .ok_or_else(|| {
                        ProfilerError::Edit(format!("Invalid index in path segment: '{}'", part))
                    })?;
                steps.push(PathStep::Index(idx));
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.steps.iter().try_fold(root, |node, step| match step {
            PathStep::Field(name) => node.get(name.as_str()),
            PathStep::Index(idx) => node.get(*idx),
        })
    }

    /// Return a copy of `root` with `value` at this path.
    ///
    /// Missing or null intermediates are created: an array when the next
    /// step is an index, an object otherwise. An index may address an
    /// existing item or the slot just past the end, which appends.
    pub fn set(&self, root: &Value, value: Value) -> Result<Value, ProfilerError> {
        set_at(root, &self.steps, value)
    }

    /// Return a copy of `root` with `item` appended to the list at this path.
    pub fn push(&self, root: &Value, item: Value) -> Result<Value, ProfilerError> {
        let mut list = match self.get(root) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(self.not_a_list()),
        };
        list.push(item);
        self.set(root, Value::Array(list))
    }

    /// Return a copy of `root` with item `index` removed from the list at this path.
    pub fn remove_at(&self, root: &Value, index: usize) -> Result<Value, ProfilerError> {
        let Some(Value::Array(items)) = self.get(root) else {
            return Err(self.not_a_list());
        };
        if index >= items.len() {
            return Err(ProfilerError::Edit(format!(
                "Index {} out of bounds for '{}' (len {})",
                index,
                self,
                items.len()
            )));
        }
        let mut list = items.clone();
        list.remove(index);
        self.set(root, Value::Array(list))
    }

    fn not_a_list(&self) -> ProfilerError {
        ProfilerError::Edit(format!("'{}' is not a list", self))
    }
}

impl std::fmt::Display for Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .steps
            .iter()
            .map(|step| match step {
                PathStep::Field(name) => name.clone(),
                PathStep::Index(idx) => idx.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

fn set_at(node: &Value, steps: &[PathStep], value: Value) -> Result<Value, ProfilerError> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(value);
    };

    match step {
        PathStep::Field(name) => {
            let mut obj = match node {
                Value::Object(map) => map.clone(),
                Value::Null => Map::new(),
                other => {
                    return Err(ProfilerError::Edit(format!(
                        "Cannot set field '{}' on {}",
                        name,
                        kind(other)
                    )))
                }
            };
            let updated = set_at(obj.get(name).unwrap_or(&Value::Null), rest, value)?;
            obj.insert(name.clone(), updated);
            Ok(Value::Object(obj))
        }
        PathStep::Index(idx) => {
            let mut arr = match node {
                Value::Array(items) => items.clone(),
                Value::Null => Vec::new(),
                other => {
                    return Err(ProfilerError::Edit(format!(
                        "Cannot index [{}] into {}",
                        idx,
                        kind(other)
                    )))
                }
            };
            let idx = *idx;
            if idx > arr.len() {
                return Err(ProfilerError::Edit(format!(
                    "Index {} out of bounds (len {}); lists grow one item at a time",
                    idx,
                    arr.len()
                )));
            }
            if idx == arr.len() {
                let grown = idx.checked_add(1).ok_or_else(|| {
                    ProfilerError::Edit(format!("Index {} out of bounds", idx))
                })?;
                arr.resize(grown, Value::Null);
            }
            let updated = set_at(&arr[idx], rest, value)?;
            arr[idx] = updated;
            Ok(Value::Array(arr))
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Interpret a command-line value: JSON if it parses, otherwise a plain string.
pub fn parse_loose_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// An in-progress edit of one record.
///
/// Holds the untouched original and a draft. Nothing reaches the store until
/// the caller commits and saves the returned record.
#[derive(Debug, Clone)]
pub struct EditBuffer {
    original: CompanyRecord,
    draft: Value,
}

impl EditBuffer {
    pub fn begin(record: CompanyRecord) -> Result<Self, ProfilerError> {
        let draft = serde_json::to_value(&record)
            .map_err(|e| ProfilerError::Edit(format!("Failed to copy record: {}", e)))?;
        Ok(Self {
            original: record,
            draft,
        })
    }

    pub fn draft(&self) -> &Value {
        &self.draft
    }

    pub fn original(&self) -> &CompanyRecord {
        &self.original
    }

    pub fn set(&mut self, path: &str, value: Value) -> Result<(), ProfilerError> {
        self.draft = Lens::parse(path)?.set(&self.draft, value)?;
        Ok(())
    }

    pub fn push(&mut self, path: &str, item: Value) -> Result<(), ProfilerError> {
        self.draft = Lens::parse(path)?.push(&self.draft, item)?;
        Ok(())
    }

    pub fn remove_at(&mut self, path: &str, index: usize) -> Result<(), ProfilerError> {
        self.draft = Lens::parse(path)?.remove_at(&self.draft, index)?;
        Ok(())
    }

    /// Discard the draft.
    pub fn cancel(self) -> CompanyRecord {
        self.original
    }

    /// Turn the draft back into a record, keeping the original id.
    pub fn commit(self) -> Result<CompanyRecord, ProfilerError> {
        let mut record: CompanyRecord = serde_json::from_value(self.draft)
            .map_err(|e| ProfilerError::Edit(format!("Edited record is invalid: {}", e)))?;
        record.id = self.original.id;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompanyData;
    use chrono::NaiveDate;
    use serde_json::json;

    fn record() -> CompanyRecord {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        CompanyRecord {
            id: "acme-inc".to_string(),
            last_fetched: "2026-10-19T10:00:00+00:00".to_string(),
            data: CompanyData::empty("Acme Inc", day),
        }
    }

    #[test]
    fn test_parse_dotted_and_bracket_paths() {
        let expected = vec![
            PathStep::Field("csrEducationFocus".into()),
            PathStep::Field("csrCommitteeMembers".into()),
            PathStep::Index(0),
            PathStep::Field("name".into()),
        ];
        assert_eq!(
            Lens::parse("csrEducationFocus.csrCommitteeMembers.0.name").unwrap().steps(),
            &expected[..]
        );
        assert_eq!(
            Lens::parse("csrEducationFocus.csrCommitteeMembers[0].name").unwrap().steps(),
            &expected[..]
        );
    }

    #[test]
    fn test_parse_rejects_bad_paths() {
        assert!(Lens::parse("").is_err());
        assert!(Lens::parse("a..b").is_err());
        assert!(Lens::parse("a[x]").is_err());
    }

    #[test]
    fn test_set_leaves_previous_snapshot_untouched() {
        let before = json!({"keyContacts": {"primaryDecisionMaker": {"name": null}}});
        let lens = Lens::parse("keyContacts.primaryDecisionMaker.name").unwrap();
        let after = lens.set(&before, json!("R. Rao")).unwrap();
        assert_eq!(before["keyContacts"]["primaryDecisionMaker"]["name"], Value::Null);
        assert_eq!(after["keyContacts"]["primaryDecisionMaker"]["name"], "R. Rao");
    }

    #[test]
    fn test_set_creates_missing_intermediates() {
        let lens = Lens::parse("a.list.0.name").unwrap();
        let out = lens.set(&json!({}), json!("x")).unwrap();
        assert_eq!(out, json!({"a": {"list": [{"name": "x"}]}}));
    }

    #[test]
    fn test_set_index_appends_one_past_end() {
        let root = json!({"projectLocations": ["Pune"]});
        let out = Lens::parse("projectLocations.1").unwrap().set(&root, json!("Delhi")).unwrap();
        assert_eq!(out["projectLocations"], json!(["Pune", "Delhi"]));
    }

    #[test]
    fn test_set_index_beyond_end_is_error() {
        let root = json!({"projectLocations": ["Pune"]});
        assert!(matches!(
            Lens::parse("projectLocations.2").unwrap().set(&root, json!("x")),
            Err(ProfilerError::Edit(_))
        ));

        let empty = json!({"projectLocations": []});
        for path in ["projectLocations.18446744073709551615", "projectLocations.4000000000"] {
            assert!(matches!(
                Lens::parse(path).unwrap().set(&empty, json!("x")),
                Err(ProfilerError::Edit(_))
            ));
        }
    }

    #[test]
    fn test_set_through_scalar_is_error() {
        let lens = Lens::parse("domain.host").unwrap();
        assert!(matches!(
            lens.set(&json!({"domain": "acme.example"}), json!("x")),
            Err(ProfilerError::Edit(_))
        ));
    }

    #[test]
    fn test_push_and_remove_at() {
        let lens = Lens::parse("projectLocations").unwrap();
        let v = lens.push(&json!({}), json!("Pune")).unwrap();
        let v = lens.push(&v, json!("Delhi")).unwrap();
        assert_eq!(v["projectLocations"], json!(["Pune", "Delhi"]));
        let v = lens.remove_at(&v, 0).unwrap();
        assert_eq!(v["projectLocations"], json!(["Delhi"]));
        assert!(lens.remove_at(&v, 5).is_err());
    }

    #[test]
    fn test_parse_loose_value() {
        assert_eq!(parse_loose_value("true"), json!(true));
        assert_eq!(parse_loose_value("[\"a\"]"), json!(["a"]));
        assert_eq!(parse_loose_value("Large Cap"), json!("Large Cap"));
    }

    #[test]
    fn test_edit_buffer_commit_keeps_id() {
        let mut buffer = EditBuffer::begin(record()).unwrap();
        buffer.set("segmentation", json!("Mid Cap")).unwrap();
        buffer.set("id", json!("hijacked")).unwrap();
        buffer
            .push("csrEducationFocus.csrCommitteeMembers", json!({"name": "A"}))
            .unwrap();
        let committed = buffer.commit().unwrap();
        assert_eq!(committed.id, "acme-inc");
        assert_eq!(committed.data.segmentation.as_deref(), Some("Mid Cap"));
        assert_eq!(
            committed.data.csr_education_focus.csr_committee_members[0].name.as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_edit_buffer_cancel_returns_original() {
        let original = record();
        let mut buffer = EditBuffer::begin(original.clone()).unwrap();
        buffer.set("priority", json!("High")).unwrap();
        assert_eq!(buffer.cancel(), original);
    }

    #[test]
    fn test_edit_buffer_commit_rejects_bad_shape() {
        let mut buffer = EditBuffer::begin(record()).unwrap();
        buffer.set("promoterLed", json!("maybe")).unwrap();
        assert!(matches!(buffer.commit(), Err(ProfilerError::Edit(_))));
    }
}
