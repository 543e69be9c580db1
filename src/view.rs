//! Grouping and filtering over stored records.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::CompanyRecord;

/// The pseudo-group that matches every record.
pub const ALL_GROUP: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingCriteria {
    #[default]
    Segmentation,
    IndustryType,
}

impl GroupingCriteria {
    /// Label for records with no value for this criterion.
    pub fn uncategorized_label(self) -> &'static str {
        match self {
            GroupingCriteria::Segmentation => "Unsegmented",
            GroupingCriteria::IndustryType => "Unspecified Sector",
        }
    }

    /// The group a record falls into. Missing and blank values are uncategorized.
    pub fn group_of(self, record: &CompanyRecord) -> String {
        let value = match self {
            GroupingCriteria::Segmentation => record.data.segmentation.as_deref(),
            GroupingCriteria::IndustryType => record.data.industry_type.as_deref(),
        };
        match value {
            Some(v) if !v.trim().is_empty() => v.to_string(),
            _ => self.uncategorized_label().to_string(),
        }
    }
}

impl fmt::Display for GroupingCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingCriteria::Segmentation => write!(f, "segmentation"),
            GroupingCriteria::IndustryType => write!(f, "industryType"),
        }
    }
}

impl FromStr for GroupingCriteria {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "segmentation" => Ok(GroupingCriteria::Segmentation),
            "industrytype" | "industry" => Ok(GroupingCriteria::IndustryType),
            other => Err(format!("Unknown grouping criteria: {}", other)),
        }
    }
}

/// `["All", ...sorted unique group labels]`.
pub fn group_keys(records: &[CompanyRecord], criteria: GroupingCriteria) -> Vec<String> {
    let labels: BTreeSet<String> = records.iter().map(|r| criteria.group_of(r)).collect();
    std::iter::once(ALL_GROUP.to_string()).chain(labels).collect()
}

fn matches_location(record: &CompanyRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record
        .data
        .office_location
        .as_deref()
        .is_some_and(|loc| loc.to_lowercase().contains(needle))
}

fn matches_group(record: &CompanyRecord, criteria: GroupingCriteria, active_key: &str) -> bool {
    active_key == ALL_GROUP || criteria.group_of(record) == active_key
}

/// Records whose office location contains `location_filter` (case-insensitive)
/// and that fall in `active_key`, sorted by company name.
pub fn filter_records<'a>(
    records: &'a [CompanyRecord],
    location_filter: &str,
    criteria: GroupingCriteria,
    active_key: &str,
) -> Vec<&'a CompanyRecord> {
    let needle = location_filter.trim().to_lowercase();
    let mut out: Vec<&CompanyRecord> = records
        .iter()
        .filter(|r| matches_location(r, &needle))
        .filter(|r| matches_group(r, criteria, active_key))
        .collect();
    out.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
    });
    out
}

/// How many records `filter_records` would return for `group_key`.
pub fn count_for_group(
    records: &[CompanyRecord],
    location_filter: &str,
    criteria: GroupingCriteria,
    group_key: &str,
) -> usize {
    let needle = location_filter.trim().to_lowercase();
    records
        .iter()
        .filter(|r| matches_location(r, &needle) && matches_group(r, criteria, group_key))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompanyData;
    use chrono::NaiveDate;

    fn record(name: &str, segmentation: Option<&str>, industry: Option<&str>, office: Option<&str>) -> CompanyRecord {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut data = CompanyData::empty(name, day);
        data.segmentation = segmentation.map(str::to_string);
        data.industry_type = industry.map(str::to_string);
        data.office_location = office.map(str::to_string);
        CompanyRecord {
            id: crate::util::company_to_id(name),
            last_fetched: String::new(),
            data,
        }
    }

    fn sample() -> Vec<CompanyRecord> {
        vec![
            record("Zeta Steel", Some("Large Cap"), Some("Manufacturing"), Some("Mumbai, MH")),
            record("Acme Inc", Some("SME"), None, Some("Pune")),
            record("Globex", None, Some("Technology"), Some("Bengaluru")),
            record("Initech", Some(""), Some("Technology"), None),
            record("Hooli", Some("N/A"), Some("Technology"), Some("Mountain View")),
        ]
    }

    #[test]
    fn test_group_keys_sorted_with_all_first() {
        let keys = group_keys(&sample(), GroupingCriteria::Segmentation);
        assert_eq!(keys, vec!["All", "Large Cap", "N/A", "SME", "Unsegmented"]);

        let keys = group_keys(&sample(), GroupingCriteria::IndustryType);
        assert_eq!(keys, vec!["All", "Manufacturing", "Technology", "Unspecified Sector"]);
    }

    #[test]
    fn test_filter_all_sorted_by_name() {
        let records = sample();
        let names: Vec<&str> = filter_records(&records, "", GroupingCriteria::Segmentation, ALL_GROUP)
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["Acme Inc", "Globex", "Hooli", "Initech", "Zeta Steel"]);
    }

    #[test]
    fn test_filter_sort_ignores_case() {
        let records = vec![
            record("Zeta Steel", None, None, None),
            record("acme labs", None, None, None),
            record("Acme Labs", None, None, None),
            record("beta corp", None, None, None),
        ];
        let names: Vec<&str> = filter_records(&records, "", GroupingCriteria::Segmentation, ALL_GROUP)
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["Acme Labs", "acme labs", "beta corp", "Zeta Steel"]);
    }

    #[test]
    fn test_filter_by_group_and_location() {
        let records = sample();
        let unsegmented =
            filter_records(&records, "", GroupingCriteria::Segmentation, "Unsegmented");
        assert_eq!(unsegmented.len(), 2);

        let tech_in_bengaluru =
            filter_records(&records, "bengal", GroupingCriteria::IndustryType, "Technology");
        assert_eq!(tech_in_bengaluru.len(), 1);
        assert_eq!(tech_in_bengaluru[0].name(), "Globex");

        let mumbai = filter_records(&records, "MUMBAI", GroupingCriteria::Segmentation, ALL_GROUP);
        assert_eq!(mumbai.len(), 1);
    }

    #[test]
    fn test_count_for_group_matches_filter() {
        let records = sample();
        for key in group_keys(&records, GroupingCriteria::IndustryType) {
            assert_eq!(
                count_for_group(&records, "", GroupingCriteria::IndustryType, &key),
                filter_records(&records, "", GroupingCriteria::IndustryType, &key).len()
            );
        }
        assert_eq!(count_for_group(&records, "", GroupingCriteria::IndustryType, ALL_GROUP), 5);
    }

    #[test]
    fn test_criteria_from_str() {
        assert_eq!("industry-type".parse::<GroupingCriteria>().unwrap(), GroupingCriteria::IndustryType);
        assert_eq!("Segmentation".parse::<GroupingCriteria>().unwrap(), GroupingCriteria::Segmentation);
        assert!("size".parse::<GroupingCriteria>().is_err());
    }
}
