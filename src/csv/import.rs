//! CSV import of company names (and optional registration numbers).

use crate::error::ProfilerError;

/// One company to fetch, as read from an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub name: String,
    pub cin: Option<String>,
}

/// Split one CSV line on commas, honouring double quotes.
///
/// A quoted field may contain commas and doubled quotes (`""`). Fields are
/// trimmed; unquoted whitespace around a quoted field is dropped.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(ch),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Read an import file.
///
/// The first non-blank line is the header. `name_header` must be present;
/// a missing `cin_header` only means no row carries a registration number.
/// Rows with a blank name are skipped.
pub fn parse_import(
    content: &str,
    name_header: &str,
    cin_header: &str,
) -> Result<Vec<ImportRow>, ProfilerError> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Err(ProfilerError::ImportFormat(
            "CSV file is empty or has no header/data rows.".to_string(),
        ));
    };

    let headers = split_csv_line(header_line);
    let name_idx = headers.iter().position(|h| h == name_header).ok_or_else(|| {
        ProfilerError::ImportFormat(format!("CSV header \"{}\" not found.", name_header))
    })?;
    let cin_idx = headers.iter().position(|h| h == cin_header);
    if cin_idx.is_none() {
        log::warn!(
            "CSV header \"{}\" not found. CSV CIN numbers will not be imported.",
            cin_header
        );
    }

    let rows: Vec<ImportRow> = lines
        .filter_map(|line| {
            let values = split_csv_line(line);
            let name = values.get(name_idx).filter(|n| !n.is_empty())?.clone();
            let cin = cin_idx
                .and_then(|i| values.get(i))
                .filter(|c| !c.is_empty())
                .cloned();
            Some(ImportRow { name, cin })
        })
        .collect();

    if rows.is_empty() {
        return Err(ProfilerError::ImportFormat(
            "No valid company entries found in CSV after header.".to_string(),
        ));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "Names of Organisation";
    const CIN: &str = "CIN";

    #[test]
    fn test_split_plain_and_quoted() {
        assert_eq!(split_csv_line("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(
            split_csv_line("\"Acme, Inc\",\"say \"\"hi\"\"\",x"),
            vec!["Acme, Inc", "say \"hi\"", "x"]
        );
        assert_eq!(split_csv_line("a,,"), vec!["a", "", ""]);
    }

    #[test]
    fn test_import_with_cin() {
        let csv = "Names of Organisation,CIN\r\nAcme Inc,U123\n\nGlobex,\n";
        let rows = parse_import(csv, NAME, CIN).unwrap();
        assert_eq!(
            rows,
            vec![
                ImportRow { name: "Acme Inc".into(), cin: Some("U123".into()) },
                ImportRow { name: "Globex".into(), cin: None },
            ]
        );
    }

    #[test]
    fn test_import_quoted_header_and_comma_names() {
        let csv = "\"CIN\",\"Names of Organisation\"\n\"L1\",\"Tata Sons, Pvt\"";
        let rows = parse_import(csv, NAME, CIN).unwrap();
        assert_eq!(rows[0].name, "Tata Sons, Pvt");
        assert_eq!(rows[0].cin.as_deref(), Some("L1"));
    }

    #[test]
    fn test_import_missing_cin_column_is_ok() {
        let rows = parse_import("Names of Organisation\nAcme Inc", NAME, CIN).unwrap();
        assert_eq!(rows, vec![ImportRow { name: "Acme Inc".into(), cin: None }]);
    }

    #[test]
    fn test_import_missing_name_column_fails() {
        let err = parse_import("Company,CIN\nAcme Inc,U1", NAME, CIN).unwrap_err();
        assert!(err.requires_user_action());
        assert!(err.to_string().contains("Names of Organisation"));
    }

    #[test]
    fn test_import_no_rows_fails() {
        assert!(matches!(
            parse_import("Names of Organisation,CIN\n,U1\n", NAME, CIN),
            Err(ProfilerError::ImportFormat(_))
        ));
        assert!(matches!(
            parse_import("   \n", NAME, CIN),
            Err(ProfilerError::ImportFormat(_))
        ));
    }

    #[test]
    fn test_import_custom_headers() {
        let rows = parse_import("Org;ignored,Reg\nAcme,R9", "Org;ignored", "Reg").unwrap();
        assert_eq!(rows[0].cin.as_deref(), Some("R9"));
    }
}
