//! Case lists as CSV with the nine labelled columns.
//!
//! Rows end in CRLF. Fields holding a comma, quote, CR or LF are quoted, with
//! embedded quotes doubled.

use uiwalk_core::TestCase;
use uiwalk_core::case::EXPORT_COLUMNS;

/// A case CSV that could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsvError {
    #[error("unterminated quoted field on row {row}")]
    UnterminatedQuote { row: usize },
    #[error("header does not match the case columns: {found}")]
    BadHeader { found: String },
    #[error("row {row} has {found} columns, expected 9")]
    ColumnCount { row: usize, found: usize },
    #[error("row {row}: {message}")]
    BadValue { row: usize, message: String },
}

/// Quote a field when it needs it.
pub fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let row = fields
        .into_iter()
        .map(escape_field)
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push_str("\r\n");
}

pub(crate) fn export_rows<'a>(cases: impl IntoIterator<Item = &'a TestCase>) -> String {
    let mut out = String::new();
    write_row(&mut out, EXPORT_COLUMNS);
    for case in cases {
        write_row(&mut out, case.column_values());
    }
    out
}

/// Export cases as CSV: a header row of the column labels, then one row per case.
pub fn export_csv(cases: &[TestCase]) -> String {
    export_rows(cases)
}

fn end_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, field: &mut String) {
    row.push(std::mem::take(field));
    let done = std::mem::take(row);
    if !(done.len() == 1 && done[0].is_empty()) {
        rows.push(done);
    }
}

/// Split CSV text into rows of fields. Blank lines are skipped.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => end_row(&mut rows, &mut row, &mut field),
            c => field.push(c),
        }
    }
    if in_quotes {
        return Err(CsvError::UnterminatedQuote {
            row: rows.len() + 1,
        });
    }
    if !row.is_empty() || !field.is_empty() {
        end_row(&mut rows, &mut row, &mut field);
    }
    Ok(rows)
}

/// Read a case CSV written by [`export_csv`] (or by hand with the same header).
pub fn import_csv(text: &str) -> Result<Vec<TestCase>, CsvError> {
    let rows = parse_rows(text)?;
    let Some((header, body)) = rows.split_first() else {
        return Ok(Vec::new());
    };
    let header_matches = header.len() == EXPORT_COLUMNS.len()
        && header.iter().zip(EXPORT_COLUMNS).all(|(h, c)| h.trim() == c);
    if !header_matches {
        return Err(CsvError::BadHeader {
            found: header.join(","),
        });
    }

    body.iter()
        .enumerate()
        .map(|(i, fields)| {
            let row = i + 2;
            let [case_id, module, check_point, principle, check_item, priority, expected, status, notes] =
                <[String; 9]>::try_from(fields.clone()).map_err(|f| CsvError::ColumnCount {
                    row,
                    found: f.len(),
                })?;
            let bad = |e: uiwalk_core::ParseLabelError| CsvError::BadValue {
                row,
                message: e.to_string(),
            };
            let mut case = TestCase::new(
                module,
                check_point,
                principle.parse().map_err(bad)?,
                check_item,
                priority.parse().map_err(bad)?,
                expected,
            );
            case.case_id = case_id;
            case.status = if status.trim().is_empty() {
                Default::default()
            } else {
                status.parse().map_err(bad)?
            };
            case.notes = notes;
            Ok(case)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiwalk_core::{DesignPrinciple, Priority};

    fn case() -> TestCase {
        let mut c = TestCase::new(
            "首页",
            "按钮",
            DesignPrinciple::ComponentStates,
            "检查按钮, 含 \"主按钮\"",
            Priority::High,
            "有禁用态",
        );
        c.case_id = "UI-TC001".into();
        c
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("x\ny"), "\"x\ny\"");
    }

    #[test]
    fn test_header_row() {
        let out = export_csv(&[]);
        assert_eq!(
            out,
            "用例编号,页面/模块,检查点,设计原则,检查项,优先级,预期结果/设计标准,是否通过,截图/备注\r\n"
        );
    }

    #[test]
    fn test_row_quoting() {
        let out = export_csv(&[case()]);
        let row = out.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "UI-TC001,首页,按钮,组件状态完整性原则,\"检查按钮, 含 \"\"主按钮\"\"\",高,有禁用态,待测试,"
        );
    }

    #[test]
    fn test_import_reads_export() {
        let original = vec![case()];
        let back = import_csv(&export_csv(&original)).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_import_accepts_bom_and_blank_status() {
        let text = "\u{feff}用例编号,页面/模块,检查点,设计原则,检查项,优先级,预期结果/设计标准,是否通过,截图/备注\n\
                    UI-TC001,首页,标题,视觉一致性原则,检查标题,中,16px,,\n\n";
        let cases = import_csv(text).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].priority, Priority::Medium);
        assert_eq!(cases[0].status, uiwalk_core::PassStatus::Pending);
    }

    #[test]
    fn test_import_errors() {
        assert!(matches!(
            import_csv("a,b\n1,2\n"),
            Err(CsvError::BadHeader { .. })
        ));
        let header = export_csv(&[]);
        assert!(matches!(
            import_csv(&format!("{header}UI-TC001,首页\r\n")),
            Err(CsvError::ColumnCount { row: 2, found: 2 })
        ));
        assert!(matches!(
            import_csv(&format!("{header}1,2,3,设计原则?,5,高,7,,\r\n")),
            Err(CsvError::BadValue { row: 2, .. })
        ));
        assert!(matches!(
            parse_rows("\"open"),
            Err(CsvError::UnterminatedQuote { .. })
        ));
    }
}
