//! Minimal-quoting delimited row codec
//!
//! The ledger schema is pipe-delimited with minimal quoting: a field is
//! quoted only when it contains the delimiter, a quote, or a line break;
//! embedded quotes are doubled. The same codec reads the comma-delimited
//! input segment table, so quoted fields may span line breaks.

/// Render one row. Fields are quoted only when they need to be.
pub fn format_row(fields: &[&str], delimiter: char) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        if field.contains(delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r')
        {
            out.push('"');
            for ch in field.chars() {
                if ch == '"' {
                    out.push('"');
                }
                out.push(ch);
            }
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out
}

/// Parse a whole table. Quoted fields may contain the delimiter and
/// line breaks; `""` inside a quoted field is a literal quote.
///
/// Returns one field list per record. Empty trailing lines are dropped.
pub fn parse_records(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
        } else if ch == '"' && field.is_empty() {
            in_quotes = true;
        } else if ch == delimiter {
            record.push(std::mem::take(&mut field));
            // an empty final field is still a field
        } else if ch == '\n' || ch == '\r' {
            if ch == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            record.push(std::mem::take(&mut field));
            if !(record.len() == 1 && record[0].is_empty()) {
                records.push(std::mem::take(&mut record));
            } else {
                record.clear();
            }
        } else {
            field.push(ch);
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Parse a single record.
pub fn parse_row(line: &str, delimiter: char) -> Vec<String> {
    parse_records(line, delimiter).into_iter().next().unwrap_or_default()
}
