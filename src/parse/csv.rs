/// Split CSV text into records of fields.
///
/// Dialect: fields separated by commas, optionally wrapped in double quotes;
/// inside quotes a doubled quote is a literal quote and commas are data.
/// CRLF and LF line endings both terminate records; a trailing newline does
/// not produce an empty record. Newlines inside quoted fields are kept.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut saw_any = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        saw_any = true;
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
                saw_any = false;
            }
            '\n' => {
                fields.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut fields));
                saw_any = false;
            }
            _ => field.push(c),
        }
    }

    // Final record without a trailing newline
    if saw_any || !fields.is_empty() {
        fields.push(field);
        records.push(fields);
    }

    records
}

/// Quote a field for emission if it needs it. Empty fields are emitted as
/// the quoted-empty form `""` only when `force_quote` asks for it, matching
/// the catalog source's integrations column.
pub fn escape_field(field: &str, force_quote: bool) -> String {
    let needs_quotes =
        force_quote || field.contains(',') || field.contains('"') || field.contains('\n');
    if !needs_quotes {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Join fields into one CSV record line, no trailing newline
pub fn write_record(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f, false))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_plain_fields() {
        let records = parse_records("a,b,c\nd,e,f");
        assert_eq!(records, vec![rec(&["a", "b", "c"]), rec(&["d", "e", "f"])]);
    }

    #[test]
    fn test_parse_quoted_field_with_comma() {
        let records = parse_records("Cash,1,\"NetSuite,Ramp\"");
        assert_eq!(records, vec![rec(&["Cash", "1", "NetSuite,Ramp"])]);
    }

    #[test]
    fn test_parse_quoted_empty() {
        let records = parse_records("a,\"\",c");
        assert_eq!(records, vec![rec(&["a", "", "c"])]);
    }

    #[test]
    fn test_parse_escaped_quote() {
        let records = parse_records("\"say \"\"hi\"\"\",x");
        assert_eq!(records, vec![rec(&["say \"hi\"", "x"])]);
    }

    #[test]
    fn test_parse_crlf_and_trailing_newline() {
        let records = parse_records("a,b\r\nc,d\n");
        assert_eq!(records, vec![rec(&["a", "b"]), rec(&["c", "d"])]);
    }

    #[test]
    fn test_parse_trailing_empty_field() {
        let records = parse_records("a,b,");
        assert_eq!(records, vec![rec(&["a", "b", ""])]);
    }

    #[test]
    fn test_parse_newline_inside_quotes() {
        let records = parse_records("a,\"line one\nline two\",b");
        assert_eq!(records, vec![rec(&["a", "line one\nline two", "b"])]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_records("").is_empty());
    }

    #[test]
    fn test_escape_round_trip() {
        for field in ["plain", "with,comma", "with \"quotes\"", ""] {
            let line = write_record(&[field.to_string(), "tail".to_string()]);
            let back = parse_records(&line);
            assert_eq!(back[0][0], field);
            assert_eq!(back[0][1], "tail");
        }
    }

    #[test]
    fn test_force_quote_empty() {
        assert_eq!(escape_field("", true), "\"\"");
        assert_eq!(escape_field("", false), "");
        assert_eq!(escape_field("Bank", true), "\"Bank\"");
    }
}
