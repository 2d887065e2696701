//! Normalization of free-text contact fields.

use chrono::NaiveDate;

/// Trims the input; blank or absent input becomes `None`.
pub fn sanitize_string(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reduces a phone number to its digits, keeping one leading `+` when the
/// trimmed input starts with one.
///
/// Returns `None` for blank input or input without any digit, so a lone
/// `+` yields `None` rather than `"+"`. A contact needs a phone number,
/// and a bare sign is not one. Applying the function to its own output
/// returns the same value.
pub fn clean_phone_number(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    Some(format!("{prefix}{digits}"))
}

/// Parses a birthday in `YYYY-MM-DD`, or the compact `YYYYMMDD` used by
/// vCard `BDAY`. Anything else is treated as no birthday.
pub fn parse_birthday(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    match value.len() {
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        8 if value.chars().all(|c| c.is_ascii_digit()) => {
            NaiveDate::parse_from_str(value, "%Y%m%d").ok()
        }
        _ => None,
    }
}

/// Splits a `;`-joined list of category ids.
pub fn split_category_ids(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Strips a `data:<mime>;base64,` prefix, returning the declared mime type
/// (if any) and the bare payload.
pub fn strip_data_uri(value: &str) -> (Option<&str>, &str) {
    let value = value.trim();
    let Some(rest) = value.strip_prefix("data:") else {
        return (None, value);
    };

    match rest.split_once(',') {
        Some((meta, data)) => {
            let mime = meta.split(';').next().filter(|m| !m.is_empty());
            (mime, data.trim())
        }
        None => (None, rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string(Some("  Jane  ")), Some("Jane".to_string()));
        assert_eq!(sanitize_string(Some("   ")), None);
        assert_eq!(sanitize_string(Some("")), None);
        assert_eq!(sanitize_string(None), None);
    }

    #[test]
    fn test_clean_phone_number() {
        assert_eq!(
            clean_phone_number(Some(" +1 (555) 010-0199 ")),
            Some("+15550100199".to_string())
        );
        assert_eq!(
            clean_phone_number(Some("555-123")),
            Some("555123".to_string())
        );
        // Only a leading plus survives
        assert_eq!(
            clean_phone_number(Some("55+5")),
            Some("555".to_string())
        );
        assert_eq!(
            clean_phone_number(Some("++44 20")),
            Some("+4420".to_string())
        );
        assert_eq!(clean_phone_number(Some("n/a")), None);
        assert_eq!(clean_phone_number(Some(" + ")), None);
        assert_eq!(clean_phone_number(Some("")), None);
        assert_eq!(clean_phone_number(None), None);
    }

    #[test]
    fn test_clean_phone_number_idempotent() {
        let samples = [
            "+1 555 0100",
            "++12",
            "(020) 7946-0958",
            " + 33 1 ",
            "tel:+49-30-1234",
            "0",
            "+",
        ];

        for sample in samples {
            let once = clean_phone_number(Some(sample));
            let twice = clean_phone_number(once.as_deref());
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_parse_birthday() {
        let expected = NaiveDate::from_ymd_opt(1990, 1, 2);
        assert_eq!(parse_birthday("1990-01-02"), expected);
        assert_eq!(parse_birthday(" 19900102 "), expected);
        assert_eq!(parse_birthday("1990-13-02"), None);
        assert_eq!(parse_birthday("02/01/1990"), None);
        assert_eq!(parse_birthday("1990-1-2"), None);
        assert_eq!(parse_birthday(""), None);
    }

    #[test]
    fn test_split_category_ids() {
        assert_eq!(split_category_ids("a; b;;c "), vec!["a", "b", "c"]);
        assert!(split_category_ids("").is_empty());
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(
            strip_data_uri("data:image/png;base64,AAAA"),
            (Some("image/png"), "AAAA")
        );
        assert_eq!(strip_data_uri("AAAA"), (None, "AAAA"));
    }
}
