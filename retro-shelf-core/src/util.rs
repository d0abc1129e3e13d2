/// Split a delimited settings list, trimming entries and dropping empties.
///
/// `split_list("all, favorites,,recent", ',')` yields `["all", "favorites", "recent"]`.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join entries into a delimited settings list. Inverse of [`split_list`].
pub fn join_list<S: AsRef<str>>(items: &[S], delimiter: char) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(item.as_ref());
    }
    out
}

/// Parse a leading integer the way C's `atoi` does: optional sign, then
/// digits, stopping at the first non-digit. Returns 0 when nothing parses.
pub fn parse_leading_int(value: &str) -> i64 {
    let s = value.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|v| v * sign).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(
            split_list("all, favorites,,recent ", ','),
            vec!["all", "favorites", "recent"]
        );
        assert!(split_list("", ',').is_empty());
    }

    #[test]
    fn join_list_round_trips() {
        let items = vec!["a", "b c", "d"];
        assert_eq!(join_list(&items, ','), "a,b c,d");
        assert_eq!(split_list(&join_list(&items, ','), ','), items);
        assert_eq!(join_list::<&str>(&[], ','), "");
    }

    #[test]
    fn parse_leading_int_behaves_like_atoi() {
        assert_eq!(parse_leading_int("4"), 4);
        assert_eq!(parse_leading_int("  12abc"), 12);
        assert_eq!(parse_leading_int("-3"), -3);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int(""), 0);
    }
}
