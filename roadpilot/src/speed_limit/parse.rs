//! Parsing of free-text `maxspeed` values.

/// Reads the leading number of a speed-limit tag.
///
/// `"50"` and `"50 mph"` both yield 50; the unit suffix is not converted.
/// Values without a leading number (`"varies"`, `"none"`, `"signals"`, `""`)
/// yield `None`, as do numbers too large for a `u32`.
pub fn parse_speed_limit(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits_len = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(i, _)| i);

    if digits_len == 0 {
        return None;
    }

    trimmed[..digits_len].parse().ok()
}

/// Picks the authoritative limit from provider tags.
///
/// Only the first element counts, even if later elements carry a value.
pub fn first_tagged_limit(tags: &[Option<String>]) -> Option<u32> {
    tags.first()?.as_deref().and_then(parse_speed_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_number() {
        assert_eq!(parse_speed_limit("50"), Some(50));
        assert_eq!(parse_speed_limit("120"), Some(120));
        assert_eq!(parse_speed_limit(" 30"), Some(30));
    }

    #[test]
    fn test_unit_suffix() {
        assert_eq!(parse_speed_limit("50 mph"), Some(50));
        assert_eq!(parse_speed_limit("70km/h"), Some(70));
        assert_eq!(parse_speed_limit("90;110"), Some(90));
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(parse_speed_limit("varies"), None);
        assert_eq!(parse_speed_limit("none"), None);
        assert_eq!(parse_speed_limit("signals"), None);
        assert_eq!(parse_speed_limit("RU:urban"), None);
        assert_eq!(parse_speed_limit(""), None);
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(parse_speed_limit("99999999999"), None);
    }

    #[test]
    fn test_parse_is_idempotent() {
        for _ in 0..2 {
            assert_eq!(parse_speed_limit("varies"), None);
        }
        assert_eq!(parse_speed_limit("50"), parse_speed_limit("50"));
    }

    #[test]
    fn test_first_element_is_authoritative() {
        let tags = vec![Some("30".to_string()), Some("90".to_string())];
        assert_eq!(first_tagged_limit(&tags), Some(30));

        let untagged_first = vec![None, Some("90".to_string())];
        assert_eq!(first_tagged_limit(&untagged_first), None);

        let unparsable_first = vec![Some("varies".to_string()), Some("90".to_string())];
        assert_eq!(first_tagged_limit(&unparsable_first), None);

        assert_eq!(first_tagged_limit(&[]), None);
    }
}
