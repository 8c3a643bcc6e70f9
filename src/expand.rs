//! Brace, range and numeric expansion of identifier patterns.

use crate::ast::{Fragment, Pattern, RangeSpec};
use crate::error::{Error, Result};

/// Expands a pattern into every string it denotes, left fragment major.
///
/// `max_range_len` caps the element count of any single range.
pub fn expand_pattern(pattern: &Pattern, max_range_len: Option<usize>) -> Result<Vec<String>> {
    let mut acc = vec![String::new()];

    for fragment in &pattern.fragments {
        let values = expand_fragment(fragment, max_range_len)?;
        if values.len() == 1 {
            for prefix in &mut acc {
                prefix.push_str(&values[0]);
            }
            continue;
        }

        let mut next = Vec::with_capacity(acc.len() * values.len());
        for prefix in &acc {
            for value in &values {
                next.push(format!("{}{}", prefix, value));
            }
        }
        acc = next;
    }

    Ok(acc)
}

fn expand_fragment(fragment: &Fragment, max_range_len: Option<usize>) -> Result<Vec<String>> {
    match fragment {
        Fragment::Text(text) => Ok(vec![text.clone()]),
        Fragment::Range(range) => expand_range(range, max_range_len),
        Fragment::Alternation(alternatives) => {
            let mut out = Vec::new();
            for alternative in alternatives {
                out.extend(expand_pattern(alternative, max_range_len)?);
            }
            Ok(out)
        }
    }
}

fn is_numeric(bound: &str) -> bool {
    !bound.is_empty() && bound.bytes().all(|b| b.is_ascii_digit())
}

fn single_letter(bound: &str) -> Option<char> {
    let mut chars = bound.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}

/// Element count of `lo..=hi`, checked against `max_range_len`.
fn check_len(range: &RangeSpec, lo: u64, hi: u64, max_range_len: Option<usize>) -> Result<()> {
    let len = (hi - lo)
        .checked_add(1)
        .ok_or_else(|| Error::invalid_range(range, "range is too large"))?;
    match max_range_len {
        Some(max) if len > max as u64 => Err(Error::invalid_range(
            range,
            format!("{} elements exceeds the limit of {}", len, max),
        )),
        _ => Ok(()),
    }
}

/// Enumerates a closed range: numeric bounds keep the zero-pad width of
/// `start`, single-letter bounds step through the alphabet.
pub fn expand_range(range: &RangeSpec, max_range_len: Option<usize>) -> Result<Vec<String>> {
    let (start, end) = (range.start.as_str(), range.end.as_str());

    if start.is_empty() || end.is_empty() {
        return Err(Error::invalid_range(range, "missing bound"));
    }

    if is_numeric(start) && is_numeric(end) {
        let lo: u64 = start
            .parse()
            .map_err(|_| Error::invalid_range(range, "start bound is too large"))?;
        let hi: u64 = end
            .parse()
            .map_err(|_| Error::invalid_range(range, "end bound is too large"))?;
        if hi < lo {
            return Err(Error::invalid_range(range, "end is before start"));
        }
        check_len(range, lo, hi, max_range_len)?;

        let width = range.width;
        return Ok((lo..=hi).map(|n| format!("{:0width$}", n, width = width)).collect());
    }

    match (single_letter(start), single_letter(end)) {
        (Some(lo), Some(hi)) => {
            if lo.is_ascii_lowercase() != hi.is_ascii_lowercase() {
                return Err(Error::invalid_range(range, "bounds differ in case"));
            }
            if hi < lo {
                return Err(Error::invalid_range(range, "end is before start"));
            }
            check_len(range, u64::from(lo), u64::from(hi), max_range_len)?;
            Ok((lo..=hi).map(String::from).collect())
        }
        _ => Err(Error::invalid_range(
            range,
            "bounds must both be numbers or both be single letters",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_pattern;

    fn expand(word: &str) -> Result<Vec<String>> {
        expand_pattern(&parse_pattern(word, 0).unwrap(), None)
    }

    #[test]
    fn test_simple_numeric_range() {
        assert_eq!(expand("{1-3}").unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_zero_padding_is_preserved() {
        assert_eq!(expand("{01-03}").unwrap(), vec!["01", "02", "03"]);
        assert_eq!(expand("web{098-100}").unwrap(), vec!["web098", "web099", "web100"]);
    }

    #[test]
    fn test_unpadded_range_crossing_widths() {
        assert_eq!(expand("{8-10}").unwrap(), vec!["8", "9", "10"]);
    }

    #[test]
    fn test_alpha_range() {
        assert_eq!(expand("{a-c}").unwrap(), vec!["a", "b", "c"]);
        assert_eq!(expand("rack{X-Z}").unwrap(), vec!["rackX", "rackY", "rackZ"]);
    }

    #[test]
    fn test_prefix_and_suffix_compose() {
        assert_eq!(
            expand("web{1-2}.dc{a-b}").unwrap(),
            vec!["web1.dca", "web1.dcb", "web2.dca", "web2.dcb"]
        );
    }

    #[test]
    fn test_alternation_and_nesting() {
        assert_eq!(expand("{a,b}.dc").unwrap(), vec!["a.dc", "b.dc"]);
        assert_eq!(expand("a{b{1-2},c}").unwrap(), vec!["ab1", "ab2", "ac"]);
    }

    #[test]
    fn test_dot_dot_ranges() {
        assert_eq!(expand("n1..3.dc").unwrap(), vec!["n1.dc", "n2.dc", "n3.dc"]);
        assert_eq!(expand("n10..2").unwrap(), vec!["n10", "n11", "n12"]);
        assert_eq!(expand("n01..n03").unwrap(), vec!["n01", "n02", "n03"]);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(expand("{3-1}"), Err(Error::InvalidRange { .. })));
        assert!(matches!(expand("{c-a}"), Err(Error::InvalidRange { .. })));
        assert!(matches!(expand("{1-c}"), Err(Error::InvalidRange { .. })));
        assert!(matches!(expand("{a-C}"), Err(Error::InvalidRange { .. })));
        assert!(matches!(expand("{ab-cd}"), Err(Error::InvalidRange { .. })));
        assert!(matches!(expand("{-3}"), Err(Error::InvalidRange { .. })));
        assert!(matches!(expand("n1..m3"), Err(Error::InvalidRange { .. })));
        assert!(matches!(
            expand("{1-99999999999999999999999}"),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_range_length_limit() {
        let pattern = parse_pattern("{1-100}", 0).unwrap();
        assert!(expand_pattern(&pattern, Some(100)).is_ok());
        let err = expand_pattern(&pattern, Some(99)).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"));
    }

    #[test]
    fn test_full_u64_range_is_rejected_not_wrapped() {
        let pattern = parse_pattern("x{0-18446744073709551615}", 0).unwrap();
        for limit in [None, Some(10)] {
            let err = expand_pattern(&pattern, limit).unwrap_err();
            assert!(matches!(err, Error::InvalidRange { .. }));
            assert!(err.to_string().contains("range is too large"), "{}", err);
        }

        let capped = parse_pattern("x{1-18446744073709551615}", 0).unwrap();
        let err = expand_pattern(&capped, Some(10)).unwrap_err();
        assert!(err.to_string().contains("exceeds the limit of 10"));
    }

    #[test]
    fn test_invalid_range_message_names_the_range() {
        let err = expand("{3-1}").unwrap_err();
        assert_eq!(err.to_string(), "invalid range {3-1}: end is before start");
    }
}
