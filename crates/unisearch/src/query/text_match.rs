//! Case-insensitive substring matching with byte offsets that stay valid
//! in the original haystack.
//!
//! Lowercasing can change the byte length of a string, so lowercasing the
//! whole haystack up front would give offsets into the wrong text. The
//! scan here lowercases per character while walking the original bytes,
//! keeping every reported span on a char boundary of the input.

/// Finds the first case-insensitive occurrence of `needle` in `haystack`.
/// Returns the byte offset and byte length of the match in `haystack`.
pub fn find_ci(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();

    // ASCII first char lets memchr skip to candidate positions
    let first = needle_lower[0];
    if first.is_ascii() {
        let lower = first as u8;
        let upper = first.to_ascii_uppercase() as u8;
        let bytes = haystack.as_bytes();
        let mut offset = 0;
        while let Some(pos) = memchr::memchr2(lower, upper, &bytes[offset..]) {
            let start = offset + pos;
            if let Some(len) = match_at(&haystack[start..], &needle_lower) {
                return Some((start, len));
            }
            offset = start + 1;
        }
        return None;
    }

    for (start, _) in haystack.char_indices() {
        if let Some(len) = match_at(&haystack[start..], &needle_lower) {
            return Some((start, len));
        }
    }
    None
}

/// True when `haystack` contains `needle` ignoring case.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    find_ci(haystack, needle).is_some()
}

/// True when `haystack` starts with `needle` ignoring case.
pub fn starts_with_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    match_at(haystack, &needle_lower).is_some()
}

/// True when `haystack` ends with `needle` ignoring case.
pub fn ends_with_ci(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    haystack
        .char_indices()
        .any(|(start, _)| match_at(&haystack[start..], &needle_lower) == Some(haystack.len() - start))
}

/// Number of non-overlapping case-insensitive occurrences.
pub fn count_ci(haystack: &str, needle: &str) -> usize {
    let mut count = 0;
    let mut offset = 0;
    while let Some((start, len)) = find_ci(&haystack[offset..], needle) {
        count += 1;
        offset += start + len;
    }
    count
}

/// Matches `needle_lower` against the start of `slice`, returning the byte
/// length consumed in `slice` on success.
fn match_at(slice: &str, needle_lower: &[char]) -> Option<usize> {
    let mut remaining = needle_lower;
    let mut consumed = 0;
    let mut chars = slice.char_indices();
    while !remaining.is_empty() {
        let (offset, ch) = chars.next()?;
        for lower in ch.to_lowercase() {
            match remaining.split_first() {
                Some((&expected, rest)) if expected == lower => remaining = rest,
                _ => return None,
            }
        }
        consumed = offset + ch.len_utf8();
    }
    Some(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_across_case() {
        assert_eq!(find_ci("Main Street", "street"), Some((5, 6)));
        assert_eq!(find_ci("STATION", "tat"), Some((1, 3)));
        assert_eq!(find_ci("abc", "xyz"), None);
    }

    #[test]
    fn offsets_stay_on_char_boundaries() {
        let haystack = "die Überführung";
        let (start, len) = find_ci(haystack, "ÜBERFÜHRUNG").expect("match");
        assert_eq!(&haystack[start..start + len], "Überführung");
    }

    #[test]
    fn prefix_and_suffix() {
        assert!(starts_with_ci("Main Street", "main"));
        assert!(!starts_with_ci("Main Street", "street"));
        assert!(ends_with_ci("Main Street", "STREET"));
        assert!(!ends_with_ci("Main Street", "main"));
    }

    #[test]
    fn counts_non_overlapping() {
        assert_eq!(count_ci("aAaA", "aa"), 2);
        assert_eq!(count_ci("hello", "l"), 2);
        assert_eq!(count_ci("hello", ""), 0);
    }
}
