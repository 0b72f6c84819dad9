//! Name normalization
//!
//! Turns a raw component name into the code point sequence that gets
//! hashed. Two names that differ only in surrounding whitespace, interior
//! whitespace run length or (when ignoring case) letter case normalize to
//! the same sequence.

/// Trim a name and collapse every interior whitespace run to one space
#[must_use]
pub fn collapse_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;
    for c in name.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Map a code point to its case-insensitive ordinal sequence
///
/// Upper-cases and then lower-cases, so a code point and its upper-case
/// form always fold to the same sequence (`ß` and `SS` both become `ss`).
pub fn fold_case(c: char) -> impl Iterator<Item = char> {
    c.to_uppercase().flat_map(char::to_lowercase)
}

/// Code points of an already collapsed name, optionally case folded
#[must_use]
pub fn code_points(collapsed: &str, ignore_case: bool) -> Vec<char> {
    if ignore_case {
        collapsed.chars().flat_map(fold_case).collect()
    } else {
        collapsed.chars().collect()
    }
}

/// Canonical code points of a file path
///
/// Separators become `/` and letter case is folded so the same file
/// referenced from different platforms hashes identically.
#[must_use]
pub fn file_path_code_points(path: &str) -> Vec<char> {
    path.trim()
        .chars()
        .map(|c| if c == '\\' { '/' } else { c })
        .flat_map(fold_case)
        .collect()
}

/// Decode UTF-16 code units, `None` on unpaired surrogates
#[must_use]
pub fn decode_utf16(units: &[u16]) -> Option<String> {
    char::decode_utf16(units.iter().copied())
        .collect::<Result<String, _>>()
        .ok()
}

/// Decode UTF-32 code units, `None` on values that are not scalar values
#[must_use]
pub fn decode_utf32(units: &[u32]) -> Option<String> {
    units.iter().map(|&u| char::from_u32(u)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_trims_and_squeezes() {
        assert_eq!(collapse_whitespace("  a \t\n b   c  "), "a b c");
        assert_eq!(collapse_whitespace("\u{3000}wide\u{3000}"), "wide");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn fold_case_is_stable_under_uppercase() {
        let folded: String = "Straße".chars().flat_map(fold_case).collect();
        let upper: String = "STRASSE".chars().flat_map(fold_case).collect();
        assert_eq!(folded, upper);
    }

    #[test]
    fn code_points_respects_case_mode() {
        assert_eq!(code_points("Ab", true), vec!['a', 'b']);
        assert_eq!(code_points("Ab", false), vec!['A', 'b']);
    }

    #[test]
    fn file_paths_canonicalize_separators() {
        assert_eq!(
            file_path_code_points("C:\\Maps\\Wood.PNG"),
            file_path_code_points("c:/maps/wood.png")
        );
    }

    #[test]
    fn decode_rejects_malformed_units() {
        assert_eq!(decode_utf16(&[0x0041, 0x0042]).as_deref(), Some("AB"));
        assert!(decode_utf16(&[0xD800]).is_none());
        assert_eq!(decode_utf32(&[0x1F600]).as_deref(), Some("\u{1F600}"));
        assert!(decode_utf32(&[0xD800]).is_none());
        assert!(decode_utf32(&[0x11_0000]).is_none());
    }
}
