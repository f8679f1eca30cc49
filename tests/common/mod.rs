#![allow(dead_code)]

/// Encode a &str as the UTF-16 code units the engine matches over.
pub fn u16s(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Slice a UTF-16 buffer by a match range, back to a String.
fn utf16_text(units: &[u16], range: &redress::Range) -> String {
    String::from_utf16_lossy(&units[range.clone()])
}

/// Test that \p pattern fails to parse with default flags.
#[track_caller]
pub fn test_parse_fails(pattern: &str) {
    let res = redress::Regex::new(pattern);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Test that \p pattern fails to parse with flags.
#[track_caller]
pub fn test_parse_fails_flags(pattern: &str, flags: &str) {
    let res = redress::Regex::with_flags(pattern, flags);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);
}

/// Test that \p pattern fails to parse without the Annex B relaxations.
#[track_caller]
pub fn test_strict_parse_fails(pattern: &str, flags: &str) {
    let res = redress::Regex::strict(pattern, flags);
    assert!(
        res.is_err(),
        "Pattern should not have parsed strictly: {}",
        pattern
    );
}

/// Format a Match by inserting commas between all capture groups.
fn format_match(r: &redress::Match, units: &[u16]) -> String {
    let mut result = utf16_text(units, &r.range);
    for cg in r.captures.iter() {
        result.push(',');
        if let Some(cg) = cg {
            result.push_str(&utf16_text(units, cg))
        }
    }
    result
}

pub trait StringTestHelpers {
    /// "Fluent" style helper for testing that a String is equal to a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    #[track_caller]
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// "Fluent" style helper for testing that a Vec<String> is equal to a
    /// Vec<&str>.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<String> {
    #[track_caller]
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(self.len(), rhs.len(), "Vectors differ in length");
        for (lhs, rhs) in self.iter().zip(rhs.iter()) {
            assert_eq!(lhs, rhs);
        }
    }
}

/// A compiled regex with fluent test helpers.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: redress::Regex,
}

impl TestCompiledRegex {
    /// Search for self in \p input, returning a list of all matches.
    pub fn matches(&self, input: &str, start: usize) -> Vec<redress::Match> {
        let units = u16s(input);
        self.re.find_iter_utf16(&units, start).collect()
    }

    /// Search for self in \p input, returning the first Match, or None.
    pub fn find(&self, input: &str) -> Option<redress::Match> {
        self.re.exec(&u16s(input), 0)
    }

    /// Match at the given code-unit offset, honoring stickiness.
    pub fn find_from(&self, input: &str, start: usize) -> Option<redress::Match> {
        self.re.exec(&u16s(input), start)
    }

    /// Match against a string, returning the first formatted match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        let units = u16s(input);
        match self.re.exec(&units, 0) {
            Some(m) => format_match(&m, &units),
            None => panic!("Failed to match {}", input),
        }
    }

    /// Match against a string, returning the text of the named group.
    #[track_caller]
    pub fn match1_named_group(&self, input: &str, group: &str) -> String {
        let units = u16s(input);
        let m = self.re.exec(&units, 0).expect("Failed to match");
        let range = m
            .named_group(group)
            .unwrap_or_else(|| panic!("Named capture group {} did not match", group));
        utf16_text(&units, &range)
    }

    /// Match against a string, returning the match as a Vec containing None
    /// for unmatched groups, or the matched strings.
    #[track_caller]
    pub fn match1_vec(&self, input: &str) -> Vec<Option<String>> {
        let units = u16s(input);
        let m = self.re.exec(&units, 0).expect("Failed to match");
        let mut result = vec![Some(utf16_text(&units, &m.range))];
        for cr in &m.captures {
            result.push(cr.as_ref().map(|r| utf16_text(&units, r)));
        }
        result
    }

    /// Test that matching against \p input fails.
    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        assert!(self.find(input).is_none(), "Should not have matched")
    }

    /// Test that matching against \p input succeeds.
    #[track_caller]
    pub fn test_succeeds(&self, input: &str) {
        assert!(self.find(input).is_some(), "Should have matched")
    }

    /// Return a list of all non-overlapping total match ranges from a given
    /// start.
    pub fn match_all_from(&self, input: &str, start: usize) -> Vec<redress::Range> {
        self.matches(input, start)
            .into_iter()
            .map(|m| m.range())
            .collect()
    }

    /// Return a list of all non-overlapping matched strings.
    pub fn match_all(&self, input: &str) -> Vec<String> {
        let units = u16s(input);
        self.re
            .find_iter_utf16(&units, 0)
            .map(|m| utf16_text(&units, &m.range))
            .collect()
    }

    /// Collect all matches into a String, separated by commas.
    pub fn run_global_match(&self, input: &str) -> String {
        let units = u16s(input);
        self.re
            .find_iter_utf16(&units, 0)
            .map(|m| format_match(&m, &units))
            .collect::<Vec<String>>()
            .join(",")
    }
}

/// Compile a pattern with default flags.
#[track_caller]
pub fn compile(pattern: &str) -> TestCompiledRegex {
    compilef(pattern, "")
}

/// Compile a pattern with the given flags.
#[track_caller]
pub fn compilef(pattern: &str, flags: &str) -> TestCompiledRegex {
    match redress::Regex::with_flags(pattern, flags) {
        Ok(re) => TestCompiledRegex { re },
        Err(err) => panic!(
            "Failed to parse! flags: {} pattern: {}, error: {}",
            flags, pattern, err
        ),
    }
}

/// Test that \p pattern with \p flags parses, and matches \p input.
#[track_caller]
pub fn test_match_succeeds(pattern: &str, flags: &str, input: &str) {
    compilef(pattern, flags).test_succeeds(input)
}

/// Test that \p pattern with \p flags parses, and does not match \p input.
#[track_caller]
pub fn test_match_fails(pattern: &str, flags: &str, input: &str) {
    compilef(pattern, flags).test_fails(input)
}
