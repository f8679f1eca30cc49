pub mod common;

use common::*;

#[track_caller]
fn test_1_error(pattern: &str, flags: &str, expected_err: &str) {
    let res = redress::Regex::with_flags(pattern, flags);
    assert!(res.is_err(), "Pattern should not have parsed: {}", pattern);

    let err = res.err().unwrap().text;
    assert!(
        err.contains(expected_err),
        "Error text '{}' did not contain '{}' for pattern '{}'",
        err,
        expected_err,
        pattern
    );
}

#[test]
fn test_excessive_capture_groups() {
    let mut captures = String::from("s");
    for _ in 0..65536 {
        captures.push_str("(x)");
    }
    test_1_error(captures.as_str(), "", "Capture group count limit exceeded");
}

#[test]
fn test_nothing_to_repeat() {
    test_1_error(r"*", "", "Nothing to repeat");
    test_1_error(r"+", "", "Nothing to repeat");
    test_1_error(r"?", "", "Nothing to repeat");
    test_1_error(r"x**", "", "Nothing to repeat");
    test_1_error(r"{3,5}", "", "Nothing to repeat");
    test_1_error(r"^*", "", "Nothing to repeat");
    test_1_error(r"${3}", "", "Nothing to repeat");
    test_1_error(r"\b+", "", "Nothing to repeat");
    // Lookbehinds are never quantifiable; lookaheads only via Annex B.
    test_1_error(r"(?<=a)*", "", "Nothing to repeat");
    test_1_error(r"(?=a)*", "u", "Nothing to repeat");
    test_strict_parse_fails(r"(?=abc)*", "");
    test_strict_parse_fails(r"(?!abc){3,}", "");
}

#[test]
fn test_invalid_quantifiers() {
    test_1_error(r"x{5,3}", "", "Invalid quantifier");
    test_1_error(r"x{5,3}?", "", "Invalid quantifier");
    test_1_error(r"a{2,1}", "", "Invalid quantifier");
}

#[test]
fn test_unbalanced() {
    test_1_error(r"(", "", "Unbalanced parenthesis");
    test_1_error(r"(?!", "", "Unbalanced parenthesis");
    test_1_error(r"abc)", "", "Unbalanced parenthesis");
    test_1_error(r"(?<=abc", "", "Unbalanced parenthesis");
    test_1_error(r"[abc", "", "Unbalanced bracket");
    test_1_error(r"]", "u", "Unbalanced bracket");
    test_1_error("\\", "", "Incomplete escape");
}

#[test]
fn test_class_errors() {
    test_1_error(
        r"[z-a]",
        "",
        "Range values reversed, start char code is greater than end char code.",
    );
    // A class escape cannot bound a range in unicode mode.
    test_1_error(r"[a-\s]", "u", "Invalid character range");
    test_1_error(r"[\d-z]", "u", "Invalid character range");
    test_1_error(r"[\1]", "u", "Invalid class escape");
}

#[test]
fn test_invalid_groups() {
    test_1_error("(?q:abc)", "", "Invalid group");
    test_1_error("(?<:abc)", "", "Invalid capture group name");
    test_1_error("(?<1a>x)", "", "Invalid capture group name");
    test_1_error("(?<>x)", "", "Invalid capture group name");
    test_1_error("(?<a>x)(?<a>y)", "", "Duplicate capture group name");
}

#[test]
fn test_invalid_escapes() {
    test_1_error(r"\u{FFFFFF}", "u", "Invalid Unicode escape");
    test_1_error(r"\u{}", "u", "Invalid Unicode escape");
    test_1_error(r"\uZZ", "u", "Invalid Unicode escape");
    test_1_error(r"\xZ", "u", "Invalid character escape");
    test_1_error(r"\c1", "u", "Invalid character escape");
    test_1_error(r"\00", "u", "Invalid character escape");
    test_1_error(r"\2(a)", "u", "exceeds number of capture groups");
    test_1_error(r"\02", "u", "Invalid character escape");
    // \p requires the unicode flag to be a property escape, and the name
    // must resolve.
    test_1_error(r"\p{NotAProperty}", "u", "Invalid property name");
    test_1_error(r"\p{Script=NotAScript}", "u", "Invalid property value");
    test_1_error(r"\p{", "u", "Invalid property name");
    test_1_error(r"\q", "u", "Invalid character escape");
}

#[test]
fn test_named_reference_errors() {
    test_1_error(r"(?<a>x)\k<b>", "", "Invalid named reference");
    test_1_error(r"(?<a>x)\k", "", "Invalid named reference");
    test_strict_parse_fails(r"\k<x>", "");
}

#[test]
fn test_flag_errors() {
    assert!(redress::Regex::with_flags("a", "gg").is_err());
    assert!(redress::Regex::with_flags("a", "ii").is_err());
    assert!(redress::Regex::with_flags("a", "x").is_err());
    assert!(redress::Regex::with_flags("a", "gimsuy").is_ok());
    test_1_error("a", "gg", "Duplicate flag");
    test_1_error("a", "q", "Unknown flag");
}

#[test]
fn test_backreference_errors() {
    // Without Annex B fallback, an out-of-range backreference is fatal.
    test_1_error(r"\2(a)", "u", "exceeds number of capture groups");
    test_strict_parse_fails(r"\2(a)", "");
    // In-range forward references are fine.
    assert!(redress::Regex::new(r"\1(a)").is_ok());
}
