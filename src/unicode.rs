//! Unicode property escape support: maps `\p{…}` names to code point sets.

use crate::codepointset::{CodePointSet, CODE_POINT_LIMIT};
use icu_properties::{maps, script, sets, GeneralCategory, GeneralCategoryGroup, Script};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Mutex;

fn add_inclusive_range(set: &mut CodePointSet, r: RangeInclusive<u32>) {
    let begin = *r.start();
    let end = (*r.end() + 1).min(CODE_POINT_LIMIT);
    if begin < end {
        set.add(begin, end);
    }
}

fn set_from_inclusive_ranges<I>(ranges: I) -> CodePointSet
where
    I: Iterator<Item = RangeInclusive<u32>>,
{
    let mut set = CodePointSet::new();
    for r in ranges {
        add_inclusive_range(&mut set, r);
    }
    set
}

/// \return the set for a General_Category value or group alias like "Lu",
/// "Letter", or "L", or None if the name is not a category.
fn general_category_set(value: &str) -> Option<CodePointSet> {
    let group = GeneralCategoryGroup::name_to_enum_mapper().get_strict(value)?;
    let mut set = CodePointSet::new();
    for range in maps::general_category().iter_ranges() {
        if group.contains(range.value) {
            add_inclusive_range(&mut set, range.range);
        }
    }
    Some(set)
}

/// \return the set for a Script value like "Hira" or "Hiragana".
fn script_set(value: &str) -> Option<CodePointSet> {
    let sc = Script::name_to_enum_mapper().get_strict(value)?;
    let data = maps::script().get_set_for_value(sc);
    Some(set_from_inclusive_ranges(data.as_borrowed().iter_ranges()))
}

/// \return the set for a Script_Extensions value: the union of the base
/// script set and the extensions.
fn script_extensions_set(value: &str) -> Option<CodePointSet> {
    let sc = Script::name_to_enum_mapper().get_strict(value)?;
    let swe = script::script_with_extensions();
    let list = swe.get_script_extensions_set(sc);
    Some(set_from_inclusive_ranges(list.iter_ranges()))
}

/// \return the set for a binary property name or alias, or None.
/// ES9 22.2.1: the table of binary Unicode property names.
fn binary_property_set(name: &str) -> Option<CodePointSet> {
    let data = match name {
        "AHex" | "ASCII_Hex_Digit" => sets::ascii_hex_digit(),
        "Alpha" | "Alphabetic" => sets::alphabetic(),
        "Bidi_C" | "Bidi_Control" => sets::bidi_control(),
        "Bidi_M" | "Bidi_Mirrored" => sets::bidi_mirrored(),
        "CI" | "Case_Ignorable" => sets::case_ignorable(),
        "Cased" => sets::cased(),
        "CWCF" | "Changes_When_Casefolded" => sets::changes_when_casefolded(),
        "CWCM" | "Changes_When_Casemapped" => sets::changes_when_casemapped(),
        "CWL" | "Changes_When_Lowercased" => sets::changes_when_lowercased(),
        "CWKCF" | "Changes_When_NFKC_Casefolded" => sets::changes_when_nfkc_casefolded(),
        "CWT" | "Changes_When_Titlecased" => sets::changes_when_titlecased(),
        "CWU" | "Changes_When_Uppercased" => sets::changes_when_uppercased(),
        "Dash" => sets::dash(),
        "DI" | "Default_Ignorable_Code_Point" => sets::default_ignorable_code_point(),
        "Dep" | "Deprecated" => sets::deprecated(),
        "Dia" | "Diacritic" => sets::diacritic(),
        "Emoji" => sets::emoji(),
        "EComp" | "Emoji_Component" => sets::emoji_component(),
        "EMod" | "Emoji_Modifier" => sets::emoji_modifier(),
        "EBase" | "Emoji_Modifier_Base" => sets::emoji_modifier_base(),
        "EPres" | "Emoji_Presentation" => sets::emoji_presentation(),
        "Ext" | "Extender" => sets::extender(),
        "ExtPict" | "Extended_Pictographic" => sets::extended_pictographic(),
        "Gr_Base" | "Grapheme_Base" => sets::grapheme_base(),
        "Gr_Ext" | "Grapheme_Extend" => sets::grapheme_extend(),
        "Hex" | "Hex_Digit" => sets::hex_digit(),
        "IDSB" | "IDS_Binary_Operator" => sets::ids_binary_operator(),
        "IDST" | "IDS_Trinary_Operator" => sets::ids_trinary_operator(),
        "IDC" | "ID_Continue" => sets::id_continue(),
        "IDS" | "ID_Start" => sets::id_start(),
        "Ideo" | "Ideographic" => sets::ideographic(),
        "Join_C" | "Join_Control" => sets::join_control(),
        "LOE" | "Logical_Order_Exception" => sets::logical_order_exception(),
        "Lower" | "Lowercase" => sets::lowercase(),
        "Math" => sets::math(),
        "NChar" | "Noncharacter_Code_Point" => sets::noncharacter_code_point(),
        "Pat_Syn" | "Pattern_Syntax" => sets::pattern_syntax(),
        "Pat_WS" | "Pattern_White_Space" => sets::pattern_white_space(),
        "QMark" | "Quotation_Mark" => sets::quotation_mark(),
        "Radical" => sets::radical(),
        "RI" | "Regional_Indicator" => sets::regional_indicator(),
        "STerm" | "Sentence_Terminal" => sets::sentence_terminal(),
        "SD" | "Soft_Dotted" => sets::soft_dotted(),
        "Term" | "Terminal_Punctuation" => sets::terminal_punctuation(),
        "UIdeo" | "Unified_Ideograph" => sets::unified_ideograph(),
        "Upper" | "Uppercase" => sets::uppercase(),
        "VS" | "Variation_Selector" => sets::variation_selector(),
        "space" | "White_Space" => sets::white_space(),
        "XIDC" | "XID_Continue" => sets::xid_continue(),
        "XIDS" | "XID_Start" => sets::xid_start(),
        "ASCII" => {
            let mut set = CodePointSet::new();
            set.add(0, 0x80);
            return Some(set);
        }
        "Any" => {
            let mut set = CodePointSet::new();
            set.add(0, CODE_POINT_LIMIT);
            return Some(set);
        }
        "Assigned" => {
            let data = maps::general_category().get_set_for_value(GeneralCategory::Unassigned);
            let mut set = set_from_inclusive_ranges(data.as_borrowed().iter_ranges());
            set.invert();
            return Some(set);
        }
        _ => return None,
    };
    Some(set_from_inclusive_ranges(data.iter_ranges()))
}

type PropertyCache = HashMap<(String, Option<String>), Option<CodePointSet>>;

static PROPERTY_SETS: Lazy<Mutex<PropertyCache>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn cached<F>(name: &str, value: Option<&str>, load: F) -> Option<CodePointSet>
where
    F: FnOnce() -> Option<CodePointSet>,
{
    let key = (name.to_string(), value.map(str::to_string));
    let mut cache = PROPERTY_SETS.lock().unwrap();
    cache.entry(key).or_insert_with(load).clone()
}

/// Look up a lone property name like `\p{Letter}` or `\p{Alphabetic}`.
/// Lone names may be binary properties or General_Category values.
/// \return the set, or None if the name is unknown.
pub(crate) fn load_property(name: &str) -> Option<CodePointSet> {
    cached(name, None, || {
        binary_property_set(name).or_else(|| general_category_set(name))
    })
}

/// Look up a property name/value pair like `\p{Script=Hiragana}`.
/// \return the set, or None if either name is unknown.
pub(crate) fn load_property_value(name: &str, value: &str) -> Option<CodePointSet> {
    cached(name, Some(value), || match name {
        "General_Category" | "gc" => general_category_set(value),
        "Script" | "sc" => script_set(value),
        "Script_Extensions" | "scx" => script_extensions_set(value),
        _ => None,
    })
}

/// \return whether \p cp may start a capture group name. ES9 21.2.1.
pub(crate) fn is_id_start(cp: u32) -> bool {
    cp == '$' as u32 || cp == '_' as u32 || sets::id_start().contains32(cp)
}

/// \return whether \p cp may continue a capture group name. ES9 21.2.1.
pub(crate) fn is_id_continue(cp: u32) -> bool {
    cp == '$' as u32 || cp == 0x200C || cp == 0x200D || sets::id_continue().contains32(cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_category() {
        let lu = load_property_value("gc", "Lu").expect("Lu should resolve");
        assert!(lu.contains('A' as u32));
        assert!(!lu.contains('a' as u32));

        // Group aliases resolve too.
        let letters = load_property("Letter").expect("Letter should resolve");
        assert!(letters.contains('A' as u32));
        assert!(letters.contains('a' as u32));
        assert!(!letters.contains('0' as u32));
    }

    #[test]
    fn test_script() {
        let hira = load_property_value("sc", "Hira").expect("Hira should resolve");
        assert!(hira.contains(0x3042)); // あ
        assert!(!hira.contains('a' as u32));
        let hira2 = load_property_value("Script", "Hiragana").unwrap();
        assert_eq!(hira, hira2);
    }

    #[test]
    fn test_script_extensions_superset() {
        // KATAKANA-HIRAGANA PROLONGED SOUND MARK has Script=Common but
        // Hiragana in its extensions.
        let scx = load_property_value("scx", "Hira").unwrap();
        let sc = load_property_value("sc", "Hira").unwrap();
        assert!(scx.contains(0x30FC));
        assert!(!sc.contains(0x30FC));
        for r in sc.ranges() {
            for cp in [r.begin, r.end - 1] {
                assert!(scx.contains(cp));
            }
        }
    }

    #[test]
    fn test_unknown_absent() {
        assert!(load_property("NoSuchProperty").is_none());
        assert!(load_property_value("sc", "NoSuchScript").is_none());
        assert!(load_property_value("NoSuchName", "Latin").is_none());
        // Lone script names are not valid lone properties.
        assert!(load_property("Greek").is_none());
    }
}
