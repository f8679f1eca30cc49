//! Case canonicalization for the `i` flag. ES9 21.2.2.8.2 Canonicalize.

use icu_casemap::CaseMapper;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static CASE_MAPPER: Lazy<CaseMapper> = Lazy::new(CaseMapper::new);

/// Canonicalize a code point for case-insensitive comparison.
///
/// Under `unicode`, this is simple case folding (Case_Folding statuses C and
/// S). Otherwise it is the legacy rule: uppercase the single code unit, but
/// never map a non-ASCII code point into the ASCII range.
pub fn canonicalize(cp: u32, unicode: bool) -> u32 {
    let Some(c) = char::from_u32(cp) else {
        // Lone surrogates canonicalize to themselves.
        return cp;
    };
    if unicode {
        CASE_MAPPER.simple_fold(c) as u32
    } else {
        let upper = CASE_MAPPER.simple_uppercase(c) as u32;
        if cp >= 0x80 && upper < 0x80 {
            cp
        } else {
            upper
        }
    }
}

/// A map from canonical code point to the sorted list of all code points
/// which canonicalize to it (including itself). Only non-trivial equivalence
/// classes are stored.
type OrbitMap = HashMap<u32, Box<[u32]>>;

fn build_orbits(unicode: bool) -> OrbitMap {
    let limit = if unicode { 0x110000 } else { 0x10000 };
    let mut groups: HashMap<u32, Vec<u32>> = HashMap::new();
    for cp in 0..limit {
        if char::from_u32(cp).is_none() {
            continue;
        }
        groups.entry(canonicalize(cp, unicode)).or_default().push(cp);
    }
    groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(canon, members)| (canon, members.into_boxed_slice()))
        .collect()
}

static UNICODE_ORBITS: Lazy<OrbitMap> = Lazy::new(|| build_orbits(true));
static LEGACY_ORBITS: Lazy<OrbitMap> = Lazy::new(|| build_orbits(false));

/// \return every code point which canonicalizes to the same value as \p cp,
/// or None if the equivalence class is just cp itself.
pub fn uncanonicalize(cp: u32, unicode: bool) -> Option<&'static [u32]> {
    let orbits: &OrbitMap = if unicode {
        &UNICODE_ORBITS
    } else {
        &LEGACY_ORBITS
    };
    orbits.get(&canonicalize(cp, unicode)).map(|b| &**b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_unicode() {
        assert_eq!(canonicalize('A' as u32, true), 'a' as u32);
        assert_eq!(canonicalize('a' as u32, true), 'a' as u32);
        // Kelvin sign folds to 'k'.
        assert_eq!(canonicalize(0x212A, true), 'k' as u32);
        // Micro sign folds to Greek mu.
        assert_eq!(canonicalize(0x00B5, true), 0x03BC);
        // Titlecase Dz digraph folds to lowercase.
        assert_eq!(canonicalize(0x01F2, true), 0x01F3);
        assert_eq!(canonicalize(0x01F1, true), 0x01F3);
    }

    #[test]
    fn test_canonicalize_legacy() {
        assert_eq!(canonicalize('a' as u32, false), 'A' as u32);
        assert_eq!(canonicalize('A' as u32, false), 'A' as u32);
        // The Kelvin sign uppercases to itself: no cross-ASCII mapping.
        assert_eq!(canonicalize(0x212A, false), 0x212A);
        // Long s uppercases to 'S', which the ASCII guard rejects.
        assert_eq!(canonicalize(0x017F, false), 0x017F);
    }

    #[test]
    fn test_canonicalize_idempotent() {
        for &cp in &[
            'a' as u32,
            'Z' as u32,
            0x00B5,
            0x017F,
            0x01F1,
            0x0130,
            0x212A,
            0x10400,
        ] {
            let c1 = canonicalize(cp, true);
            assert_eq!(canonicalize(c1, true), c1, "cp {:#x}", cp);
        }
    }

    #[test]
    fn test_uncanonicalize() {
        let orbit = uncanonicalize('k' as u32, true).expect("should have an orbit");
        assert!(orbit.contains(&('k' as u32)));
        assert!(orbit.contains(&('K' as u32)));
        assert!(orbit.contains(&0x212A));

        let orbit = uncanonicalize(0x01F3, true).expect("should have an orbit");
        assert!(orbit.contains(&0x01F1) && orbit.contains(&0x01F2) && orbit.contains(&0x01F3));

        // Legacy orbits exclude the Kelvin sign.
        let orbit = uncanonicalize('k' as u32, false).expect("should have an orbit");
        assert!(orbit.contains(&('k' as u32)) && orbit.contains(&('K' as u32)));
        assert!(!orbit.contains(&0x212A));
        assert!(uncanonicalize(0x212A, false).is_none());
    }
}
