use crate::backtrack::BacktrackExecutor;
use crate::emit;
use crate::exec;
use crate::exec::MatchProducer;
use crate::indexing::Input;
use crate::insn::CompiledRegex;
use crate::parse;

use std::fmt;
use std::str::FromStr;

pub use crate::parse::Error;

/// Flags used to control parsing and matching.
/// Parsed from a flag string; each letter may appear at most once.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// The 'g' flag: find all matches instead of just the first one.
    pub global: bool,

    /// The 'i' flag: case-insensitive matching.
    pub icase: bool,

    /// The 'm' flag: ^ and $ match at line separators, not just the input
    /// boundaries.
    pub multiline: bool,

    /// The 's' flag: . matches line separators as well.
    pub dot_all: bool,

    /// The 'u' flag: the pattern and input are sequences of Unicode code
    /// points rather than bare code units.
    pub unicode: bool,

    /// The 'y' flag: a match must start exactly at the given offset.
    pub sticky: bool,
}

impl Flags {
    /// Parse a flag string. Unknown letters and duplicates are errors.
    pub fn parse(s: &str) -> Result<Flags, Error> {
        let mut result = Flags::default();
        for c in s.chars() {
            let field = match c {
                'g' => &mut result.global,
                'i' => &mut result.icase,
                'm' => &mut result.multiline,
                's' => &mut result.dot_all,
                'u' => &mut result.unicode,
                'y' => &mut result.sticky,
                _ => return parse::error(format!("Unknown flag '{}'", c)),
            };
            if *field {
                return parse::error(format!("Duplicate flag '{}'", c));
            }
            *field = true;
        }
        Ok(result)
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.icase {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        if self.dot_all {
            f.write_str("s")?;
        }
        if self.unicode {
            f.write_str("u")?;
        }
        if self.sticky {
            f.write_str("y")?;
        }
        Ok(())
    }
}

/// Range is used to express the extent of a match, as indexes into the
/// input's UTF-16 code units.
pub type Range = std::ops::Range<usize>;

/// An iterator type which yields `Match`es found in a UTF-16 string.
pub type Matches<'r, 't> = exec::Matches<BacktrackExecutor<'r, 't>>;

/// A Match represents a portion of a string which was found to match a
/// Regex. All offsets count UTF-16 code units.
#[derive(Debug, Clone)]
pub struct Match {
    /// The total range of the match. Note this may be empty, if the regex
    /// matched an empty string.
    pub range: Range,

    /// The list of captures. This has length equal to the number of
    /// capturing groups in the regex. For each capture, if the value is
    /// None, that group did not match (for example, it was in a not-taken
    /// branch of an alternation). If the value is Some, the group did match
    /// with the enclosed range.
    pub captures: Vec<Option<Range>>,

    // A list of capture group names. This is either:
    //   - Empty, if there were no named capture groups.
    //   - A list of names with length `captures.len()`, corresponding to
    //     the capture group names in order. Groups without names have an
    //     empty string.
    pub(crate) group_names: Box<[Box<str>]>,
}

impl Match {
    /// Access a group by index. Index 0 is the total match, index 1 is the
    /// first capture group.
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        if idx == 0 {
            Some(self.range.clone())
        } else {
            self.captures[idx - 1].clone()
        }
    }

    /// Access a named group by name.
    #[inline]
    pub fn named_group(&self, name: &str) -> Option<Range> {
        // Empty strings are used as sentinels to indicate unnamed groups.
        if name.is_empty() {
            return None;
        }
        let pos = self.group_names.iter().position(|s| s.as_ref() == name)?;
        self.captures[pos].clone()
    }

    /// \return the number of groups, counting the whole match as group 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.captures.len() + 1
    }

    /// Always false: a match always includes group 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the range over the starting and ending offsets of the match.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    /// Returns the starting offset of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the ending offset of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Return an iterator over a Match. The first returned value is the
    /// total match, and subsequent values represent the capture groups.
    #[inline]
    pub fn groups(&self) -> Groups {
        Groups::new(self)
    }

    /// Return an iterator over the named groups of a Match.
    #[inline]
    pub fn named_groups(&self) -> NamedGroups {
        NamedGroups::new(self)
    }
}

/// An iterator over the capture groups of a [`Match`]
///
/// This struct is created by the [`groups`] method on [`Match`].
///
/// [`Match`]: struct.Match.html
/// [`groups`]: struct.Match.html#method.groups
#[derive(Clone)]
pub struct Groups<'m> {
    mat: &'m Match,
    i: usize,
    max: usize,
}

impl<'m> Groups<'m> {
    #[inline]
    fn new(mat: &'m Match) -> Self {
        Self {
            mat,
            i: 0,
            max: mat.captures.len() + 1,
        }
    }
}

impl Iterator for Groups<'_> {
    type Item = Option<Range>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let i = self.i;
        if i < self.max {
            self.i += 1;
            Some(self.mat.group(i))
        } else {
            None
        }
    }
}

/// An iterator over the named capture groups of a [`Match`]
///
/// This struct is created by the [`named_groups`] method on [`Match`].
///
/// [`Match`]: struct.Match.html
/// [`named_groups`]: struct.Match.html#method.named_groups
#[derive(Clone)]
pub struct NamedGroups<'m> {
    mat: &'m Match,
    next_group_name_idx: usize,
}

impl<'m> NamedGroups<'m> {
    #[inline]
    fn new(mat: &'m Match) -> Self {
        Self {
            mat,
            next_group_name_idx: 0,
        }
    }
}

impl<'m> Iterator for NamedGroups<'m> {
    type Item = (&'m str, Option<Range>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        // Increment next_group_name_idx until we find a non-empty name.
        debug_assert!(self.next_group_name_idx <= self.mat.group_names.len());
        let end = self.mat.group_names.len();
        let mut idx = self.next_group_name_idx;
        while idx < end && self.mat.group_names[idx].is_empty() {
            idx += 1;
        }
        if idx == end {
            return None;
        }
        let name = self.mat.group_names[idx].as_ref();
        let range = self.mat.captures[idx].clone();
        self.next_group_name_idx = idx + 1;
        Some((name, range))
    }
}

/// A Regex is the compiled version of a pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    cr: CompiledRegex,
}

impl Regex {
    /// Construct a regex by parsing `pattern` using the default flags.
    /// An Error may be returned if the syntax is invalid.
    /// Note that this is rather expensive; prefer to cache a Regex which is
    /// intended to be used more than once.
    #[inline]
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Self::with_flags(pattern, "")
    }

    /// Construct a regex by parsing `pattern` with a flag string like
    /// `"imu"`. The web-compatibility relaxations of ECMA-262 Annex B are
    /// honored when the `u` flag is absent.
    #[inline]
    pub fn with_flags(pattern: &str, flags: &str) -> Result<Regex, Error> {
        Self::build(pattern, flags, true)
    }

    /// As `with_flags`, but with the Annex B relaxations disabled.
    #[inline]
    pub fn strict(pattern: &str, flags: &str) -> Result<Regex, Error> {
        Self::build(pattern, flags, false)
    }

    fn build(pattern: &str, flags: &str, annex_b: bool) -> Result<Regex, Error> {
        let flags = Flags::parse(flags)?;
        let ire = parse::try_parse(pattern, flags, annex_b)?;
        let cr = emit::emit(&ire)?;
        Ok(Regex { cr })
    }

    /// Scan `text` for a match starting at or after the code-unit offset
    /// `start`. With the sticky flag, only a match starting exactly at
    /// `start` is reported.
    pub fn exec(&self, text: &[u16], start: usize) -> Option<Match> {
        let input = Input::new(text, self.cr.flags.unicode);
        let mut executor = BacktrackExecutor::new(&self.cr, input);
        let mut next_start = None;
        executor.next_match(start, &mut next_start)
    }

    /// Searches `text` to find the first match.
    /// The text is converted to UTF-16 internally; match offsets count
    /// UTF-16 code units, which coincide with byte offsets for ASCII text.
    pub fn find(&self, text: &str) -> Option<Match> {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.exec(&units, 0)
    }

    /// Returns an iterator over non-overlapping matches in `text`, starting
    /// at the code-unit offset `start`.
    pub fn find_iter_utf16<'r, 't>(&'r self, text: &'t [u16], start: usize) -> Matches<'r, 't> {
        let input = Input::new(text, self.cr.flags.unicode);
        exec::Matches::new(BacktrackExecutor::new(&self.cr, input), start)
    }

    /// \return the pattern re-serialized from its parsed form.
    pub fn source(&self) -> &str {
        &self.cr.pattern
    }

    /// \return the flags the regex was compiled with.
    pub fn flags(&self) -> Flags {
        self.cr.flags
    }

    /// \return the name of the given capture group, if it has one.
    /// Group indices start at 1.
    pub fn group_name(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return None;
        }
        self.cr.group_name(index - 1)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.cr, f)
    }
}

impl FromStr for Regex {
    type Err = Error;

    /// Attempts to parse a string into a regular expression
    #[inline]
    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}
