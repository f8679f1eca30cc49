/*!

# redress - an ECMAScript regular expression engine

This crate implements the ECMA-262 2019 regular expression language: a
parser producing a validated syntax tree, a compiler lowering it to
bytecode, and a backtracking virtual machine executing that bytecode
against a string. The "Additional ECMAScript Features for Web Browsers"
(Annex B) relaxations are implemented and enabled by default, along with
lookbehind, named captures, Unicode property escapes, and the `g`, `i`,
`m`, `s`, `u`, and `y` flags.

Input strings follow the host-language model: a sequence of UTF-16 code
units. Match offsets count code units, which coincide with byte offsets
for ASCII text.

# Example: test if a string contains a match

```rust
use redress::Regex;
let re = Regex::new(r"\d{4}").unwrap();
assert!(re.find("2020-20-05").is_some());
```

# Example: using capture groups

```rust
use redress::Regex;
let re = Regex::new(r"(\d{4})").unwrap();
let m = re.find("Today is 2020-20-05").unwrap();
assert_eq!(m.group(1), Some(9..13));
```

# Example: named groups and case-insensitive matching

```rust
use redress::Regex;
let re = Regex::with_flags(r"(?<word>\w+)", "i").unwrap();
let m = re.find("Hello").unwrap();
assert_eq!(m.named_group("word"), Some(0..5));
```

# Example: matching UTF-16 text directly

```rust
use redress::Regex;
let re = Regex::with_flags(r"\p{sc=Hiragana}", "u").unwrap();
let text: Vec<u16> = "あ".encode_utf16().collect();
let m = re.exec(&text, 0).unwrap();
assert_eq!(m.range(), 0..1);
```

# Comparison to the regex crate

This crate supports backreferences and arbitrary-width lookaround, which
`regex` does not; `regex` provides linear-time matching guarantees, which a
backtracking engine cannot. Patterns with pathological backtracking behave
as they do in JavaScript engines.

*/

#![warn(clippy::all)]

pub use crate::api::*;

mod api;
mod backtrack;
mod charclasses;
mod codepointset;
mod emit;
mod exec;
mod folds;
mod indexing;
mod insn;
mod ir;
mod parse;
mod printer;
mod unicode;
mod util;
