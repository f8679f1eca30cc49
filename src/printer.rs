//! Pattern re-serialization: turns the IR back into pattern text for
//! diagnostics and the `source` accessor.
//!
//! Literal characters carry their original escape text, so a parsed pattern
//! prints back as written, up to a few normalizations: an empty pattern or
//! alternative renders as `(?:)`.

use crate::ir::{ClassItem, EscapeClass, Node};

/// \return the pattern text for a parsed node tree.
pub(crate) fn pattern_to_string(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    if out.is_empty() {
        out.push_str("(?:)");
    }
    out
}

fn is_empty_sequence(node: &Node) -> bool {
    matches!(node, Node::Sequence(children) if children.is_empty())
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Disjunction(children) => {
            for (idx, child) in children.iter().enumerate() {
                if idx > 0 {
                    out.push('|');
                }
                if is_empty_sequence(child) {
                    out.push_str("(?:)");
                } else {
                    write_node(out, child);
                }
            }
        }
        Node::Sequence(children) => {
            for child in children {
                write_node(out, child);
            }
        }
        Node::Group(child) => {
            out.push_str("(?:");
            write_node(out, child);
            out.push(')');
        }
        Node::Capture { child, .. } => {
            out.push('(');
            write_node(out, child);
            out.push(')');
        }
        Node::NamedCapture { name, child, .. } => {
            out.push_str("(?<");
            out.push_str(name);
            out.push('>');
            write_node(out, child);
            out.push(')');
        }
        Node::Many { child, non_greedy } => write_quantified(out, child, "*", *non_greedy),
        Node::Some { child, non_greedy } => write_quantified(out, child, "+", *non_greedy),
        Node::Optional { child, non_greedy } => write_quantified(out, child, "?", *non_greedy),
        Node::Repeat {
            child,
            min,
            max,
            non_greedy,
        } => {
            let suffix = match max {
                Some(max) if max == min => format!("{{{}}}", min),
                Some(max) => format!("{{{},{}}}", min, max),
                None => format!("{{{},}}", min),
            };
            write_quantified(out, child, &suffix, *non_greedy);
        }
        Node::LineBegin => out.push('^'),
        Node::LineEnd => out.push('$'),
        Node::WordBoundary { invert } => {
            out.push_str(if *invert { "\\B" } else { "\\b" });
        }
        Node::LookAhead { child, negative } => {
            out.push_str(if *negative { "(?!" } else { "(?=" });
            write_node(out, child);
            out.push(')');
        }
        Node::LookBehind { child, negative } => {
            out.push_str(if *negative { "(?<!" } else { "(?<=" });
            write_node(out, child);
            out.push(')');
        }
        Node::Char(c) => out.push_str(&c.raw),
        Node::Dot => out.push('.'),
        Node::Class { invert, items } => {
            out.push('[');
            if *invert {
                out.push('^');
            }
            for item in items {
                match item {
                    ClassItem::Char(c) => out.push_str(&c.raw),
                    ClassItem::Range(begin, end) => {
                        out.push_str(&begin.raw);
                        out.push('-');
                        out.push_str(&end.raw);
                    }
                    ClassItem::Escape(escape) => write_escape_class(out, escape),
                }
            }
            out.push(']');
        }
        Node::EscapeClass(escape) => write_escape_class(out, escape),
        Node::BackRef(index) => {
            out.push('\\');
            out.push_str(&index.to_string());
        }
        Node::NamedBackRef { name, .. } => {
            out.push_str("\\k<");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_quantified(out: &mut String, child: &Node, suffix: &str, non_greedy: bool) {
    write_node(out, child);
    out.push_str(suffix);
    if non_greedy {
        out.push('?');
    }
}

fn write_escape_class(out: &mut String, escape: &EscapeClass) {
    match escape {
        EscapeClass::Digit { invert } => out.push_str(if *invert { "\\D" } else { "\\d" }),
        EscapeClass::Word { invert } => out.push_str(if *invert { "\\W" } else { "\\w" }),
        EscapeClass::Space { invert } => out.push_str(if *invert { "\\S" } else { "\\s" }),
        EscapeClass::Property { invert, name } => {
            out.push_str(if *invert { "\\P{" } else { "\\p{" });
            out.push_str(name);
            out.push('}');
        }
        EscapeClass::PropertyValue {
            invert,
            name,
            value,
        } => {
            out.push_str(if *invert { "\\P{" } else { "\\p{" });
            out.push_str(name);
            out.push('=');
            out.push_str(value);
            out.push('}');
        }
    }
}
