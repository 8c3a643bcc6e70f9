//! AST for range expressions. Trees are immutable once parsed.

use regex::Regex;
use std::fmt;

use crate::token::Span;

/// AST 的根节点, 代表一个完整的范围表达式
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The empty expression; evaluates to the empty set
    Empty,
    /// A word, possibly with brace or numeric expansion: `web{1-3}.dc`
    Literal(Pattern),
    /// A verbatim literal, `"web-01"` or `q(web-01)`
    Quoted(String),
    /// `/pattern/`
    Regex(RegexLiteral),
    /// `%name`, the default member list of the named cluster(s)
    ClusterRef(Box<Expr>),
    /// `%name:KEY` or `name:KEY`
    Attribute { cluster: Box<Expr>, key: Pattern },
    /// `@KEY`, a key of the local cluster
    LocalRef(Box<Expr>),
    /// `*x`, clusters whose members include any of `x`
    ClustersContaining(Box<Expr>),
    /// `?x`, keys of the local cluster whose values include any of `x`
    LocalKeysContaining(Box<Expr>),
    /// Binary set operation
    SetOp { op: SetOp, left: Box<Expr>, right: Box<Expr> },
    /// 使用括号分组的表达式
    Grouped(Box<Expr>),
    /// `name(arg; arg)`
    Function { name: String, args: Vec<Expr>, span: Span },
}

/// Set operators, lowest tier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,     // ,
    Subtract,  // -
    Intersect, // &
}

impl fmt::Display for SetOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SetOp::Union => ",",
            SetOp::Subtract => "-",
            SetOp::Intersect => "&",
        })
    }
}

/// An identifier split into fragments; it expands to the cartesian
/// product of its fragments, left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pattern {
    pub fragments: Vec<Fragment>,
}

impl Pattern {
    pub fn text(s: &str) -> Self {
        Self { fragments: vec![Fragment::Text(s.to_string())] }
    }

    /// The literal text if the pattern has no expansion in it.
    pub fn as_plain(&self) -> Option<String> {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(t) => out.push_str(t),
                _ => return None,
            }
        }
        Some(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    /// `{start-end}` or `start..end`
    Range(RangeSpec),
    /// `{a,b{1-2},c}`
    Alternation(Vec<Pattern>),
}

/// A closed range embedded in an identifier. Bounds are kept as written;
/// they are classified (numeric or alphabetic) at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub start: String,
    pub end: String,
    /// Zero-pad width for numeric ranges, taken from `start`
    pub width: usize,
    pub span: Span,
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}-{}}}", self.start, self.end)
    }
}

/// A compiled regex together with its source text.
#[derive(Debug, Clone)]
pub struct RegexLiteral {
    pub source: String,
    pub regex: Regex,
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
