//! Evaluator that interprets a range AST against a [`State`].
//!
//! Every node evaluates to an [`Operand`]: either a concrete set of names
//! or a regex pattern that can only filter a set supplied by the other
//! side of an operator. Set operators dispatch exhaustively over both
//! operand kinds.

use tracing::{trace, warn};

use crate::ast::{Expr, RegexLiteral, SetOp};
use crate::cluster::{Cluster, DEFAULT_KEY, KEYS_KEY};
use crate::error::{Error, Result};
use crate::expand::expand_pattern;
use crate::parser;
use crate::result::ResultSet;
use crate::state::State;

/// The value of an evaluated sub-expression.
#[derive(Debug)]
pub enum Operand<'e> {
    Set(ResultSet),
    Pattern(&'e RegexLiteral),
}

/// Evaluation context threaded through every call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context<'c> {
    /// Cluster that `@` and `?` resolve against
    pub local: Option<&'c str>,
    /// Number of cluster definitions entered so far
    pub depth: usize,
}

pub struct Evaluator<'s> {
    state: &'s State,
}

impl<'s> Evaluator<'s> {
    pub fn new(state: &'s State) -> Self {
        Self { state }
    }

    /// Evaluate an expression at top level, with the state's default
    /// cluster as the local cluster.
    pub fn evaluate(&self, expr: &Expr) -> Result<ResultSet> {
        let ctx = Context {
            local: self.state.default_cluster(),
            depth: 0,
        };
        self.eval_set(expr, ctx, "a whole expression")
    }

    pub(crate) fn eval<'e>(&self, expr: &'e Expr, ctx: Context<'_>) -> Result<Operand<'e>> {
        let set = match expr {
            Expr::Empty => ResultSet::new(),
            Expr::Literal(pattern) => {
                expand_pattern(pattern, self.state.config().max_range_len)?.into_iter().collect()
            }
            Expr::Quoted(text) => std::iter::once(text.as_str()).collect(),
            Expr::Regex(regex) => return Ok(Operand::Pattern(regex)),
            Expr::Grouped(inner) => return self.eval(inner, ctx),
            Expr::ClusterRef(name) => {
                let names = self.eval_set(name, ctx, "a cluster name")?;
                let mut out = ResultSet::new();
                for name in names.iter() {
                    out.union(self.expand_key(name, DEFAULT_KEY, ctx)?);
                }
                out
            }
            Expr::Attribute { cluster, key } => {
                let names = self.eval_set(cluster, ctx, "a cluster name")?;
                let keys = expand_pattern(key, self.state.config().max_range_len)?;
                let mut out = ResultSet::new();
                for name in names.iter() {
                    for key in &keys {
                        out.union(self.expand_key(name, key, ctx)?);
                    }
                }
                out
            }
            Expr::LocalRef(key) => {
                let local = self.local_cluster(ctx, "@")?;
                let keys = self.eval_set(key, ctx, "a key name")?;
                let mut out = ResultSet::new();
                for key in keys.iter() {
                    out.union(self.expand_key(local, key, ctx)?);
                }
                out
            }
            Expr::ClustersContaining(members) => {
                let members = self.eval_set(members, ctx, "an operand of '*'")?;
                self.clusters_containing(DEFAULT_KEY, &members, ctx)?
            }
            Expr::LocalKeysContaining(members) => {
                let local = self.local_cluster(ctx, "?")?;
                let members = self.eval_set(members, ctx, "an operand of '?'")?;
                self.keys_containing(local, &members, ctx)?
            }
            Expr::SetOp { op, left, right } => {
                let left = self.eval(left, ctx)?;
                let right = self.eval(right, ctx)?;
                return combine(*op, left, right);
            }
            Expr::Function { name, args, .. } => self.call_function(name, args, ctx)?,
        };
        Ok(Operand::Set(set))
    }

    /// Evaluate an expression that must produce a concrete set.
    pub(crate) fn eval_set(&self, expr: &Expr, ctx: Context<'_>, role: &str) -> Result<ResultSet> {
        match self.eval(expr, ctx)? {
            Operand::Set(set) => Ok(set),
            Operand::Pattern(regex) => Err(Error::Unsupported(format!(
                "regex /{}/ used as {} has no candidate set to match against",
                regex.source, role
            ))),
        }
    }

    pub(crate) fn cluster(&self, name: &str) -> Result<&'s Cluster> {
        self.state
            .cluster(name)
            .ok_or_else(|| Error::UndefinedCluster(name.to_string()))
    }

    pub(crate) fn cluster_names(&self) -> ResultSet {
        self.state.clusters().map(|(name, _)| name).collect()
    }

    fn local_cluster<'c>(&self, ctx: Context<'c>, operator: &str) -> Result<&'c str> {
        ctx.local.ok_or_else(|| {
            Error::Unsupported(format!("'{}' used without a local cluster", operator))
        })
    }

    /// Expand `key` of cluster `name`: every value is parsed and evaluated
    /// with that cluster as the local cluster. A missing key is empty.
    pub(crate) fn expand_key(&self, name: &str, key: &str, ctx: Context<'_>) -> Result<ResultSet> {
        let max_depth = self.state.config().max_depth;
        if ctx.depth >= max_depth {
            return Err(Error::RecursionLimit {
                cluster: name.to_string(),
                max_depth,
            });
        }

        let cluster = self.cluster(name)?;
        let Some(values) = cluster.get(key) else {
            // a stored KEYS attribute shadows the pseudo-key
            if key == KEYS_KEY {
                return Ok(cluster.keys().collect());
            }
            return Ok(ResultSet::new());
        };

        trace!(cluster = name, key, depth = ctx.depth, "expanding cluster key");

        let inner = Context {
            local: Some(name),
            depth: ctx.depth + 1,
        };
        let mut out = ResultSet::new();
        for value in values {
            out.union(self.expand_value(name, key, value, inner)?);
        }
        Ok(out)
    }

    /// Evaluates one stored value. Values that are not expressions
    /// (`-5`, `ops@example.com`, free text) and `host:port` style values
    /// whose left side names no cluster are kept as literal text.
    fn expand_value(&self, name: &str, key: &str, value: &str, ctx: Context<'_>) -> Result<ResultSet> {
        let expr = match parser::parse(value) {
            Ok(expr) => expr,
            Err(e) => {
                warn!(cluster = name, key, value, error = %e, "cluster value is not an expression, kept as literal");
                return Ok(std::iter::once(value).collect());
            }
        };

        match self.eval_set(&expr, ctx, "a cluster value") {
            Err(Error::UndefinedCluster(missing))
                if bare_attribute_cluster(&expr).as_deref() == Some(missing.as_str()) =>
            {
                warn!(cluster = name, key, value, "`{}` names no cluster, value kept as literal", missing);
                Ok(std::iter::once(value).collect())
            }
            result => result,
        }
    }

    /// Names of every cluster whose `key` expansion shares a member with
    /// `members`, in cluster name order.
    pub(crate) fn clusters_containing(
        &self,
        key: &str,
        members: &ResultSet,
        ctx: Context<'_>,
    ) -> Result<ResultSet> {
        let mut out = ResultSet::new();
        if members.is_empty() {
            return Ok(out);
        }
        for (name, cluster) in self.state.clusters() {
            if cluster.get(key).is_none() {
                continue;
            }
            if self.expand_key(name, key, ctx)?.overlaps(members) {
                out.add(name);
            }
        }
        Ok(out)
    }

    /// Keys of cluster `name` whose expansion shares a member with `members`.
    pub(crate) fn keys_containing(
        &self,
        name: &str,
        members: &ResultSet,
        ctx: Context<'_>,
    ) -> Result<ResultSet> {
        let cluster = self.cluster(name)?;
        let mut out = ResultSet::new();
        for key in cluster.keys() {
            if self.expand_key(name, key, ctx)?.overlaps(members) {
                out.add(key);
            }
        }
        Ok(out)
    }
}

/// The plain cluster name of a `name:key` expression.
fn bare_attribute_cluster(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Attribute { cluster, .. } => match cluster.as_ref() {
            Expr::Literal(pattern) => pattern.as_plain(),
            _ => None,
        },
        _ => None,
    }
}

/// Apply a set operator. A regex operand filters the set on the other
/// side where the operator defines one; every other combination is
/// rejected rather than guessed.
fn combine<'e>(op: SetOp, left: Operand<'e>, right: Operand<'e>) -> Result<Operand<'e>> {
    let set = match (op, left, right) {
        (_, Operand::Pattern(a), Operand::Pattern(b)) => {
            return Err(Error::Unsupported(format!(
                "'{}' between two regexes /{}/ and /{}/",
                op, a.source, b.source
            )))
        }
        (SetOp::Union, Operand::Set(mut l), Operand::Set(r)) => {
            l.union(r);
            l
        }
        (SetOp::Intersect, Operand::Set(mut l), Operand::Set(r)) => {
            l.intersect(&r);
            l
        }
        (SetOp::Subtract, Operand::Set(mut l), Operand::Set(r)) => {
            l.subtract(&r);
            l
        }
        (SetOp::Intersect, Operand::Set(mut set), Operand::Pattern(re))
        | (SetOp::Intersect, Operand::Pattern(re), Operand::Set(mut set)) => {
            set.retain(|v| re.regex.is_match(v));
            set
        }
        (SetOp::Subtract, Operand::Set(mut set), Operand::Pattern(re)) => {
            set.retain(|v| !re.regex.is_match(v));
            set
        }
        (SetOp::Subtract, Operand::Pattern(re), Operand::Set(_)) => {
            return Err(Error::Unsupported(format!(
                "regex /{}/ as the left operand of '-'",
                re.source
            )))
        }
        (SetOp::Union, Operand::Pattern(re), Operand::Set(_))
        | (SetOp::Union, Operand::Set(_), Operand::Pattern(re)) => {
            return Err(Error::Unsupported(format!(
                "regex /{}/ in a union has no candidate set to match against",
                re.source
            )))
        }
    };
    Ok(Operand::Set(set))
}
