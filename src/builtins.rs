//! Built-in functions callable as `name(arg; arg)`.

use std::fmt;

use crate::ast::Expr;
use crate::cluster::DEFAULT_KEY;
use crate::error::{Error, Result};
use crate::evaluator::{Context, Evaluator};
use crate::result::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `allclusters()`: every registered cluster name
    AllClusters,
    /// `clusters(x)`: clusters whose default members include any of x
    Clusters,
    /// `has(KEY;x)`: clusters whose KEY includes any of x
    Has,
    /// `mem(cluster;x)`: keys of cluster that include any of x
    Mem,
    /// `keys(cluster)`: keys of cluster
    Keys,
    /// `count(x)`: number of members of x
    Count,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Builtin::AllClusters,
        Builtin::Clusters,
        Builtin::Has,
        Builtin::Mem,
        Builtin::Keys,
        Builtin::Count,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::AllClusters => "allclusters",
            Builtin::Clusters => "clusters",
            Builtin::Has => "has",
            Builtin::Mem => "mem",
            Builtin::Keys => "keys",
            Builtin::Count => "count",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::AllClusters => 0,
            Builtin::Clusters | Builtin::Keys | Builtin::Count => 1,
            Builtin::Has | Builtin::Mem => 2,
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.name())
    }
}

impl<'s> Evaluator<'s> {
    pub(crate) fn call_function(&self, name: &str, args: &[Expr], ctx: Context<'_>) -> Result<ResultSet> {
        let builtin = Builtin::from_name(name).ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
        if args.len() != builtin.arity() {
            return Err(Error::FunctionArity {
                name: name.to_string(),
                expected: builtin.arity(),
                found: args.len(),
            });
        }

        // arguments are evaluated left to right before dispatch
        let mut values = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let role = format!("argument {} of {}", index + 1, builtin);
            values.push(self.eval_set(arg, ctx, &role)?);
        }

        match builtin {
            Builtin::AllClusters => Ok(self.cluster_names()),
            Builtin::Clusters => self.clusters_containing(DEFAULT_KEY, &values[0], ctx),
            Builtin::Has => {
                let mut out = ResultSet::new();
                for key in values[0].iter() {
                    out.union(self.clusters_containing(key, &values[1], ctx)?);
                }
                Ok(out)
            }
            Builtin::Mem => {
                let mut out = ResultSet::new();
                for cluster in values[0].iter() {
                    out.union(self.keys_containing(cluster, &values[1], ctx)?);
                }
                Ok(out)
            }
            Builtin::Keys => {
                let mut out = ResultSet::new();
                for cluster in values[0].iter() {
                    out.extend(self.cluster(cluster)?.keys());
                }
                Ok(out)
            }
            Builtin::Count => Ok(std::iter::once(values[0].len().to_string()).collect()),
        }
    }
}
