//! Query state: the registry of clusters a query is evaluated against.

use std::collections::BTreeMap;
use tracing::debug;

use crate::ast::Expr;
use crate::cluster::Cluster;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::evaluator::Evaluator;
use crate::parser;
use crate::result::ResultSet;

/// Owns the clusters of one session plus the default (local) cluster.
///
/// Queries take `&self` and never mutate the state, so any number of
/// threads may query a shared `&State` at once. Registering clusters needs
/// `&mut self`; callers that interleave registration with concurrent
/// queries must provide their own read/write lock (`Arc<RwLock<State>>`).
#[derive(Debug, Clone, Default)]
pub struct State {
    clusters: BTreeMap<String, Cluster>,
    config: EngineConfig,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            clusters: BTreeMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers or replaces a cluster; last write wins.
    pub fn add_cluster(&mut self, name: impl Into<String>, cluster: Cluster) {
        let name = name.into();
        if self.clusters.insert(name.clone(), cluster).is_some() {
            debug!(cluster = %name, "replaced cluster");
        }
    }

    pub fn remove_cluster(&mut self, name: &str) -> Option<Cluster> {
        self.clusters.remove(name)
    }

    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.get(name)
    }

    /// Clusters in name order.
    pub fn clusters(&self) -> impl Iterator<Item = (&str, &Cluster)> {
        self.clusters.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// The cluster `@` and `?` resolve against in top-level expressions.
    pub fn default_cluster(&self) -> Option<&str> {
        self.config.default_cluster.as_deref()
    }

    pub fn set_default_cluster<S: Into<String>>(&mut self, name: Option<S>) {
        self.config.default_cluster = name.map(Into::into);
    }

    /// Parses and evaluates an expression.
    pub fn query(&self, expression: &str) -> Result<ResultSet> {
        let expr = parser::parse(expression).map_err(|e| Error::syntax(expression, e))?;
        let result = self.evaluate(&expr)?;
        debug!(expression, members = result.len(), "query evaluated");
        Ok(result)
    }

    /// Evaluates an already parsed expression.
    pub fn evaluate(&self, expr: &Expr) -> Result<ResultSet> {
        Evaluator::new(self).evaluate(expr)
    }
}
