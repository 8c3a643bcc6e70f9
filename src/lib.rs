//! Range expressions over named clusters of hosts.
//!
//! A [`State`] holds clusters (named maps of key to value list); an
//! expression such as `%web - web1`, `has(ENVIRONMENT;prod)` or
//! `db{01-03}.dc & /^db0[12]/` is parsed into an [`ast::Expr`] and
//! evaluated against it into an ordered, deduplicated [`ResultSet`].
//!
//! ```text
//! let mut state = State::new();
//! state.add_cluster("web", Cluster::new().with("CLUSTER", ["web{1-2}"]));
//! state.query("%web")?;            // web1,web2
//! ```

pub mod ast;
pub mod builtins;
pub mod cluster;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod expand;
pub mod fixture;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod result;
pub mod state;
pub mod token;

pub use cluster::{Cluster, Discarded};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use parser::{parse, ParseError};
pub use result::ResultSet;
pub use state::State;
