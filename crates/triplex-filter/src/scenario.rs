//! Self-contained filter scenarios (JSON).
//!
//! A scenario bundles everything one filter run needs: alias binding, raw
//! filter AST, entity properties and candidate triplets.
//!
//! ```text
//! {
//!   "aliases": ["a", "r", "b"],
//!   "filter": {"kind": "predicate", "alias": "a", "property": "age",
//!              "op": "gt", "value": {"type": "int32", "value": 30}},
//!   "properties": {"person:1": {"age": "35"}},
//!   "triplets": [{"subject": "person:1", "predicate": "knows", "object": "person:2"}]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use triplex_dsl::RawFilterNode;

use crate::config::FilterConfig;
use crate::eval::{AliasBinding, EvalError, Triplet};
use crate::resolver::HashPropertyStore;
use crate::scan::{scan, ScanOutcome};
use crate::tree::{build, BuildError, FilterNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub aliases: AliasBinding,
    pub filter: RawFilterNode,
    #[serde(default)]
    pub properties: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub triplets: Vec<Triplet>,
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("filter does not compile: {0}")]
    Build(#[from] BuildError),
    #[error("filter evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

impl Scenario {
    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn compile(&self) -> Result<FilterNode, BuildError> {
        build(&self.filter)
    }

    /// Load `properties` into a fresh store.
    pub fn property_store(&self) -> HashPropertyStore {
        let store = HashPropertyStore::new();
        for (entity, fields) in &self.properties {
            store.insert_entity(
                entity.as_str(),
                fields.iter().map(|(k, v)| (k.as_str(), v.as_bytes())),
            );
        }
        store
    }

    /// Compile the filter and scan every triplet.
    pub fn run(&self, config: &FilterConfig) -> Result<ScanOutcome, ScenarioError> {
        let filter = self.compile()?;
        let store = self.property_store();
        let outcome = scan(&filter, self.triplets.iter().cloned(), &self.aliases, &store, config)?;
        Ok(outcome)
    }
}
