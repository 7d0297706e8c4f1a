//! Search definitions and outcomes

use crate::error::{Error, Result};
use crate::query::{AggregatedResult, Request};
use serde::{Deserialize, Serialize};

/// One configured search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefinition {
    pub name: String,
    /// Set this to true to ignore this search definition
    pub disabled: bool,
    /// Path of the output files, without extension. The extension is
    /// added per output type when results are saved.
    pub output: String,
    /// Supported: `json`, `csv`
    pub output_types: Vec<String>,
    /// Dataset to query
    #[serde(rename = "dataset")]
    pub dataset_id: String,
    pub request: Request,
}

impl SearchDefinition {
    pub fn new(name: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            output: name.clone(),
            name,
            dataset_id: dataset_id.into(),
            ..Default::default()
        }
    }

    pub fn with_request(mut self, request: Request) -> Self {
        self.request = request;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>, types: &[&str]) -> Self {
        self.output = output.into();
        self.output_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Read one definition from JSON
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Terminal record of one search: the data fetched, and the error if it failed.
/// A failed search may still carry the pages fetched before the failure.
#[derive(Debug)]
pub struct RunOutcome {
    pub search: SearchDefinition,
    pub data: AggregatedResult,
    pub error: Option<Error>,
}

impl RunOutcome {
    pub fn success(search: SearchDefinition, data: AggregatedResult) -> Self {
        Self {
            search,
            data,
            error: None,
        }
    }

    pub fn failure(search: SearchDefinition, error: Error) -> Self {
        Self {
            search,
            data: AggregatedResult::default(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn name(&self) -> &str {
        &self.search.name
    }
}
