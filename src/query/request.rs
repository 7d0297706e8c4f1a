//! Filter payload definitions

use serde::{Deserialize, Serialize};

/// A request definition as documented by the Thinknum query API.
///
/// `Clone` is a deep copy: the filter and ticker vectors of a clone never
/// share storage with the original, so time-sliced copies made from a
/// template can be extended freely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Request {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tickers: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub pointintime: bool,
}

impl Request {
    /// Request restricted to the given tickers
    pub fn for_tickers<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Add a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Serialize to the JSON sent in the `request` form field
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A single filter used to filter data from a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    /// Operator, e.g. `>=`, `<`, `=`
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Vec<String>,
}

impl Filter {
    pub fn new(column: impl Into<String>, kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: kind.into(),
            value: vec![value.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_wire_format() {
        assert_eq!(Request::default().to_wire().unwrap(), "{}");
    }

    #[test]
    fn test_wire_format() {
        let request = Request::for_tickers(["nasdaq:aapl"])
            .with_filter(Filter::new("as_of_date", ">=", "2020-01-01"));

        let wire = request.to_wire().unwrap();
        assert_eq!(
            wire,
            r#"{"filters":[{"column":"as_of_date","type":">=","value":["2020-01-01"]}],"tickers":["nasdaq:aapl"]}"#
        );

        let pit = Request {
            pointintime: true,
            ..Default::default()
        };
        assert_eq!(pit.to_wire().unwrap(), r#"{"pointintime":true}"#);
    }

    #[test]
    fn test_clone_does_not_alias() {
        let original = Request::for_tickers(["nasdaq:aapl"])
            .with_filter(Filter::new("state", "=", "NY"));

        let mut copy = original.clone();
        copy.filters.push(Filter::new("state", "=", "CA"));
        copy.filters[0].value.push("NJ".to_string());
        copy.tickers.clear();

        assert_eq!(original.filters, vec![Filter::new("state", "=", "NY")]);
        assert_eq!(original.tickers, vec!["nasdaq:aapl".to_string()]);
    }
}
