//! Response envelopes and the aggregated query result

use serde::{Deserialize, Serialize};

/// Metadata returned with every response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMetadata {
    /// Number of records returned on this page
    pub count: u64,
    /// Total number of records that can be retrieved for this search
    pub total: u64,
    pub status: u16,
    pub summary: Option<String>,
    pub id: Option<String>,
    pub display_name: Option<String>,
}

impl ResponseMetadata {
    /// True while records remain beyond this page
    pub fn has_more(&self, start: u64) -> bool {
        self.total > start.saturating_add(self.count)
    }
}

/// Metadata for one column of the results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    pub id: String,
    pub display_name: String,
    pub format: String,
    pub metric: bool,
    pub length: u64,
    pub summary: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Vec<String>,
}

/// One row of data
pub type Row = Vec<serde_json::Value>;

/// Fields and rows carried by one page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageItems {
    #[serde(alias = "Fields")]
    pub fields: Vec<Field>,
    #[serde(alias = "Rows")]
    pub rows: Vec<Row>,
}

/// One page of a paginated query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPage {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    #[serde(alias = "Items")]
    pub items: PageItems,
}

/// All pages of one query merged together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatedResult {
    /// Column metadata, taken from the first page only
    pub fields: Vec<Field>,
    pub rows: Vec<Row>,
    /// Total reported by the server
    pub total: u64,
    /// Number of pages fetched
    pub pages: u32,
}

impl AggregatedResult {
    /// Merge one page. Later field lists are ignored.
    pub fn absorb(&mut self, page: QueryPage) {
        if self.fields.is_empty() {
            self.fields = page.items.fields;
        }
        self.rows.extend(page.items.rows);
        self.pages += 1;
        if page.metadata.total > 0 {
            self.total = page.metadata.total;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A dataset as returned by the dataset listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetItem {
    pub id: String,
    pub display_name: String,
    #[serde(alias = "State")]
    pub state: String,
    #[serde(alias = "Summary")]
    pub summary: String,
}

/// JSON response of the dataset listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    #[serde(alias = "Items")]
    pub items: Vec<DatasetItem>,
}

/// One ticker of a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerItem {
    pub id: String,
    pub display_name: String,
    pub sector: String,
    pub country: String,
    pub industry: String,
}

/// JSON response of the ticker listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    #[serde(alias = "Items")]
    pub items: Vec<TickerItem>,
}
