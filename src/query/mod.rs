//! Query selections and query documents
//!
//! A [`QuerySelection`] is what the caller asks for, keyed by variable code.
//! A [`QueryDocument`] is what goes over the wire: one entry per variable that
//! is not merged away, plus the requested response format.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "query": [
//!     {"code": "Tid", "selection": {"filter": "item", "values": ["2020", "2021"]}}
//!   ],
//!   "response": {"format": "json"}
//! }
//! ```

use crate::ResponseFormat;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub mod builder;
pub mod estimate;

pub use builder::QueryBuilder;
pub use estimate::estimate;

/// Wildcard sentinel accepted at the boundary for [`Selection::All`]
pub const WILDCARD: &str = "*";

/// Merge sentinel accepted at the boundary for [`Selection::Merge`]
pub const MERGE: &str = "%";

/// Query construction errors
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Selection names a variable the table does not have
    #[error("{code} is not a valid variable, the valid variables are {}", .valid.join(", "))]
    InvalidVariable {
        /// Offending code
        code: String,
        /// Codes known to the catalog
        valid: Vec<String>,
    },

    /// Selection directive is malformed or names values outside the domain
    #[error("invalid selection for {code}: {reason}")]
    InvalidSelectionValue {
        /// Variable code the directive was given for
        code: String,
        /// What is wrong with it
        reason: String,
    },

    /// Unrecognized response format
    #[error("invalid response format '{0}', expected json or csv")]
    InvalidFormat(String),

    /// `time_top` was requested but the table has no time variable
    #[error("time_top requires a time variable, but the table has none")]
    NoTimeVariable,

    /// `time_top` was requested while the time variable is also selected
    #[error("time_top cannot be combined with an explicit selection of time variable {0}")]
    ConflictingTimeSelection(String),
}

/// Result type for query construction
pub type QueryResult<T> = Result<T, QueryError>;

/// Selection directive for one variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every value of the variable
    All,
    /// Collapse all values into one aggregate cell (variable left out of the query)
    Merge,
    /// Exactly these values, in this order
    Explicit(Vec<String>),
}

impl Selection {
    /// Build a directive from a list of values, honoring the `*` and `%` sentinels
    ///
    /// # Errors
    /// Returns `InvalidSelectionValue` for an empty list
    pub fn from_values(code: &str, values: Vec<String>) -> QueryResult<Self> {
        match values.as_slice() {
            [] => Err(QueryError::InvalidSelectionValue {
                code: code.to_string(),
                reason: "selection must contain at least one value".to_string(),
            }),
            [only] if only == WILDCARD => Ok(Selection::All),
            [only] if only == MERGE => Ok(Selection::Merge),
            _ => Ok(Selection::Explicit(values)),
        }
    }

    /// Build a directive from a JSON value, which must be an array of strings
    pub fn from_json(code: &str, value: &Value) -> QueryResult<Self> {
        let invalid = || QueryError::InvalidSelectionValue {
            code: code.to_string(),
            reason: format!(
                "got {value}, all selections should be lists of strings, even if there is only one element"
            ),
        };

        let items = value.as_array().ok_or_else(invalid)?;
        let values = items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<QueryResult<Vec<_>>>()?;

        Self::from_values(code, values)
    }

    /// Parse a `CODE=v1,v2` assignment, as used on the command line
    ///
    /// `CODE=*` selects everything and `CODE=%` merges the variable away.
    pub fn parse_assignment(assignment: &str) -> QueryResult<(String, Self)> {
        let (code, values) =
            assignment
                .split_once('=')
                .ok_or_else(|| QueryError::InvalidSelectionValue {
                    code: assignment.to_string(),
                    reason: "expected CODE=value[,value...]".to_string(),
                })?;

        let code = code.trim();
        if code.is_empty() {
            return Err(QueryError::InvalidSelectionValue {
                code: assignment.to_string(),
                reason: "variable code cannot be empty".to_string(),
            });
        }

        let values: Vec<String> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        Ok((code.to_string(), Self::from_values(code, values)?))
    }
}

/// Caller selection keyed by variable code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySelection {
    directives: BTreeMap<String, Selection>,
}

impl QuerySelection {
    /// Empty selection (every variable wildcarded)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directive for `code`, replacing any earlier one
    pub fn insert(&mut self, code: impl Into<String>, selection: Selection) -> &mut Self {
        self.directives.insert(code.into(), selection);
        self
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, code: impl Into<String>, selection: Selection) -> Self {
        self.insert(code, selection);
        self
    }

    /// Directive for `code`, if any
    pub fn get(&self, code: &str) -> Option<&Selection> {
        self.directives.get(code)
    }

    /// Whether the selection names `code`
    pub fn contains(&self, code: &str) -> bool {
        self.directives.contains_key(code)
    }

    /// Number of directives
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// No directives at all
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Directives in code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.directives.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a JSON object of `code -> [values]`
    ///
    /// ```
    /// use scb_client::query::{QuerySelection, Selection};
    /// use serde_json::json;
    ///
    /// let sel = QuerySelection::from_json(&json!({"Tid": ["2020"], "Kon": ["%"]})).unwrap();
    /// assert_eq!(sel.get("Kon"), Some(&Selection::Merge));
    /// ```
    pub fn from_json(value: &Value) -> QueryResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| QueryError::InvalidSelectionValue {
                code: String::new(),
                reason: format!("expected an object of variable selections, got {value}"),
            })?;

        let mut selection = Self::new();
        for (code, values) in object {
            selection.insert(code.clone(), Selection::from_json(code, values)?);
        }
        Ok(selection)
    }
}

impl FromIterator<(String, Selection)> for QuerySelection {
    fn from_iter<I: IntoIterator<Item = (String, Selection)>>(iter: I) -> Self {
        Self {
            directives: iter.into_iter().collect(),
        }
    }
}

/// Filter kind of a query entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Enumerated values
    Item,
    /// Server-side wildcard
    All,
}

/// Selection part of a wire entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySelection {
    /// Filter kind
    pub filter: FilterKind,
    /// Selected values, in request order
    pub values: Vec<String>,
}

/// One variable in a query document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryEntry {
    /// Variable code
    pub code: String,
    /// Filter and values
    pub selection: EntrySelection,
}

impl QueryEntry {
    /// Item-filtered entry
    pub fn item(code: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            code: code.into(),
            selection: EntrySelection {
                filter: FilterKind::Item,
                values,
            },
        }
    }

    /// Selected values
    pub fn values(&self) -> &[String] {
        &self.selection.values
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ResponseSpec {
    format: ResponseFormat,
}

/// Query document as sent to the server
///
/// Codes are unique. A merged variable has no entry at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDocument {
    query: Vec<QueryEntry>,
    response: ResponseSpec,
}

impl QueryDocument {
    /// Assemble a document from entries
    ///
    /// # Errors
    /// Returns `InvalidSelectionValue` if a code appears twice
    pub fn new(entries: Vec<QueryEntry>, format: ResponseFormat) -> QueryResult<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.code == entry.code) {
                return Err(QueryError::InvalidSelectionValue {
                    code: entry.code.clone(),
                    reason: "variable appears more than once in the query".to_string(),
                });
            }
        }
        Ok(Self {
            query: entries,
            response: ResponseSpec { format },
        })
    }

    /// Entries in document order
    pub fn entries(&self) -> &[QueryEntry] {
        &self.query
    }

    /// Entry for `code`, if present
    pub fn entry(&self, code: &str) -> Option<&QueryEntry> {
        self.query.iter().find(|e| e.code == code)
    }

    /// Declared response format
    pub fn format(&self) -> ResponseFormat {
        self.response.format
    }

    /// Estimated number of cells this document produces
    pub fn estimate(&self) -> u64 {
        estimate(self)
    }

    /// Copy of this document with `code`'s values replaced
    ///
    /// Returns `None` if `code` has no entry.
    pub fn with_values(&self, code: &str, values: Vec<String>) -> Option<Self> {
        let mut doc = self.clone();
        let entry = doc.query.iter_mut().find(|e| e.code == code)?;
        entry.selection.values = values;
        Some(doc)
    }

    pub(crate) fn entry_mut(&mut self, code: &str) -> Option<&mut QueryEntry> {
        self.query.iter_mut().find(|e| e.code == code)
    }

    pub(crate) fn remove(&mut self, code: &str) {
        self.query.retain(|e| e.code != code);
    }

    /// Wire representation
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "query": self.query.iter().map(|e| serde_json::json!({
                "code": e.code,
                "selection": {
                    "filter": e.selection.filter,
                    "values": e.selection.values,
                },
            })).collect::<Vec<_>>(),
            "response": {"format": self.response.format},
        })
    }
}
