//! Query document construction
//!
//! Starts from a document that lists every catalog variable with all of its
//! values, then applies the caller's directives and the optional `time_top`
//! trim. Nothing here touches the network.

use tracing::debug;

use crate::query::{QueryDocument, QueryEntry, QueryError, QueryResult, QuerySelection, Selection};
use crate::{ResponseFormat, Variable};

/// Builds query documents against a fixed set of variables
pub struct QueryBuilder<'a> {
    variables: &'a [Variable],
}

impl<'a> QueryBuilder<'a> {
    /// Create a builder over the table's variables
    pub fn new(variables: &'a [Variable]) -> Self {
        Self { variables }
    }

    /// Document selecting every value of every variable, in catalog order
    ///
    /// # Errors
    /// Returns `InvalidSelectionValue` if the catalog lists a code twice
    pub fn default_document(&self, format: ResponseFormat) -> QueryResult<QueryDocument> {
        let entries = self
            .variables
            .iter()
            .map(|var| QueryEntry::item(var.code.clone(), var.values.clone()))
            .collect();
        QueryDocument::new(entries, format)
    }

    /// Build a query document
    ///
    /// # Arguments
    /// * `selection` - Directives keyed by variable code; unnamed variables keep all values
    /// * `format` - Response format to request
    /// * `time_top` - If non-zero, keep only the last `time_top` values of the time variable
    ///
    /// # Errors
    /// * `InvalidVariable` - a selection key is not a catalog code
    /// * `InvalidSelectionValue` - an explicit selection is empty, repeats a value,
    ///   or names a value outside the variable's domain
    /// * `NoTimeVariable` - `time_top > 0` but no variable is flagged as time
    /// * `ConflictingTimeSelection` - `time_top > 0` and the selection names the time variable
    pub fn build(
        &self,
        selection: Option<&QuerySelection>,
        format: ResponseFormat,
        time_top: usize,
    ) -> QueryResult<QueryDocument> {
        let mut doc = self.default_document(format)?;

        if let Some(selection) = selection {
            for (code, directive) in selection.iter() {
                let variable = self.variable(code)?;
                match directive {
                    Selection::Merge => doc.remove(code),
                    Selection::All => {}
                    Selection::Explicit(values) => {
                        Self::check_explicit(variable, values)?;
                        if let Some(entry) = doc.entry_mut(code) {
                            entry.selection.values = values.clone();
                        }
                    }
                }
            }
        }

        if time_top > 0 {
            self.apply_time_top(&mut doc, selection, time_top)?;
        }

        debug!(
            entries = doc.entries().len(),
            cells = doc.estimate(),
            "Built query document"
        );

        Ok(doc)
    }

    fn variable(&self, code: &str) -> QueryResult<&'a Variable> {
        self.variables
            .iter()
            .find(|var| var.code == code)
            .ok_or_else(|| QueryError::InvalidVariable {
                code: code.to_string(),
                valid: self.variables.iter().map(|var| var.code.clone()).collect(),
            })
    }

    fn check_explicit(variable: &Variable, values: &[String]) -> QueryResult<()> {
        let invalid = |reason: String| QueryError::InvalidSelectionValue {
            code: variable.code.clone(),
            reason,
        };

        if values.is_empty() {
            return Err(invalid(
                "selection must contain at least one value".to_string(),
            ));
        }

        for (i, value) in values.iter().enumerate() {
            if !variable.has_value(value) {
                return Err(invalid(format!("'{value}' is not a value of this variable")));
            }
            if values[..i].contains(value) {
                return Err(invalid(format!("'{value}' is selected more than once")));
            }
        }

        Ok(())
    }

    /// Keep the chronological tail of the time variable
    ///
    /// Assumes the catalog lists time values in ascending order.
    fn apply_time_top(
        &self,
        doc: &mut QueryDocument,
        selection: Option<&QuerySelection>,
        time_top: usize,
    ) -> QueryResult<()> {
        let time_var = self
            .variables
            .iter()
            .find(|var| var.is_time)
            .ok_or(QueryError::NoTimeVariable)?;

        if selection.is_some_and(|s| s.contains(&time_var.code)) {
            return Err(QueryError::ConflictingTimeSelection(time_var.code.clone()));
        }

        if let Some(entry) = doc.entry_mut(&time_var.code) {
            let skip = entry.selection.values.len().saturating_sub(time_top);
            entry.selection.values.drain(..skip);
        }

        Ok(())
    }
}
