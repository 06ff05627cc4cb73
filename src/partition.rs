//! Splitting oversized queries into legal-sized sub-queries
//!
//! When a document would return more cells than the server allows in one
//! request, one variable's values are cut into consecutive runs and one
//! sub-document is issued per run. Concatenating the runs in order gives back
//! the original value sequence exactly once.

use tracing::{debug, info};

use crate::query::{QueryDocument, QueryEntry};

/// Partitioning errors
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    /// Preferred partition variable is not part of the document
    #[error("partition variable {0} is not part of the query")]
    UnknownVariable(String),

    /// Even a single value of the splitting variable exceeds the server limit
    #[error("can't partition by {code}, each partition would exceed the server limit ({per_value} > {limit})")]
    UnpartitionableSelection {
        /// Splitting variable code (empty if the document has no variables)
        code: String,
        /// Cells contributed by one value of the splitting variable
        per_value: u64,
        /// Server limit
        limit: u64,
    },
}

/// Result type for partitioning
pub type PartitionResult<T> = Result<T, PartitionError>;

/// How a document is split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Splitting variable
    pub variable_code: String,
    /// Maximum values per chunk
    pub chunk_size: usize,
    /// Consecutive, non-overlapping runs covering the variable's selected values
    pub chunks: Vec<Vec<String>>,
}

impl PartitionPlan {
    /// Number of sub-requests this plan produces
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the plan is empty (never true for a plan returned by [`Partitioner::plan`])
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// One document per chunk, in chunk order
    ///
    /// Each is identical to `doc` except for the splitting variable's values.
    pub fn sub_documents(&self, doc: &QueryDocument) -> PartitionResult<Vec<QueryDocument>> {
        self.chunks
            .iter()
            .map(|chunk| {
                doc.with_values(&self.variable_code, chunk.clone())
                    .ok_or_else(|| PartitionError::UnknownVariable(self.variable_code.clone()))
            })
            .collect()
    }
}

/// Chooses a splitting variable and chunk size under a server limit
#[derive(Debug, Clone)]
pub struct Partitioner {
    server_limit: u64,
    preferred_variable: Option<String>,
}

impl Partitioner {
    /// Create a partitioner
    ///
    /// # Arguments
    /// * `server_limit` - Maximum cells the server returns per request
    /// * `preferred_variable` - Variable to split on; `None` picks the one with most values
    pub fn new(server_limit: u64, preferred_variable: Option<String>) -> Self {
        Self {
            server_limit,
            preferred_variable,
        }
    }

    /// Server limit this partitioner plans against
    pub fn server_limit(&self) -> u64 {
        self.server_limit
    }

    /// Plan the split of `doc`
    ///
    /// # Errors
    /// * `UnknownVariable` - the preferred variable has no entry in `doc`
    /// * `UnpartitionableSelection` - one value's worth of cells already exceeds the limit
    pub fn plan(&self, doc: &QueryDocument) -> PartitionResult<PartitionPlan> {
        let entry = self.splitting_entry(doc)?;
        let values = entry.values();
        let total = doc.estimate();

        if values.is_empty() {
            return Err(PartitionError::UnpartitionableSelection {
                code: entry.code.clone(),
                per_value: total,
                limit: self.server_limit,
            });
        }

        let per_value = total / values.len() as u64;
        let chunk_size = self.chunk_size(&entry.code, per_value)?;

        let chunks: Vec<Vec<String>> = values.chunks(chunk_size).map(<[String]>::to_vec).collect();

        info!(
            variable = %entry.code,
            values = values.len(),
            chunk_size,
            requests = chunks.len(),
            cells = total,
            "Partitioning query"
        );

        Ok(PartitionPlan {
            variable_code: entry.code.clone(),
            chunk_size,
            chunks,
        })
    }

    /// Values of the splitting variable that fit in one request
    ///
    /// Clamped to at least 1 so a plan always makes progress.
    pub fn chunk_size(&self, code: &str, per_value: u64) -> PartitionResult<usize> {
        if per_value > self.server_limit {
            return Err(PartitionError::UnpartitionableSelection {
                code: code.to_string(),
                per_value,
                limit: self.server_limit,
            });
        }

        let size = self.server_limit.checked_div(per_value).unwrap_or(self.server_limit);
        let size = usize::try_from(size).unwrap_or(usize::MAX).max(1);
        debug!(code, per_value, size, "Computed chunk size");
        Ok(size)
    }

    fn splitting_entry<'d>(&self, doc: &'d QueryDocument) -> PartitionResult<&'d QueryEntry> {
        if let Some(code) = &self.preferred_variable {
            return doc
                .entry(code)
                .ok_or_else(|| PartitionError::UnknownVariable(code.clone()));
        }

        // Largest value count wins, ties go to the earliest entry
        doc.entries()
            .iter()
            .fold(None, |best: Option<&QueryEntry>, entry| match best {
                Some(b) if b.values().len() >= entry.values().len() => Some(b),
                _ => Some(entry),
            })
            .ok_or_else(|| PartitionError::UnpartitionableSelection {
                code: String::new(),
                per_value: 1,
                limit: self.server_limit,
            })
    }
}
