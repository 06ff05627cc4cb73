//! Table path parsing and endpoint URLs
//!
//! Tables are addressed as AREA/CATEGORY/SPECIFICATION/TABLE beneath the API root.

use std::fmt;

/// Names of the four levels of the endpoint hierarchy, outermost first.
pub const LEVEL_NAMES: [&str; 4] = ["area", "category", "category specification", "table"];

/// Path of a table in the endpoint hierarchy
///
/// Segments are case-sensitive on the server and kept verbatim.
///
/// # Examples
///
/// ```
/// use scb_client::table::TablePath;
///
/// let path = TablePath::parse("AM/AM0110/AM0110A/LoneSpridSektorN").unwrap();
/// assert_eq!(path.area(), "AM");
/// assert_eq!(path.table(), "LoneSpridSektorN");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TablePath {
    area: String,
    category: String,
    category_specification: String,
    table: String,
}

impl TablePath {
    /// Build a path from its four segments
    pub fn new(
        area: impl Into<String>,
        category: impl Into<String>,
        category_specification: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            area: area.into(),
            category: category.into(),
            category_specification: category_specification.into(),
            table: table.into(),
        }
    }

    /// Parse a path string of the form `AREA/CATEGORY/SPECIFICATION/TABLE`
    ///
    /// # Errors
    ///
    /// Returns an error if there are not exactly four segments or any segment is empty.
    pub fn parse(s: &str) -> Result<Self, TablePathError> {
        let parts: Vec<&str> = s.trim().trim_matches('/').split('/').collect();
        if parts.len() != 4 {
            return Err(TablePathError::InvalidFormat(format!(
                "expected AREA/CATEGORY/SPECIFICATION/TABLE, got '{s}'"
            )));
        }

        for (name, part) in LEVEL_NAMES.iter().zip(&parts) {
            if part.trim().is_empty() {
                return Err(TablePathError::InvalidFormat(format!(
                    "{name} component cannot be empty"
                )));
            }
        }

        Ok(Self::new(
            parts[0].trim(),
            parts[1].trim(),
            parts[2].trim(),
            parts[3].trim(),
        ))
    }

    /// Area segment
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Category segment
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Category specification segment
    pub fn category_specification(&self) -> &str {
        &self.category_specification
    }

    /// Table segment
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Segments in hierarchy order
    pub fn segments(&self) -> [&str; 4] {
        [
            self.area.as_str(),
            self.category.as_str(),
            self.category_specification.as_str(),
            self.table.as_str(),
        ]
    }

    /// URL of the table itself (metadata on GET, data on POST)
    pub fn data_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// URLs listing the children of each level, paired with the segment expected there
    ///
    /// The first URL is the base itself, which lists areas.
    pub fn level_urls(&self, base_url: &str) -> Vec<(String, &str)> {
        let mut url = base_url.trim_end_matches('/').to_string();
        let mut levels = Vec::with_capacity(4);
        for segment in self.segments() {
            levels.push((url.clone(), segment));
            url.push('/');
            url.push_str(segment);
        }
        levels
    }
}

impl fmt::Display for TablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.area, self.category, self.category_specification, self.table
        )
    }
}

impl std::str::FromStr for TablePath {
    type Err = TablePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors that can occur during table path parsing
#[derive(Debug, thiserror::Error)]
pub enum TablePathError {
    /// Invalid path format
    #[error("table path error: {0}")]
    InvalidFormat(String),
}
