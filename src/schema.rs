//! Schema directory: column lists and semantic column types per table.
mod catalog;
mod ddl;
#[cfg(feature = "json")]
mod json;

use std::path::PathBuf;

pub use catalog::{Column, SchemaCatalog, TableSchema};

/// How a column's values are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum SemanticType {
    /// Stored as a narrow integer in the dump, `BOOLEAN` in the target.
    Boolean,
    /// A date or time column that may hold the all-zero sentinel.
    Temporal,
    /// Anything else; values pass through untouched.
    #[default]
    Other,
}

impl SemanticType {
    /// Classify a MySQL column type.
    ///
    /// `BOOLEAN`, `BOOL` and `TINYINT(1)` are boolean-like; `DATE`,
    /// `DATETIME` and `TIMESTAMP` are temporal.
    ///
    /// # Example
    ///
    /// ```
    /// use sqldump_rewrite::schema::SemanticType;
    ///
    /// assert_eq!(SemanticType::from_sql_type("tinyint", &["1".into()]), SemanticType::Boolean);
    /// assert_eq!(SemanticType::from_sql_type("TINYINT", &["4".into()]), SemanticType::Other);
    /// assert_eq!(SemanticType::from_sql_type("datetime", &[]), SemanticType::Temporal);
    /// ```
    #[must_use]
    pub fn from_sql_type(type_name: &str, params: &[String]) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "TINYINT" if matches!(params, [width] if width.trim() == "1") => {
                Self::Boolean
            }
            "DATE" | "DATETIME" | "TIMESTAMP" => Self::Temporal,
            _ => Self::Other,
        }
    }

    /// Whether values of this type may need rewriting.
    #[must_use]
    pub fn needs_rewrite(self) -> bool {
        self != Self::Other
    }
}

/// Source of table and column metadata.
///
/// Lookups are read-only and idempotent. Implementations may be backed by an
/// exported schema file or by live introspection.
pub trait SchemaDirectory {
    /// Whether the directory knows `table`.
    fn table_exists(&self, table: &str) -> bool;

    /// The data-bearing columns of `table`, in declaration order.
    ///
    /// Generated columns are not data-bearing: dumps never carry their values.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTable`] if the table is unknown.
    fn columns_of(&self, table: &str) -> Result<Vec<&str>, SchemaError>;

    /// The semantic type of `column` in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTable`] or [`SchemaError::UnknownColumn`].
    fn semantic_type_of(&self, table: &str, column: &str) -> Result<SemanticType, SchemaError>;
}

impl<T: SchemaDirectory + ?Sized> SchemaDirectory for &T {
    #[inline]
    fn table_exists(&self, table: &str) -> bool {
        T::table_exists(self, table)
    }

    #[inline]
    fn columns_of(&self, table: &str) -> Result<Vec<&str>, SchemaError> {
        T::columns_of(self, table)
    }

    #[inline]
    fn semantic_type_of(&self, table: &str, column: &str) -> Result<SemanticType, SchemaError> {
        T::semantic_type_of(self, table, column)
    }
}

/// Errors raised while loading or querying a schema directory.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The table is not part of the schema.
    #[error("Invalid table: {0}")]
    UnknownTable(String),
    /// The column is not part of the table.
    #[error("Invalid column {column} in table {table}")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// A table repeats a column name.
    #[error("Duplicate column {column} in table {table}")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// The same table is defined twice.
    #[error("Duplicate table definition: {0}")]
    DuplicateTable(String),
    /// The DDL schema file could not be parsed.
    #[error("Invalid DDL schema: {0}")]
    Ddl(#[from] crate::sql::ParseError),
    /// The JSON schema file could not be parsed.
    #[cfg(feature = "json")]
    #[error("Invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),
    /// The schema file format is not supported by this build.
    #[error("Unsupported schema file {}: build with the `json` feature", .0.display())]
    UnsupportedFormat(PathBuf),
    /// The schema file could not be read.
    #[error("Cannot read schema file {}: {source}", .path.display())]
    Io {
        /// Path of the schema file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_booleans() {
        assert_eq!(SemanticType::from_sql_type("BOOLEAN", &[]), SemanticType::Boolean);
        assert_eq!(SemanticType::from_sql_type("bool", &[]), SemanticType::Boolean);
        assert_eq!(SemanticType::from_sql_type("tinyint", &["1".into()]), SemanticType::Boolean);
        assert_eq!(SemanticType::from_sql_type("tinyint", &[]), SemanticType::Other);
        assert_eq!(SemanticType::from_sql_type("tinyint", &["3".into()]), SemanticType::Other);
        assert_eq!(SemanticType::from_sql_type("int", &["1".into()]), SemanticType::Other);
    }

    #[test]
    fn test_classify_temporal() {
        for name in ["date", "DATETIME", "Timestamp"] {
            assert_eq!(SemanticType::from_sql_type(name, &[]), SemanticType::Temporal);
        }
        assert_eq!(SemanticType::from_sql_type("datetime", &["6".into()]), SemanticType::Temporal);
        assert_eq!(SemanticType::from_sql_type("time", &[]), SemanticType::Other);
        assert_eq!(SemanticType::from_sql_type("year", &[]), SemanticType::Other);
    }

    #[test]
    fn test_needs_rewrite() {
        assert!(SemanticType::Boolean.needs_rewrite());
        assert!(SemanticType::Temporal.needs_rewrite());
        assert!(!SemanticType::Other.needs_rewrite());
    }
}
