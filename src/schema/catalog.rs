//! In-memory schema directory.
//!
//! [`SchemaCatalog`] holds every table of a schema with its columns in
//! declaration order. It is built once, from a DDL or JSON schema file, and
//! then only queried.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use indexmap::IndexMap;

use super::{SchemaDirectory, SchemaError, SemanticType};

/// A column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Column name, as declared.
    pub name: String,
    /// How values of the column are rewritten.
    pub semantic_type: SemanticType,
    /// Whether the column is computed by the database.
    pub generated: bool,
}

impl Column {
    /// Create a stored (non-generated) column.
    #[must_use]
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            generated: false,
        }
    }

    /// Mark the column as generated.
    #[must_use]
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }
}

/// A table with its columns in declaration order.
///
/// Column lookup ignores ASCII case, as MySQL does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: IndexMap<String, Column>,
}

impl TableSchema {
    /// Create a table schema.
    ///
    /// # Errors
    ///
    /// Returns an error if two columns share a name.
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut by_name = IndexMap::new();
        for column in columns {
            let key = column.name.to_ascii_lowercase();
            if by_name.contains_key(&key) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name,
                });
            }
            by_name.insert(key, column);
        }
        Ok(Self {
            name,
            columns: by_name,
        })
    }

    /// The table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns, generated ones included.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Names of the data-bearing columns, in declaration order.
    #[must_use]
    pub fn data_column_names(&self) -> Vec<&str> {
        self.columns
            .values()
            .filter(|c| !c.generated)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(&name.to_ascii_lowercase())
    }
}

/// A schema directory backed by in-memory table definitions.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: HashMap<String, TableSchema>,
}

impl SchemaCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] if a table with the same name
    /// (ignoring ASCII case) is already present.
    pub fn insert(&mut self, table: TableSchema) -> Result<(), SchemaError> {
        let key = table.name.to_ascii_lowercase();
        if self.tables.contains_key(&key) {
            return Err(SchemaError::DuplicateTable(table.name));
        }
        self.tables.insert(key, table);
        Ok(())
    }

    /// Build a catalog from table definitions.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] if two tables share a name,
    /// as [`SchemaCatalog::insert`] does.
    pub fn from_tables(
        tables: impl IntoIterator<Item = TableSchema>,
    ) -> Result<Self, SchemaError> {
        let mut catalog = Self::new();
        for table in tables {
            catalog.insert(table)?;
        }
        Ok(catalog)
    }

    /// Look up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    /// Number of tables in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the catalog has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Load a catalog from a schema file.
    ///
    /// Files ending in `.json` are read as JSON schema documents, anything
    /// else as `CREATE TABLE` DDL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let catalog = if is_json {
            #[cfg(feature = "json")]
            {
                Self::from_json(&text)?
            }
            #[cfg(not(feature = "json"))]
            {
                return Err(SchemaError::UnsupportedFormat(path.to_path_buf()));
            }
        } else {
            Self::from_ddl(&text)?
        };

        log::info!(
            "Loaded {} tables from schema file {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    fn require(&self, table: &str) -> Result<&TableSchema, SchemaError> {
        self.table(table)
            .ok_or_else(|| SchemaError::UnknownTable(table.to_owned()))
    }
}

impl SchemaDirectory for SchemaCatalog {
    fn table_exists(&self, table: &str) -> bool {
        self.table(table).is_some()
    }

    fn columns_of(&self, table: &str) -> Result<Vec<&str>, SchemaError> {
        Ok(self.require(table)?.data_column_names())
    }

    fn semantic_type_of(&self, table: &str, column: &str) -> Result<SemanticType, SchemaError> {
        self.require(table)?
            .column(column)
            .map(|c| c.semantic_type)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: table.to_owned(),
                column: column.to_owned(),
            })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableSchema {
        TableSchema::new(
            "Users",
            [
                Column::new("id", SemanticType::Other),
                Column::new("active", SemanticType::Boolean),
                Column::new("created_at", SemanticType::Temporal),
                Column::new("name_upper", SemanticType::Other).generated(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_exclude_generated() {
        let catalog = SchemaCatalog::from_tables([users()]).unwrap();
        assert_eq!(
            catalog.columns_of("users").unwrap(),
            vec!["id", "active", "created_at"]
        );
        assert_eq!(catalog.table("USERS").unwrap().columns().count(), 4);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let catalog = SchemaCatalog::from_tables([users()]).unwrap();
        assert!(catalog.table_exists("users"));
        assert!(catalog.table_exists("USERS"));
        assert_eq!(
            catalog.semantic_type_of("users", "ACTIVE").unwrap(),
            SemanticType::Boolean
        );
    }

    #[test]
    fn test_unknown_table_and_column() {
        let catalog = SchemaCatalog::from_tables([users()]).unwrap();
        assert!(!catalog.table_exists("ghost"));
        assert!(matches!(
            catalog.columns_of("ghost"),
            Err(SchemaError::UnknownTable(name)) if name == "ghost"
        ));
        assert!(matches!(
            catalog.semantic_type_of("users", "nope"),
            Err(SchemaError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_duplicate_table() {
        let mut catalog = SchemaCatalog::new();
        catalog.insert(users()).unwrap();
        assert!(matches!(
            catalog.insert(users()),
            Err(SchemaError::DuplicateTable(name)) if name == "Users"
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_from_tables_rejects_duplicates() {
        let renamed = TableSchema::new("USERS", [Column::new("id", SemanticType::Other)]).unwrap();
        assert!(matches!(
            SchemaCatalog::from_tables([users(), renamed]),
            Err(SchemaError::DuplicateTable(name)) if name == "USERS"
        ));
    }

    #[test]
    fn test_duplicate_column() {
        let result = TableSchema::new(
            "t",
            [
                Column::new("a", SemanticType::Other),
                Column::new("A", SemanticType::Other),
            ],
        );
        assert!(matches!(
            result,
            Err(SchemaError::DuplicateColumn { column, .. }) if column == "A"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SchemaCatalog::load("/nonexistent/schema.sql"),
            Err(SchemaError::Io { .. })
        ));
    }
}
