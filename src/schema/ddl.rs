//! Schema directory adapter for `CREATE TABLE` DDL.
//!
//! Reads a schema-only dump such as the output of
//! `mysqldump --no-data`, classifying every column from its declared type.

use super::{Column, SchemaCatalog, SchemaError, SemanticType, TableSchema};
use crate::sql::{ColumnDef, CreateTable, Parser};

impl From<&ColumnDef> for Column {
    fn from(def: &ColumnDef) -> Self {
        let semantic_type = def
            .type_name
            .as_deref()
            .map_or(SemanticType::Other, |name| {
                SemanticType::from_sql_type(name, &def.type_params)
            });
        Self {
            name: def.name.clone(),
            semantic_type,
            generated: def.is_generated,
        }
    }
}

impl TryFrom<&CreateTable> for TableSchema {
    type Error = SchemaError;

    fn try_from(ct: &CreateTable) -> Result<Self, Self::Error> {
        TableSchema::new(ct.name.clone(), ct.columns.iter().map(Column::from))
    }
}

impl SchemaCatalog {
    /// Build a catalog from `CREATE TABLE` statements.
    ///
    /// Statements other than `CREATE TABLE` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL cannot be parsed or a table is defined
    /// twice.
    ///
    /// # Example
    ///
    /// ```
    /// use sqldump_rewrite::schema::{SchemaCatalog, SchemaDirectory, SemanticType};
    ///
    /// let catalog = SchemaCatalog::from_ddl(
    ///     "CREATE TABLE `users` (`id` int(11), `active` tinyint(1), `seen` datetime);",
    /// )
    /// .unwrap();
    /// assert_eq!(catalog.columns_of("users").unwrap(), vec!["id", "active", "seen"]);
    /// assert_eq!(catalog.semantic_type_of("users", "active").unwrap(), SemanticType::Boolean);
    /// ```
    pub fn from_ddl(ddl: &str) -> Result<Self, SchemaError> {
        let mut catalog = Self::new();
        for ct in Parser::new(ddl).parse_all()? {
            log::debug!("Schema table {} with {} columns", ct.name, ct.columns.len());
            catalog.insert(TableSchema::try_from(&ct)?)?;
        }
        Ok(catalog)
    }
}
