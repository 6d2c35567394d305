//! Schema directory adapter for JSON schema documents.
//!
//! The document maps table names to their ordered columns:
//!
//! ```json
//! {
//!   "tables": {
//!     "users": {
//!       "columns": [
//!         { "name": "id" },
//!         { "name": "active", "type": "boolean" },
//!         { "name": "created_at", "type": "temporal" },
//!         { "name": "search", "generated": true }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! A column may give its MySQL type as `sql_type` (e.g. `"tinyint(1)"`)
//! instead of a semantic `type`.

use core::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::{Column, SchemaCatalog, SchemaError, SemanticType, TableSchema};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    #[serde(deserialize_with = "table_entries")]
    tables: Vec<(String, TableDocument)>,
}

/// Read the `tables` object as entries in document order.
///
/// Repeated names are kept so the catalog can reject them.
fn table_entries<'de, D>(deserializer: D) -> Result<Vec<(String, TableDocument)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, TableDocument)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of table names to table definitions")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    columns: Vec<ColumnDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnDocument {
    name: String,
    #[serde(rename = "type")]
    semantic_type: Option<SemanticType>,
    sql_type: Option<String>,
    #[serde(default)]
    generated: bool,
}

impl ColumnDocument {
    fn semantic_type(&self) -> SemanticType {
        if let Some(semantic_type) = self.semantic_type {
            return semantic_type;
        }
        let Some(sql_type) = self.sql_type.as_deref() else {
            return SemanticType::Other;
        };
        let (name, params) = match sql_type.split_once('(') {
            Some((name, rest)) => (
                name,
                rest.split_once(')')
                    .map_or(rest, |(inner, _)| inner)
                    .split(',')
                    .map(|p| p.trim().to_owned())
                    .collect(),
            ),
            None => (sql_type, Vec::new()),
        };
        SemanticType::from_sql_type(name.trim(), &params)
    }
}

impl SchemaCatalog {
    /// Build a catalog from a JSON schema document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed, a table is defined
    /// twice, or a table repeats a column.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;

        let mut catalog = Self::new();
        for (name, table) in document.tables {
            let columns = table.columns.iter().map(|c| Column {
                name: c.name.clone(),
                semantic_type: c.semantic_type(),
                generated: c.generated,
            });
            catalog.insert(TableSchema::new(name, columns)?)?;
        }
        Ok(catalog)
    }
}
