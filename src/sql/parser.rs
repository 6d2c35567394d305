//! DDL parser extracting `CREATE TABLE` definitions from exported schema files.

use super::lexer::{Lexer, LexerError, Token, TokenKind};

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type name as written, if any.
    pub type_name: Option<String>,
    /// Type parameters as written, e.g. `["1"]` for `tinyint(1)`.
    pub type_params: Vec<String>,
    /// Whether this column is computed (`GENERATED ALWAYS AS` / `AS (...)`).
    pub is_generated: bool,
}

/// A CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    /// Table name, without any schema qualifier.
    pub name: String,
    /// Column definitions, in declaration order.
    pub columns: Vec<ColumnDef>,
}

/// DDL parser errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// Lexer error.
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),
    /// Unexpected token.
    #[error("Unexpected token {found:?} at position {pos}, expected {expected}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: TokenKind,
        /// Position in input.
        pos: usize,
    },
    /// Empty column list.
    #[error("Empty column list in CREATE TABLE {0}")]
    EmptyColumnList(String),
    /// Duplicate column name.
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// DDL parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Parse every `CREATE TABLE` statement from the input.
    ///
    /// Any other statement (`DROP TABLE`, `SET`, `CREATE VIEW`, ...) is skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a `CREATE TABLE` statement is malformed or a string
    /// literal is left open.
    pub fn parse_all(&mut self) -> Result<Vec<CreateTable>, ParseError> {
        let mut tables = Vec::new();

        loop {
            match self.lexer.peek()?.kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon => {
                    self.lexer.next()?;
                }
                TokenKind::Create => {
                    if let Some(table) = self.parse_create()? {
                        tables.push(table);
                    }
                }
                _ => self.skip_statement()?,
            }
        }

        Ok(tables)
    }

    /// Parse a CREATE statement, returning `None` for anything but a table.
    fn parse_create(&mut self) -> Result<Option<CreateTable>, ParseError> {
        self.expect(&TokenKind::Create)?;
        if self.lexer.peek()?.kind == TokenKind::Temporary {
            self.lexer.next()?;
        }
        if self.lexer.peek()?.kind != TokenKind::Table {
            self.skip_statement()?;
            return Ok(None);
        }
        self.lexer.next()?;

        if self.lexer.peek()?.kind == TokenKind::If {
            self.lexer.next()?;
            self.expect(&TokenKind::Not)?;
            self.expect(&TokenKind::Exists)?;
        }

        let name = self.parse_table_name()?;

        // CREATE TABLE ... LIKE / AS SELECT carry no column list.
        if self.lexer.peek()?.kind != TokenKind::LParen {
            self.skip_statement()?;
            return Ok(None);
        }
        self.lexer.next()?;

        let mut columns: Vec<ColumnDef> = Vec::new();
        loop {
            if is_table_constraint(&self.lexer.peek()?.kind) {
                self.skip_element()?;
            } else {
                let col_def = self.parse_column_def()?;

                // Check for duplicate
                if columns
                    .iter()
                    .any(|c| c.name.eq_ignore_ascii_case(&col_def.name))
                {
                    return Err(ParseError::DuplicateColumn(col_def.name));
                }

                columns.push(col_def);
            }

            if self.lexer.peek()?.kind != TokenKind::Comma {
                break;
            }
            self.lexer.next()?;
        }

        self.expect(&TokenKind::RParen)?;
        // Table options (ENGINE=..., CHARSET=...) up to the terminator.
        self.skip_statement()?;

        if columns.is_empty() {
            return Err(ParseError::EmptyColumnList(name));
        }

        Ok(Some(CreateTable { name, columns }))
    }

    /// Parse a possibly schema-qualified table name, keeping the last part.
    fn parse_table_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_identifier()?;
        while self.lexer.peek()?.kind == TokenKind::Dot {
            self.lexer.next()?;
            name = self.expect_identifier()?;
        }
        Ok(name)
    }

    /// Parse a column definition.
    fn parse_column_def(&mut self) -> Result<ColumnDef, ParseError> {
        let name = self.expect_identifier()?;

        let mut type_name = None;
        let mut type_params = Vec::new();
        if let TokenKind::Identifier(ident) = &self.lexer.peek()?.kind {
            type_name = Some(ident.clone());
            self.lexer.next()?;
            if self.lexer.peek()?.kind == TokenKind::LParen {
                self.lexer.next()?;
                type_params = self.parse_type_params()?;
            }
        }

        let mut is_generated = false;
        let mut depth = 0usize;
        loop {
            let token = self.lexer.peek()?;
            match &token.kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => break,
                TokenKind::Eof | TokenKind::Semicolon => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                TokenKind::Generated | TokenKind::As if depth == 0 => is_generated = true,
                _ => {}
            }
            self.lexer.next()?;
        }

        Ok(ColumnDef {
            name,
            type_name,
            type_params,
            is_generated,
        })
    }

    /// Parse the comma-separated parameters of a column type, after `(`.
    fn parse_type_params(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();
        loop {
            let token = self.lexer.next()?;
            match token.kind {
                TokenKind::Number(value)
                | TokenKind::StringLiteral(value)
                | TokenKind::Identifier(value) => params.push(value),
                TokenKind::RParen => return Ok(params),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "type parameter".into(),
                        found: other,
                        pos: token.pos,
                    });
                }
            }

            let token = self.lexer.next()?;
            match token.kind {
                TokenKind::Comma => {}
                TokenKind::RParen => return Ok(params),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "',' or ')'".into(),
                        found: other,
                        pos: token.pos,
                    });
                }
            }
        }
    }

    /// Skip a table-level constraint up to the next top-level `,` or `)`.
    fn skip_element(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.lexer.peek()?.kind {
                TokenKind::Comma | TokenKind::RParen if depth == 0 => return Ok(()),
                TokenKind::Eof | TokenKind::Semicolon => return Ok(()),
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth -= 1,
                _ => {}
            }
            self.lexer.next()?;
        }
    }

    /// Skip tokens up to and including the next `;`.
    fn skip_statement(&mut self) -> Result<(), ParseError> {
        loop {
            match self.lexer.next()?.kind {
                TokenKind::Eof | TokenKind::Semicolon => return Ok(()),
                _ => {}
            }
        }
    }

    /// Expect a specific token kind.
    fn expect(&mut self, expected: &TokenKind) -> Result<Token, ParseError> {
        let token = self.lexer.next()?;
        if core::mem::discriminant(&token.kind) == core::mem::discriminant(expected) {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{expected:?}"),
                found: token.kind,
                pos: token.pos,
            })
        }
    }

    /// Expect an identifier and return its name.
    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let token = self.lexer.next()?;
        match token.kind.as_identifier() {
            Some(name) => Ok(name.to_owned()),
            None => Err(ParseError::UnexpectedToken {
                expected: "identifier".into(),
                found: token.kind,
                pos: token.pos,
            }),
        }
    }
}

/// Whether a table element starting with this token is a constraint or index.
fn is_table_constraint(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Primary
            | TokenKind::Key
            | TokenKind::Index
            | TokenKind::Unique
            | TokenKind::Constraint
            | TokenKind::Foreign
            | TokenKind::Fulltext
            | TokenKind::Spatial
            | TokenKind::Check
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MYSQLDUMP_DDL: &str = "
-- MySQL dump 10.13
/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;
DROP TABLE IF EXISTS `users`;
CREATE TABLE `users` (
  `id` int(11) NOT NULL AUTO_INCREMENT,
  `name` varchar(255) COLLATE utf8_unicode_ci NOT NULL DEFAULT '',
  `active` tinyint(1) NOT NULL DEFAULT '1',
  `created_at` datetime DEFAULT NULL,
  `price` decimal(10,2) DEFAULT NULL,
  PRIMARY KEY (`id`),
  UNIQUE KEY `users_name` (`name`),
  CONSTRAINT `fk_x` FOREIGN KEY (`id`) REFERENCES `other` (`id`)
) ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8;
";

    fn names(table: &CreateTable) -> Vec<&str> {
        table.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_parse_mysqldump_table() {
        let tables = Parser::new(MYSQLDUMP_DDL).parse_all().unwrap();
        assert_eq!(tables.len(), 1);

        let users = &tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(
            names(users),
            vec!["id", "name", "active", "created_at", "price"]
        );
        assert_eq!(users.columns[2].type_name.as_deref(), Some("tinyint"));
        assert_eq!(users.columns[2].type_params, vec!["1"]);
        assert_eq!(users.columns[4].type_params, vec!["10", "2"]);
    }

    #[test]
    fn test_parse_create_table_simple() {
        let tables = Parser::new("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .parse_all()
            .unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "users");
        // An inline PRIMARY KEY is a column attribute, not a table element.
        assert_eq!(names(&tables[0]), vec!["id", "name"]);
        assert_eq!(tables[0].columns[0].type_name.as_deref(), Some("INTEGER"));
        assert_eq!(tables[0].columns[1].type_name.as_deref(), Some("TEXT"));
    }

    #[test]
    fn test_generated_columns_are_flagged() {
        let tables = Parser::new(
            "CREATE TABLE t (a int, b int GENERATED ALWAYS AS (a * 2) STORED, c int AS (a + 1) VIRTUAL, d int)",
        )
        .parse_all()
        .unwrap();
        let flags: Vec<bool> = tables[0].columns.iter().map(|c| c.is_generated).collect();
        assert_eq!(flags, vec![false, true, true, false]);
    }

    #[test]
    fn test_schema_qualified_and_if_not_exists() {
        let tables = Parser::new("CREATE TABLE IF NOT EXISTS app.`orders` (`key` int);")
            .parse_all()
            .unwrap();
        assert_eq!(tables[0].name, "orders");
        assert_eq!(names(&tables[0]), vec!["key"]);
    }

    #[test]
    fn test_enum_type_params() {
        let tables = Parser::new("CREATE TABLE t (state enum('on','off') DEFAULT 'on')")
            .parse_all()
            .unwrap();
        assert_eq!(tables[0].columns[0].type_params, vec!["on", "off"]);
    }

    #[test]
    fn test_other_statements_skipped() {
        let sql = "
            CREATE VIEW v AS SELECT 1;
            CREATE TABLE copy LIKE users;
            INSERT INTO users (id) VALUES (1);
            CREATE TABLE t (a int);
        ";
        let tables = Parser::new(sql).parse_all().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "t");
    }

    #[test]
    fn test_duplicate_column() {
        let result = Parser::new("CREATE TABLE t (a int, A int)").parse_all();
        assert_eq!(result, Err(ParseError::DuplicateColumn("A".into())));
    }

    #[test]
    fn test_empty_column_list() {
        let result = Parser::new("CREATE TABLE t (PRIMARY KEY (a))").parse_all();
        assert_eq!(result, Err(ParseError::EmptyColumnList("t".into())));
    }
}
