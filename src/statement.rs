//! Classification of tokenized statements.

use crate::tokenizer::{Token, unquote};

/// The parts of an `INSERT` statement the rewriter needs, as token indices.
///
/// Indices point into the token sequence the statement was classified from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Index of the target table name token.
    pub table: usize,
    /// Index of the parenthesized column-list token.
    pub columns: usize,
    /// Indices of the value tuple tokens, in order.
    pub tuples: Vec<usize>,
}

impl InsertStatement {
    /// The table name with identifier quoting removed.
    ///
    /// # Panics
    ///
    /// Panics if `tokens` is not the sequence this statement was classified
    /// from.
    #[must_use]
    pub fn table_name<'t>(&self, tokens: &'t [Token]) -> &'t str {
        table_name(&tokens[self.table])
    }
}

/// The name of a table token with identifier quoting removed.
///
/// Schema-qualified names (`"app"."users"`) resolve by their last part.
#[must_use]
pub fn table_name(token: &Token) -> &str {
    let raw = token.as_str();
    let name = unquote(raw);
    if name.len() + 2 == raw.len() && !name.contains(['"', '`']) {
        return name;
    }
    raw.rsplit_once('.').map_or(name, |(_, table)| unquote(table))
}

/// A classified statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// An `INSERT` with an explicit column list.
    Insert(InsertStatement),
    /// An `INSERT` whose values cannot be matched to column names: it has no
    /// column list, or its first tuple is glued to `VALUES`.
    Unaligned {
        /// Index of the target table name token.
        table: usize,
    },
    /// Anything else; emitted verbatim.
    Other,
}

/// Classify a token sequence.
///
/// Recognizes `INSERT [IGNORE] INTO <table> (<columns>) VALUES (...)[, (...)]`.
/// Keywords are matched ignoring ASCII case. Any other statement starting
/// with `INSERT [IGNORE] INTO <table>` is [`Statement::Unaligned`]; the rest
/// is [`Statement::Other`].
///
/// # Example
///
/// ```
/// use sqldump_rewrite::statement::{classify, Statement};
/// use sqldump_rewrite::tokenizer::tokenize;
///
/// let tokens = tokenize("INSERT INTO \"t\" (\"a\") VALUES (1),(2);").unwrap();
/// let Statement::Insert(insert) = classify(&tokens) else { panic!() };
/// assert_eq!(insert.table_name(&tokens), "t");
/// assert_eq!(tokens[insert.columns].as_str(), "(\"a\")");
/// assert_eq!(insert.tuples.len(), 2);
/// ```
#[must_use]
pub fn classify(tokens: &[Token]) -> Statement {
    let mut words = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_separator());

    if !words.next().is_some_and(|(_, t)| t.is_keyword("INSERT")) {
        return Statement::Other;
    }

    let mut next = words.next();
    if next.is_some_and(|(_, t)| t.is_keyword("IGNORE")) {
        next = words.next();
    }
    if !next.is_some_and(|(_, t)| t.is_keyword("INTO")) {
        return Statement::Other;
    }

    let Some((table, table_token)) = words.next() else {
        return Statement::Other;
    };
    if table_token.is_group() {
        return Statement::Other;
    }

    let Some((columns, _)) = words.next().filter(|(_, t)| t.is_group()) else {
        return Statement::Unaligned { table };
    };

    if !words
        .next()
        .is_some_and(|(_, t)| t.is_keyword("VALUES") || t.is_keyword("VALUE"))
    {
        return Statement::Unaligned { table };
    }

    let tuples = words
        .filter(|(_, token)| token.is_group())
        .map(|(idx, _)| idx)
        .collect();

    Statement::Insert(InsertStatement {
        table,
        columns,
        tuples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn classify_str(sql: &str) -> (Vec<Token>, Statement) {
        let tokens = tokenize(sql).unwrap();
        let statement = classify(&tokens);
        (tokens, statement)
    }

    #[test]
    fn test_mysqldump_insert() {
        let (tokens, statement) = classify_str(
            "INSERT INTO \"users\" (\"id\", \"active\") VALUES (1,0),(2,1);\n",
        );
        let Statement::Insert(insert) = statement else {
            panic!("Expected Insert");
        };
        assert_eq!(insert.table, 4);
        assert_eq!(insert.columns, 6);
        assert_eq!(insert.tuples, vec![10, 12]);
        assert_eq!(insert.table_name(&tokens), "users");
        assert_eq!(tokens[insert.tuples[1]].as_str(), "(2,1)");
    }

    #[test]
    fn test_lowercase_and_ignore() {
        let (tokens, statement) =
            classify_str("insert ignore into `t` (`a`) values (1), (2)");
        let Statement::Insert(insert) = statement else {
            panic!("Expected Insert");
        };
        assert_eq!(insert.table_name(&tokens), "t");
        assert_eq!(insert.tuples.len(), 2);
    }

    #[test]
    fn test_leading_whitespace() {
        let (_, statement) = classify_str("  INSERT INTO t (a) VALUES (1);");
        assert!(matches!(statement, Statement::Insert(_)));
    }

    #[test]
    fn test_schema_qualified_table() {
        let (tokens, statement) = classify_str("INSERT INTO \"app\".\"users\" (a) VALUES (1);");
        let Statement::Insert(insert) = statement else {
            panic!("Expected Insert");
        };
        assert_eq!(insert.table_name(&tokens), "users");
    }

    #[test]
    fn test_other_statements() {
        for sql in [
            "SET NAMES utf8;\n",
            "LOCK TABLES \"users\" WRITE;\n",
            "\n",
            "",
            "INSERT INTO (a) VALUES (1);",
            "INSERT t (a) VALUES (1);",
            "UPDATE t SET a = 1;",
        ] {
            let (_, statement) = classify_str(sql);
            assert_eq!(statement, Statement::Other, "{sql:?}");
        }
    }

    #[test]
    fn test_unaligned_inserts() {
        for sql in [
            "INSERT INTO \"users\" VALUES (1,0);",
            "insert into `users` value (1,0);",
            "INSERT INTO users (id, active) VALUES(1,0),(2,1);",
            "INSERT INTO users (id) SELECT 1;",
            "INSERT INTO users",
        ] {
            let (tokens, statement) = classify_str(sql);
            let Statement::Unaligned { table } = statement else {
                panic!("Expected Unaligned for {sql:?}, got {statement:?}");
            };
            assert_eq!(table_name(&tokens[table]), "users", "{sql:?}");
        }
    }

    #[test]
    fn test_insert_without_tuples() {
        let (_, statement) = classify_str("INSERT INTO t (a) VALUES;");
        assert_eq!(
            statement,
            Statement::Insert(InsertStatement {
                table: 4,
                columns: 6,
                tuples: vec![],
            })
        );
    }
}
