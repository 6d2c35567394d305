//! DDL lexer for tokenizing exported schema files.

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The position in the input where this token starts.
    pub pos: usize,
}

/// The different kinds of tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    /// CREATE keyword
    Create,
    /// TEMPORARY keyword
    Temporary,
    /// TABLE keyword
    Table,
    /// IF keyword
    If,
    /// NOT keyword
    Not,
    /// EXISTS keyword
    Exists,
    /// PRIMARY keyword
    Primary,
    /// KEY keyword
    Key,
    /// INDEX keyword
    Index,
    /// UNIQUE keyword
    Unique,
    /// CONSTRAINT keyword
    Constraint,
    /// FOREIGN keyword
    Foreign,
    /// FULLTEXT keyword
    Fulltext,
    /// SPATIAL keyword
    Spatial,
    /// CHECK keyword
    Check,
    /// GENERATED keyword
    Generated,
    /// AS keyword
    As,

    // Literals
    /// Numeric literal, kept as written.
    Number(String),
    /// Single-quoted string literal, unescaped.
    StringLiteral(String),

    // Identifiers
    /// A bare identifier (type name, column name, option name, etc.)
    Identifier(String),
    /// A backtick or double-quote delimited identifier, unescaped.
    QuotedIdentifier(String),

    // Symbols
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Comma
    Comma,
    /// Semicolon
    Semicolon,
    /// Period
    Dot,
    /// Any other punctuation character.
    Symbol(char),

    // Special
    /// End of input
    Eof,
}

/// DDL lexer that produces tokens from input.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is an unterminated string.
    pub fn peek(&mut self) -> Result<&Token, LexerError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token()?);
        }
        Ok(self.peeked.get_or_insert(Token {
            kind: TokenKind::Eof,
            pos: self.pos,
        }))
    }

    /// Consume and return the next token.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is an unterminated string.
    pub fn next(&mut self) -> Result<Token, LexerError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.next_token()
    }

    /// Skip whitespace and comments.
    ///
    /// MySQL conditional comments (`/*!40101 ... */`) are skipped like any
    /// other block comment.
    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if (b == b'-' && self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'-')
                || b == b'#'
            {
                // Line comment
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/' && self.pos + 1 < bytes.len() && bytes[self.pos + 1] == b'*' {
                // Block comment
                self.pos += 2;
                while self.pos + 1 < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(bytes.len());
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        let start_pos = self.pos;
        let bytes = self.input.as_bytes();

        if self.pos >= bytes.len() {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: start_pos,
            });
        }

        let b = bytes[self.pos];

        let kind = match b {
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'\'' => {
                let value = self.read_delimited(start_pos, b'\'')?;
                return Ok(Token {
                    kind: TokenKind::StringLiteral(value),
                    pos: start_pos,
                });
            }
            b'`' | b'"' => {
                let value = self.read_delimited(start_pos, b)?;
                return Ok(Token {
                    kind: TokenKind::QuotedIdentifier(value),
                    pos: start_pos,
                });
            }
            _ if b.is_ascii_digit() => return Ok(self.read_number(start_pos)),
            _ if is_ident_cont(b) => return Ok(self.read_identifier(start_pos)),
            _ => TokenKind::Symbol(char::from(b)),
        };

        self.pos += 1;
        Ok(Token {
            kind,
            pos: start_pos,
        })
    }

    /// Read a quote-delimited run, honoring doubled-quote and backslash escapes.
    fn read_delimited(&mut self, start_pos: usize, quote: u8) -> Result<String, LexerError> {
        let bytes = self.input.as_bytes();
        self.pos += 1;

        let mut value = String::new();
        let mut run_start = self.pos;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b == b'\\' && quote == b'\'' && self.pos + 1 < bytes.len() {
                value.push_str(&self.input[run_start..self.pos]);
                self.pos += 1;
                run_start = self.pos;
                self.pos += 1;
            } else if b == quote {
                value.push_str(&self.input[run_start..self.pos]);
                // Check for escaped quote (doubled)
                if self.pos + 1 < bytes.len() && bytes[self.pos + 1] == quote {
                    value.push(char::from(quote));
                    self.pos += 2;
                    run_start = self.pos;
                } else {
                    self.pos += 1;
                    return Ok(value);
                }
            } else {
                self.pos += 1;
            }
        }

        Err(LexerError::UnterminatedString { pos: start_pos })
    }

    fn read_number(&mut self, start_pos: usize) -> Token {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len()
            && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'.')
        {
            self.pos += 1;
        }

        Token {
            kind: TokenKind::Number(self.input[start_pos..self.pos].into()),
            pos: start_pos,
        }
    }

    fn read_identifier(&mut self, start_pos: usize) -> Token {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_ident_cont(bytes[self.pos]) {
            self.pos += 1;
        }

        let ident = &self.input[start_pos..self.pos];
        let kind = match ident.to_ascii_uppercase().as_str() {
            "CREATE" => TokenKind::Create,
            "TEMPORARY" => TokenKind::Temporary,
            "TABLE" => TokenKind::Table,
            "IF" => TokenKind::If,
            "NOT" => TokenKind::Not,
            "EXISTS" => TokenKind::Exists,
            "PRIMARY" => TokenKind::Primary,
            "KEY" => TokenKind::Key,
            "INDEX" => TokenKind::Index,
            "UNIQUE" => TokenKind::Unique,
            "CONSTRAINT" => TokenKind::Constraint,
            "FOREIGN" => TokenKind::Foreign,
            "FULLTEXT" => TokenKind::Fulltext,
            "SPATIAL" => TokenKind::Spatial,
            "CHECK" => TokenKind::Check,
            "GENERATED" => TokenKind::Generated,
            "AS" => TokenKind::As,
            _ => TokenKind::Identifier(ident.into()),
        };

        Token {
            kind,
            pos: start_pos,
        }
    }
}

impl TokenKind {
    /// The identifier spelled by this token, if it can name a table or column.
    ///
    /// Keywords are accepted as identifiers, which is common in dumps.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        Some(match self {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => name,
            TokenKind::Create => "CREATE",
            TokenKind::Temporary => "TEMPORARY",
            TokenKind::Table => "TABLE",
            TokenKind::If => "IF",
            TokenKind::Not => "NOT",
            TokenKind::Exists => "EXISTS",
            TokenKind::Primary => "PRIMARY",
            TokenKind::Key => "KEY",
            TokenKind::Index => "INDEX",
            TokenKind::Unique => "UNIQUE",
            TokenKind::Constraint => "CONSTRAINT",
            TokenKind::Foreign => "FOREIGN",
            TokenKind::Fulltext => "FULLTEXT",
            TokenKind::Spatial => "SPATIAL",
            TokenKind::Check => "CHECK",
            TokenKind::Generated => "GENERATED",
            TokenKind::As => "AS",
            _ => return None,
        })
    }
}

/// Check if a byte can continue an identifier.
///
/// Bytes outside ASCII belong to multi-byte characters and are kept whole.
fn is_ident_cont(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || !b.is_ascii()
}

/// Errors that can occur during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    /// Unterminated string literal or quoted identifier.
    #[error("Unterminated string literal starting at position {pos}")]
    UnterminatedString {
        /// Position where string started.
        pos: usize,
    },
}
