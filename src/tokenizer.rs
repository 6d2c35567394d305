//! Lossless tokenizer for dump statements.
//!
//! Unlike the DDL lexer in [`crate::sql`], this tokenizer never interprets or
//! drops input: every byte of a statement ends up in exactly one [`Token`],
//! so joining the tokens back together reproduces the statement verbatim.
//!
//! Separators (whitespace, `,` and `;`) only split tokens at nesting depth
//! zero. A quoted string or a parenthesized group is kept whole, delimiters
//! included, and can be tokenized again through [`Token::interior`].

use core::fmt;

/// A span of statement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    pos: usize,
}

/// The structural role of a token, derived from its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A single whitespace character.
    Whitespace,
    /// A top-level `,`.
    Comma,
    /// A top-level `;`.
    Semicolon,
    /// A `'...'` string literal.
    SingleQuoted,
    /// A `"..."` quoted identifier or string.
    DoubleQuoted,
    /// A `(...)` group.
    Group,
    /// Anything else: keywords, bare identifiers, numbers, `NULL`.
    Word,
}

impl Token {
    /// Create a token from its text and byte offset.
    #[must_use]
    pub fn new(text: impl Into<String>, pos: usize) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }

    /// The token text, exactly as it appeared in the input.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Byte offset of the token in the tokenized text.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The structural role of this token.
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self.text.chars().next() {
            Some(',') => TokenKind::Comma,
            Some(';') => TokenKind::Semicolon,
            Some('\'') => TokenKind::SingleQuoted,
            Some('"') => TokenKind::DoubleQuoted,
            Some('(') => TokenKind::Group,
            Some(c) if c.is_whitespace() => TokenKind::Whitespace,
            _ => TokenKind::Word,
        }
    }

    /// Whether this token only separates other tokens.
    #[must_use]
    pub fn is_separator(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Whitespace | TokenKind::Comma | TokenKind::Semicolon
        )
    }

    /// Whether this token is a parenthesized group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind() == TokenKind::Group
    }

    /// The text between the enclosing delimiters of a quoted or group token.
    ///
    /// Returns `None` for tokens that are not delimited, and for a token whose
    /// group or quote is followed by more text, such as `(a)b`.
    #[must_use]
    pub fn interior(&self) -> Option<&str> {
        let close = match self.kind() {
            TokenKind::Group => ')',
            TokenKind::SingleQuoted => '\'',
            TokenKind::DoubleQuoted => '"',
            _ => return None,
        };
        self.text
            .get(1..)
            .and_then(|rest| rest.strip_suffix(close))
    }

    /// The token text with one pair of enclosing quotes removed.
    ///
    /// Identifiers may be quoted with `"` or backticks. Unquoted text is
    /// returned as is.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        unquote(&self.text)
    }

    /// Whether the token spells `keyword`, ignoring ASCII case.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Strip one pair of matching `"`, `'` or backtick quotes.
#[must_use]
pub fn unquote(text: &str) -> &str {
    for quote in ['"', '`', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// An open nesting scope on the tokenizer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// Inside a `'...'` string.
    SingleQuote,
    /// Inside a `"..."` string.
    DoubleQuote,
    /// Inside a `(...)` group.
    Paren,
}

impl Nesting {
    /// The scope opened by `c`, if `c` is an opener.
    fn opened_by(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Self::SingleQuote),
            '"' => Some(Self::DoubleQuote),
            '(' => Some(Self::Paren),
            _ => None,
        }
    }

    /// The character closing this scope.
    #[must_use]
    pub fn closer(self) -> char {
        match self {
            Self::SingleQuote => '\'',
            Self::DoubleQuote => '"',
            Self::Paren => ')',
        }
    }

    /// Whether further scopes may open inside this one.
    ///
    /// Quotes are opaque: only their own closer ends them.
    fn admits_nesting(self) -> bool {
        self == Self::Paren
    }
}

impl fmt::Display for Nesting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opener = match self {
            Self::SingleQuote => '\'',
            Self::DoubleQuote => '"',
            Self::Paren => '(',
        };
        write!(f, "{opener}")
    }
}

/// Errors that can occur while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// Input ended while a quote or parenthesis was still open.
    #[error("Unclosed nesting {} opened at position {pos}", display_stack(.open))]
    UnbalancedNesting {
        /// Scopes still open at end of input, outermost first.
        open: Vec<Nesting>,
        /// Byte offset of the outermost open scope.
        pos: usize,
    },
}

fn display_stack(open: &[Nesting]) -> String {
    open.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

/// Split `text` into tokens.
///
/// A doubled single quote (`''`) is an escaped quote and never changes the
/// nesting state, inside or outside a string.
///
/// # Errors
///
/// Returns [`TokenizeError::UnbalancedNesting`] if a quote or parenthesis is
/// left open at end of input.
///
/// # Example
///
/// ```
/// use sqldump_rewrite::tokenizer::tokenize;
///
/// let tokens = tokenize("VALUES (1,'a, b');").unwrap();
/// let texts: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
/// assert_eq!(texts, vec!["VALUES", " ", "(1,'a, b')", ";"]);
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut stack: Vec<(Nesting, usize)> = Vec::new();
    let mut start = 0;

    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
            chars.next();
            continue;
        }

        match stack.last() {
            None if c.is_whitespace() || c == ',' || c == ';' => {
                if start < idx {
                    tokens.push(Token::new(&text[start..idx], start));
                }
                let end = idx + c.len_utf8();
                tokens.push(Token::new(&text[idx..end], idx));
                start = end;
            }
            None => {
                if let Some(nesting) = Nesting::opened_by(c) {
                    stack.push((nesting, idx));
                }
            }
            Some(&(top, _)) => {
                if c == top.closer() {
                    stack.pop();
                } else if top.admits_nesting() {
                    if let Some(nesting) = Nesting::opened_by(c) {
                        stack.push((nesting, idx));
                    }
                }
            }
        }
    }

    if start < text.len() {
        tokens.push(Token::new(&text[start..], start));
    }

    if let Some(&(_, pos)) = stack.first() {
        return Err(TokenizeError::UnbalancedNesting {
            open: stack.into_iter().map(|(nesting, _)| nesting).collect(),
            pos,
        });
    }

    Ok(tokens)
}

/// Concatenate tokens back into statement text.
#[must_use]
pub fn join(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        out.push_str(&token.text);
    }
    out
}
