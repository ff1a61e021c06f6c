use std::{fmt, sync::Arc};

use logos::Logos;

use crate::error::{ParseError, ParseResult};

/// The kind of a lexical token.
///
/// Keywords are matched with priority over the identifier pattern, and the
/// logos DFA always picks the longest match, so `<=` never lexes as `<`
/// followed by `=`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(extras = LexerExtras)]
pub enum TokenKind {
    /// Integer literal such as `42`.
    #[regex(r"0|[1-9][0-9]*")]
    Integer,
    /// Rational literal such as `3.14` or `2.`.
    #[regex(r"[0-9]+\.[0-9]*")]
    Rational,
    /// `True` or `False`.
    #[token("True")]
    #[token("False")]
    Boolean,
    /// Double quoted string literal.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,
    /// `None`
    #[token("None")]
    None,
    /// `=`
    #[token("=")]
    Equals,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Multiply,
    /// `/`
    #[token("/")]
    Divide,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessOrEqual,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterOrEqual,
    /// `==`
    #[token("==")]
    LogEqual,
    /// `!=`
    #[token("!=")]
    LogNotEqual,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `not`
    #[token("not")]
    Not,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `.`
    #[token(".")]
    Dot,
    /// `:`
    #[token(":")]
    Colon,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    SemiColon,
    /// `as`
    #[token("as")]
    As,
    /// `let`
    #[token("let")]
    Let,
    /// `@native` and friends.
    #[regex(r"@[a-z]+")]
    Annotation,
    /// `while`
    #[token("while")]
    While,
    /// `for`
    #[token("for")]
    For,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `fn`
    #[token("fn")]
    Function,
    /// `type`
    #[token("type")]
    Type,
    /// `ret`, also spelled `return`.
    #[token("ret")]
    #[token("return")]
    Return,
    /// `->`
    #[token("->")]
    Arrow,
    /// `<-`
    #[token("<-")]
    BackArrow,
    /// `=>`
    #[token("=>")]
    DualArrow,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `::`
    #[token("::")]
    NamespaceScope,
    /// `use`
    #[token("use")]
    Use,
    /// Variable, function, field or type name.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    /// `// Comments.`
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Line breaks only advance the line counter.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        logos::Skip
    })]
    Newline,
    /// Other whitespace.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
    /// Sentinel closing every file's token queue. Never produced by a pattern.
    EndOfFile,
}

/// Line tracking state carried by the logos lexer.
#[derive(Debug, Default)]
pub struct LexerExtras {
    /// The 1-based line of the token being produced.
    pub line: usize,
}

impl TokenKind {
    /// Returns `true` for the operators the expression parser treats as
    /// binary operators.
    #[must_use]
    pub const fn is_binary_operator(self) -> bool {
        matches!(self,
                 Self::Plus
                 | Self::Minus
                 | Self::Multiply
                 | Self::Divide
                 | Self::LogEqual
                 | Self::LogNotEqual
                 | Self::Less
                 | Self::LessOrEqual
                 | Self::Greater
                 | Self::GreaterOrEqual
                 | Self::And
                 | Self::Or)
    }

    /// Returns `true` for literal tokens.
    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::Integer | Self::Rational | Self::Boolean | Self::String)
    }

    /// Returns `true` for tokens a statement can begin with.
    #[must_use]
    pub const fn starts_statement(self) -> bool {
        matches!(self,
                 Self::Return
                 | Self::Let
                 | Self::Identifier
                 | Self::If
                 | Self::While
                 | Self::For
                 | Self::LBrace)
    }

    /// Returns `true` for tokens a top-level declaration can begin with.
    #[must_use]
    pub const fn starts_declaration(self) -> bool {
        matches!(self, Self::Function | Self::Type | Self::Use | Self::Annotation)
    }

    /// A short human readable description used in diagnostics.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Rational => "RATIONAL",
            Self::Boolean => "BOOLEAN",
            Self::String => "STRING",
            Self::None => "None",
            Self::Equals => "'='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Multiply => "'*'",
            Self::Divide => "'/'",
            Self::Less => "'<'",
            Self::LessOrEqual => "'<='",
            Self::Greater => "'>'",
            Self::GreaterOrEqual => "'>='",
            Self::LogEqual => "'=='",
            Self::LogNotEqual => "'!='",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Not => "'not'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Dot => "'.'",
            Self::Colon => "':'",
            Self::Comma => "','",
            Self::SemiColon => "';'",
            Self::As => "'as'",
            Self::Let => "'let'",
            Self::Annotation => "ANNOTATION",
            Self::While => "'while'",
            Self::For => "'for'",
            Self::If => "'if'",
            Self::Else => "'else'",
            Self::Function => "'fn'",
            Self::Type => "'type'",
            Self::Return => "'ret'",
            Self::Arrow => "'->'",
            Self::BackArrow => "'<-'",
            Self::DualArrow => "'=>'",
            Self::Ampersand => "'&'",
            Self::NamespaceScope => "'::'",
            Self::Use => "'use'",
            Self::Identifier => "IDENTIFIER",
            Self::Comment | Self::Newline | Self::Ignored => "whitespace",
            Self::EndOfFile => "END_OF_FILE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its text and location.
///
/// The end-of-file sentinel carries the file name as its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The exact source text.
    pub text: String,
    /// The file the token was read from.
    pub file: Arc<str>,
    /// The 1-based line the token appeared on.
    pub line: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: TokenKind, text: impl Into<String>, file: &Arc<str>, line: usize) -> Self {
        Self { kind,
               text: text.into(),
               file: Arc::clone(file),
               line }
    }

    /// Creates the end-of-file sentinel for `file`.
    pub fn end_of_file(file: &Arc<str>, line: usize) -> Self {
        Self::new(TokenKind::EndOfFile, file.as_ref(), file, line)
    }

    /// Returns `true` if the token is of `kind`.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Checks that the token is of `kind`.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    ///
    /// use kvantum::lexer::token::{Token, TokenKind};
    ///
    /// let file: Arc<str> = Arc::from("main.kv");
    /// let token = Token::new(TokenKind::Identifier, "x", &file, 1);
    ///
    /// assert!(token.expect(TokenKind::Identifier).is_ok());
    /// assert!(token.expect(TokenKind::SemiColon).is_err());
    /// ```
    pub fn expect(&self, kind: TokenKind) -> ParseResult<&Self> {
        if self.kind == kind {
            Ok(self)
        } else {
            Err(ParseError::UnexpectedToken { found:    self.to_string(),
                                              expected: kind.to_string(),
                                              line:     self.line, })
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::Integer
            | TokenKind::Rational
            | TokenKind::Boolean
            | TokenKind::String
            | TokenKind::Annotation => write!(f, "{}({})", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Strips the quotes of a string literal and decodes its escapes.
///
/// # Example
/// ```
/// use kvantum::lexer::token::unquote;
///
/// assert_eq!(unquote(r#""hello\n""#), "hello\n");
/// assert_eq!(unquote(r#""say \"hi\"""#), "say \"hi\"");
/// ```
#[must_use]
pub fn unquote(text: &str) -> String {
    let inner = text.strip_prefix('"')
                    .and_then(|t| t.strip_suffix('"'))
                    .unwrap_or(text);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
