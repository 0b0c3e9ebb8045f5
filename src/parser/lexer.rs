//! Logos-based lexer for Trilogy
//!
//! Dotted names (`user_id.name`, `b.user_id`) lex as a single identifier
//! token; the semantic layer decides what the segments mean.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use rowan::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"#[^\n]*")]
    #[regex(r"//[^\n]*")]
    Comment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*")]
    Ident,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("<-")]
    LeftArrow,

    #[token("->")]
    Arrow,

    #[token("--")]
    MinusMinus,

    #[token("==")]
    EqEq,

    #[token("!=")]
    BangEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("?")]
    Question,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("key")]
    KeyKw,
    #[token("property")]
    PropertyKw,
    #[token("metric")]
    MetricKw,
    #[token("auto")]
    AutoKw,
    #[token("const")]
    ConstKw,
    #[token("datasource")]
    DatasourceKw,
    #[token("root")]
    RootKw,
    #[token("grain")]
    GrainKw,
    #[token("address")]
    AddressKw,
    #[token("query")]
    QueryKw,
    #[token("import")]
    ImportKw,
    #[token("as")]
    AsKw,
    #[token("select")]
    SelectKw,
    #[token("where")]
    WhereKw,
    #[token("order")]
    OrderKw,
    #[token("by")]
    ByKw,
    #[token("asc")]
    AscKw,
    #[token("desc")]
    DescKw,
    #[token("limit")]
    LimitKw,
    #[token("and")]
    AndKw,
    #[token("or")]
    OrKw,
    #[token("not")]
    NotKw,
    #[token("in")]
    InKw,
    #[token("is")]
    IsKw,
    #[token("like")]
    LikeKw,
    #[token("null")]
    NullKw,
    #[token("true")]
    TrueKw,
    #[token("false")]
    FalseKw,
    #[token("merge")]
    MergeKw,
    #[token("align")]
    AlignKw,
    #[token("persist")]
    PersistKw,
    #[token("into")]
    IntoKw,
    #[token("from")]
    FromKw,
    #[token("raw_sql")]
    RawSqlKw,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        use LogosToken::*;
        match token {
            // Trivia
            Whitespace => SyntaxKind::WHITESPACE,
            Comment => SyntaxKind::COMMENT,

            // Literals
            Ident => SyntaxKind::IDENT,
            Integer => SyntaxKind::INTEGER,
            Float => SyntaxKind::FLOAT,
            String => SyntaxKind::STRING,

            // Punctuation
            LeftArrow => SyntaxKind::LEFT_ARROW,
            Arrow => SyntaxKind::ARROW,
            MinusMinus => SyntaxKind::MINUS_MINUS,
            EqEq => SyntaxKind::EQ_EQ,
            BangEq => SyntaxKind::BANG_EQ,
            LtEq => SyntaxKind::LT_EQ,
            GtEq => SyntaxKind::GT_EQ,
            LParen => SyntaxKind::L_PAREN,
            RParen => SyntaxKind::R_PAREN,
            Semicolon => SyntaxKind::SEMICOLON,
            Colon => SyntaxKind::COLON,
            Comma => SyntaxKind::COMMA,
            Question => SyntaxKind::QUESTION,
            Eq => SyntaxKind::EQ,
            Lt => SyntaxKind::LT,
            Gt => SyntaxKind::GT,
            Plus => SyntaxKind::PLUS,
            Minus => SyntaxKind::MINUS,
            Star => SyntaxKind::STAR,
            Slash => SyntaxKind::SLASH,
            Percent => SyntaxKind::PERCENT,

            // Keywords
            KeyKw => SyntaxKind::KEY_KW,
            PropertyKw => SyntaxKind::PROPERTY_KW,
            MetricKw => SyntaxKind::METRIC_KW,
            AutoKw => SyntaxKind::AUTO_KW,
            ConstKw => SyntaxKind::CONST_KW,
            DatasourceKw => SyntaxKind::DATASOURCE_KW,
            RootKw => SyntaxKind::ROOT_KW,
            GrainKw => SyntaxKind::GRAIN_KW,
            AddressKw => SyntaxKind::ADDRESS_KW,
            QueryKw => SyntaxKind::QUERY_KW,
            ImportKw => SyntaxKind::IMPORT_KW,
            AsKw => SyntaxKind::AS_KW,
            SelectKw => SyntaxKind::SELECT_KW,
            WhereKw => SyntaxKind::WHERE_KW,
            OrderKw => SyntaxKind::ORDER_KW,
            ByKw => SyntaxKind::BY_KW,
            AscKw => SyntaxKind::ASC_KW,
            DescKw => SyntaxKind::DESC_KW,
            LimitKw => SyntaxKind::LIMIT_KW,
            AndKw => SyntaxKind::AND_KW,
            OrKw => SyntaxKind::OR_KW,
            NotKw => SyntaxKind::NOT_KW,
            InKw => SyntaxKind::IN_KW,
            IsKw => SyntaxKind::IS_KW,
            LikeKw => SyntaxKind::LIKE_KW,
            NullKw => SyntaxKind::NULL_KW,
            TrueKw => SyntaxKind::TRUE_KW,
            FalseKw => SyntaxKind::FALSE_KW,
            MergeKw => SyntaxKind::MERGE_KW,
            AlignKw => SyntaxKind::ALIGN_KW,
            PersistKw => SyntaxKind::PERSIST_KW,
            IntoKw => SyntaxKind::INTO_KW,
            FromKw => SyntaxKind::FROM_KW,
            RawSqlKw => SyntaxKind::RAW_SQL_KW,
        }
    }
}
