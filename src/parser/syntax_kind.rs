//! Syntax kinds for the Rowan-based CST
//!
//! This enum defines all possible node and token kinds in the syntax tree.

/// All syntax kinds (tokens and nodes) in Trilogy
///
/// Tokens are leaf nodes (identifiers, keywords, punctuation).
/// Nodes are composite (declarations, statements, expressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,   // user_id, user_id.name, b.user_id
    INTEGER, // 42
    FLOAT,   // 3.14
    STRING,  // "hello" or 'hello'

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_PAREN,     // (
    R_PAREN,     // )
    SEMICOLON,   // ;
    COLON,       // :
    COMMA,       // ,
    LEFT_ARROW,  // <-
    ARROW,       // ->
    MINUS_MINUS, // --
    QUESTION,    // ?
    EQ,          // =
    EQ_EQ,       // ==
    BANG_EQ,     // !=
    LT,          // <
    GT,          // >
    LT_EQ,       // <=
    GT_EQ,       // >=
    PLUS,        // +
    MINUS,       // -
    STAR,        // *
    SLASH,       // /
    PERCENT,     // %

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    KEY_KW,
    PROPERTY_KW,
    METRIC_KW,
    AUTO_KW,
    CONST_KW,
    DATASOURCE_KW,
    ROOT_KW,
    GRAIN_KW,
    ADDRESS_KW,
    QUERY_KW,
    IMPORT_KW,
    AS_KW,
    SELECT_KW,
    WHERE_KW,
    ORDER_KW,
    BY_KW,
    ASC_KW,
    DESC_KW,
    LIMIT_KW,
    AND_KW,
    OR_KW,
    NOT_KW,
    IN_KW,
    IS_KW,
    LIKE_KW,
    NULL_KW,
    TRUE_KW,
    FALSE_KW,
    MERGE_KW,
    ALIGN_KW,
    PERSIST_KW,
    INTO_KW,
    FROM_KW,
    RAW_SQL_KW,

    // =========================================================================
    // NODES
    // =========================================================================
    SOURCE_FILE,
    CONCEPT_DECLARATION,
    CONCEPT_PROPERTY_DECLARATION,
    CONCEPT_DERIVATION,
    DATATYPE,
    DATASOURCE,
    COLUMN_LIST,
    COLUMN_ALIAS,
    GRAIN_CLAUSE,
    ADDRESS_CLAUSE,
    QUERY_CLAUSE,
    IMPORT_STATEMENT,
    SELECT_STATEMENT,
    SELECT_ITEM,
    SELECT_TRANSFORM,
    CONCEPT_ASSIGNMENT,
    WHERE_CLAUSE,
    ORDER_BY_CLAUSE,
    ORDER_ITEM,
    LIMIT_CLAUSE,
    MULTI_SELECT_STATEMENT,
    ALIGN_CLAUSE,
    ALIGN_ITEM,
    PERSIST_STATEMENT,
    RAW_SQL_STATEMENT,

    // Expressions
    CONCEPT_LIT,
    LITERAL,
    TYPE_LIT,
    CALL_EXPR,
    ARG_LIST,
    PAREN_EXPR,
    BINARY_EXPR,
    UNARY_EXPR,
    IS_NULL_EXPR,
    IN_EXPR,

    ERROR,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::COMMENT)
    }

    /// Check if this is a keyword
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::KEY_KW as u16) && (self as u16) <= (Self::RAW_SQL_KW as u16)
    }

    /// Check if this is a punctuation or operator token
    pub fn is_punct(self) -> bool {
        (self as u16) >= (Self::L_PAREN as u16) && (self as u16) <= (Self::PERCENT as u16)
    }

    /// Check if this is an operator (as opposed to plain punctuation)
    pub fn is_operator(self) -> bool {
        self.is_punct()
            && !matches!(
                self,
                Self::L_PAREN | Self::R_PAREN | Self::SEMICOLON | Self::COLON | Self::COMMA
            )
    }

    /// Check if this is a literal
    pub fn is_literal(self) -> bool {
        matches!(self, Self::IDENT | Self::INTEGER | Self::FLOAT | Self::STRING)
    }

    /// Concept purpose keywords that open a declaration statement
    pub fn is_purpose(self) -> bool {
        matches!(
            self,
            Self::KEY_KW | Self::PROPERTY_KW | Self::METRIC_KW | Self::AUTO_KW | Self::CONST_KW
        )
    }

    /// Name used in "Expected one of" messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::IDENT => "IDENTIFIER",
            Self::INTEGER => "INTEGER",
            Self::FLOAT => "FLOAT",
            Self::STRING => "STRING",
            Self::L_PAREN => "LPAR",
            Self::R_PAREN => "RPAR",
            Self::SEMICOLON => "SEMICOLON",
            Self::COLON => "COLON",
            Self::COMMA => "COMMA",
            Self::LEFT_ARROW => "\"<-\"",
            Self::ARROW => "\"->\"",
            Self::MINUS_MINUS => "\"--\"",
            Self::QUESTION => "\"?\"",
            Self::EQ => "\"=\"",
            Self::EQ_EQ => "\"==\"",
            Self::BANG_EQ => "\"!=\"",
            Self::LT => "\"<\"",
            Self::GT => "\">\"",
            Self::LT_EQ => "\"<=\"",
            Self::GT_EQ => "\">=\"",
            Self::PLUS => "\"+\"",
            Self::MINUS => "\"-\"",
            Self::STAR => "\"*\"",
            Self::SLASH => "\"/\"",
            Self::PERCENT => "\"%\"",
            Self::KEY_KW => "\"key\"",
            Self::PROPERTY_KW => "\"property\"",
            Self::METRIC_KW => "\"metric\"",
            Self::AUTO_KW => "\"auto\"",
            Self::CONST_KW => "\"const\"",
            Self::DATASOURCE_KW => "\"datasource\"",
            Self::ROOT_KW => "\"root\"",
            Self::GRAIN_KW => "\"grain\"",
            Self::ADDRESS_KW => "\"address\"",
            Self::QUERY_KW => "\"query\"",
            Self::IMPORT_KW => "\"import\"",
            Self::AS_KW => "\"as\"",
            Self::SELECT_KW => "\"select\"",
            Self::WHERE_KW => "\"where\"",
            Self::ORDER_KW => "\"order\"",
            Self::BY_KW => "\"by\"",
            Self::ASC_KW => "\"asc\"",
            Self::DESC_KW => "\"desc\"",
            Self::LIMIT_KW => "\"limit\"",
            Self::AND_KW => "\"and\"",
            Self::OR_KW => "\"or\"",
            Self::NOT_KW => "\"not\"",
            Self::IN_KW => "\"in\"",
            Self::IS_KW => "\"is\"",
            Self::LIKE_KW => "\"like\"",
            Self::NULL_KW => "\"null\"",
            Self::TRUE_KW => "\"true\"",
            Self::FALSE_KW => "\"false\"",
            Self::MERGE_KW => "\"merge\"",
            Self::ALIGN_KW => "\"align\"",
            Self::PERSIST_KW => "\"persist\"",
            Self::INTO_KW => "\"into\"",
            Self::FROM_KW => "\"from\"",
            Self::RAW_SQL_KW => "\"raw_sql\"",
            _ => "TOKEN",
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl From<rowan::SyntaxKind> for SyntaxKind {
    fn from(raw: rowan::SyntaxKind) -> Self {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: we control all syntax kinds and check bounds above
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }
}

/// Language definition for Rowan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrilogyLanguage {}

impl rowan::Language for TrilogyLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        raw.into()
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for convenience
pub type SyntaxNode = rowan::SyntaxNode<TrilogyLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<TrilogyLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<TrilogyLanguage>;
