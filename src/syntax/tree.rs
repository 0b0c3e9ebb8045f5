//! The parse tree handed across the parser boundary.
//!
//! Node kinds are named after grammar rules and tokens carry optional
//! 1-indexed positions. A parser that cannot report a position leaves it
//! empty and consumers fall back to defaults.

use smol_str::SmolStr;

/// Grammar rule that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Start,
    ConceptDeclaration,
    ConceptPropertyDeclaration,
    ConceptDerivation,
    Datatype,
    Datasource,
    ColumnList,
    ColumnAlias,
    GrainClause,
    AddressClause,
    QueryClause,
    ImportStatement,
    SelectStatement,
    SelectItem,
    SelectTransform,
    ConceptAssignment,
    WhereClause,
    OrderByClause,
    OrderItem,
    LimitClause,
    MultiSelectStatement,
    AlignClause,
    AlignItem,
    PersistStatement,
    RawSqlStatement,
    ConceptLit,
    Literal,
    TypeLit,
    CallExpr,
    ArgList,
    ParenExpr,
    BinaryExpr,
    UnaryExpr,
    IsNullExpr,
    InExpr,
    Error,
}

impl TreeKind {
    /// Grammar rule name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ConceptDeclaration => "concept_declaration",
            Self::ConceptPropertyDeclaration => "concept_property_declaration",
            Self::ConceptDerivation => "concept_derivation",
            Self::Datatype => "data_type",
            Self::Datasource => "datasource",
            Self::ColumnList => "column_list",
            Self::ColumnAlias => "raw_column",
            Self::GrainClause => "grain_clause",
            Self::AddressClause => "address",
            Self::QueryClause => "query",
            Self::ImportStatement => "import_statement",
            Self::SelectStatement => "select_statement",
            Self::SelectItem => "select_item",
            Self::SelectTransform => "select_transform",
            Self::ConceptAssignment => "concept_assignment",
            Self::WhereClause => "where",
            Self::OrderByClause => "order_by",
            Self::OrderItem => "ordering",
            Self::LimitClause => "limit",
            Self::MultiSelectStatement => "multi_select_statement",
            Self::AlignClause => "align_clause",
            Self::AlignItem => "align_item",
            Self::PersistStatement => "persist",
            Self::RawSqlStatement => "raw_sql",
            Self::ConceptLit => "concept_lit",
            Self::Literal => "literal",
            Self::TypeLit => "type_lit",
            Self::CallExpr => "function_call",
            Self::ArgList => "args",
            Self::ParenExpr => "parenthetical",
            Self::BinaryExpr => "binary_expr",
            Self::UnaryExpr => "unary_expr",
            Self::IsNullExpr => "is_null",
            Self::InExpr => "in_list",
            Self::Error => "error",
        }
    }

    /// Nodes whose identifier names the concept being declared.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            Self::ConceptDeclaration | Self::ConceptPropertyDeclaration | Self::ConceptDerivation
        )
    }

    /// Nodes whose identifier refers to an existing concept.
    pub fn is_reference(self) -> bool {
        matches!(self, Self::ConceptLit | Self::ConceptAssignment)
    }

    /// Nodes whose identifiers take part in symbol naming at all.
    pub fn is_naming_context(self) -> bool {
        self.is_definition()
            || self.is_reference()
            || matches!(self, Self::GrainClause | Self::ColumnList)
    }
}

/// Lexical class of a leaf token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    TypeName,
    String,
    Number,
    Operator,
    Punctuation,
}

/// A leaf token with optional 1-indexed position.
///
/// `end_column` is one past the last character, so a token starting at
/// column 7 with five characters ends at column 12.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeToken {
    pub kind: TokenKind,
    pub text: SmolStr,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

impl TreeToken {
    /// A token without position information.
    pub fn new(kind: TokenKind, text: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            text: text.into(),
            line: None,
            column: None,
            end_line: None,
            end_column: None,
        }
    }

    pub fn ident(text: impl Into<SmolStr>) -> Self {
        Self::new(TokenKind::Identifier, text)
    }

    pub fn keyword(text: impl Into<SmolStr>) -> Self {
        Self::new(TokenKind::Keyword, text)
    }

    /// Place a single-line token at `line:column`.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let width = self.text.chars().count() as u32;
        self.line = Some(line);
        self.column = Some(column);
        self.end_line = Some(line);
        self.end_column = Some(column + width);
        self
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// Either a nested rule or a leaf token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeElement {
    Node(ParseTree),
    Token(TreeToken),
}

/// A parsed document or a sub-rule of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub kind: TreeKind,
    pub children: Vec<TreeElement>,
}

impl ParseTree {
    pub fn new(kind: TreeKind, children: Vec<TreeElement>) -> Self {
        Self { kind, children }
    }

    /// Direct child nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &ParseTree> {
        self.children.iter().filter_map(|child| match child {
            TreeElement::Node(node) => Some(node),
            TreeElement::Token(_) => None,
        })
    }

    /// Direct child tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &TreeToken> {
        self.children.iter().filter_map(|child| match child {
            TreeElement::Token(token) => Some(token),
            TreeElement::Node(_) => None,
        })
    }

    /// Direct identifier tokens.
    pub fn identifiers(&self) -> impl Iterator<Item = &TreeToken> {
        self.tokens().filter(|t| t.is_identifier())
    }

    /// First direct child node of the given kind.
    pub fn node(&self, kind: TreeKind) -> Option<&ParseTree> {
        self.nodes().find(|n| n.kind == kind)
    }

    /// Whether a direct keyword token with this text is present.
    pub fn has_keyword(&self, text: &str) -> bool {
        self.tokens()
            .any(|t| t.kind == TokenKind::Keyword && t.text.eq_ignore_ascii_case(text))
    }

    /// First leaf token in document order.
    pub fn first_token(&self) -> Option<&TreeToken> {
        self.children.iter().find_map(|child| match child {
            TreeElement::Token(token) => Some(token),
            TreeElement::Node(node) => node.first_token(),
        })
    }

    /// Last leaf token in document order.
    pub fn last_token(&self) -> Option<&TreeToken> {
        self.children.iter().rev().find_map(|child| match child {
            TreeElement::Token(token) => Some(token),
            TreeElement::Node(node) => node.last_token(),
        })
    }

    /// Every leaf token in document order.
    pub fn leaves(&self) -> Vec<&TreeToken> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TreeToken>) {
        for child in &self.children {
            match child {
                TreeElement::Token(token) => out.push(token),
                TreeElement::Node(node) => node.collect_leaves(out),
            }
        }
    }
}

impl From<ParseTree> for TreeElement {
    fn from(node: ParseTree) -> Self {
        TreeElement::Node(node)
    }
}

impl From<TreeToken> for TreeElement {
    fn from(token: TreeToken) -> Self {
        TreeElement::Token(token)
    }
}
