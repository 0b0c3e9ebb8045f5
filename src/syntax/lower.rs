//! Lowering from the lossless rowan CST to a [`ParseTree`].
//!
//! Trivia is dropped. Token positions are converted from byte offsets to
//! 1-indexed lines and character columns.

use crate::base::LineIndex;
use crate::parser::{SyntaxKind, SyntaxNode, SyntaxToken};

use super::tree::{ParseTree, TokenKind, TreeElement, TreeKind, TreeToken};

/// Lower a CST root (and everything below it) into a [`ParseTree`].
pub fn lower(root: &SyntaxNode, text: &str) -> ParseTree {
    let index = LineIndex::new(text);
    lower_node(root, &index)
}

fn lower_node(node: &SyntaxNode, index: &LineIndex<'_>) -> ParseTree {
    let kind = tree_kind(node.kind());
    let children = node
        .children_with_tokens()
        .filter_map(|element| match element {
            rowan::NodeOrToken::Node(child) => Some(TreeElement::Node(lower_node(&child, index))),
            rowan::NodeOrToken::Token(token) if token.kind().is_trivia() => None,
            rowan::NodeOrToken::Token(token) => {
                Some(TreeElement::Token(lower_token(&token, kind, index)))
            }
        })
        .collect();
    ParseTree::new(kind, children)
}

fn lower_token(token: &SyntaxToken, parent: TreeKind, index: &LineIndex<'_>) -> TreeToken {
    let range = token.text_range();
    let start = index.line_col(range.start());
    let end = index.line_col(range.end());

    TreeToken {
        kind: token_kind(token.kind(), parent),
        text: token.text().into(),
        line: Some(start.line_one_indexed()),
        column: Some(start.col_one_indexed()),
        end_line: Some(end.line_one_indexed()),
        end_column: Some(end.col_one_indexed()),
    }
}

fn token_kind(kind: SyntaxKind, parent: TreeKind) -> TokenKind {
    match kind {
        SyntaxKind::IDENT if matches!(parent, TreeKind::Datatype | TreeKind::TypeLit) => {
            TokenKind::TypeName
        }
        SyntaxKind::IDENT => TokenKind::Identifier,
        SyntaxKind::STRING => TokenKind::String,
        SyntaxKind::INTEGER | SyntaxKind::FLOAT => TokenKind::Number,
        kind if kind.is_keyword() => TokenKind::Keyword,
        kind if kind.is_operator() => TokenKind::Operator,
        _ => TokenKind::Punctuation,
    }
}

fn tree_kind(kind: SyntaxKind) -> TreeKind {
    match kind {
        SyntaxKind::SOURCE_FILE => TreeKind::Start,
        SyntaxKind::CONCEPT_DECLARATION => TreeKind::ConceptDeclaration,
        SyntaxKind::CONCEPT_PROPERTY_DECLARATION => TreeKind::ConceptPropertyDeclaration,
        SyntaxKind::CONCEPT_DERIVATION => TreeKind::ConceptDerivation,
        SyntaxKind::DATATYPE => TreeKind::Datatype,
        SyntaxKind::DATASOURCE => TreeKind::Datasource,
        SyntaxKind::COLUMN_LIST => TreeKind::ColumnList,
        SyntaxKind::COLUMN_ALIAS => TreeKind::ColumnAlias,
        SyntaxKind::GRAIN_CLAUSE => TreeKind::GrainClause,
        SyntaxKind::ADDRESS_CLAUSE => TreeKind::AddressClause,
        SyntaxKind::QUERY_CLAUSE => TreeKind::QueryClause,
        SyntaxKind::IMPORT_STATEMENT => TreeKind::ImportStatement,
        SyntaxKind::SELECT_STATEMENT => TreeKind::SelectStatement,
        SyntaxKind::SELECT_ITEM => TreeKind::SelectItem,
        SyntaxKind::SELECT_TRANSFORM => TreeKind::SelectTransform,
        SyntaxKind::CONCEPT_ASSIGNMENT => TreeKind::ConceptAssignment,
        SyntaxKind::WHERE_CLAUSE => TreeKind::WhereClause,
        SyntaxKind::ORDER_BY_CLAUSE => TreeKind::OrderByClause,
        SyntaxKind::ORDER_ITEM => TreeKind::OrderItem,
        SyntaxKind::LIMIT_CLAUSE => TreeKind::LimitClause,
        SyntaxKind::MULTI_SELECT_STATEMENT => TreeKind::MultiSelectStatement,
        SyntaxKind::ALIGN_CLAUSE => TreeKind::AlignClause,
        SyntaxKind::ALIGN_ITEM => TreeKind::AlignItem,
        SyntaxKind::PERSIST_STATEMENT => TreeKind::PersistStatement,
        SyntaxKind::RAW_SQL_STATEMENT => TreeKind::RawSqlStatement,
        SyntaxKind::CONCEPT_LIT => TreeKind::ConceptLit,
        SyntaxKind::LITERAL => TreeKind::Literal,
        SyntaxKind::TYPE_LIT => TreeKind::TypeLit,
        SyntaxKind::CALL_EXPR => TreeKind::CallExpr,
        SyntaxKind::ARG_LIST => TreeKind::ArgList,
        SyntaxKind::PAREN_EXPR => TreeKind::ParenExpr,
        SyntaxKind::BINARY_EXPR => TreeKind::BinaryExpr,
        SyntaxKind::UNARY_EXPR => TreeKind::UnaryExpr,
        SyntaxKind::IS_NULL_EXPR => TreeKind::IsNullExpr,
        SyntaxKind::IN_EXPR => TreeKind::InExpr,
        _ => TreeKind::Error,
    }
}
