//! Semantic tokens: syntax highlighting from the parse tree.

use serde::Serialize;

use crate::syntax::{ParseTree, TokenKind, TreeElement, TreeKind, TreeToken};

use super::functions::lookup_function;

/// Token type for semantic highlighting, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    Keyword,
    Variable,
    Function,
    Operator,
    Parameter,
    Type,
}

impl TokenType {
    pub const LEGEND: [&'static str; 6] = [
        "keyword",
        "variable",
        "function",
        "operator",
        "parameter",
        "type",
    ];

    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::Keyword => 0,
            TokenType::Variable => 1,
            TokenType::Function => 2,
            TokenType::Operator => 3,
            TokenType::Parameter => 4,
            TokenType::Type => 5,
        }
    }
}

/// Modifier bits, in legend order.
pub mod modifiers {
    pub const DEPRECATED: u32 = 1;
    pub const READONLY: u32 = 1 << 1;
    pub const DEFAULT_LIBRARY: u32 = 1 << 2;
    pub const DEFINITION: u32 = 1 << 3;
    pub const DECLARATION: u32 = 1 << 4;

    pub const LEGEND: [&str; 5] = [
        "deprecated",
        "readonly",
        "defaultLibrary",
        "definition",
        "declaration",
    ];
}

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticToken {
    /// Line number (0-indexed)
    pub line: u32,
    /// Column number (0-indexed)
    pub col: u32,
    /// Length of the token in characters
    pub length: u32,
    pub token_type: TokenType,
    /// Bitset of [`modifiers`]
    pub modifiers: u32,
}

/// Tokens for every keyword, identifier, type name and operator in the tree,
/// sorted by position.
pub fn semantic_tokens(tree: &ParseTree) -> Vec<SemanticToken> {
    let mut tokens = Vec::new();
    collect(tree, &mut tokens);
    tokens.sort_by_key(|t| (t.line, t.col));
    tokens
}

fn collect(node: &ParseTree, out: &mut Vec<SemanticToken>) {
    for child in &node.children {
        match child {
            TreeElement::Node(inner) => collect(inner, out),
            TreeElement::Token(token) => {
                if let Some(token) = classify(node.kind, token) {
                    out.push(token);
                }
            }
        }
    }
}

fn classify(parent: TreeKind, token: &TreeToken) -> Option<SemanticToken> {
    let (token_type, modifiers) = match token.kind {
        TokenKind::Keyword => (TokenType::Keyword, 0),
        TokenKind::TypeName => (TokenType::Type, 0),
        TokenKind::Operator => (TokenType::Operator, 0),
        TokenKind::Identifier => match parent {
            TreeKind::CallExpr if lookup_function(&token.text).is_some() => {
                (TokenType::Function, modifiers::DEFAULT_LIBRARY)
            }
            TreeKind::CallExpr => (TokenType::Function, 0),
            TreeKind::ColumnAlias => (TokenType::Parameter, 0),
            kind if kind.is_definition() => (TokenType::Variable, modifiers::DEFINITION),
            _ => (TokenType::Variable, 0),
        },
        TokenKind::String | TokenKind::Number | TokenKind::Punctuation => return None,
    };

    // Positionless or multi-line tokens cannot be highlighted
    let line = token.line?;
    let column = token.column?;
    if token.end_line.is_some_and(|end| end != line) {
        return None;
    }
    Some(SemanticToken {
        line: line.saturating_sub(1),
        col: column.saturating_sub(1),
        length: token.text.chars().count() as u32,
        token_type,
        modifiers,
    })
}

/// Encode sorted tokens as LSP relative data: five integers per token.
pub fn encode_deltas(tokens: &[SemanticToken]) -> Vec<u32> {
    let mut data = Vec::with_capacity(tokens.len() * 5);
    let (mut prev_line, mut prev_col) = (0, 0);
    for token in tokens {
        let delta_line = token.line - prev_line;
        let delta_col = if delta_line == 0 {
            token.col - prev_col
        } else {
            token.col
        };
        data.extend([
            delta_line,
            delta_col,
            token.length,
            token.token_type.to_lsp_index(),
            token.modifiers,
        ]);
        prev_line = token.line;
        prev_col = token.col;
    }
    data
}
