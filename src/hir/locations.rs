//! Identifier occurrences that name concepts.

use serde::Serialize;

use crate::base::SourceSpan;
use crate::syntax::{ParseTree, TreeElement, TreeToken};

/// One identifier occurrence taking part in symbol naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolLocation {
    /// Canonical-or-raw address; resolve before using as a metadata key.
    pub address: String,
    pub span: SourceSpan,
    pub is_definition: bool,
}

/// Walk `tree` and record every identifier whose parent node declares or
/// references a concept.
///
/// Definitions and undotted references are qualified with
/// `default_namespace`. Dotted references keep their text as written,
/// since the first segment may already be a namespace.
pub fn extract(tree: &ParseTree, default_namespace: &str) -> Vec<SymbolLocation> {
    let mut out = Vec::new();
    walk(tree, default_namespace, &mut out);
    out
}

fn walk(node: &ParseTree, default_namespace: &str, out: &mut Vec<SymbolLocation>) {
    for child in &node.children {
        match child {
            TreeElement::Node(inner) => walk(inner, default_namespace, out),
            TreeElement::Token(token)
                if token.is_identifier() && node.kind.is_naming_context() =>
            {
                let is_definition = node.kind.is_definition();
                let raw = token.text.as_str();
                let address = if is_definition || !raw.contains('.') {
                    format!("{default_namespace}.{raw}")
                } else {
                    raw.to_string()
                };
                out.push(SymbolLocation {
                    address,
                    span: span_of(token),
                    is_definition,
                });
            }
            TreeElement::Token(_) => {}
        }
    }
}

/// Token span, filling gaps a parser may leave.
pub(crate) fn span_of(token: &TreeToken) -> SourceSpan {
    let line = token.line.unwrap_or(1);
    let column = token.column.unwrap_or(1);
    let end_line = token.end_line.unwrap_or(line);
    let end_col = token
        .end_column
        .unwrap_or(column + token.text.chars().count() as u32);
    SourceSpan::new(line, column, end_line, end_col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{TreeKind, TreeToken};

    fn node(kind: TreeKind, children: Vec<TreeElement>) -> ParseTree {
        ParseTree::new(kind, children)
    }

    #[test]
    fn test_definition_is_always_qualified() {
        let tree = node(
            TreeKind::Start,
            vec![
                node(
                    TreeKind::ConceptPropertyDeclaration,
                    vec![
                        TreeToken::keyword("property").at(1, 1).into(),
                        TreeToken::ident("user_id.name").at(1, 10).into(),
                    ],
                )
                .into(),
            ],
        );
        let locations = extract(&tree, "local");
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].address, "local.user_id.name");
        assert!(locations[0].is_definition);
    }

    #[test]
    fn test_dotted_reference_is_raw() {
        let tree = node(
            TreeKind::ConceptLit,
            vec![TreeToken::ident("orders.total").at(3, 5).into()],
        );
        let locations = extract(&tree, "local");
        assert_eq!(locations[0].address, "orders.total");
        assert!(!locations[0].is_definition);
        assert_eq!(locations[0].span, SourceSpan::single_line(3, 5, 17));
    }

    #[test]
    fn test_identifiers_outside_naming_contexts_are_skipped() {
        let tree = node(
            TreeKind::Datasource,
            vec![
                TreeToken::keyword("datasource").at(1, 1).into(),
                TreeToken::ident("users").at(1, 12).into(),
                node(
                    TreeKind::ColumnList,
                    vec![TreeToken::ident("user_id").at(1, 19).into()],
                )
                .into(),
            ],
        );
        let locations = extract(&tree, "local");
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].address, "local.user_id");
    }

    #[test]
    fn test_missing_positions_use_defaults() {
        let tree = node(
            TreeKind::ConceptAssignment,
            vec![TreeToken::ident("revenue").into()],
        );
        let locations = extract(&tree, "local");
        assert_eq!(locations[0].span, SourceSpan::new(1, 1, 1, 8));
    }
}
