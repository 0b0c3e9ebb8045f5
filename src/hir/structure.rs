//! Datasource and import declarations read straight from the tree.
//!
//! These need no semantic model, so they stay available when compilation
//! fails.

use serde::Serialize;

use super::locations::span_of;
use crate::base::SourceSpan;
use crate::syntax::{ParseTree, TreeKind};

/// End column used when a datasource has no address token.
const OPEN_END_COLUMN: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSourceInfo {
    pub name: String,
    /// Table address, or the datasource name when it reads from a query
    pub address: String,
    /// Concept names bound by the column list
    pub columns: Vec<String>,
    pub grain: Vec<String>,
    pub is_root: bool,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportInfo {
    pub path: String,
    pub alias: Option<String>,
    pub span: SourceSpan,
}

impl ImportInfo {
    /// Name the import is referred to by.
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }
}

/// Every datasource declaration in document order.
pub fn extract_datasources(tree: &ParseTree) -> Vec<DataSourceInfo> {
    let mut out = Vec::new();
    collect(tree, TreeKind::Datasource, &mut |node| {
        if let Some(info) = datasource_info(node) {
            out.push(info);
        }
    });
    out
}

/// Every import statement in document order.
pub fn extract_imports(tree: &ParseTree) -> Vec<ImportInfo> {
    let mut out = Vec::new();
    collect(tree, TreeKind::ImportStatement, &mut |node| {
        if let Some(info) = import_info(node) {
            out.push(info);
        }
    });
    out
}

fn collect(node: &ParseTree, kind: TreeKind, visit: &mut dyn FnMut(&ParseTree)) {
    if node.kind == kind {
        visit(node);
        return;
    }
    for child in node.nodes() {
        collect(child, kind, visit);
    }
}

fn datasource_info(node: &ParseTree) -> Option<DataSourceInfo> {
    let name_token = node.identifiers().next()?;
    let address_token = node
        .node(TreeKind::AddressClause)
        .and_then(|clause| clause.identifiers().next());

    let start = span_of(name_token);
    let span = match address_token {
        Some(token) => {
            let end = span_of(token);
            SourceSpan::new(start.start_line, start.start_col, end.end_line, end.end_col)
        }
        None => SourceSpan::new(
            start.start_line,
            start.start_col,
            start.start_line,
            OPEN_END_COLUMN,
        ),
    };

    let idents = |kind: TreeKind| -> Vec<String> {
        node.node(kind)
            .map(|n| n.identifiers().map(|t| t.text.to_string()).collect())
            .unwrap_or_default()
    };

    Some(DataSourceInfo {
        name: name_token.text.to_string(),
        address: address_token
            .map(|t| t.text.to_string())
            .unwrap_or_else(|| name_token.text.to_string()),
        columns: idents(TreeKind::ColumnList),
        grain: idents(TreeKind::GrainClause),
        is_root: node.has_keyword("root"),
        span,
    })
}

fn import_info(node: &ParseTree) -> Option<ImportInfo> {
    let mut idents = node.identifiers();
    let path = idents.next()?;
    let alias = idents.next();

    let start = span_of(path);
    let end = span_of(alias.unwrap_or(path));
    Some(ImportInfo {
        path: path.text.to_string(),
        alias: alias.map(|t| t.text.to_string()),
        span: SourceSpan::new(start.start_line, start.start_col, end.end_line, end.end_col),
    })
}
