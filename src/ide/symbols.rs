//! Document outline.

use crate::base::SourceSpan;
use crate::hir::{DataSourceInfo, ImportInfo, MetadataMap, PositionIndex, Role, resolve};

/// Outline entry kind, a subset of the LSP symbol kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Property,
    Variable,
    Constant,
    Number,
    Key,
    Struct,
}

impl SymbolKind {
    /// Kind for a concept with the given role.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Key => SymbolKind::Key,
            Role::Property => SymbolKind::Property,
            Role::Metric => SymbolKind::Number,
            Role::Constant => SymbolKind::Constant,
            Role::AutoDerived => SymbolKind::Variable,
        }
    }

    /// Convert to LSP symbol kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            SymbolKind::Module => 2,
            SymbolKind::Property => 7,
            SymbolKind::Variable => 13,
            SymbolKind::Constant => 14,
            SymbolKind::Number => 16,
            SymbolKind::Key => 20,
            SymbolKind::Struct => 23,
        }
    }
}

/// A symbol for the document outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Symbol name.
    pub name: String,
    pub kind: SymbolKind,
    /// Detail shown next to the name.
    pub detail: String,
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed).
    pub end_col: u32,
}

impl SymbolInfo {
    fn new(name: String, kind: SymbolKind, detail: String, span: SourceSpan) -> Self {
        let range = span.to_span();
        Self {
            name,
            kind,
            detail,
            start_line: range.start.line,
            start_col: range.start.column,
            end_line: range.end.line,
            end_col: range.end.column,
        }
    }
}

/// Outline of one document: resolved concept definitions, datasources and
/// imports, sorted by start line.
///
/// Definitions that do not resolve to metadata are left out. Entries on the
/// same line keep the order concepts, datasources, imports.
pub fn document_symbols(
    index: &PositionIndex,
    metadata: &MetadataMap,
    datasources: &[DataSourceInfo],
    imports: &[ImportInfo],
) -> Vec<SymbolInfo> {
    let concepts = index
        .locations()
        .iter()
        .filter(|loc| loc.is_definition)
        .filter_map(|loc| {
            let concept = resolve(&loc.address, metadata)?;
            Some(SymbolInfo::new(
                concept.name.clone(),
                SymbolKind::for_role(concept.role),
                format!("{}: {}", concept.role, concept.datatype),
                loc.span,
            ))
        });

    let sources = datasources.iter().map(|ds| {
        SymbolInfo::new(
            ds.name.clone(),
            SymbolKind::Struct,
            format!("datasource -> {}", ds.address),
            ds.span,
        )
    });

    let modules = imports.iter().map(|imp| {
        SymbolInfo::new(
            imp.display_name().to_string(),
            SymbolKind::Module,
            format!("import {}", imp.path),
            imp.span,
        )
    });

    let mut symbols: Vec<SymbolInfo> = concepts.chain(sources).chain(modules).collect();
    // Vec::sort_by_key is stable
    symbols.sort_by_key(|s| s.start_line);
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::{SymbolLocation, SymbolMetadata};
    use rstest::rstest;

    #[rstest]
    #[case(Role::Key, 20)]
    #[case(Role::Property, 7)]
    #[case(Role::Metric, 16)]
    #[case(Role::Constant, 14)]
    #[case(Role::AutoDerived, 13)]
    fn test_role_kinds(#[case] role: Role, #[case] lsp: u32) {
        assert_eq!(SymbolKind::for_role(role).to_lsp(), lsp);
    }

    #[test]
    fn test_outline_merges_and_sorts() {
        let index = PositionIndex::new(vec![
            SymbolLocation {
                address: "local.id".to_string(),
                span: SourceSpan::single_line(3, 5, 7),
                is_definition: true,
            },
            SymbolLocation {
                address: "local.missing".to_string(),
                span: SourceSpan::single_line(4, 5, 12),
                is_definition: true,
            },
        ]);
        let mut metadata = MetadataMap::new();
        metadata.insert(
            "local.id".to_string(),
            SymbolMetadata::new("id", "local.id", "int", Role::Key, "local"),
        );
        let datasources = vec![DataSourceInfo {
            name: "users".to_string(),
            address: "raw.users".to_string(),
            columns: vec!["id".to_string()],
            grain: Vec::new(),
            is_root: false,
            span: SourceSpan::single_line(5, 12, 40),
        }];
        let imports = vec![ImportInfo {
            path: "shared.dates".to_string(),
            alias: None,
            span: SourceSpan::single_line(1, 8, 20),
        }];

        let symbols = document_symbols(&index, &metadata, &datasources, &imports);
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["shared.dates", "id", "users"]);
        assert_eq!(symbols[0].detail, "import shared.dates");
        assert_eq!(symbols[1].detail, "key: int");
        assert_eq!(symbols[2].detail, "datasource -> raw.users");
        assert_eq!(symbols[2].kind, SymbolKind::Struct);
    }
}
