//! Hover information implementation.

use crate::base::{Position, SourceSpan};
use crate::hir::{DataSourceInfo, ImportInfo, SymbolLocation, SymbolMetadata, resolve};

use super::config::AnalysisConfig;
use super::snapshot::DocumentSnapshot;
use super::text_utils::truncate_with_ellipsis;

/// Columns listed in a datasource hover before the total is shown instead.
const MAX_HOVER_COLUMNS: usize = 10;

/// Result of a hover request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// Address of the hovered concept, canonical when it resolved.
    pub address: Option<String>,
    /// Whether the cursor is on a definition site.
    pub is_definition: bool,
    /// Start line of the hovered range (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed).
    pub end_col: u32,
}

impl HoverResult {
    fn new(contents: String, span: SourceSpan) -> Self {
        let range = span.to_span();
        Self {
            contents,
            address: None,
            is_definition: false,
            start_line: range.start.line,
            start_col: range.start.column,
            end_line: range.end.line,
            end_col: range.end.column,
        }
    }
}

/// Get hover information for a 0-indexed position.
///
/// Datasource declarations are checked first, then imports, then concept
/// locations. A location whose address does not resolve still gets a basic
/// hover naming the address.
pub fn hover(
    snapshot: &DocumentSnapshot,
    position: Position,
    config: &AnalysisConfig,
) -> Option<HoverResult> {
    if let Some(ds) = snapshot
        .datasources
        .iter()
        .find(|ds| ds.span.contains_position(position))
    {
        return Some(HoverResult::new(format_datasource(ds), ds.span));
    }

    if let Some(import) = snapshot
        .imports
        .iter()
        .find(|imp| imp.span.contains_position(position))
    {
        return Some(HoverResult::new(format_import(import), import.span));
    }

    let location = snapshot.index.find_containing(position)?;
    let (contents, address) = match resolve(&location.address, &snapshot.metadata) {
        Some(metadata) => (
            format_concept(metadata, location.is_definition, config),
            metadata.canonical_address.clone(),
        ),
        None => (format_unresolved(location), location.address.clone()),
    };

    let mut result = HoverResult::new(contents, location.span);
    result.address = Some(address);
    result.is_definition = location.is_definition;
    Some(result)
}

fn format_unresolved(location: &SymbolLocation) -> String {
    let mut text = format!("**Concept:** `{}`", location.address);
    if location.is_definition {
        text.push_str("\n\n*(definition)*");
    }
    text
}

/// Markdown for a resolved concept.
pub fn format_concept(
    metadata: &SymbolMetadata,
    is_definition: bool,
    config: &AnalysisConfig,
) -> String {
    let mut lines = vec![
        format!(
            "**{}** `{}`: `{}`",
            metadata.role, metadata.name, metadata.datatype
        ),
        String::new(),
    ];

    if let Some(description) = metadata.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(description.to_string());
        lines.push(String::new());
    }

    if !metadata.namespace.is_empty() && metadata.namespace != config.default_namespace {
        lines.push(format!("**Namespace:** `{}`", metadata.namespace));
    }

    if let Some(keys) = metadata.dependency_keys.as_ref().filter(|k| !k.is_empty()) {
        lines.push(format!("**Keys:** {}", backticked(keys)));
    }

    if let Some(lineage) = metadata.lineage.as_deref().filter(|l| !l.is_empty()) {
        let limit = config.hover_lineage_limit;
        let shown = truncate_with_ellipsis(lineage, limit, limit.saturating_sub(3));
        lines.push(format!("**Derivation:** `{shown}`"));
    }

    if !metadata.modifiers.is_empty() {
        lines.push(format!("**Modifiers:** {}", metadata.modifiers.join(", ")));
    }

    if let Some(line) = metadata.def_line.filter(|&l| l > 0) {
        if is_definition {
            lines.push(format!("**Defined on line:** {line}"));
        } else {
            lines.push(format!("**Definition:** line {line}"));
        }
    }

    if let Some(source) = metadata.source_kind.as_deref() {
        if !source.is_empty() && source != "manual" {
            lines.push(format!("**Source:** {source}"));
        }
    }

    lines.push(String::new());
    lines.push(format!("*Full address: `{}`*", metadata.canonical_address));
    lines.join("\n")
}

/// Markdown for a datasource declaration.
pub fn format_datasource(ds: &DataSourceInfo) -> String {
    let heading = if ds.is_root {
        "root datasource"
    } else {
        "datasource"
    };
    let mut lines = vec![
        format!("**{heading}** `{}`", ds.name),
        String::new(),
        format!("**Address:** `{}`", ds.address),
    ];

    if !ds.columns.is_empty() {
        let shown = &ds.columns[..ds.columns.len().min(MAX_HOVER_COLUMNS)];
        let mut columns = backticked(shown);
        if ds.columns.len() > MAX_HOVER_COLUMNS {
            columns.push_str(&format!(" ... ({} total)", ds.columns.len()));
        }
        lines.push(format!("**Columns:** {columns}"));
    }

    if !ds.grain.is_empty() {
        lines.push(format!("**Grain:** {}", backticked(&ds.grain)));
    }

    lines.join("\n")
}

/// Markdown for an import statement.
pub fn format_import(import: &ImportInfo) -> String {
    let mut lines = vec![
        "**import statement**".to_string(),
        String::new(),
        format!("**Path:** `{}`", import.path),
    ];
    if let Some(alias) = &import.alias {
        lines.push(format!("**Alias:** `{alias}`"));
        lines.push(String::new());
        lines.push(format!(
            "*Use `{alias}.concept_name` to reference concepts from this import*"
        ));
    }
    lines.join("\n")
}

fn backticked(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
