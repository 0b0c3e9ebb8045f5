//! Completion suggestions implementation.

use std::sync::Arc;

use crate::hir::{DataSourceInfo, MetadataMap, Role, SymbolMetadata};
use crate::semantic::INTERNAL_NAMESPACE;

use super::config::AnalysisConfig;
use super::functions::{FunctionInfo, TRILOGY_FUNCTIONS};
use super::text_utils::truncate_with_ellipsis;

/// Keywords offered in every completion list.
pub const KEYWORDS: &[&str] = &[
    "select", "key", "property", "metric", "const", "datasource", "import", "as", "where",
    "order", "by", "limit", "asc", "desc", "and", "or", "not", "in", "between", "like", "is",
    "null", "true", "false", "grain", "address", "auto", "persist", "into", "rowset", "merge",
    "show",
];

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    Function,
    Field,
    Variable,
    Property,
    Value,
    Keyword,
    Constant,
    Struct,
}

impl CompletionKind {
    /// Kind for a concept with the given role.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Key => CompletionKind::Field,
            Role::Property => CompletionKind::Property,
            Role::Metric => CompletionKind::Value,
            Role::Constant => CompletionKind::Constant,
            Role::AutoDerived => CompletionKind::Variable,
        }
    }

    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Function => 3,
            CompletionKind::Field => 5,
            CompletionKind::Variable => 6,
            CompletionKind::Property => 10,
            CompletionKind::Value => 12,
            CompletionKind::Keyword => 14,
            CompletionKind::Constant => 21,
            CompletionKind::Struct => 22,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Documentation (markdown, shown in popup).
    pub documentation: Option<Arc<str>>,
    /// Text to insert (if different from label).
    pub insert_text: Option<Arc<str>>,
    /// Whether `insert_text` is a snippet with tab stops.
    pub is_snippet: bool,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            is_snippet: false,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the documentation.
    pub fn with_documentation(mut self, doc: impl Into<Arc<str>>) -> Self {
        self.documentation = Some(doc.into());
        self
    }

    /// Set the insert text.
    pub fn with_insert_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    /// Set a snippet as the insert text.
    pub fn with_snippet(mut self, snippet: impl Into<Arc<str>>) -> Self {
        self.insert_text = Some(snippet.into());
        self.is_snippet = true;
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    /// Editor sort key: priority group first, then label.
    pub fn sort_text(&self) -> String {
        format!("{}_{}", self.sort_priority, self.label)
    }

    /// Create from concept metadata.
    pub fn from_concept(concept: &SymbolMetadata, lineage_limit: usize) -> Self {
        let mut doc_parts = vec![format!(
            "**{}** `{}`: `{}`",
            concept.role, concept.name, concept.datatype
        )];
        if let Some(description) = concept.description.as_deref().filter(|d| !d.is_empty()) {
            doc_parts.push(description.to_string());
        }
        if let Some(lineage) = concept.lineage.as_deref().filter(|l| !l.is_empty()) {
            let shown = truncate_with_ellipsis(lineage, lineage_limit, lineage_limit);
            doc_parts.push(format!("Derivation: `{shown}`"));
        }

        Self::new(concept.name.as_str(), CompletionKind::for_role(concept.role))
            .with_detail(format!("{}: {}", concept.role, concept.datatype))
            .with_documentation(doc_parts.join("\n\n"))
            .with_insert_text(concept.name.as_str())
            .with_priority(0)
    }

    /// Create from a built-in function.
    pub fn from_function(function: &FunctionInfo) -> Self {
        Self::new(function.name, CompletionKind::Function)
            .with_detail(function.signature)
            .with_documentation(function.description)
            .with_snippet(format!("{}($1)", function.name))
            .with_priority(2)
    }

    /// Create from a datasource declaration.
    pub fn from_datasource(ds: &DataSourceInfo) -> Self {
        Self::new(ds.name.as_str(), CompletionKind::Struct)
            .with_detail(format!("datasource -> {}", ds.address))
            .with_documentation(format!(
                "**Datasource:** `{}`\n\n**Address:** `{}`",
                ds.name, ds.address
            ))
            .with_insert_text(ds.name.as_str())
            .with_priority(3)
    }
}

/// Get completion suggestions for a document.
///
/// The list is not filtered by cursor context: user concepts come first,
/// then keywords, built-in functions and datasources.
pub fn completions(
    metadata: &MetadataMap,
    datasources: &[DataSourceInfo],
    config: &AnalysisConfig,
) -> Vec<CompletionItem> {
    let mut items = Vec::with_capacity(
        metadata.len() + KEYWORDS.len() + TRILOGY_FUNCTIONS.len() + datasources.len(),
    );

    items.extend(
        metadata
            .values()
            .filter(|concept| concept.namespace != INTERNAL_NAMESPACE)
            .map(|concept| CompletionItem::from_concept(concept, config.completion_lineage_limit)),
    );

    items.extend(KEYWORDS.iter().map(|&keyword| {
        CompletionItem::new(keyword, CompletionKind::Keyword)
            .with_detail("keyword")
            .with_insert_text(keyword)
            .with_priority(1)
    }));

    items.extend(TRILOGY_FUNCTIONS.iter().map(CompletionItem::from_function));
    items.extend(datasources.iter().map(CompletionItem::from_datasource));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourceSpan;

    #[test]
    fn test_concept_item() {
        let mut concept =
            SymbolMetadata::new("revenue", "local.revenue", "float", Role::Metric, "local");
        concept.lineage = Some("y".repeat(60));

        let item = CompletionItem::from_concept(&concept, 50);
        assert_eq!(item.kind, CompletionKind::Value);
        assert_eq!(item.detail.as_deref(), Some("metric: float"));
        assert_eq!(item.sort_text(), "0_revenue");
        assert_eq!(
            item.documentation.as_deref(),
            Some(format!("**metric** `revenue`: `float`\n\nDerivation: `{}...`", "y".repeat(50)).as_str())
        );
    }

    #[test]
    fn test_function_items_are_snippets() {
        let item = CompletionItem::from_function(&TRILOGY_FUNCTIONS[0]);
        assert!(item.is_snippet);
        assert_eq!(item.insert_text.as_deref(), Some("count($1)"));
        assert_eq!(item.sort_text(), "2_count");
    }

    #[test]
    fn test_completion_groups() {
        let mut metadata = MetadataMap::new();
        metadata.insert(
            "local.id".to_string(),
            SymbolMetadata::new("id", "local.id", "int", Role::Key, "local"),
        );
        metadata.insert(
            "__preql_internal.hidden".to_string(),
            SymbolMetadata::new("hidden", "__preql_internal.hidden", "int", Role::Key, INTERNAL_NAMESPACE),
        );
        let datasources = vec![DataSourceInfo {
            name: "users".to_string(),
            address: "raw.users".to_string(),
            columns: Vec::new(),
            grain: Vec::new(),
            is_root: false,
            span: SourceSpan::single_line(1, 12, 17),
        }];

        let items = completions(&metadata, &datasources, &AnalysisConfig::default());
        assert_eq!(
            items.len(),
            1 + KEYWORDS.len() + TRILOGY_FUNCTIONS.len() + 1
        );
        assert_eq!(items[0].label.as_ref(), "id");
        assert!(items.iter().all(|i| i.label.as_ref() != "hidden"));
        let last = items.last().unwrap();
        assert_eq!(last.kind, CompletionKind::Struct);
        assert_eq!(last.sort_text(), "3_users");
    }
}
