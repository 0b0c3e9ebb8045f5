//! Per-symbol metadata read from the semantic model.
//!
//! The index reads concepts through [`ConceptView`] rather than the concrete
//! [`Concept`] type. Required accessors cover what every symbol graph has;
//! optional accessors default to "absent", and a view declares which optional
//! fields it actually provides through [`ConceptView::provided_fields`]. A
//! graph that provides fewer fields still yields metadata, marked partial.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::semantic::{Concept, ConceptSource, Environment, INTERNAL_NAMESPACE, Purpose};

/// Metadata keyed by canonical address, in model order.
pub type MetadataMap = IndexMap<String, SymbolMetadata>;

// ============================================================================
// METADATA RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Key,
    Property,
    Metric,
    Constant,
    AutoDerived,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Key => "key",
            Role::Property => "property",
            Role::Metric => "metric",
            Role::Constant => "constant",
            Role::AutoDerived => "auto",
        }
    }
}

impl From<Purpose> for Role {
    fn from(purpose: Purpose) -> Self {
        match purpose {
            Purpose::Key => Role::Key,
            Purpose::Property => Role::Property,
            Purpose::Metric => Role::Metric,
            Purpose::Constant => Role::Constant,
            Purpose::Auto => Role::AutoDerived,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the editor features know about one user symbol.
///
/// Definition positions are 1-indexed, as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMetadata {
    pub name: String,
    pub canonical_address: String,
    pub datatype: String,
    pub role: Role,
    pub namespace: String,
    pub def_line: Option<u32>,
    pub def_col: Option<u32>,
    pub def_end_line: Option<u32>,
    pub def_end_col: Option<u32>,
    pub description: Option<String>,
    /// Rendered derivation expression
    pub lineage: Option<String>,
    pub dependency_keys: Option<Vec<String>>,
    pub modifiers: Vec<String>,
    pub derivation: Option<String>,
    pub source_kind: Option<String>,
}

impl SymbolMetadata {
    /// Metadata with only the required fields set.
    pub fn new(
        name: impl Into<String>,
        canonical_address: impl Into<String>,
        datatype: impl Into<String>,
        role: Role,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            canonical_address: canonical_address.into(),
            datatype: datatype.into(),
            role,
            namespace: namespace.into(),
            def_line: None,
            def_col: None,
            def_end_line: None,
            def_end_col: None,
            description: None,
            lineage: None,
            dependency_keys: None,
            modifiers: Vec::new(),
            derivation: None,
            source_kind: None,
        }
    }

    pub fn with_definition(mut self, site: DefinitionSite) -> Self {
        self.def_line = site.line;
        self.def_col = site.column;
        self.def_end_line = site.end_line;
        self.def_end_col = site.end_column;
        self
    }

    pub fn is_auto_derived(&self) -> bool {
        self.source_kind.as_deref() == Some(ConceptSource::AutoDerived.as_str())
    }
}

/// Declaration position of a symbol, each part optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DefinitionSite {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

// ============================================================================
// ADAPTER TRAITS
// ============================================================================

/// Optional metadata a [`ConceptView`] may provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Definition,
    Description,
    Lineage,
    DependencyKeys,
    Modifiers,
    Derivation,
    SourceKind,
}

impl MetadataField {
    pub const ALL: [MetadataField; 7] = [
        MetadataField::Definition,
        MetadataField::Description,
        MetadataField::Lineage,
        MetadataField::DependencyKeys,
        MetadataField::Modifiers,
        MetadataField::Derivation,
        MetadataField::SourceKind,
    ];
}

/// Read access to one concept of a symbol graph.
pub trait ConceptView {
    fn name(&self) -> &str;
    fn namespace(&self) -> &str;
    fn address(&self) -> String;
    fn datatype(&self) -> String;
    fn role(&self) -> Role;

    /// Optional fields this view fills in.
    fn provided_fields(&self) -> &'static [MetadataField] {
        &[]
    }

    fn definition(&self) -> DefinitionSite {
        DefinitionSite::default()
    }

    fn description(&self) -> Option<String> {
        None
    }

    fn lineage(&self) -> Option<String> {
        None
    }

    fn dependency_keys(&self) -> Option<Vec<String>> {
        None
    }

    fn modifiers(&self) -> Vec<String> {
        Vec::new()
    }

    fn derivation(&self) -> Option<String> {
        None
    }

    fn source_kind(&self) -> Option<String> {
        None
    }
}

/// A collection of concepts to extract metadata from.
pub trait SymbolGraph {
    fn concept_views(&self) -> Box<dyn Iterator<Item = &dyn ConceptView> + '_>;
}

impl ConceptView for Concept {
    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn address(&self) -> String {
        Concept::address(self)
    }

    fn datatype(&self) -> String {
        self.datatype.as_str().to_string()
    }

    fn role(&self) -> Role {
        self.purpose.into()
    }

    fn provided_fields(&self) -> &'static [MetadataField] {
        &MetadataField::ALL
    }

    fn definition(&self) -> DefinitionSite {
        DefinitionSite {
            line: self.metadata.line,
            column: self.metadata.column,
            end_line: self.metadata.end_line,
            end_column: self.metadata.end_column,
        }
    }

    fn description(&self) -> Option<String> {
        self.metadata.description.clone()
    }

    fn lineage(&self) -> Option<String> {
        self.lineage.as_ref().map(|expr| expr.to_string())
    }

    fn dependency_keys(&self) -> Option<Vec<String>> {
        self.keys.as_ref().map(|keys| keys.iter().cloned().collect())
    }

    fn modifiers(&self) -> Vec<String> {
        self.modifiers.iter().map(|m| m.as_str().to_string()).collect()
    }

    fn derivation(&self) -> Option<String> {
        Some(self.derivation.as_str().to_string())
    }

    fn source_kind(&self) -> Option<String> {
        Some(self.metadata.source.as_str().to_string())
    }
}

impl SymbolGraph for Environment {
    fn concept_views(&self) -> Box<dyn Iterator<Item = &dyn ConceptView> + '_> {
        Box::new(self.concepts.values().map(|c| c as &dyn ConceptView))
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Result of reading one concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Complete(SymbolMetadata),
    /// Usable metadata, but the view lacked some optional fields.
    Partial {
        metadata: SymbolMetadata,
        missing: Vec<MetadataField>,
    },
    Skipped {
        address: String,
        reason: &'static str,
    },
}

impl ExtractionOutcome {
    pub fn metadata(self) -> Option<SymbolMetadata> {
        match self {
            ExtractionOutcome::Complete(metadata)
            | ExtractionOutcome::Partial { metadata, .. } => Some(metadata),
            ExtractionOutcome::Skipped { .. } => None,
        }
    }
}

/// Read one concept into metadata.
pub fn extract_one(view: &dyn ConceptView) -> ExtractionOutcome {
    let address = view.address();
    if view.name().is_empty() {
        return ExtractionOutcome::Skipped {
            address,
            reason: "concept has no name",
        };
    }
    if view.namespace().starts_with(INTERNAL_NAMESPACE) {
        return ExtractionOutcome::Skipped {
            address,
            reason: "internal namespace",
        };
    }

    let provided = view.provided_fields();
    let mut metadata = SymbolMetadata::new(
        view.name(),
        address,
        view.datatype(),
        view.role(),
        view.namespace(),
    )
    .with_definition(view.definition());
    metadata.description = view.description();
    metadata.lineage = view.lineage();
    metadata.dependency_keys = view.dependency_keys();
    metadata.modifiers = view.modifiers();
    metadata.derivation = view.derivation();
    metadata.source_kind = view.source_kind();

    let missing: Vec<MetadataField> = MetadataField::ALL
        .into_iter()
        .filter(|field| !provided.contains(field))
        .collect();
    if missing.is_empty() {
        ExtractionOutcome::Complete(metadata)
    } else {
        ExtractionOutcome::Partial { metadata, missing }
    }
}

/// Build the metadata map for every user symbol in `graph`.
pub fn build_metadata(graph: &dyn SymbolGraph) -> MetadataMap {
    let mut map = MetadataMap::new();
    let mut partial = 0usize;
    for view in graph.concept_views() {
        match extract_one(view) {
            ExtractionOutcome::Complete(metadata) => {
                map.insert(metadata.canonical_address.clone(), metadata);
            }
            ExtractionOutcome::Partial { metadata, missing } => {
                debug!(
                    "Partial metadata for {}: missing {:?}",
                    metadata.canonical_address, missing
                );
                partial += 1;
                map.insert(metadata.canonical_address.clone(), metadata);
            }
            ExtractionOutcome::Skipped { address, reason } => {
                tracing::trace!("Skipped {address}: {reason}");
            }
        }
    }
    debug!("Extracted metadata for {} symbols ({partial} partial)", map.len());
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{DataType, Expr, Modifier};
    use indexmap::IndexSet;

    /// A view from an older graph that only knows the required fields.
    struct BareView;

    impl ConceptView for BareView {
        fn name(&self) -> &str {
            "revenue"
        }
        fn namespace(&self) -> &str {
            "local"
        }
        fn address(&self) -> String {
            "local.revenue".to_string()
        }
        fn datatype(&self) -> String {
            "float".to_string()
        }
        fn role(&self) -> Role {
            Role::Metric
        }
    }

    struct BareGraph;

    impl SymbolGraph for BareGraph {
        fn concept_views(&self) -> Box<dyn Iterator<Item = &dyn ConceptView> + '_> {
            Box::new(std::iter::once(&BareView as &dyn ConceptView))
        }
    }

    #[test]
    fn test_concept_extracts_completely() {
        let mut concept = Concept::new("name", "local", Purpose::Property, DataType::String);
        concept.keys = Some(IndexSet::from(["local.user_id".to_string()]));
        concept.modifiers.push(Modifier::Nullable);
        concept.metadata.line = Some(2);
        concept.metadata.description = Some("Display name".to_string());

        let ExtractionOutcome::Complete(metadata) = extract_one(&concept) else {
            panic!("expected complete metadata");
        };
        assert_eq!(metadata.canonical_address, "local.name");
        assert_eq!(metadata.role, Role::Property);
        assert_eq!(metadata.def_line, Some(2));
        assert_eq!(metadata.dependency_keys, Some(vec!["local.user_id".to_string()]));
        assert_eq!(metadata.modifiers, vec!["nullable"]);
        assert_eq!(metadata.derivation.as_deref(), Some("root"));
        assert_eq!(metadata.source_kind.as_deref(), Some("manual"));
    }

    #[test]
    fn test_bare_view_is_partial() {
        match extract_one(&BareView) {
            ExtractionOutcome::Partial { metadata, missing } => {
                assert_eq!(metadata.datatype, "float");
                assert_eq!(missing.len(), MetadataField::ALL.len());
            }
            other => panic!("expected partial metadata, got {other:?}"),
        }
        let map = build_metadata(&BareGraph);
        assert!(map.contains_key("local.revenue"));
    }

    #[test]
    fn test_internal_namespace_is_filtered() {
        let mut env = Environment::new();
        env.add_concept(
            Concept::derived(
                "total",
                "local",
                Purpose::Metric,
                DataType::Integer,
                Expr::Concept("local.x".to_string()),
            ),
            1,
        )
        .unwrap();
        let map = build_metadata(&env);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["local.total"]);
        assert_eq!(map["local.total"].lineage.as_deref(), Some("local.x"));
    }

    #[test]
    fn test_auto_role_displays_short() {
        assert_eq!(Role::AutoDerived.to_string(), "auto");
        assert_eq!(Role::from(Purpose::Auto), Role::AutoDerived);
    }
}
