//! The symbol environment a document compiles into.

use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;

use super::concept::{Concept, ConceptSource, DataType, Purpose};
use super::error::SemanticError;
use super::expr::Expr;

/// Namespace of concepts declared in the document itself.
pub const DEFAULT_NAMESPACE: &str = "local";

/// Namespace for compiler-generated concepts; never shown to users.
pub const INTERNAL_NAMESPACE: &str = "__preql_internal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasourceAddress {
    Table(SmolStr),
    Query(String),
}

impl DatasourceAddress {
    /// Text shown to users: the table name, or the query in parentheses.
    pub fn display(&self) -> String {
        match self {
            DatasourceAddress::Table(table) => table.to_string(),
            DatasourceAddress::Query(query) => format!("({query})"),
        }
    }
}

/// Binding of a physical column to a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAssignment {
    pub column: SmolStr,
    /// Canonical concept address
    pub concept: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datasource {
    pub name: SmolStr,
    pub namespace: String,
    pub columns: Vec<ColumnAssignment>,
    pub grain: Vec<String>,
    pub address: DatasourceAddress,
    pub is_root: bool,
}

impl Datasource {
    pub fn identifier(&self) -> String {
        if self.namespace == DEFAULT_NAMESPACE {
            self.name.to_string()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn column_for(&self, concept: &str) -> Option<&ColumnAssignment> {
        self.columns.iter().find(|c| c.concept == concept)
    }

    pub fn binds(&self, concept: &str) -> bool {
        self.column_for(concept).is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub path: String,
    pub alias: Option<String>,
}

impl ImportRecord {
    /// Namespace the import's concepts live under.
    pub fn namespace(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.path)
    }
}

/// Concepts, datasources and imports known to a compilation.
#[derive(Debug, Clone)]
pub struct Environment {
    pub namespace: String,
    pub concepts: IndexMap<String, Concept>,
    pub datasources: IndexMap<String, Datasource>,
    pub imports: IndexMap<String, ImportRecord>,
    pub working_path: Option<PathBuf>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        let mut env = Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            concepts: IndexMap::new(),
            datasources: IndexMap::new(),
            imports: IndexMap::new(),
            working_path: None,
        };
        let mut all_rows = Concept::derived(
            "all_rows",
            INTERNAL_NAMESPACE,
            Purpose::Constant,
            DataType::Integer,
            Expr::Call {
                function: "count".into(),
                args: vec![Expr::Literal(super::expr::Literal::Number("1".into()))],
            },
        );
        all_rows.metadata.source = ConceptSource::AutoDerived;
        env.concepts.insert(all_rows.address(), all_rows);
        env
    }

    pub fn with_working_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_path = Some(path.into());
        self
    }

    /// Register a concept. Re-declaring an identical definition is a no-op.
    pub fn add_concept(&mut self, concept: Concept, line: u32) -> Result<(), SemanticError> {
        let address = concept.address();
        if let Some(existing) = self.concepts.get(&address) {
            if existing.is_compatible(&concept) {
                return Ok(());
            }
            return Err(SemanticError::ConflictingDeclaration { address, line });
        }
        self.concepts.insert(address, concept);
        Ok(())
    }

    pub fn add_datasource(
        &mut self,
        datasource: Datasource,
        line: u32,
    ) -> Result<(), SemanticError> {
        let identifier = datasource.identifier();
        if self.datasources.contains_key(&identifier) {
            return Err(SemanticError::DuplicateDatasource {
                name: identifier,
                line,
            });
        }
        self.datasources.insert(identifier, datasource);
        Ok(())
    }

    pub fn add_import(&mut self, record: ImportRecord) {
        self.imports.insert(record.namespace().to_string(), record);
    }

    /// Concepts outside the internal namespace.
    pub fn user_concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts
            .values()
            .filter(|c| !c.namespace.starts_with(INTERNAL_NAMESPACE))
    }

    pub fn concept(&self, address: &str) -> Option<&Concept> {
        self.concepts.get(address)
    }

    /// Canonical address for a name as written in source.
    ///
    /// Tries, in order: the name as given; an import namespace prefix;
    /// the name under the local namespace; a property named by its parent
    /// (`order.total` for a property `total` keyed on `order`).
    pub fn resolve(&self, raw: &str) -> Option<String> {
        if self.concepts.contains_key(raw) {
            return Some(raw.to_string());
        }

        let local = format!("{}.{raw}", self.namespace);
        if self.concepts.contains_key(&local) {
            return Some(local);
        }

        let (parent, name) = raw.rsplit_once('.')?;
        let parent_address = self.resolve(parent)?;
        let namespace = self
            .concepts
            .get(&parent_address)
            .map(|c| c.namespace.clone())
            .unwrap_or_else(|| self.namespace.clone());
        let candidate = format!("{namespace}.{name}");
        let keyed_on_parent = self
            .concepts
            .get(&candidate)
            .and_then(|c| c.keys.as_ref())
            .is_some_and(|keys: &IndexSet<String>| keys.contains(&parent_address));
        keyed_on_parent.then_some(candidate)
    }
}
