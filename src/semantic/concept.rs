//! Concepts: the named, typed values a Trilogy model is made of.

use std::fmt;

use indexmap::IndexSet;
use smol_str::SmolStr;

use super::environment::DEFAULT_NAMESPACE;
use super::expr::Expr;

/// What role a concept plays in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    Key,
    Property,
    Metric,
    Constant,
    Auto,
}

impl Purpose {
    /// Map a declaration keyword (`key`, `property`, `metric`, `const`, `auto`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "key" => Some(Self::Key),
            "property" => Some(Self::Property),
            "metric" => Some(Self::Metric),
            "const" | "constant" => Some(Self::Constant),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Property => "property",
            Self::Metric => "metric",
            Self::Constant => "constant",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    String,
    Float,
    Numeric,
    Bool,
    Date,
    Datetime,
    Timestamp,
    Unknown,
}

impl DataType {
    /// Parse a type name as written in source.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" | "bigint" => Some(Self::Integer),
            "string" => Some(Self::String),
            "float" => Some(Self::Float),
            "numeric" => Some(Self::Numeric),
            "bool" | "boolean" => Some(Self::Bool),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::Datetime),
            "timestamp" => Some(Self::Timestamp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::String => "string",
            Self::Float => "float",
            Self::Numeric => "numeric",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Unknown => "unknown",
        }
    }

    /// DuckDB spelling of the type.
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::String => "VARCHAR",
            Self::Float => "DOUBLE",
            Self::Numeric => "DECIMAL",
            Self::Bool => "BOOLEAN",
            Self::Date => "DATE",
            Self::Datetime | Self::Timestamp => "TIMESTAMP",
            Self::Unknown => "VARCHAR",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Numeric)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Nullable,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nullable => "nullable",
        }
    }
}

/// How a concept's values come to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    /// Bound directly to datasource columns
    Root,
    /// Row-level expression over other concepts
    Basic,
    Aggregate,
    Constant,
}

impl Derivation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Basic => "basic",
            Self::Aggregate => "aggregate",
            Self::Constant => "constant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConceptSource {
    #[default]
    Manual,
    /// Generated alongside another concept (`<key>.count`)
    AutoDerived,
}

impl ConceptSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::AutoDerived => "auto_derived",
        }
    }
}

/// Where and how a concept was declared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConceptMetadata {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
    pub description: Option<String>,
    pub source: ConceptSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    pub name: SmolStr,
    pub namespace: String,
    pub datatype: DataType,
    pub purpose: Purpose,
    pub lineage: Option<Expr>,
    /// Parent keys for properties
    pub keys: Option<IndexSet<String>>,
    pub modifiers: Vec<Modifier>,
    pub derivation: Derivation,
    pub metadata: ConceptMetadata,
}

impl Concept {
    /// A root concept with no lineage.
    pub fn new(
        name: impl Into<SmolStr>,
        namespace: impl Into<String>,
        purpose: Purpose,
        datatype: DataType,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            datatype,
            purpose,
            lineage: None,
            keys: None,
            modifiers: Vec::new(),
            derivation: Derivation::Root,
            metadata: ConceptMetadata::default(),
        }
    }

    /// A concept computed from `lineage`.
    pub fn derived(
        name: impl Into<SmolStr>,
        namespace: impl Into<String>,
        purpose: Purpose,
        datatype: DataType,
        lineage: Expr,
    ) -> Self {
        let derivation = if lineage.contains_aggregate() {
            Derivation::Aggregate
        } else if lineage.concepts().is_empty() {
            Derivation::Constant
        } else {
            Derivation::Basic
        };
        Self {
            lineage: Some(lineage),
            derivation,
            ..Self::new(name, namespace, purpose, datatype)
        }
    }

    pub fn address(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Declarations of the same address agree when role and type match.
    pub fn is_compatible(&self, other: &Concept) -> bool {
        self.purpose == other.purpose
            && self.datatype == other.datatype
            && self.lineage == other.lineage
    }

    /// Copy of this concept as seen through an import namespace.
    pub fn requalified(&self, namespace: &str) -> Concept {
        let mut concept = self.clone();
        concept.namespace = requalify_namespace(&self.namespace, namespace);
        concept.lineage = self
            .lineage
            .as_ref()
            .map(|lineage| lineage.map_concepts(&|address| requalify_address(address, namespace)));
        concept.keys = self.keys.as_ref().map(|keys| {
            keys.iter()
                .map(|key| requalify_address(key, namespace))
                .collect()
        });
        concept
    }
}

fn requalify_namespace(current: &str, namespace: &str) -> String {
    if current == DEFAULT_NAMESPACE {
        namespace.to_string()
    } else {
        format!("{namespace}.{current}")
    }
}

/// Rewrite an address from an imported file into the importing namespace.
///
/// `local.x` imported as `b` becomes `b.x`; `c.x` (a nested import) becomes
/// `b.c.x`.
pub fn requalify_address(address: &str, namespace: &str) -> String {
    match address.strip_prefix(DEFAULT_NAMESPACE).and_then(|rest| rest.strip_prefix('.')) {
        Some(rest) => format!("{namespace}.{rest}"),
        None => format!("{namespace}.{address}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_keywords() {
        assert_eq!(Purpose::from_keyword("const"), Some(Purpose::Constant));
        assert_eq!(Purpose::from_keyword("KEY"), Some(Purpose::Key));
        assert_eq!(Purpose::from_keyword("rowset"), None);
        assert_eq!(Purpose::Constant.as_str(), "constant");
    }

    #[test]
    fn test_datatype_names() {
        assert_eq!(DataType::from_name("int"), Some(DataType::Integer));
        assert_eq!(DataType::from_name("Integer"), Some(DataType::Integer));
        assert_eq!(DataType::from_name("blob"), None);
        assert_eq!(DataType::Integer.to_string(), "int");
    }

    #[test]
    fn test_requalify() {
        assert_eq!(requalify_address("local.user_id", "b"), "b.user_id");
        assert_eq!(requalify_address("c.user_id", "b"), "b.c.user_id");

        let mut concept = Concept::new("name", "local", Purpose::Property, DataType::String);
        concept.keys = Some(IndexSet::from(["local.user_id".to_string()]));
        let imported = concept.requalified("b");
        assert_eq!(imported.address(), "b.name");
        assert!(imported.keys.unwrap().contains("b.user_id"));
    }
}
