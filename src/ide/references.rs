//! Find references implementation.

use crate::base::Position;
use crate::hir::{SymbolLocation, resolve_address};

use super::snapshot::DocumentSnapshot;

/// Result of a find-references request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceResult {
    /// All references found, in document order.
    pub references: Vec<Reference>,
    /// Address every reference resolved to.
    pub address: Option<String>,
}

impl ReferenceResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if any references were found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get the number of references.
    pub fn len(&self) -> usize {
        self.references.len()
    }
}

/// A reference to a concept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed).
    pub end_col: u32,
    /// Whether this is the definition (vs a reference).
    pub is_definition: bool,
}

impl From<&SymbolLocation> for Reference {
    fn from(location: &SymbolLocation) -> Self {
        let range = location.span.to_span();
        Self {
            start_line: range.start.line,
            start_col: range.start.column,
            end_line: range.end.line,
            end_col: range.end.column,
            is_definition: location.is_definition,
        }
    }
}

/// Find all occurrences of the concept at a 0-indexed position.
///
/// Occurrences are matched on their resolved address, so `user_id` and
/// `local.user_id` count as the same concept. Definition sites are only
/// included when `include_declaration` is set.
pub fn find_references(
    snapshot: &DocumentSnapshot,
    position: Position,
    include_declaration: bool,
) -> ReferenceResult {
    let Some(location) = snapshot.index.find_containing(position) else {
        return ReferenceResult::empty();
    };
    let target = resolve_address(&location.address, &snapshot.metadata)
        .unwrap_or_else(|| location.address.clone());

    let references = snapshot
        .index
        .all_matching_resolved(&snapshot.metadata, &target)
        .into_iter()
        .filter(|loc| include_declaration || !loc.is_definition)
        .map(Reference::from)
        .collect();

    ReferenceResult {
        references,
        address: Some(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourceSpan;
    use crate::hir::{PositionIndex, Role, SymbolMetadata};

    fn snapshot() -> DocumentSnapshot {
        let locations = vec![
            SymbolLocation {
                address: "local.id".to_string(),
                span: SourceSpan::single_line(1, 5, 7),
                is_definition: true,
            },
            SymbolLocation {
                address: "local.id".to_string(),
                span: SourceSpan::single_line(2, 8, 10),
                is_definition: false,
            },
            SymbolLocation {
                address: "local.id".to_string(),
                span: SourceSpan::single_line(3, 8, 10),
                is_definition: false,
            },
        ];
        let mut snapshot = DocumentSnapshot {
            index: PositionIndex::new(locations),
            ..DocumentSnapshot::default()
        };
        snapshot.metadata.insert(
            "local.id".to_string(),
            SymbolMetadata::new("id", "local.id", "int", Role::Key, "local"),
        );
        snapshot
    }

    #[test]
    fn test_references_without_declaration() {
        let result = find_references(&snapshot(), Position::new(2, 8), false);
        assert_eq!(result.len(), 2);
        assert!(result.references.iter().all(|r| !r.is_definition));
        assert_eq!(result.address.as_deref(), Some("local.id"));
    }

    #[test]
    fn test_references_with_declaration() {
        let result = find_references(&snapshot(), Position::new(0, 5), true);
        assert_eq!(result.len(), 3);
        assert!(result.references[0].is_definition);
    }

    #[test]
    fn test_no_location_no_references() {
        assert!(find_references(&snapshot(), Position::new(9, 0), true).is_empty());
    }
}
