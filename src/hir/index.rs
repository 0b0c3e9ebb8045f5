//! Position lookups over a document's symbol locations.

use serde::Serialize;

use super::locations::SymbolLocation;
use super::metadata::MetadataMap;
use super::resolve::resolve;
use crate::base::Position;

/// Symbol locations of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PositionIndex {
    locations: Vec<SymbolLocation>,
}

impl PositionIndex {
    pub fn new(locations: Vec<SymbolLocation>) -> Self {
        Self { locations }
    }

    pub fn locations(&self) -> &[SymbolLocation] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// First location containing a 0-indexed editor position.
    pub fn find_containing(&self, position: Position) -> Option<&SymbolLocation> {
        self.locations
            .iter()
            .find(|loc| loc.span.contains_position(position))
    }

    /// Definition sites recorded under exactly `address`.
    pub fn definitions_of<'a>(
        &'a self,
        address: &'a str,
    ) -> impl Iterator<Item = &'a SymbolLocation> + 'a {
        self.locations
            .iter()
            .filter(move |loc| loc.is_definition && loc.address == address)
    }

    /// Every location that resolves to `canonical_address`. Locations that
    /// do not resolve are compared by their recorded address.
    pub fn all_matching_resolved(
        &self,
        metadata: &MetadataMap,
        canonical_address: &str,
    ) -> Vec<&SymbolLocation> {
        self.locations
            .iter()
            .filter(|loc| match resolve(&loc.address, metadata) {
                Some(found) => found.canonical_address == canonical_address,
                None => loc.address == canonical_address,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SourceSpan;
    use crate::hir::metadata::{Role, SymbolMetadata};

    fn location(address: &str, line: u32, start: u32, end: u32, def: bool) -> SymbolLocation {
        SymbolLocation {
            address: address.to_string(),
            span: SourceSpan::single_line(line, start, end),
            is_definition: def,
        }
    }

    fn index() -> PositionIndex {
        PositionIndex::new(vec![
            location("local.user_id", 1, 5, 12, true),
            location("local.user_id.name", 2, 10, 22, true),
            location("local.user_id", 3, 8, 15, false),
            location("user_id.name", 3, 17, 29, false),
            location("local.ghost", 4, 8, 13, false),
        ])
    }

    #[test]
    fn test_find_containing_converts_to_one_indexed() {
        let index = index();
        let found = index.find_containing(Position::new(2, 7)).unwrap();
        assert_eq!(found.address, "local.user_id");
        assert!(!found.is_definition);
        // End column is inclusive
        assert!(index.find_containing(Position::new(2, 14)).is_some());
        assert!(index.find_containing(Position::new(2, 15)).is_none());
        assert!(index.find_containing(Position::new(9, 0)).is_none());
    }

    #[test]
    fn test_find_containing_first_match_wins() {
        let index = PositionIndex::new(vec![
            location("orders.total", 1, 8, 20, false),
            location("local.total", 1, 15, 20, false),
        ]);
        let found = index.find_containing(Position::new(0, 16)).unwrap();
        assert_eq!(found.address, "orders.total");
    }

    #[test]
    fn test_definitions_of_requires_exact_address() {
        let index = index();
        assert_eq!(index.definitions_of("local.user_id").count(), 1);
        assert_eq!(index.definitions_of("local.name").count(), 0);
    }

    #[test]
    fn test_all_matching_resolved() {
        let metadata: MetadataMap = [
            ("local.user_id", "user_id", Role::Key),
            ("local.name", "name", Role::Property),
        ]
        .into_iter()
        .map(|(address, name, role)| {
            (
                address.to_string(),
                SymbolMetadata::new(name, address, "int", role, "local"),
            )
        })
        .collect();

        let index = index();
        let names = index.all_matching_resolved(&metadata, "local.name");
        assert_eq!(names.len(), 2);
        assert_eq!(index.all_matching_resolved(&metadata, "local.user_id").len(), 2);
        // Unresolved locations still match on their own address
        assert_eq!(index.all_matching_resolved(&metadata, "local.ghost").len(), 1);
    }
}
