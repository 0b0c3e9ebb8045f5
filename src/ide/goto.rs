//! Go-to-definition implementation.

use crate::base::{Position, SourceSpan};
use crate::hir::{SymbolMetadata, resolve};

use super::snapshot::DocumentSnapshot;

/// End column used when the definition site has no end position.
const OPEN_END_COLUMN: u32 = 100;

/// Result of a go-to-definition request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result with a single target.
    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition, in the same document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    /// Start line (0-indexed).
    pub start_line: u32,
    /// Start column (0-indexed).
    pub start_col: u32,
    /// End line (0-indexed).
    pub end_line: u32,
    /// End column (0-indexed).
    pub end_col: u32,
    pub address: String,
}

impl GotoTarget {
    fn from_span(span: SourceSpan, address: &str) -> Self {
        let range = span.to_span();
        Self {
            start_line: range.start.line,
            start_col: range.start.column,
            end_line: range.end.line,
            end_col: range.end.column,
            address: address.to_string(),
        }
    }

    /// Target from the declaration position the compiler recorded.
    fn from_metadata(metadata: &SymbolMetadata) -> Option<Self> {
        let line = metadata.def_line.filter(|&l| l > 0)?;
        Some(Self {
            start_line: line - 1,
            start_col: metadata.def_col.map_or(0, |c| c.saturating_sub(1)),
            end_line: metadata.def_end_line.unwrap_or(line).saturating_sub(1),
            end_col: metadata
                .def_end_col
                .map_or(OPEN_END_COLUMN, |c| c.saturating_sub(1)),
            address: metadata.canonical_address.clone(),
        })
    }
}

/// Find the definition of the concept referenced at a 0-indexed position.
///
/// Nothing is returned when the cursor already sits on a definition.
/// The compiler's recorded declaration position is preferred; otherwise the
/// definition locations recorded under the same address are used.
pub fn goto_definition(snapshot: &DocumentSnapshot, position: Position) -> GotoResult {
    let Some(location) = snapshot.index.find_containing(position) else {
        return GotoResult::empty();
    };
    if location.is_definition {
        return GotoResult::empty();
    }

    if let Some(target) =
        resolve(&location.address, &snapshot.metadata).and_then(GotoTarget::from_metadata)
    {
        return GotoResult::single(target);
    }

    GotoResult {
        targets: snapshot
            .index
            .definitions_of(&location.address)
            .map(|def| GotoTarget::from_span(def.span, &def.address))
            .collect(),
    }
}
