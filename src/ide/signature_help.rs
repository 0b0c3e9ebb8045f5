//! Signature help for built-in function calls.

use crate::base::Position;

use super::functions::{ParameterInfo, lookup_function};
use super::text_utils::{find_open_call, text_before};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureHelp {
    /// Full signature, e.g. `round(value, decimals?) -> numeric`.
    pub label: &'static str,
    /// Markdown description.
    pub documentation: &'static str,
    pub parameters: &'static [ParameterInfo],
    /// Index into `parameters`; `None` for functions without parameters.
    pub active_parameter: Option<u32>,
}

/// Signature of the innermost open call at a 0-indexed position.
///
/// Only text on the cursor's line is considered. When the innermost open
/// parenthesis does not follow a built-in function name there is no help,
/// even if an outer call would match.
pub fn signature_help(text: &str, position: Position) -> Option<SignatureHelp> {
    let before = text_before(text, position.line, position.column)?;
    let call = find_open_call(&before)?;
    let function = lookup_function(&call.name)?;

    let active_parameter = function
        .parameters
        .len()
        .checked_sub(1)
        .map(|last| call.commas.min(last) as u32);

    Some(SignatureHelp {
        label: function.signature,
        documentation: function.description,
        parameters: function.parameters,
        active_parameter,
    })
}
