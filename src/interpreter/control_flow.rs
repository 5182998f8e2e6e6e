// File: src/interpreter/control_flow.rs
//
// Control flow signal for early returns.
//
// Executing a statement list yields a `Flow`. A `Give back` produces
// `Flow::Return`, which every enclosing block passes straight up until the
// function call that owns the body turns it into the call's value.

use super::value::Value;

/// Result of executing a statement or a block
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    /// Normal execution, continue to the next statement
    Next,
    /// A `Give back` ran; unwind to the calling function with this value
    Return(Value),
}
