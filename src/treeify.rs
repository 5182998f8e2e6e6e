// File: src/treeify.rs
//
// Block structuring for parsed Rockstar lines.
//
// The line parser yields one flat statement per line. Here statements that
// open a block (If, Until/While, function definitions) take ownership of the
// statements that follow them, up to the next blank line (`End`) or the end of
// input. A `Give back` also closes the block it appears in.

use crate::ast::Statement;
use crate::errors::{SourceLocation, SyntaxError};

/// A parsed line waiting to be nested
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// 0-based line number in the source file
    pub number: usize,
    pub source: String,
    pub statement: Statement,
}

/// Builds one block from the front of `lines`, leaving the rest in the iterator.
///
/// `in_function` is true while inside a function body; nested `If` and loop
/// blocks inherit it so they may contain `Give back`.
pub fn treeify<I>(lines: &mut I, in_function: bool) -> Result<Vec<Statement>, SyntaxError>
where
    I: Iterator<Item = ParsedLine>,
{
    let mut block = Vec::new();

    while let Some(line) = lines.next() {
        let statement = match line.statement {
            Statement::End => break,
            Statement::Return(value) => {
                if !in_function {
                    return Err(SyntaxError::new("\"Give back\" statement has to be in function")
                        .with_location(SourceLocation::new("-", line.number))
                        .with_source(&line.source));
                }
                block.push(Statement::Return(value));
                break;
            }
            Statement::If { condition, .. } => {
                Statement::If { condition, then_block: treeify(lines, in_function)? }
            }
            Statement::Loop { is_while, condition, .. } => {
                Statement::Loop { is_while, condition, body: treeify(lines, in_function)? }
            }
            Statement::FunctionDef { name, params, .. } => {
                Statement::FunctionDef { name, params, body: treeify(lines, true)? }
            }
            other => other,
        };
        block.push(statement);
    }

    Ok(block)
}

/// Nests a whole program; top-level blocks are closed one after another
/// until every line has been consumed.
pub fn treeify_program(lines: Vec<ParsedLine>) -> Result<Vec<Statement>, SyntaxError> {
    let mut remaining = lines.into_iter().peekable();
    let mut program = Vec::new();

    while remaining.peek().is_some() {
        program.extend(treeify(&mut remaining, false)?);
    }

    Ok(program)
}
