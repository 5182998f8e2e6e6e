// File: src/lib.rs
//
// Library interface for the Rockstar interpreter.
// Exposes the pipeline stages (lexer, parser, treeify, interpreter) for
// integration testing and external use.

pub mod ast;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod treeify;
