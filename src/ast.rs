// File: src/ast.rs
//
// Abstract Syntax Tree (AST) definitions for the Rockstar language.
// Defines the structure of parsed Rockstar programs.
//
// A Rockstar expression is a flat, left-to-right sequence of evalables and
// operators with no precedence. Statements are produced one per line by the
// parser and nested into blocks afterwards by the treeifier.

use std::fmt;

/// An already-resolved literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// String contents, without the surrounding quotes
    Str(String),
}

/// Binary operators; every one combines the running left value with the next evalable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Operator::Add => "add",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
            Operator::Div => "div",
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Leq => "leq",
            Operator::Gt => "gt",
            Operator::Geq => "geq",
        };
        write!(f, "{}", name)
    }
}

/// Anything that produces a value directly
#[derive(Debug, Clone, PartialEq)]
pub enum Evalable {
    Constant(Literal),
    /// Canonical (lowercase, normalized) variable name
    Variable(String),
    Call { name: String, args: Vec<Expression> },
}

/// One element of an expression sequence
#[derive(Debug, Clone, PartialEq)]
pub enum ExprItem {
    Evalable(Evalable),
    Operator(Operator),
}

/// Ordered mix of evalables and operators, evaluated strictly left to right
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub items: Vec<ExprItem>,
}

impl Expression {
    pub fn new(items: Vec<ExprItem>) -> Self {
        Expression { items }
    }

    /// Expression made of a single constant
    pub fn constant(literal: Literal) -> Self {
        Expression { items: vec![ExprItem::Evalable(Evalable::Constant(literal))] }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Direction of a `Turn` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A statement.
///
/// `If`, `Loop` and `FunctionDef` come out of the line parser with an empty
/// block; the treeifier fills it in. `End` only exists between those two
/// stages and never appears in a finished tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment { variable: String, value: Expression },
    Output(Expression),
    Input(String),
    If { condition: Expression, then_block: Vec<Statement> },
    Loop { is_while: bool, condition: Expression, body: Vec<Statement> },
    Turn { direction: Direction, variable: String },
    FunctionDef { name: String, params: Vec<String>, body: Vec<Statement> },
    Return(Expression),
    End,
}
