// File: src/interpreter/mod.rs
//
// Tree-walking interpreter for the Rockstar language.
// Executes Rockstar programs by walking the nested statement tree.
//
// The interpreter owns the top-level environment and the function table.
// Execution is depth-first and strictly sequential:
// - Function definitions register in the table when execution reaches them,
//   so a function is only callable after its definition has run
// - Each call evaluates its arguments in the caller's environment and runs
//   the body against a brand-new environment; the function table is shared
// - If and loop bodies run against the environment of the enclosing frame
// - Output is written synchronously in statement order

mod control_flow;
mod environment;
pub mod test_runner;
mod value;

pub use environment::Environment;
pub use test_runner::{SnapshotReport, SnapshotResult, SnapshotRunner};
pub use value::Value;

use control_flow::Flow;

use crate::ast::{Evalable, ExprItem, Expression, Statement};
use crate::errors::RuntimeError;
use log::{debug, info};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

/// A registered function: parameter names and body
#[derive(Debug)]
struct Function {
    params: Vec<String>,
    body: Vec<Statement>,
}

/// Main interpreter that executes Rockstar programs
pub struct Interpreter {
    /// Top-level variables; survives the whole run
    pub env: Environment,
    functions: HashMap<String, Rc<Function>>,
    output: Option<Arc<Mutex<Vec<u8>>>>,
    input: Option<Box<dyn BufRead>>,
}

impl Interpreter {
    /// Creates a new interpreter with an empty environment and function table
    pub fn new() -> Self {
        Interpreter { env: Environment::new(), functions: HashMap::new(), output: None, input: None }
    }

    /// Sets the output sink for `Say` statements (used for testing)
    pub fn set_output(&mut self, output: Arc<Mutex<Vec<u8>>>) {
        self.output = Some(output);
    }

    /// Sets the source of lines for `Listen to` (stdin otherwise)
    pub fn set_input(&mut self, input: Box<dyn BufRead>) {
        self.input = Some(input);
    }

    /// True once execution has reached the definition of `name`
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Runs a whole program against the top-level environment
    pub fn run(&mut self, program: &[Statement]) -> Result<(), RuntimeError> {
        info!("running program of {} top-level statements", program.len());
        let mut env = std::mem::take(&mut self.env);
        let result = self.eval_statements(program, &mut env);
        self.env = env;
        result?;
        info!("program finished with {} variables", self.env.len());
        Ok(())
    }

    /// Evaluates statements in order, stopping at the first `Give back`
    fn eval_statements(&mut self, statements: &[Statement], env: &mut Environment) -> Result<Flow, RuntimeError> {
        for statement in statements {
            if let Flow::Return(value) = self.eval_statement(statement, env)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Next)
    }

    fn eval_statement(&mut self, statement: &Statement, env: &mut Environment) -> Result<Flow, RuntimeError> {
        match statement {
            Statement::Assignment { variable, value } => {
                let value = self.eval_expression(value, env)?;
                env.set(variable.clone(), value);
            }
            Statement::Output(expr) => {
                let value = self.eval_expression(expr, env)?;
                self.write_output(&value.to_string())?;
            }
            Statement::Input(variable) => {
                let line = self.read_input()?.ok_or_else(|| RuntimeError::EndOfInput(variable.clone()))?;
                env.set(variable.clone(), Value::Str(line));
            }
            Statement::If { condition, then_block } => {
                if self.eval_expression(condition, env)?.is_truthy() {
                    return self.eval_statements(then_block, env);
                }
            }
            Statement::Loop { is_while, condition, body } => {
                let expected = Value::Bool(*is_while);
                while self.eval_expression(condition, env)?.loose_eq(&expected) {
                    if let Flow::Return(value) = self.eval_statements(body, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }
            Statement::Turn { direction, variable } => {
                let current = env
                    .get(variable)
                    .ok_or_else(|| RuntimeError::UndefinedVariable(variable.clone()))?;
                let turned = current.turned(*direction).ok_or_else(|| RuntimeError::InvalidTurn {
                    variable: variable.clone(),
                    value: current.describe(),
                })?;
                env.set(variable.clone(), turned);
            }
            Statement::FunctionDef { name, params, body } => {
                debug!("registering function '{}' with {} params", name, params.len());
                let function = Function { params: params.clone(), body: body.clone() };
                self.functions.insert(name.clone(), Rc::new(function));
            }
            Statement::Return(expr) => {
                return Ok(Flow::Return(self.eval_expression(expr, env)?));
            }
            Statement::End => {}
        }
        Ok(Flow::Next)
    }

    /// Evaluates an expression strictly left to right with no precedence
    fn eval_expression(&mut self, expr: &Expression, env: &mut Environment) -> Result<Value, RuntimeError> {
        let mut items = expr.items.iter();

        let mut left = match items.next() {
            Some(ExprItem::Evalable(evalable)) => self.eval_evalable(evalable, env)?,
            Some(ExprItem::Operator(op)) => {
                return Err(RuntimeError::MalformedExpression(format!(
                    "expected a value but found operator '{}'",
                    op
                )));
            }
            None => return Err(RuntimeError::MalformedExpression("empty expression".to_string())),
        };

        while let Some(item) = items.next() {
            let ExprItem::Operator(op) = item else {
                return Err(RuntimeError::MalformedExpression(
                    "expected an operator between two values".to_string(),
                ));
            };
            let right = match items.next() {
                Some(ExprItem::Evalable(evalable)) => self.eval_evalable(evalable, env)?,
                _ => {
                    return Err(RuntimeError::MalformedExpression(format!(
                        "operator '{}' is missing its right-hand value",
                        op
                    )));
                }
            };
            left = left.apply(*op, &right)?;
        }

        Ok(left)
    }

    fn eval_evalable(&mut self, evalable: &Evalable, env: &mut Environment) -> Result<Value, RuntimeError> {
        match evalable {
            Evalable::Constant(literal) => Ok(Value::from(literal)),
            Evalable::Variable(name) => {
                env.get(name).cloned().ok_or_else(|| RuntimeError::UndefinedVariable(name.clone()))
            }
            Evalable::Call { name, args } => self.call_function(name, args, env),
        }
    }

    /// Calls a registered function.
    ///
    /// Arguments are evaluated in the caller's environment and bound to the
    /// parameters in order; extra arguments are ignored and missing ones stay
    /// unbound. A body that ends without `Give back` yields `Value::Null`.
    fn call_function(&mut self, name: &str, args: &[Expression], env: &mut Environment) -> Result<Value, RuntimeError> {
        let function = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownFunction(name.to_string()))?;
        debug!("calling function '{}' with {} args", name, args.len());

        let mut locals = Environment::new();
        for (param, arg) in function.params.iter().zip(args) {
            let value = self.eval_expression(arg, env)?;
            locals.set(param.clone(), value);
        }

        match self.eval_statements(&function.body, &mut locals)? {
            Flow::Return(value) => Ok(value),
            Flow::Next => Ok(Value::Null),
        }
    }

    /// Helper to write output to either the output buffer or stdout
    fn write_output(&self, msg: &str) -> Result<(), RuntimeError> {
        if let Some(out) = &self.output {
            let mut buffer = out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            writeln!(buffer, "{}", msg)?;
        } else {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", msg)?;
            handle.flush()?;
        }
        Ok(())
    }

    /// Reads one line without its line ending; `None` at end of input
    fn read_input(&mut self) -> Result<Option<String>, RuntimeError> {
        let mut line = String::new();
        let read = match self.input.as_mut() {
            Some(input) => input.read_line(&mut line)?,
            None => std::io::stdin().lock().read_line(&mut line)?,
        };
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(Some(trimmed.to_string()))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
