// File: src/parser.rs
//
// Line parser for the Rockstar language.
// Turns one source line at a time into a single flat statement.
//
// The parser is a family of small lookahead parsers over a token slice. Each
// `try_parse_*` function either consumes a prefix of the tokens and returns
// what it recognised together with the remaining tokens, or returns `None`
// and leaves the caller's slice untouched. The line parser dispatches on the
// leading keyword and fails with a `SyntaxError` when a line does not fit.
//
// Pronouns refer to the most recently parsed variable name. That memory lives
// in the `Parser` value and is carried from line to line for a whole source
// file, including through nested sub-parses such as call arguments.

use crate::ast::{Direction, Evalable, ExprItem, Expression, Literal, Operator, Statement};
use crate::errors::{SourceLocation, SyntaxError};
use crate::lexer::tokenize;
use crate::treeify::{treeify_program, ParsedLine};
use log::debug;

const PRONOUNS: &[&str] = &[
    "it", "he", "she", "him", "her", "they", "them", "ze", "hir", "zie", "zir", "xe", "xem", "ve",
    "ver",
];
const DETERMINERS: &[&str] = &["a", "an", "the", "my", "your"];
const NULL_WORDS: &[&str] = &["null", "nothing", "nowhere", "nobody", "empty", "gone"];
const TRUE_WORDS: &[&str] = &["true", "right", "yes", "ok", "truth"];
const FALSE_WORDS: &[&str] = &["false", "wrong", "no", "lies"];
const ASSIGNMENT_WORDS: &[&str] = &["be", "is", "are", "was", "were"];
const OUTPUT_WORDS: &[&str] = &["say", "shout", "whisper", "scream"];
const SAYS_WORDS: &[&str] = &["says", "shouts", "screams", "whispers"];
const ARGUMENT_SEPARATORS: &[&str] = &[",", "and", "n"];

/// Parser state that outlives a single line
#[derive(Debug, Default)]
pub struct Parser {
    last_variable: Option<String>,
}

impl Parser {
    pub fn new() -> Self {
        Parser { last_variable: None }
    }

    /// The variable a pronoun would currently resolve to
    pub fn last_variable(&self) -> Option<&str> {
        self.last_variable.as_deref()
    }

    /// Tries to read a variable name from the front of the tokens.
    ///
    /// Resolution order: pronoun, determiner + lowercase word ("my heart"
    /// becomes `my#heart`), a run of title-case words ("Dr Feel Good" becomes
    /// `dr_feel_good`), then a single lowercase word. Every match is
    /// remembered for later pronouns.
    pub fn try_parse_variable_name<'t>(
        &mut self,
        tokens: &'t [String],
    ) -> Option<(String, &'t [String])> {
        let first = tokens.first()?;

        let (name, rest) = if is_pronoun(first) {
            (self.last_variable.clone()?, &tokens[1..])
        } else if let Some(word) =
            tokens.get(1).filter(|word| is_determiner(first) && is_simple_variable(word))
        {
            (format!("{}#{}", first, word), &tokens[2..])
        } else if is_proper_variable(first) {
            let count = tokens.iter().take_while(|t| is_proper_variable(t)).count();
            (tokens[..count].join("_"), &tokens[count..])
        } else if is_simple_variable(first) {
            (first.clone(), &tokens[1..])
        } else {
            return None;
        };

        let name = name.to_lowercase();
        self.last_variable = Some(name.clone());
        Some((name, rest))
    }

    /// Parses the tokens as one expression, consuming all of them.
    ///
    /// `NAME taking ARGS` turns the rest of the tokens into a function call
    /// whose arguments are separated by `,`, `and` or `n`. Tokens that are not
    /// an operator, literal or variable are skipped.
    pub fn try_parse_expression(&mut self, tokens: &[String]) -> Expression {
        let mut items = Vec::new();
        let mut rest = tokens;

        while !rest.is_empty() {
            if rest.len() > 1 && rest[1] == "taking" {
                let name = rest[0].clone();
                let mut args = Vec::new();
                for chunk in split_arguments(&rest[2..]) {
                    let arg = self.try_parse_expression(chunk);
                    if !arg.is_empty() {
                        args.push(arg);
                    }
                }
                items.push(ExprItem::Evalable(Evalable::Call { name, args }));
                break;
            }
            if let Some((op, tail)) = try_parse_operator(rest) {
                items.push(ExprItem::Operator(op));
                rest = tail;
                continue;
            }
            if let Some((literal, tail)) = try_parse_string_literal(rest) {
                items.push(ExprItem::Evalable(Evalable::Constant(literal)));
                rest = tail;
                continue;
            }
            if let Some((literal, tail)) = try_parse_numeric_constant(rest) {
                items.push(ExprItem::Evalable(Evalable::Constant(literal)));
                rest = tail;
                continue;
            }
            if let Some((name, tail)) = self.try_parse_variable_name(rest) {
                items.push(ExprItem::Evalable(Evalable::Variable(name)));
                rest = tail;
                continue;
            }
            debug!("skipping unrecognized token {:?}", rest[0]);
            rest = &rest[1..];
        }

        Expression::new(items)
    }

    /// Parses a single raw source line into one flat statement.
    ///
    /// Blank lines become `Statement::End`. Block headers come back with an
    /// empty block for the treeifier to fill.
    pub fn parse_line(&mut self, source: &str) -> Result<Statement, SyntaxError> {
        let line = preprocess(source)?;
        let tokens = tokenize(&line);
        let tokens: &[String] = &tokens;

        let Some(first) = tokens.first() else {
            return Ok(Statement::End);
        };

        if OUTPUT_WORDS.contains(&first.to_lowercase().as_str()) {
            let value = self.parse_required_expression(&tokens[1..], "after output command")?;
            return Ok(Statement::Output(value));
        }
        if first.to_lowercase() == "listen" && tokens.get(1).is_some_and(|t| t == "to") {
            return self.parse_input(&tokens[2..]);
        }

        match first.as_str() {
            "Put" => self.parse_put(&tokens[1..]),
            "Let" => self.parse_let(&tokens[1..]),
            "If" => {
                let condition = self.parse_required_expression(&tokens[1..], "after \"If\"")?;
                Ok(Statement::If { condition, then_block: Vec::new() })
            }
            "Until" => self.parse_loop(false, &tokens[1..]),
            "While" => self.parse_loop(true, &tokens[1..]),
            "Turn" => self.parse_turn(&tokens[1..]),
            _ if tokens.get(1).is_some_and(|t| t == "takes") => {
                self.parse_function_def(first, &tokens[2..])
            }
            "Give" => self.parse_return(&tokens[1..]),
            _ => self.parse_poetic_assignment(tokens, source),
        }
    }

    fn parse_required_expression(
        &mut self,
        tokens: &[String],
        context: &str,
    ) -> Result<Expression, SyntaxError> {
        let expr = self.try_parse_expression(tokens);
        if expr.is_empty() {
            return Err(SyntaxError::new(format!("Expected expression {}", context)));
        }
        Ok(expr)
    }

    fn parse_input(&mut self, tokens: &[String]) -> Result<Statement, SyntaxError> {
        let (variable, rest) = self
            .try_parse_variable_name(tokens)
            .ok_or_else(|| SyntaxError::new("Expected variable after \"Listen to\""))?;
        expect_end_of_line(rest)?;
        Ok(Statement::Input(variable))
    }

    /// Put EXPR into VAR
    fn parse_put(&mut self, tokens: &[String]) -> Result<Statement, SyntaxError> {
        let into = tokens
            .iter()
            .position(|t| t == "into")
            .ok_or_else(|| SyntaxError::new("Expected \"into\" in assignment"))?;
        let value = self.parse_required_expression(&tokens[..into], "in assignment")?;
        let (variable, rest) = self
            .try_parse_variable_name(&tokens[into + 1..])
            .ok_or_else(|| SyntaxError::new("Expected variable in assignment"))?;
        expect_end_of_line(rest)?;
        Ok(Statement::Assignment { variable, value })
    }

    /// Let VAR be EXPR
    fn parse_let(&mut self, tokens: &[String]) -> Result<Statement, SyntaxError> {
        let (variable, rest) = self
            .try_parse_variable_name(tokens)
            .ok_or_else(|| SyntaxError::new("Expected variable in assignment"))?;
        match rest.first() {
            Some(word) if ASSIGNMENT_WORDS.contains(&word.as_str()) => {}
            _ => return Err(SyntaxError::new("Expected \"be\" after variable in assignment")),
        }
        let value = self.parse_required_expression(&rest[1..], "in assignment")?;
        Ok(Statement::Assignment { variable, value })
    }

    fn parse_loop(&mut self, is_while: bool, tokens: &[String]) -> Result<Statement, SyntaxError> {
        let keyword = if is_while { "While" } else { "Until" };
        let condition =
            self.parse_required_expression(tokens, &format!("after \"{}\"", keyword))?;
        Ok(Statement::Loop { is_while, condition, body: Vec::new() })
    }

    /// Turn up VAR, or Turn VAR up
    fn parse_turn(&mut self, tokens: &[String]) -> Result<Statement, SyntaxError> {
        let missing_direction = || SyntaxError::new("Expected \"up\" or \"down\" for turn statement");
        let missing_variable = || SyntaxError::new("Expected variable in turn statement");

        let (direction, variable, rest) = if let Some(direction) = tokens.first().and_then(|t| parse_direction(t)) {
            let (variable, rest) =
                self.try_parse_variable_name(&tokens[1..]).ok_or_else(missing_variable)?;
            (direction, variable, rest)
        } else {
            let (variable, rest) =
                self.try_parse_variable_name(tokens).ok_or_else(missing_variable)?;
            let direction =
                rest.first().and_then(|t| parse_direction(t)).ok_or_else(missing_direction)?;
            (direction, variable, &rest[1..])
        };

        expect_end_of_line(rest)?;
        Ok(Statement::Turn { direction, variable })
    }

    /// NAME takes ARG, ARG and ARG
    fn parse_function_def(&mut self, name: &str, tokens: &[String]) -> Result<Statement, SyntaxError> {
        let mut params = Vec::new();
        let mut rest = tokens;

        while !rest.is_empty() {
            let (param, tail) = self
                .try_parse_variable_name(rest)
                .ok_or_else(|| SyntaxError::new("Failed to read argument list"))?;
            params.push(param);
            rest = tail;

            match rest.first() {
                Some(sep) if ARGUMENT_SEPARATORS.contains(&sep.as_str()) => {
                    rest = &rest[1..];
                    if rest.first().is_some_and(|t| t == "and") {
                        rest = &rest[1..];
                    }
                }
                Some(_) => {
                    return Err(SyntaxError::new(format!("Invalid syntax for function {}", name)));
                }
                None => {}
            }
        }

        Ok(Statement::FunctionDef { name: name.to_string(), params, body: Vec::new() })
    }

    /// Give back EXPR
    fn parse_return(&mut self, tokens: &[String]) -> Result<Statement, SyntaxError> {
        if tokens.first().map(String::as_str) != Some("back") {
            return Err(SyntaxError::new("Invalid \"Give back\" statement"));
        }
        let value = self.parse_required_expression(&tokens[1..], "in \"Give back\" statement")?;
        Ok(Statement::Return(value))
    }

    /// VAR is <poetic literal>, or VAR says <rest of line>
    fn parse_poetic_assignment(
        &mut self,
        tokens: &[String],
        source: &str,
    ) -> Result<Statement, SyntaxError> {
        let cannot_parse = || SyntaxError::new("Cannot parse line");
        let (variable, rest) = self.try_parse_variable_name(tokens).ok_or_else(cannot_parse)?;
        let keyword = rest.first().ok_or_else(cannot_parse)?;

        let literal = if ASSIGNMENT_WORDS.contains(&keyword.as_str()) {
            let words = &rest[1..];
            let constant = match words {
                [_] => try_parse_string_literal(words)
                    .or_else(|| try_parse_numeric_constant(words))
                    .map(|(literal, _)| literal),
                _ => None,
            };
            constant.unwrap_or_else(|| parse_poetic_number_literal(words))
        } else if SAYS_WORDS.contains(&keyword.as_str()) {
            // Taken from the raw line so spacing and punctuation survive. The
            // variable may itself contain the keyword as a word; skip those.
            let earlier = tokens[..tokens.len() - rest.len()].iter().filter(|t| *t == keyword).count();
            let start = find_word(source, keyword, earlier).ok_or_else(cannot_parse)? + keyword.len();
            Literal::Str(source[start..].chars().skip(1).collect())
        } else {
            return Err(cannot_parse());
        };

        Ok(Statement::Assignment { variable, value: Expression::constant(literal) })
    }
}

/// Tries to read an operator phrase of one to five words.
///
/// Comparison phrases starting with "is" are tried before plain "is", and a
/// phrase only matches when something follows it.
pub fn try_parse_operator(tokens: &[String]) -> Option<(Operator, &[String])> {
    let (op, used) = match tokens.first()?.as_str() {
        "plus" | "with" => (Operator::Add, 1),
        "minus" | "without" => (Operator::Sub, 1),
        "times" | "of" => (Operator::Mul, 1),
        "over" => (Operator::Div, 1),
        "isnt" | "aint" => (Operator::Neq, 1),
        "is" => match_comparison(tokens),
        _ => return None,
    };
    Some((op, &tokens[used..]))
}

fn match_comparison(tokens: &[String]) -> (Operator, usize) {
    let word = |i: usize| tokens.get(i).map(String::as_str).unwrap_or("");

    if tokens.len() > 2 && word(1) == "not" {
        return (Operator::Neq, 2);
    }
    if tokens.len() > 3 && matches!(word(2), "then" | "than") {
        match word(1) {
            "higher" | "greater" | "bigger" | "stronger" => return (Operator::Gt, 3),
            "lower" | "less" | "smaller" | "weaker" => return (Operator::Lt, 3),
            _ => {}
        }
    }
    if tokens.len() > 4 && word(1) == "as" && word(3) == "as" {
        match word(2) {
            "high" | "great" | "big" | "strong" => return (Operator::Geq, 4),
            "low" | "little" | "small" | "weak" => return (Operator::Leq, 4),
            _ => {}
        }
    }
    (Operator::Eq, 1)
}

/// A quoted token becomes a string constant, quotes removed
pub fn try_parse_string_literal(tokens: &[String]) -> Option<(Literal, &[String])> {
    let token = tokens.first()?;
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        let contents = token[1..token.len() - 1].to_string();
        return Some((Literal::Str(contents), &tokens[1..]));
    }
    None
}

/// Nothing-words (as 0), yes/no-words, integers and decimal numbers
pub fn try_parse_numeric_constant(tokens: &[String]) -> Option<(Literal, &[String])> {
    let token = tokens.first()?.as_str();
    let literal = if NULL_WORDS.contains(&token) {
        Literal::Int(0)
    } else if TRUE_WORDS.contains(&token) {
        Literal::Bool(true)
    } else if FALSE_WORDS.contains(&token) {
        Literal::Bool(false)
    } else if let Ok(n) = token.parse::<i64>() {
        Literal::Int(n)
    } else if is_decimal(token) {
        Literal::Float(token.parse().ok()?)
    } else {
        return None;
    };
    Some((literal, &tokens[1..]))
}

fn is_decimal(token: &str) -> bool {
    let digits = token.trim_start_matches(['-', '+']);
    digits.contains('.')
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Reads words as digits: each word's letter count modulo 10.
///
/// The word containing a `.` is the last digit of the integer part; every word
/// after it adds one decimal place.
pub fn parse_poetic_number_literal(tokens: &[String]) -> Literal {
    let mut integer = String::new();
    let mut fraction = String::new();
    let mut in_fraction = false;

    for token in tokens {
        let digit = poetic_digit(token);
        if in_fraction {
            fraction.push(digit);
        } else {
            integer.push(digit);
            in_fraction = token.contains('.');
        }
    }

    if integer.is_empty() {
        return Literal::Int(0);
    }
    if fraction.is_empty() {
        return integer
            .parse::<i64>()
            .map(Literal::Int)
            .unwrap_or_else(|_| Literal::Float(integer.parse().unwrap_or_default()));
    }
    Literal::Float(format!("{}.{}", integer, fraction).parse().unwrap_or_default())
}

fn poetic_digit(token: &str) -> char {
    let letters = token.chars().filter(|c| c.is_alphabetic() || *c == '-').count();
    char::from(b'0' + (letters % 10) as u8)
}

/// Splits call arguments on `,`, `and` or `n`; ", and" counts as one separator
fn split_arguments(tokens: &[String]) -> Vec<&[String]> {
    let mut chunks = Vec::new();
    let mut rest = tokens;

    while !rest.is_empty() {
        let end = rest
            .iter()
            .position(|t| ARGUMENT_SEPARATORS.contains(&t.as_str()))
            .unwrap_or(rest.len());
        chunks.push(&rest[..end]);
        rest = &rest[end..];
        if !rest.is_empty() {
            rest = &rest[1..];
            if rest.first().is_some_and(|t| t == "and") {
                rest = &rest[1..];
            }
        }
    }
    chunks
}

/// Byte offset of the `nth` occurrence of `word` standing alone between
/// whitespace (or the line ends)
fn find_word(source: &str, word: &str, nth: usize) -> Option<usize> {
    source
        .match_indices(word)
        .map(|(start, _)| start)
        .filter(|&start| {
            let before = source[..start].chars().next_back();
            let after = source[start + word.len()..].chars().next();
            before.map_or(true, char::is_whitespace) && after.map_or(true, char::is_whitespace)
        })
        .nth(nth)
}

fn parse_direction(token: &str) -> Option<Direction> {
    match token {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        _ => None,
    }
}

fn expect_end_of_line(rest: &[String]) -> Result<(), SyntaxError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(SyntaxError::new("Unexpected tokens at end of line"))
    }
}

/// Rejects lowercase starts, strips one parenthesized comment and rewrites
/// possessives so "Tommy's" reads as "Tommy is"
fn preprocess(source: &str) -> Result<String, SyntaxError> {
    if source.chars().next().is_some_and(char::is_lowercase) {
        return Err(SyntaxError::new("Cannot start a statement with a lowercase letter"));
    }

    let mut line = source.to_string();
    match (line.find('('), line.find(')')) {
        (None, None) => {}
        (Some(start), Some(end)) if start < end => line.replace_range(start..=end, ""),
        _ => return Err(SyntaxError::new("Invalid comment")),
    }

    Ok(line.replace("'s ", " is ").replace('\'', ""))
}

fn is_pronoun(token: &str) -> bool {
    PRONOUNS.contains(&token.to_lowercase().as_str())
}

fn is_determiner(token: &str) -> bool {
    DETERMINERS.contains(&token.to_lowercase().as_str())
}

fn is_simple_variable(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(char::is_uppercase)
}

fn is_proper_variable(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next().is_some_and(char::is_uppercase) && !chars.any(char::is_uppercase)
}

/// Parses a whole source file into a nested statement tree.
///
/// Every line is parsed even after a failure so that all syntax errors are
/// reported together; any error means no tree is produced.
pub fn parse_source(source: &str, file_name: &str) -> Result<Vec<Statement>, Vec<SyntaxError>> {
    let mut parser = Parser::new();
    let mut lines = Vec::new();
    let mut errors = Vec::new();

    for (number, text) in source.split('\n').enumerate() {
        let text = text.strip_suffix('\r').unwrap_or(text);
        match parser.parse_line(text) {
            Ok(statement) => {
                debug!("line {}: {:?}", number, statement);
                lines.push(ParsedLine { number, source: text.to_string(), statement });
            }
            Err(err) => {
                errors.push(err.with_location(SourceLocation::new(file_name, number)).with_source(text));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    treeify_program(lines).map_err(|err| {
        let line = err.location.line;
        vec![err.with_location(SourceLocation::new(file_name, line))]
    })
}
