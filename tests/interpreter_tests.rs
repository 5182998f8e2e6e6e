// Integration tests for the Rockstar interpreter
//
// These tests run complete Rockstar programs through the parser and the
// interpreter and check captured output and the final top-level variables.
// Tests cover:
// - Assignment forms (Put, Let, poetic literals, says)
// - Control flow (If, While, Until, Turn)
// - Functions, recursion and the lazy function table
// - Input and output
// - Syntax and runtime error reporting

use rockstar::errors::RuntimeError;
use rockstar::interpreter::{Interpreter, SnapshotRunner, Value};
use rockstar::parser::parse_source;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

struct Run {
    interp: Interpreter,
    output: String,
    result: Result<(), RuntimeError>,
}

fn run_with_input(code: &str, input: &str) -> Run {
    let program = parse_source(code, "test.rock").expect("program should parse");
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.set_input(Box::new(Cursor::new(input.as_bytes().to_vec())));
    let result = interp.run(&program);
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    Run { interp, output, result }
}

fn run_code(code: &str) -> Run {
    run_with_input(code, "")
}

const COUNTDOWN: &str = "\
My heart is 5
While my heart is greater than nothing
Say my heart
Turn down my heart
";

#[test]
fn test_countdown_runs_exactly_five_times() {
    let run = run_code(COUNTDOWN);
    assert!(run.result.is_ok());
    assert_eq!(run.output, "5\n4\n3\n2\n1\n");
    assert_eq!(run.interp.env.get("my#heart"), Some(&Value::Int(0)));
}

#[test]
fn test_same_program_gives_same_result() {
    let first = run_code(COUNTDOWN);
    let second = run_code(COUNTDOWN);
    assert_eq!(first.output, second.output);
    assert_eq!(first.interp.env.snapshot(), second.interp.env.snapshot());
}

#[test]
fn test_until_loop_runs_while_condition_is_false() {
    let run = run_code(
        "Put 0 into the count\n\
         Until the count is 3\n\
         Put the count plus 1 into the count\n\
         Say the count\n",
    );
    assert_eq!(run.output, "1\n2\n3\n");
    assert_eq!(run.interp.env.get("the#count"), Some(&Value::Int(3)));
}

#[test]
fn test_until_countdown_with_turn_runs_five_times() {
    let run = run_code("X is 5\nUntil X is 0\nSay X\nTurn X down\n");
    assert!(run.result.is_ok());
    assert_eq!(run.output, "5\n4\n3\n2\n1\n");
    assert_eq!(run.interp.env.get("x"), Some(&Value::Int(0)));
}

#[test]
fn test_huge_string_repeat_is_a_runtime_error() {
    let run = run_code("Say \"abcd\" times 9223372036854775807\nSay \"unreached\"\n");
    assert!(matches!(run.result, Err(RuntimeError::StringTooLong { .. })));
    assert_eq!(run.output, "");
}

#[test]
fn test_function_with_two_parameters() {
    let run = run_code(
        "Midnight takes your heart and your soul\n\
         Give back your heart plus your soul\n\
         \n\
         Put Midnight taking 3, 4 into the night\n\
         Say the night\n",
    );
    assert!(run.result.is_ok());
    assert_eq!(run.output, "7\n");
    assert!(run.interp.has_function("Midnight"));
}

#[test]
fn test_call_arguments_separated_by_and() {
    let run = run_code(
        "Midnight takes your heart and your soul\n\
         Give back your heart minus your soul\n\
         \n\
         Put Midnight taking 10 and 4 into the night\n",
    );
    assert_eq!(run.interp.env.get("the#night"), Some(&Value::Int(6)));
}

#[test]
fn test_calling_before_definition_is_an_error() {
    let run = run_code(
        "Put Midnight taking 1 into the night\n\
         \n\
         Midnight takes your heart\n\
         Give back your heart\n",
    );
    assert!(matches!(
        run.result,
        Err(RuntimeError::UnknownFunction(ref name)) if name == "Midnight"
    ));
    assert!(!run.interp.env.contains("the#night"));
}

#[test]
fn test_function_without_give_back_returns_null() {
    let run = run_code(
        "Heartbreak takes my love\n\
         Put my love into my heart\n\
         \n\
         Put Heartbreak taking 1 into the void\n",
    );
    assert!(run.result.is_ok());
    assert_eq!(run.interp.env.get("the#void"), Some(&Value::Null));
    // Locals do not leak into the caller
    assert!(!run.interp.env.contains("my#heart"));
}

#[test]
fn test_recursion_and_give_back_inside_if() {
    let run = run_code(
        "Factorial takes the number\n\
         If the number is as low as 1\n\
         Give back 1\n\
         Put the number minus 1 into the smaller\n\
         Put Factorial taking the smaller into the result\n\
         Give back the number times the result\n\
         \n\
         Put Factorial taking 5 into the answer\n\
         Say the answer\n",
    );
    assert!(run.result.is_ok());
    assert_eq!(run.output, "120\n");
}

#[test]
fn test_turn_rounds_fractional_values() {
    let up = run_code("My heart is 4.2\nTurn up my heart\n");
    assert_eq!(up.interp.env.get("my#heart"), Some(&Value::Int(5)));

    let down = run_code("My heart is 4.2\nTurn my heart down\n");
    assert_eq!(down.interp.env.get("my#heart"), Some(&Value::Int(4)));
}

#[test]
fn test_turning_a_string_is_an_error() {
    let run = run_code("Put \"x\" into my heart\nTurn up my heart\n");
    assert!(matches!(run.result, Err(RuntimeError::InvalidTurn { .. })));
}

#[test]
fn test_pronouns_follow_the_last_variable() {
    let run = run_code(
        "Put 10 into my heart\n\
         Say it\n\
         Let it be it minus 4\n\
         Say my heart\n",
    );
    assert_eq!(run.output, "10\n6\n");
}

#[test]
fn test_output_keeps_statement_order() {
    let run = run_code("Say \"Rock\"\nShout \"and\"\nWhisper \"roll\"\nScream 4 over 2\n");
    assert_eq!(run.output, "Rock\nand\nroll\n2\n");
}

#[test]
fn test_expressions_evaluate_left_to_right() {
    let run = run_code("Say 2 plus 3 times 4\nPut 7 over 2 into the half\nSay the half\n");
    assert_eq!(run.output, "20\n3.5\n");
}

#[test]
fn test_poetic_literals() {
    let run = run_code(
        "Tommy was a lovestruck ladykiller\n\
         My dreams were ice. A life unfulfilled\n\
         Tommy's a rockstar\n\
         My father says Hello, world!\n\
         Say my father\n",
    );
    let env = &run.interp.env;
    assert_eq!(env.get("tommy"), Some(&Value::Int(18)));
    assert_eq!(env.get("my#dreams"), Some(&Value::Float(3.141)));
    assert_eq!(run.output, "Hello, world!\n");
}

#[test]
fn test_poetic_type_literal_assigns_constant() {
    let run = run_code("The night is gone\nThe day is right\nThe song is \"loud\"\n");
    let env = &run.interp.env;
    assert_eq!(env.get("the#night"), Some(&Value::Int(0)));
    assert_eq!(env.get("the#day"), Some(&Value::Bool(true)));
    assert_eq!(env.get("the#song"), Some(&Value::Str("loud".to_string())));
}

#[test]
fn test_if_uses_truthiness_and_blank_line_closes_block() {
    let run = run_code(
        "Put 0 into the flag\n\
         If the flag\n\
         Say \"never\"\n\
         \n\
         Say \"done\" (comments vanish)\n",
    );
    assert_eq!(run.output, "done\n");
}

#[test]
fn test_listen_reads_one_line() {
    let run = run_with_input("Listen to your name\nSay \"Hello \" plus your name\n", "Tommy\r\nGina\n");
    assert!(run.result.is_ok());
    assert_eq!(run.output, "Hello Tommy\n");
}

#[test]
fn test_listen_at_end_of_input_is_an_error() {
    let run = run_code("Listen to your name\n");
    assert!(matches!(run.result, Err(RuntimeError::EndOfInput(_))));
}

#[test]
fn test_runtime_error_stops_after_earlier_output() {
    let run = run_code("Say 1\nSay my heart\nSay 2\n");
    assert_eq!(run.output, "1\n");
    assert!(matches!(
        run.result,
        Err(RuntimeError::UndefinedVariable(ref name)) if name == "my#heart"
    ));
}

#[test]
fn test_lowercase_line_fails_the_whole_parse() {
    let errors = parse_source("Say 1\nsay 2\nSay 3", "song.rock").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location.line, 1);
    assert_eq!(errors[0].message, "Cannot start a statement with a lowercase letter");
    assert!(errors[0].plain().starts_with("say 2\n^^^^^\nsong.rock(1): SyntaxError"));
}

#[test]
fn test_every_syntax_error_is_reported() {
    let errors = parse_source("Put 1 in my heart\nSay 1\nTurn my heart sideways\n", "song.rock").unwrap_err();
    let lines: Vec<usize> = errors.iter().map(|e| e.location.line).collect();
    assert_eq!(lines, vec![0, 2]);
}

#[test]
fn test_give_back_outside_function_is_rejected() {
    let errors = parse_source("Say 1\nGive back 2\n", "song.rock").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].location.file, "song.rock");
    assert_eq!(errors[0].location.line, 1);
    assert!(errors[0].message.contains("has to be in function"));
}

#[test]
fn test_program_snapshots() {
    let runner = SnapshotRunner::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/programs"), false);
    let report = runner.run_all().expect("snapshot directory should be readable");
    assert!(report.total() > 0);
    for result in &report.results {
        assert!(
            result.passed,
            "{}\nexpected:\n{}\nactual:\n{}",
            result.path.display(),
            result.expected,
            result.actual
        );
    }
}
