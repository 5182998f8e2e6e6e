// File: src/main.rs
//
// Main entry point for the Rockstar interpreter.
// Handles command-line argument parsing and dispatches to the appropriate
// subcommand (run, check, or test).

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use colored::Colorize;
use rockstar::errors::SyntaxError;
use rockstar::interpreter::{Environment, Interpreter, SnapshotRunner};
use rockstar::parser::parse_source;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(
    name = "rockstar",
    about = "Rockstar: programs that read like power ballads",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    /// Log interpreter internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a Rockstar program
    Run {
        /// Path to the .rock file
        file: PathBuf,

        /// Print the parsed statement tree before running
        #[arg(long)]
        ast: bool,

        /// How to report the final top-level variables
        #[arg(long, value_enum, default_value_t = StateFormat::Text)]
        state: StateFormat,
    },

    /// Parse a program and report syntax errors without running it
    Check {
        /// Path to the .rock file
        file: PathBuf,
    },

    /// Run every .rock program in a directory against its .out snapshot
    Test {
        /// Directory holding the programs
        #[arg(default_value = "tests/programs")]
        dir: PathBuf,

        /// Regenerate all .out files based on actual output
        #[arg(long)]
        update: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StateFormat {
    Text,
    Json,
    None,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let code = match cli.command {
        Commands::Run { file, ast, state } => run(&file, ast, state),
        Commands::Check { file } => check(&file),
        Commands::Test { dir, update } => test(&dir, update),
    };
    process::exit(code);
}

fn read_source(file: &Path) -> Result<String, i32> {
    fs::read_to_string(file).map_err(|err| {
        eprintln!("{} cannot read {}: {}", "Error:".red().bold(), file.display(), err);
        1
    })
}

fn report_syntax_errors(errors: &[SyntaxError]) {
    for err in errors {
        eprintln!("{}", err);
    }
    eprintln!("{}", "Failed to parse input file".red().bold());
}

fn run(file: &Path, show_ast: bool, state: StateFormat) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let program = match parse_source(&source, &file.to_string_lossy()) {
        Ok(program) => program,
        Err(errors) => {
            report_syntax_errors(&errors);
            return 1;
        }
    };

    if show_ast {
        println!("{:#?}", program);
    }

    let mut interpreter = Interpreter::new();
    if let Err(err) = interpreter.run(&program) {
        eprintln!("{}: {}", "Runtime Error".red().bold(), err.to_string().bold());
        return 1;
    }

    report_state(&interpreter.env, state)
}

fn report_state(env: &Environment, format: StateFormat) -> i32 {
    match format {
        StateFormat::None => {}
        StateFormat::Text => {
            println!("{}", "-------------------".bright_blue());
            for (name, value) in env.snapshot() {
                println!("{} = {}", name.bright_cyan(), value.describe());
            }
        }
        StateFormat::Json => match serde_json::to_string_pretty(&env.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("{} cannot serialize state: {}", "Error:".red().bold(), err);
                return 1;
            }
        },
    }
    0
}

fn check(file: &Path) -> i32 {
    let source = match read_source(file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    match parse_source(&source, &file.to_string_lossy()) {
        Ok(program) => {
            println!("{} {} ({} top-level statements)", "[✓]".green(), file.display(), program.len());
            0
        }
        Err(errors) => {
            report_syntax_errors(&errors);
            1
        }
    }
}

fn test(dir: &Path, update: bool) -> i32 {
    let runner = SnapshotRunner::new(dir, update);
    let report = match runner.run_all() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("[!] Failed to read test directory {}: {}", dir.display(), err);
            return 1;
        }
    };

    for result in &report.results {
        if result.passed {
            println!("{} {} ({:.2?})", "[✓]".green(), result.path.display(), result.duration);
        } else {
            println!("{} {}", "[✗]".red(), result.path.display());
            println!("Expected:\n{}\nGot:\n{}\n", result.expected, result.actual);
        }
    }

    println!("\n[✓] Passed {}/{} tests", report.passed(), report.total());
    if report.all_passed() {
        0
    } else {
        1
    }
}
