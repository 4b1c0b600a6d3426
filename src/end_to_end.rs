//! Code to configure and run the interpreter on an input expression.

use std::fs;
use std::io::{self, BufRead, Write};
use std::thread;

use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};

use crate::box_tree_impl::box_tree_definitions::default_definitions;
use crate::box_tree_impl::box_tree_execution::reduction_trace;
use crate::box_tree_impl::box_tree_numerals::canonicalize_numerals;
use crate::box_tree_impl::box_tree_recursive_descent_parsing::{parse, ParseError};
use crate::pretty_printing::{format_expr, highlight_diff, step_label, DisplayConfig};

/// Prompt shown when the expression is read from standard input.
pub const PROMPT: &str = "λ-expr> ";

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// The expression to evaluate. Words are joined with single spaces. When
    /// neither this nor a source file is given, one line is read from
    /// standard input.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub expression: Vec<String>,

    /// Read the expression from this file instead.
    #[arg(short, long, conflicts_with = "expression")]
    pub src_filepath: Option<String>,

    /// Stop after this many reduction steps.
    #[arg(short, long)]
    pub max_steps: Option<usize>,

    /// Keep the spaces in printed terms.
    #[arg(long)]
    pub spaced: bool,

    /// Do not color parentheses by nesting depth.
    #[arg(long)]
    pub no_color: bool,

    /// Highlight what changed between consecutive steps.
    #[arg(long)]
    pub color_diff: bool,

    /// Do not label steps with (β) or (δ).
    #[arg(long)]
    pub hide_step_type: bool,

    /// Do not print the final term with numerals folded into digits.
    #[arg(long)]
    pub no_abstract_numerals: bool,

    /// Stack size, in MiB, of the thread that parses and reduces.
    #[arg(long, default_value_t = 256)]
    pub stack_size_mb: usize,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl InterpreterConfig {
    /// The display options selected by this config.
    pub fn display_config(&self) -> DisplayConfig {
        return DisplayConfig {
            compact: !self.spaced,
            color_parens: !self.no_color,
            color_diff: self.color_diff,
            show_step_type: !self.hide_step_type,
        };
    }
}

/// Errors that may be thrown when running the interpreter.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Interpreter configuration error: {0}")]
    ConfigError(String),

    #[error("Input error: {0}")]
    InputError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Unable to start the evaluation thread: {0}")]
    ThreadError(io::Error),

    #[error("The evaluation thread panicked")]
    EvaluationPanicked,
}

/// Gets the source text selected by the config: the expression words, the
/// source file, or a line read from standard input.
pub fn read_source(config: &InterpreterConfig) -> Result<String, RunError> {
    if let Some(src_filepath) = &config.src_filepath {
        return Ok(fs::read_to_string(src_filepath)?);
    }

    if !config.expression.is_empty() {
        return Ok(config.expression.join(" "));
    }

    let mut stdout = io::stdout();
    write!(stdout, "{}", PROMPT)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    return Ok(line);
}

/// Parses and reduces `source`, returning the step-by-step transcript.
pub fn run_source(source: &str, config: &InterpreterConfig) -> Result<String, RunError> {
    let display_config = config.display_config();
    let def_map = default_definitions();

    let trace = reduction_trace(parse(source)?, def_map, config.max_steps);
    let mut out = Vec::with_capacity(trace.steps.len() + 3);
    let mut prev: Option<String> = None;

    for step in &trace.steps {
        let formatted = format_expr(&step.expr, &display_config);

        let (label, shown) = match (step.kind, &prev) {
            (Some(step_kind), Some(prev)) => {
                let shown = if display_config.color_diff {
                    highlight_diff(prev, &formatted)
                } else {
                    formatted.clone()
                };
                (step_label(step_kind, &display_config), shown)
            }
            _ => (String::new(), formatted.clone()),
        };

        out.push(format!("Step {}{}: {}", step.index, label, shown));
        prev = Some(formatted);
    }

    let steps = trace.step_count();

    if trace.reached_normal_form {
        out.push(String::from("→ normal form reached."));
    } else {
        warn!(max_steps = steps, "step limit reached before a normal form");
        out.push(format!("→ step limit of {} reached.", steps));
    }

    info!(steps, reached_normal_form = trace.reached_normal_form, "evaluation finished");

    if !config.no_abstract_numerals {
        out.push(String::new());
        out.push(format!(
            "δ-abstracted: {}",
            format_expr(&canonicalize_numerals(trace.final_expr()), &display_config)
        ));
    }

    return Ok(out.join("\n"));
}

/// Run the interpreter (reading the input, parsing, and reduction) given an
/// interpreter config.
pub fn run_interpreter(config: &InterpreterConfig) -> Result<String, RunError> {
    let source = read_source(config)?;
    return run_source(&source, config);
}

/// Runs `run_interpreter` on a thread whose stack is `config.stack_size_mb`
/// MiB, since parsing, substitution and rendering recurse over term depth.
pub fn run_interpreter_on_large_stack(config: InterpreterConfig) -> Result<String, RunError> {
    let stack_size = config
        .stack_size_mb
        .checked_mul(1024 * 1024)
        .filter(|stack_size| *stack_size > 0)
        .ok_or_else(|| {
            RunError::ConfigError(format!(
                "Unsupported stack size of {} MiB",
                config.stack_size_mb
            ))
        })?;

    let handle = thread::Builder::new()
        .name(String::from("evaluator"))
        .stack_size(stack_size)
        .spawn(move || run_interpreter(&config))
        .map_err(RunError::ThreadError)?;

    return handle.join().map_err(|_| RunError::EvaluationPanicked)?;
}
