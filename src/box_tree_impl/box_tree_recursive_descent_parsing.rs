//! Recursive descent parser that constructs lambda-calculus expressions in the
//! box-tree representation directly from source text.
//!
//! Grammar:
//!
//! ```text
//! expr := abs | app
//! abs  := LAMBDA varname '.' expr
//! app  := atom atom*
//! atom := '(' expr ')' | digits | varname
//! ```
//!
//! Every rule takes the source characters and a start index, and returns the
//! parsed node together with the index just past it. Positions reported in
//! errors are character offsets.

use thiserror::Error;

use crate::box_tree_impl::box_tree_ast::{church_numeral, ExprNode, LAMBDA};

/// Largest numeral literal accepted. A Church numeral holds one node per unit,
/// so larger literals would exhaust memory rather than fail cleanly.
pub const MAX_NUMERAL: u64 = 1_000_000;

/// Represents a parsing error.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("{message} at position {position}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

impl ParseError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        return ParseError {
            position,
            message: message.into(),
        };
    }

    // Error for an unexpected character (or end of input) at start_idx.
    fn unexpected(chars: &[char], start_idx: usize) -> Self {
        match chars.get(start_idx) {
            Some(c) => return ParseError::new(start_idx, format!("Unexpected '{}'", c)),
            None => return ParseError::new(start_idx, "Unexpected end of input"),
        }
    }
}

fn is_lambda(c: char) -> bool {
    return c == LAMBDA;
}

/// Whether `c` may appear in a variable name. Anything other than
/// whitespace, parentheses, `.` and `λ` is allowed, including `\`.
pub fn is_var_name_char(c: char) -> bool {
    return !(c.is_whitespace() || c == '(' || c == ')' || c == '.' || is_lambda(c));
}

fn skip_whitespace(chars: &[char], mut start_idx: usize) -> usize {
    while start_idx < chars.len() && chars[start_idx].is_whitespace() {
        start_idx += 1;
    }

    return start_idx;
}

/// Tries to consume exactly the character `expected` at chars[start_idx].
fn try_char(
    chars: &[char],
    start_idx: usize,
    expected: char,
    message: &str,
) -> Result<usize, ParseError> {
    match chars.get(start_idx) {
        Some(c) if *c == expected => return Ok(start_idx + 1),
        Some(c) => {
            return Err(ParseError::new(
                start_idx,
                format!("{}, found '{}'", message, c),
            ))
        }
        None => {
            return Err(ParseError::new(
                start_idx,
                format!("{}, found end of input", message),
            ))
        }
    }
}

/// Tries to parse a maximal run of variable name characters.
fn try_var_name_rule(chars: &[char], start_idx: usize) -> Result<(String, usize), ParseError> {
    let mut end_idx = start_idx;

    while end_idx < chars.len() && is_var_name_char(chars[end_idx]) {
        end_idx += 1;
    }

    if end_idx == start_idx {
        return Err(match chars.get(start_idx) {
            Some(c) => ParseError::new(start_idx, format!("Invalid variable start '{}'", c)),
            None => ParseError::new(start_idx, "Expected a variable name, found end of input"),
        });
    }

    return Ok((chars[start_idx..end_idx].iter().collect(), end_idx));
}

/// Tries to parse a run of decimal digits and desugar it into a Church
/// numeral.
fn try_numeral_rule(chars: &[char], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    let mut end_idx = start_idx;

    while end_idx < chars.len() && chars[end_idx].is_ascii_digit() {
        end_idx += 1;
    }

    let digits: String = chars[start_idx..end_idx].iter().collect();
    let value = digits
        .parse::<u64>()
        .ok()
        .filter(|value| *value <= MAX_NUMERAL)
        .ok_or_else(|| {
            ParseError::new(
                start_idx,
                format!("Numeral '{}' is larger than {}", digits, MAX_NUMERAL),
            )
        })?;

    return Ok((church_numeral(value), end_idx));
}

/// Tries to parse an expression that looks like `λ[VARNAME].[EXPR]`.
fn try_lambda_rule(chars: &[char], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    if !chars.get(start_idx).map_or(false, |c| is_lambda(*c)) {
        return Err(ParseError::unexpected(chars, start_idx));
    }

    let start_idx = skip_whitespace(chars, start_idx + 1);
    let (formal_param, start_idx) = try_var_name_rule(chars, start_idx)?;
    let start_idx = skip_whitespace(chars, start_idx);
    let start_idx = try_char(chars, start_idx, '.', "Expected '.' after λ parameter")?;
    let (fn_body, start_idx) = try_expr_rule(chars, start_idx)?;

    return Ok((ExprNode::fn_def(formal_param, fn_body), start_idx));
}

/// Tries to parse according to the production
/// `atom -> ( e ) | digits | varname`.
fn try_atom_rule(chars: &[char], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    let start_idx = skip_whitespace(chars, start_idx);

    match chars.get(start_idx) {
        Some('(') => {
            let (expr_node, start_idx) = try_expr_rule(chars, start_idx + 1)?;
            let start_idx = skip_whitespace(chars, start_idx);
            let start_idx = try_char(chars, start_idx, ')', "Expected ')'")?;

            return Ok((expr_node, start_idx));
        }
        Some(c) if c.is_ascii_digit() => {
            return try_numeral_rule(chars, start_idx);
        }
        _ => {
            let (var_name, start_idx) = try_var_name_rule(chars, start_idx)?;
            return Ok((ExprNode::var(var_name), start_idx));
        }
    }
}

/// Tries to parse chains of function applications. Atoms are collected with a
/// loop that folds them into a left-associative application tree. The chain
/// ends at end of input, `)` or `.`; a bare λ is not an atom, so an unwrapped
/// trailing abstraction is a syntax error.
fn try_application_rule(chars: &[char], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    // Parse at least one atom.
    let (mut out_expr, start_idx) = try_atom_rule(chars, start_idx)?;
    let mut start_idx = skip_whitespace(chars, start_idx);

    loop {
        match chars.get(start_idx) {
            None | Some(')') | Some('.') => break,
            Some(_) => {
                let (next_atom, new_start_idx) = try_atom_rule(chars, start_idx)?;
                out_expr = ExprNode::fn_app(out_expr, next_atom);
                start_idx = skip_whitespace(chars, new_start_idx);
            }
        }
    }

    return Ok((out_expr, start_idx));
}

/// Tries to parse according to the production `e -> abs | app`.
fn try_expr_rule(chars: &[char], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    let start_idx = skip_whitespace(chars, start_idx);

    match chars.get(start_idx) {
        Some(c) if is_lambda(*c) => return try_lambda_rule(chars, start_idx),
        _ => return try_application_rule(chars, start_idx),
    }
}

/// Parses `source` into an expression. Fails if anything other than
/// whitespace follows a complete expression.
///
/// Parsing recurses once per parenthesis and per abstraction, so nesting depth
/// is bounded by the calling thread's stack.
pub fn parse(source: &str) -> Result<ExprNode, ParseError> {
    let chars: Vec<char> = source.chars().collect();

    let (expr_node, start_idx) = try_expr_rule(&chars, 0)?;
    let start_idx = skip_whitespace(&chars, start_idx);

    if start_idx < chars.len() {
        return Err(ParseError::unexpected(&chars, start_idx));
    }

    return Ok(expr_node);
}
