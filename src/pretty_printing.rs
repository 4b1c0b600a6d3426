//! Terminal presentation of rendered expressions: compact spacing, colored
//! parentheses and highlighting of what changed between two steps.
//!
//! Nothing here changes the meaning of a rendered term; these functions only
//! post-process the canonical string produced by the box-tree AST.

use lazy_static::lazy_static;
use regex::Regex;

use crate::box_tree_impl::box_tree_ast::ExprNode;
use crate::box_tree_impl::box_tree_execution::StepKind;

/// Start of an ANSI control sequence.
pub const ESC: &str = "\x1b[";

/// Resets all ANSI attributes.
pub const RESET: &str = "\x1b[0m";

/// Foreground color used to highlight changed text.
pub const HIGHLIGHT: &str = "\x1b[38;2;255;255;0m";

lazy_static! {
    static ref ANSI_SGR_REGEX: Regex =
        Regex::new(r"\x1b\[[0-9;]*m").expect("Unable to compile ANSI SGR regex.");
}

/// Options controlling how expressions are shown to the user.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DisplayConfig {
    /// Drop every space from rendered terms.
    pub compact: bool,
    /// Color parentheses by nesting depth.
    pub color_parens: bool,
    /// Highlight the part of a term that changed since the previous step.
    pub color_diff: bool,
    /// Label each step with `(β)` or `(δ)`.
    pub show_step_type: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        return DisplayConfig {
            compact: true,
            color_parens: true,
            color_diff: false,
            show_step_type: true,
        };
    }
}

/// Removes all spaces from `s` when `compact` is set.
pub fn strip_spaces(s: &str, compact: bool) -> String {
    if compact {
        return s.replace(' ', "");
    }
    return String::from(s);
}

/// ANSI sequence selecting a 24-bit foreground color.
pub fn rgb(r: u8, g: u8, b: u8) -> String {
    return format!("{}38;2;{};{};{}m", ESC, r, g, b);
}

/// Removes ANSI SGR sequences from `s`.
pub fn strip_ansi(s: &str) -> String {
    return ANSI_SGR_REGEX.replace_all(s, "").into_owned();
}

/// Colors one parenthesis. Depth 1 is teal and the deepest level is cyan, with
/// the levels in between interpolated.
pub fn paren_color(depth: usize, max_depth: usize, paren: char) -> String {
    let ratio = if max_depth > 1 {
        depth.saturating_sub(1) as f64 / (max_depth - 1) as f64
    } else {
        0.0
    };

    let channel = (128.0 * (1.0 - ratio) + 255.0 * ratio) as u8;

    return format!("{}{}{}", rgb(0, channel, channel), paren, RESET);
}

/// Colors every parenthesis in `s` by its nesting depth.
pub fn color_parens(s: &str) -> String {
    let mut depth: usize = 0;
    let mut max_depth: usize = 0;

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut out = String::with_capacity(s.len());
    depth = 0;

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                out.push_str(&paren_color(depth, max_depth, c));
            }
            ')' => {
                out.push_str(&paren_color(depth, max_depth, c));
                depth = depth.saturating_sub(1);
            }
            _ => out.push(c),
        }
    }

    return out;
}

/// Highlights the part of `new` that differs from `old`.
///
/// Both strings are compared without their ANSI sequences; the longest common
/// prefix and suffix are left plain and the middle is wrapped in `HIGHLIGHT`.
/// The result carries no other coloring.
pub fn highlight_diff(old: &str, new: &str) -> String {
    let old_chars: Vec<char> = strip_ansi(old).chars().collect();
    let new_chars: Vec<char> = strip_ansi(new).chars().collect();

    if old_chars == new_chars {
        return new_chars.into_iter().collect();
    }

    let shared_len = old_chars.len().min(new_chars.len());

    let prefix_len = (0..shared_len)
        .find(|&k| old_chars[k] != new_chars[k])
        .unwrap_or(shared_len);

    let suffix_len = (0..shared_len - prefix_len)
        .find(|&k| old_chars[old_chars.len() - 1 - k] != new_chars[new_chars.len() - 1 - k])
        .unwrap_or(shared_len - prefix_len);

    let changed_end = new_chars.len() - suffix_len;

    let mut out = String::new();
    out.extend(&new_chars[..prefix_len]);
    out.push_str(HIGHLIGHT);
    out.extend(&new_chars[prefix_len..changed_end]);
    out.push_str(RESET);
    out.extend(&new_chars[changed_end..]);

    return out;
}

/// Renders `expr_node` for the terminal according to `config`.
pub fn format_expr(expr_node: &ExprNode, config: &DisplayConfig) -> String {
    let rendered = strip_spaces(&expr_node.render(), config.compact);

    if config.color_parens {
        return color_parens(&rendered);
    }
    return rendered;
}

/// The `" (β)"` style suffix for a step, or nothing when labels are hidden.
pub fn step_label(step_kind: StepKind, config: &DisplayConfig) -> String {
    if config.show_step_type {
        return format!(" ({})", step_kind);
    }
    return String::new();
}
