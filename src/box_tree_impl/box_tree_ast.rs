//! Data structures to represent lambda calculus expressions, and some utility
//! functions to display and inspect them.
//!
//! Rendering is a recursive walk over the tree, so its depth is bounded by the
//! stack of the calling thread. The interpreter binary runs evaluation on a
//! thread with an enlarged stack (see `end_to_end`) for that reason.
use std::collections::{HashMap, HashSet};

/// Symbol used when rendering abstractions.
pub const LAMBDA: char = 'λ';

/// Represents a lambda-calculus expression.
///
/// Equality and hashing are syntactic: two nodes are equal iff they have the
/// same shape and the same names at every position.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ExprNode {
    FnDef {
        formal_param: String,
        fn_body: Box<ExprNode>,
    },
    FnApp {
        fn_body: Box<ExprNode>,
        actual_arg: Box<ExprNode>,
    },
    Var {
        var_name: String,
    },
}

impl ExprNode {
    /// Creates a variable node.
    pub fn var(var_name: impl Into<String>) -> Self {
        return ExprNode::Var {
            var_name: var_name.into(),
        };
    }

    /// Creates an abstraction node binding `formal_param` in `fn_body`.
    pub fn fn_def(formal_param: impl Into<String>, fn_body: ExprNode) -> Self {
        return ExprNode::FnDef {
            formal_param: formal_param.into(),
            fn_body: Box::new(fn_body),
        };
    }

    /// Creates an application node.
    pub fn fn_app(fn_body: ExprNode, actual_arg: ExprNode) -> Self {
        return ExprNode::FnApp {
            fn_body: Box::new(fn_body),
            actual_arg: Box::new(actual_arg),
        };
    }

    /// Renders the expression in its canonical form (same as `Display`).
    pub fn render(&self) -> String {
        return expr_node_to_string(self);
    }
}

/// Builds the Church numeral for `n`: `λf.λx.f (f (... (f x)))`.
pub fn church_numeral(n: u64) -> ExprNode {
    let mut body = ExprNode::var("x");

    for _ in 0..n {
        body = ExprNode::fn_app(ExprNode::var("f"), body);
    }

    return ExprNode::fn_def("f", ExprNode::fn_def("x", body));
}

// Helper function to produce a string representation of an ExprNode.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::Var { var_name } => {
            string_so_far.push_str(var_name.as_str());
        }
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            // A function def in function position is parenthesized, otherwise
            // it would swallow the argument.
            let first_needs_parens = matches!(**fn_body, ExprNode::FnDef { .. });

            // Application associates left, so both function defs and
            // applications need parentheses in argument position.
            let second_needs_parens = matches!(
                **actual_arg,
                ExprNode::FnDef { .. } | ExprNode::FnApp { .. }
            );

            push_maybe_parenthesized(fn_body, first_needs_parens, string_so_far);
            string_so_far.push(' ');
            push_maybe_parenthesized(actual_arg, second_needs_parens, string_so_far);
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            string_so_far.push(LAMBDA);
            string_so_far.push_str(formal_param.as_str());
            string_so_far.push('.');

            let body_needs_parens = matches!(**fn_body, ExprNode::FnDef { .. });
            push_maybe_parenthesized(fn_body, body_needs_parens, string_so_far);
        }
    };
}

fn push_maybe_parenthesized(expr_node: &ExprNode, needs_parens: bool, string_so_far: &mut String) {
    if needs_parens {
        string_so_far.push('(');
        expr_node_to_string_helper(expr_node, string_so_far);
        string_so_far.push(')');
    } else {
        expr_node_to_string_helper(expr_node, string_so_far);
    }
}

/// Converts an expr node to its canonical string.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    return out_string;
}

// Display trait implementation for ExprNode using expr_node_to_string function.
impl std::fmt::Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_node_to_string(self).as_str());
    }
}

/// Drops `expr_node` one node at a time. The derived drop glue recurses once
/// per level, which overflows the stack on very deep terms.
pub fn drop_iteratively(expr_node: ExprNode) {
    let mut work_list = vec![expr_node];

    while let Some(curr_node) = work_list.pop() {
        match curr_node {
            ExprNode::FnApp {
                fn_body,
                actual_arg,
            } => {
                work_list.push(*fn_body);
                work_list.push(*actual_arg);
            }
            ExprNode::FnDef { fn_body, .. } => work_list.push(*fn_body),
            ExprNode::Var { .. } => {}
        }
    }
}

// Work items for the free variable walk.
enum FreeVarFrame<'a> {
    Visit(&'a ExprNode),
    Unbind(&'a str),
}

/// Computes the free variables in the given lambda calculus expression.
///
/// Uses an explicit work list rather than recursion, so arbitrarily deep
/// terms are fine. Binders are tracked with a count per name so that
/// shadowing binders of the same name nest correctly.
pub fn get_all_free_variables(expr_body: &ExprNode) -> HashSet<&str> {
    let mut free_vars: HashSet<&str> = HashSet::new();
    let mut bound_counts: HashMap<&str, usize> = HashMap::new();
    let mut work_list = vec![FreeVarFrame::Visit(expr_body)];

    while let Some(frame) = work_list.pop() {
        match frame {
            FreeVarFrame::Visit(ExprNode::Var { var_name }) => {
                let is_bound = bound_counts
                    .get(var_name.as_str())
                    .map_or(false, |count| *count > 0);

                if !is_bound {
                    free_vars.insert(var_name.as_str());
                }
            }
            FreeVarFrame::Visit(ExprNode::FnApp {
                fn_body,
                actual_arg,
            }) => {
                work_list.push(FreeVarFrame::Visit(actual_arg));
                work_list.push(FreeVarFrame::Visit(fn_body));
            }
            FreeVarFrame::Visit(ExprNode::FnDef {
                formal_param,
                fn_body,
            }) => {
                *bound_counts.entry(formal_param.as_str()).or_insert(0) += 1;
                work_list.push(FreeVarFrame::Unbind(formal_param.as_str()));
                work_list.push(FreeVarFrame::Visit(fn_body));
            }
            FreeVarFrame::Unbind(formal_param) => {
                if let Some(count) = bound_counts.get_mut(formal_param) {
                    *count -= 1;
                }
            }
        }
    }

    return free_vars;
}
