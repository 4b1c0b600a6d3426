//! Capture-avoiding substitution over box-tree expressions.
//!
//! Substitution never mutates its input; it builds a new tree. It recurses
//! once per node on the path being rebuilt, so very deep terms need a thread
//! with a large enough stack.

use std::collections::HashSet;

use tracing::trace;

use crate::box_tree_impl::box_tree_ast::{get_all_free_variables, ExprNode};

/// Returns a name not contained in `avoid`.
///
/// Candidates are tried in a fixed order: `a` through `z`, then `a1` through
/// `z1`, then `a2` and so on. The result only depends on the contents of
/// `avoid`, never on its iteration order.
pub fn fresh_name(avoid: &HashSet<&str>) -> String {
    for suffix in 0usize.. {
        for letter in 'a'..='z' {
            let candidate = if suffix == 0 {
                letter.to_string()
            } else {
                format!("{}{}", letter, suffix)
            };

            if !avoid.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }

    unreachable!("a finite set cannot exclude every candidate name")
}

/// Given a function def's formal param and body, picks a fresh param and
/// rewrites the body to use it, so that substituting a value whose free
/// variables include `formal_param` cannot capture them.
fn perform_alpha_conversion(
    formal_param: &str,
    fn_body: &ExprNode,
    var_name: &str,
    value_free_vars: &HashSet<&str>,
) -> (String, ExprNode) {
    debug_assert!(
        value_free_vars.contains(formal_param),
        "Alpha conversion attempted when not required."
    );

    let mut vars_to_avoid: HashSet<&str> = get_all_free_variables(fn_body);
    vars_to_avoid.extend(value_free_vars.iter().copied());
    vars_to_avoid.insert(formal_param);
    vars_to_avoid.insert(var_name);

    let new_formal_param = fresh_name(&vars_to_avoid);
    trace!(
        old_param = formal_param,
        new_param = new_formal_param.as_str(),
        "alpha renaming to avoid capture"
    );

    let renamed_body = substitute(fn_body, formal_param, &ExprNode::var(new_formal_param.as_str()));

    return (new_formal_param, renamed_body);
}

fn substitute_helper(
    expr_body: &ExprNode,
    var_name: &str,
    var_value: &ExprNode,
    value_free_vars: &HashSet<&str>,
) -> ExprNode {
    match expr_body {
        // Substitute into variable.
        ExprNode::Var {
            var_name: curr_var_name,
        } => {
            if curr_var_name == var_name {
                return var_value.clone();
            }
            return expr_body.clone();
        }

        // Substitute into both sides of a function application.
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => {
            return ExprNode::fn_app(
                substitute_helper(fn_body, var_name, var_value, value_free_vars),
                substitute_helper(actual_arg, var_name, var_value, value_free_vars),
            );
        }

        // Substitute into a function definition.
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            // The formal param shadows var_name, so nothing below is free.
            if formal_param == var_name {
                return expr_body.clone();
            }

            // To prevent variable capture, perform alpha conversion if
            // var_value contains formal_param as a free variable.
            if value_free_vars.contains(formal_param.as_str()) {
                let (new_formal_param, renamed_body) =
                    perform_alpha_conversion(formal_param, fn_body, var_name, value_free_vars);

                return ExprNode::fn_def(
                    new_formal_param,
                    substitute_helper(&renamed_body, var_name, var_value, value_free_vars),
                );
            }

            return ExprNode::fn_def(
                formal_param.as_str(),
                substitute_helper(fn_body, var_name, var_value, value_free_vars),
            );
        }
    };
}

/// Returns `expr_body` with every free occurrence of `var_name` replaced by
/// `var_value`, renaming binders as needed to avoid capture.
pub fn substitute(expr_body: &ExprNode, var_name: &str, var_value: &ExprNode) -> ExprNode {
    let value_free_vars = get_all_free_variables(var_value);
    return substitute_helper(expr_body, var_name, var_value, &value_free_vars);
}
