//! Recognizes Church numerals structurally and folds them back into decimal
//! literals for display.

use crate::box_tree_impl::box_tree_ast::{drop_iteratively, ExprNode};

/// If `expr_node` has the shape `λf.λx.f (f (... (f x)))`, returns the number
/// of applications of `f`. Matching is purely by name: any other function,
/// extra free variable or different nesting disqualifies the term.
pub fn church_numeral_value(expr_node: &ExprNode) -> Option<u64> {
    let (f_param, x_param, mut curr_node) = match expr_node {
        ExprNode::FnDef {
            formal_param: f_param,
            fn_body: outer_body,
        } => match &**outer_body {
            ExprNode::FnDef {
                formal_param: x_param,
                fn_body: inner_body,
            } => (f_param, x_param, &**inner_body),
            _ => return None,
        },
        _ => return None,
    };

    let mut count = 0;

    loop {
        match curr_node {
            ExprNode::FnApp {
                fn_body,
                actual_arg,
            } => match &**fn_body {
                ExprNode::Var { var_name } if var_name == f_param => {
                    count += 1;
                    curr_node = &**actual_arg;
                }
                _ => return None,
            },
            ExprNode::Var { var_name } if var_name == x_param => return Some(count),
            _ => return None,
        }
    }
}

/// Whether `expr_node` is shaped like a Church numeral.
pub fn is_church_numeral(expr_node: &ExprNode) -> bool {
    return church_numeral_value(expr_node).is_some();
}

// Work items for the post-order numeral pass.
enum CanonFrame<'a> {
    Visit(&'a ExprNode),
    BuildApp,
    BuildDef(&'a str),
}

/// Replaces every Church-numeral-shaped subterm with a variable named by its
/// decimal value.
///
/// Children are rewritten first and the rebuilt node is checked afterwards.
/// Running this twice gives the same result as running it once, since a
/// digit variable never has the numeral shape. The walk uses an explicit
/// work list, so term depth is bounded only by memory.
pub fn canonicalize_numerals(expr_node: &ExprNode) -> ExprNode {
    let mut work_list = vec![CanonFrame::Visit(expr_node)];
    let mut rebuilt_nodes: Vec<ExprNode> = Vec::new();

    while let Some(frame) = work_list.pop() {
        let rebuilt = match frame {
            CanonFrame::Visit(ExprNode::Var { var_name }) => {
                rebuilt_nodes.push(ExprNode::var(var_name.as_str()));
                continue;
            }
            CanonFrame::Visit(ExprNode::FnApp {
                fn_body,
                actual_arg,
            }) => {
                work_list.push(CanonFrame::BuildApp);
                work_list.push(CanonFrame::Visit(actual_arg));
                work_list.push(CanonFrame::Visit(fn_body));
                continue;
            }
            CanonFrame::Visit(ExprNode::FnDef {
                formal_param,
                fn_body,
            }) => {
                work_list.push(CanonFrame::BuildDef(formal_param.as_str()));
                work_list.push(CanonFrame::Visit(fn_body));
                continue;
            }
            CanonFrame::BuildApp => {
                let actual_arg = rebuilt_nodes.pop();
                let fn_body = rebuilt_nodes.pop();
                match (fn_body, actual_arg) {
                    (Some(fn_body), Some(actual_arg)) => ExprNode::fn_app(fn_body, actual_arg),
                    _ => unreachable!("application rebuilt before both of its children"),
                }
            }
            CanonFrame::BuildDef(formal_param) => match rebuilt_nodes.pop() {
                Some(fn_body) => ExprNode::fn_def(formal_param, fn_body),
                None => unreachable!("function def rebuilt before its body"),
            },
        };

        match church_numeral_value(&rebuilt) {
            Some(value) => {
                rebuilt_nodes.push(ExprNode::var(value.to_string()));
                drop_iteratively(rebuilt);
            }
            None => rebuilt_nodes.push(rebuilt),
        }
    }

    match rebuilt_nodes.pop() {
        Some(out) => return out,
        None => unreachable!("the root is always rebuilt"),
    }
}
