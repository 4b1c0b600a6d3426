//! Reduces lambda-calculus expressions given in the box-tree representation,
//! one normal-order step at a time.

use std::fmt::Display;

use tracing::debug;

use crate::box_tree_impl::box_tree_ast::ExprNode;
use crate::box_tree_impl::box_tree_definitions::DefinitionMap;
use crate::box_tree_impl::box_tree_substitution::substitute;

/// The kind of rewrite performed by a single reduction step.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum StepKind {
    /// A function def applied to an argument was replaced by its body with
    /// the argument substituted in.
    Beta,
    /// A defined name was replaced by its definition.
    Delta,
}

/// Display trait implementation for StepKind.
impl Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepKind::Beta => return write!(f, "β"),
            StepKind::Delta => return write!(f, "δ"),
        }
    }
}

// How a node on the path to a redex is rebuilt around the reduced child.
enum PathStep<'a> {
    FnBody { actual_arg: &'a ExprNode },
    ActualArg { fn_body: &'a ExprNode },
    DefBody { formal_param: &'a str },
}

/// Tries to rewrite `expr_body` itself, without looking at its children.
fn try_reduce_here(expr_body: &ExprNode, def_map: &DefinitionMap) -> Option<(ExprNode, StepKind)> {
    match expr_body {
        // A defined name expands to its definition.
        ExprNode::Var { var_name } => {
            return def_map
                .get(var_name.as_str())
                .map(|def_body| (def_body.clone(), StepKind::Delta));
        }

        // The function being applied is a function definition, so we are at
        // a redex.
        ExprNode::FnApp {
            fn_body,
            actual_arg,
        } => match &**fn_body {
            ExprNode::FnDef {
                formal_param,
                fn_body: defined_fn,
            } => {
                return Some((
                    substitute(defined_fn, formal_param.as_str(), actual_arg),
                    StepKind::Beta,
                ));
            }
            _ => return None,
        },

        ExprNode::FnDef { .. } => return None,
    }
}

/// Performs a single leftmost-outermost reduction step.
///
/// Returns `None` when `expr_body` is in normal form. Redexes at a node are
/// taken before looking inside it, and the function side of an application
/// is searched before the argument side. The search uses an explicit work
/// list, so deep terms do not grow the call stack here.
pub fn reduce_once(expr_body: &ExprNode, def_map: &DefinitionMap) -> Option<(ExprNode, StepKind)> {
    // Each entry is a node, its depth, and the step leading to it from its
    // parent. `path` holds the steps from the root to the node being visited.
    let mut work_list: Vec<(&ExprNode, usize, Option<PathStep>)> = vec![(expr_body, 0, None)];
    let mut path: Vec<PathStep> = Vec::new();

    while let Some((curr_node, depth, path_step)) = work_list.pop() {
        path.truncate(depth.saturating_sub(1));
        if let Some(path_step) = path_step {
            path.push(path_step);
        }

        if let Some((reduced, step_kind)) = try_reduce_here(curr_node, def_map) {
            return Some((rebuild_along_path(reduced, &path), step_kind));
        }

        match curr_node {
            // The argument is pushed first so the function side is popped,
            // and fully searched, before it.
            ExprNode::FnApp {
                fn_body,
                actual_arg,
            } => {
                work_list.push((
                    &**actual_arg,
                    depth + 1,
                    Some(PathStep::ActualArg { fn_body: &**fn_body }),
                ));
                work_list.push((
                    &**fn_body,
                    depth + 1,
                    Some(PathStep::FnBody {
                        actual_arg: &**actual_arg,
                    }),
                ));
            }
            ExprNode::FnDef {
                formal_param,
                fn_body,
            } => {
                work_list.push((
                    &**fn_body,
                    depth + 1,
                    Some(PathStep::DefBody {
                        formal_param: formal_param.as_str(),
                    }),
                ));
            }
            ExprNode::Var { .. } => {}
        }
    }

    return None;
}

// Rebuilds the tree above a reduced node, innermost step first.
fn rebuild_along_path(reduced: ExprNode, path: &[PathStep]) -> ExprNode {
    let mut out = reduced;

    for path_step in path.iter().rev() {
        out = match path_step {
            PathStep::FnBody { actual_arg } => ExprNode::fn_app(out, (*actual_arg).clone()),
            PathStep::ActualArg { fn_body } => ExprNode::fn_app((*fn_body).clone(), out),
            PathStep::DefBody { formal_param } => ExprNode::fn_def(*formal_param, out),
        };
    }

    return out;
}

/// The outcome of repeatedly reducing an expression.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Normalization {
    /// The last expression reached.
    pub expr: ExprNode,
    /// Number of steps taken.
    pub steps: usize,
    /// False when the step limit was hit before a normal form was found.
    pub reached_normal_form: bool,
}

/// Reduces `expr_body` until it is in normal form or `max_steps` steps have
/// been taken. A term that is already normal when the limit is hit still
/// counts as having reached normal form. With no limit this does not return
/// for terms without a normal form.
pub fn normalize_with_limit(
    expr_body: ExprNode,
    def_map: &DefinitionMap,
    max_steps: Option<usize>,
) -> Normalization {
    let mut expr_body = expr_body;
    let mut steps = 0;

    loop {
        match reduce_once(&expr_body, def_map) {
            Some(_) if max_steps.map_or(false, |max_steps| steps >= max_steps) => {
                return Normalization {
                    expr: expr_body,
                    steps,
                    reached_normal_form: false,
                };
            }
            Some((next_expr, step_kind)) => {
                steps += 1;
                debug!(step = steps, kind = %step_kind, expr = %next_expr, "reduction step");
                expr_body = next_expr;
            }
            None => {
                return Normalization {
                    expr: expr_body,
                    steps,
                    reached_normal_form: true,
                };
            }
        }
    }
}

/// Reduces `expr_body` to normal form, returning it with the number of steps
/// taken. Does not return for terms without a normal form.
pub fn normalize(expr_body: ExprNode, def_map: &DefinitionMap) -> (ExprNode, usize) {
    let normalization = normalize_with_limit(expr_body, def_map, None);
    return (normalization.expr, normalization.steps);
}

/// One entry of a reduction trace.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReductionStep {
    pub index: usize,
    pub expr: ExprNode,
    /// `None` for the initial expression.
    pub kind: Option<StepKind>,
}

/// Every expression visited while reducing, starting with the input.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ReductionTrace {
    pub steps: Vec<ReductionStep>,
    pub reached_normal_form: bool,
}

impl ReductionTrace {
    /// The last expression in the trace.
    pub fn final_expr(&self) -> &ExprNode {
        // A trace always holds at least the initial expression.
        return &self.steps[self.steps.len() - 1].expr;
    }

    /// Number of reduction steps taken (the initial entry is not a step).
    pub fn step_count(&self) -> usize {
        return self.steps.len() - 1;
    }
}

/// Like `normalize_with_limit`, but records every intermediate expression.
pub fn reduction_trace(
    expr_body: ExprNode,
    def_map: &DefinitionMap,
    max_steps: Option<usize>,
) -> ReductionTrace {
    let mut steps = vec![ReductionStep {
        index: 0,
        expr: expr_body,
        kind: None,
    }];

    loop {
        let taken = steps.len() - 1;

        match reduce_once(&steps[taken].expr, def_map) {
            Some(_) if max_steps.map_or(false, |max_steps| taken >= max_steps) => {
                return ReductionTrace {
                    steps,
                    reached_normal_form: false,
                };
            }
            Some((next_expr, step_kind)) => {
                debug!(step = taken + 1, kind = %step_kind, expr = %next_expr, "reduction step");
                steps.push(ReductionStep {
                    index: taken + 1,
                    expr: next_expr,
                    kind: Some(step_kind),
                });
            }
            None => {
                return ReductionTrace {
                    steps,
                    reached_normal_form: true,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree_impl::box_tree_definitions::default_definitions;
    use crate::box_tree_impl::box_tree_numerals::canonicalize_numerals;
    use crate::box_tree_impl::box_tree_recursive_descent_parsing::parse;

    fn parse_(source: &str) -> ExprNode {
        return parse(source).expect("Unable to parse test input.");
    }

    // Normalizes `source` with the built-in definitions and canonicalizes
    // the numerals in the result.
    fn evaluate_to_string(source: &str) -> String {
        let (normal_form, _) = normalize(parse_(source), default_definitions());
        return canonicalize_numerals(&normal_form).render();
    }

    // Test a single beta step on the identity function.
    #[test]
    fn test_identity_application() {
        let normalization =
            normalize_with_limit(parse_("(λx.x) (λy.y)"), default_definitions(), None);

        assert_eq!(normalization.expr.render(), "λy.y");
        assert_eq!(normalization.steps, 1);
        assert!(normalization.reached_normal_form);

        let (expr, step_kind) = reduce_once(&parse_("(λx.x) (λy.y)"), &DefinitionMap::new())
            .expect("expected a reduction step");
        assert_eq!(expr.render(), "λy.y");
        assert_eq!(step_kind, StepKind::Beta);
    }

    // Test beta reduction with nested expressions.
    #[test]
    fn test_nested_beta_reduction() {
        let no_defs = DefinitionMap::new();

        let (expr_1, kind_1) =
            reduce_once(&parse_("(λx.λy.x y) a b"), &no_defs).expect("expected a first step");
        assert_eq!(kind_1, StepKind::Beta);
        assert_eq!(expr_1.render(), "(λy.a y) b");

        let (expr_2, kind_2) = reduce_once(&expr_1, &no_defs).expect("expected a second step");
        assert_eq!(kind_2, StepKind::Beta);
        assert_eq!(expr_2.render(), "a b");

        assert_eq!(reduce_once(&expr_2, &no_defs), None);
    }

    // Test delta reduction after a beta step exposes a defined name.
    #[test]
    fn test_delta_reduction_with_nested() {
        let (expr_1, kind_1) = reduce_once(&parse_("(λx.⊤) y"), default_definitions())
            .expect("expected a first step");
        assert_eq!(kind_1, StepKind::Beta);
        assert_eq!(expr_1.render(), "⊤");

        let (expr_2, kind_2) =
            reduce_once(&expr_1, default_definitions()).expect("expected a second step");
        assert_eq!(kind_2, StepKind::Delta);
        assert_eq!(expr_2.render(), "λx.(λy.x)");
    }

    // Test that reduction continues inside function bodies.
    #[test]
    fn test_reduce_once_inside_abstraction() {
        let (expr, step_kind) =
            reduce_once(&parse_("λx.(λy.y) x"), &DefinitionMap::new()).expect("expected a step");

        assert_eq!(step_kind, StepKind::Beta);
        assert_eq!(expr.render(), "λx.x");
    }

    // Test that the function side is reduced before the argument side.
    #[test]
    fn test_leftmost_redex_first() {
        let no_defs = DefinitionMap::new();

        let (expr, _) =
            reduce_once(&parse_("a ((λx.x) b) ((λy.y) c)"), &no_defs).expect("expected a step");
        assert_eq!(expr.render(), "a b ((λy.y) c)");

        // The defined name in function position expands before the argument
        // redex is touched.
        let (expr, step_kind) = reduce_once(&parse_("⊤ ((λx.x) b)"), default_definitions())
            .expect("expected a step");
        assert_eq!(step_kind, StepKind::Delta);
        assert_eq!(expr.render(), "(λx.(λy.x)) ((λx.x) b)");
    }

    // Test that an unused divergent argument is discarded rather than
    // evaluated.
    #[test]
    fn test_normal_order_discards_divergent_argument() {
        let (expr, steps) = normalize(
            parse_("(λx.z) ((λw.w w) (λw.w w))"),
            &DefinitionMap::new(),
        );

        assert_eq!(expr.render(), "z");
        assert_eq!(steps, 1);

        assert_eq!(evaluate_to_string("⊥ ((λw.w w) (λw.w w)) 7"), "7");
    }

    // Test that names without a definition are inert.
    #[test]
    fn test_unbound_names_are_inert() {
        assert_eq!(reduce_once(&parse_("foo bar"), default_definitions()), None);
        assert_eq!(reduce_once(&parse_("λfoo.foo"), default_definitions()), None);
    }

    // Test that reduce_once is deterministic.
    #[test]
    fn test_reduce_once_deterministic() {
        let mut expr = parse_("* 2 (+ 1 1)");

        for _ in 0..50 {
            let first = reduce_once(&expr, default_definitions());
            let second = reduce_once(&expr, default_definitions());
            assert_eq!(first, second);

            match first {
                Some((next_expr, _)) => expr = next_expr,
                None => break,
            }
        }
    }

    // Test that the step limit stops a divergent term.
    #[test]
    fn test_step_limit() {
        let omega = parse_("(λw.w w) (λw.w w)");

        let normalization = normalize_with_limit(omega.clone(), &DefinitionMap::new(), Some(10));
        assert_eq!(normalization.steps, 10);
        assert!(!normalization.reached_normal_form);
        assert_eq!(normalization.expr, omega);

        // Already normal, so the limit is irrelevant.
        let normalization = normalize_with_limit(parse_("x"), &DefinitionMap::new(), Some(0));
        assert_eq!(normalization.steps, 0);
        assert!(normalization.reached_normal_form);

        let normalization =
            normalize_with_limit(parse_("(λx.x) y"), &DefinitionMap::new(), Some(1));
        assert_eq!(normalization.expr.render(), "y");
        assert!(normalization.reached_normal_form);
    }

    // Test that a trace records the initial expression and every step.
    #[test]
    fn test_reduction_trace() {
        let trace = reduction_trace(parse_("(λx.⊤) y"), default_definitions(), None);

        assert!(trace.reached_normal_form);
        assert_eq!(trace.step_count(), 2);
        assert_eq!(trace.final_expr().render(), "λx.(λy.x)");

        let summary: Vec<(usize, String, Option<StepKind>)> = trace
            .steps
            .iter()
            .map(|step| (step.index, step.expr.render(), step.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, String::from("(λx.⊤) y"), None),
                (1, String::from("⊤"), Some(StepKind::Beta)),
                (2, String::from("λx.(λy.x)"), Some(StepKind::Delta)),
            ]
        );

        let trace = reduction_trace(parse_("(λw.w w) (λw.w w)"), default_definitions(), Some(3));
        assert!(!trace.reached_normal_form);
        assert_eq!(trace.step_count(), 3);
    }

    // Test addition of Church numerals.
    #[test]
    fn test_addition() {
        let test_cases = [
            ("+ 0 0", "0"),
            ("+ 1 1", "2"),
            ("+ 2 3", "5"),
            ("+ 3 4", "7"),
            ("+ 5 7", "12"),
            ("+ 9 1", "10"),
        ];

        for (source, expected) in test_cases {
            assert_eq!(evaluate_to_string(source), expected, "evaluating {}", source);
        }
    }

    // Test multiplication of Church numerals.
    #[test]
    fn test_multiplication() {
        let test_cases = [
            ("* 0 5", "0"),
            ("* 1 7", "7"),
            ("* 2 3", "6"),
            ("* 3 4", "12"),
            ("* 5 5", "25"),
            ("* 10 10", "100"),
        ];

        for (source, expected) in test_cases {
            assert_eq!(evaluate_to_string(source), expected, "evaluating {}", source);
        }
    }

    // Test nested arithmetic.
    #[test]
    fn test_complex_expressions() {
        let test_cases = [
            ("+ (* 2 3) 4", "10"),
            ("* (+ 1 2) 3", "9"),
            ("+ (* 2 2) (* 3 3)", "13"),
            ("* (+ 2 2) (+ 3 3)", "24"),
            ("* (+ 1 2) (+ 3 4)", "21"),
            ("↑ (↑ 0)", "2"),
            ("↓ 3", "2"),
            ("- 7 3", "4"),
        ];

        for (source, expected) in test_cases {
            assert_eq!(evaluate_to_string(source), expected, "evaluating {}", source);
        }
    }

    // Test the less-or-equal comparison, which normalizes to one of the
    // boolean definitions exactly.
    #[test]
    fn test_all_comparisons() {
        let definitions = default_definitions();
        let test_cases = [
            (2, 5, true),
            (5, 2, false),
            (3, 3, true),
            (0, 1, true),
            (10, 0, false),
            (1, 0, false),
            (0, 0, true),
            (7, 8, true),
            (8, 7, false),
        ];

        for (a, b, expected) in test_cases {
            let (normal_form, _) = normalize(parse_(&format!("≤ {} {}", a, b)), definitions);
            let expected_def = if expected { "⊤" } else { "⊥" };

            assert_eq!(normal_form, definitions[expected_def], "evaluating ≤ {} {}", a, b);
        }
    }

    // Test the boolean connectives and pairs.
    #[test]
    fn test_booleans_and_pairs() {
        assert_eq!(evaluate_to_string("∧ ⊤ ⊥ 1 2"), "2");
        assert_eq!(evaluate_to_string("∨ ⊥ ⊤ 1 2"), "1");
        assert_eq!(evaluate_to_string("is0 0 3 4"), "3");
        assert_eq!(evaluate_to_string("is0 2 3 4"), "4");
        assert_eq!(evaluate_to_string("pair 1 2 ⊤"), "1");
        assert_eq!(evaluate_to_string("pair 1 2 ⊥"), "2");
    }
}
