//! This crate contains code for a lambda calculus evaluator: a parser, a
//! normal-order reducer with delta definitions, and a pass that folds Church
//! numerals back into digits.

pub mod box_tree_impl;
pub mod end_to_end;
pub mod pretty_printing;

pub use box_tree_impl::box_tree_ast::{
    church_numeral, drop_iteratively, get_all_free_variables, ExprNode,
};
pub use box_tree_impl::box_tree_definitions::{default_definitions, DefinitionMap};
pub use box_tree_impl::box_tree_execution::{
    normalize, normalize_with_limit, reduce_once, reduction_trace, Normalization, ReductionStep,
    ReductionTrace, StepKind,
};
pub use box_tree_impl::box_tree_numerals::canonicalize_numerals;
pub use box_tree_impl::box_tree_recursive_descent_parsing::{parse, ParseError, MAX_NUMERAL};
pub use box_tree_impl::box_tree_substitution::{fresh_name, substitute};
