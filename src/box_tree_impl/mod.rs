//! Parser, reducer and numeral folding for expressions represented as a tree
//! where each node references its children via `Box` smart pointers.

pub mod box_tree_ast;
pub mod box_tree_definitions;
pub mod box_tree_execution;
pub mod box_tree_numerals;
pub mod box_tree_recursive_descent_parsing;
pub mod box_tree_substitution;
