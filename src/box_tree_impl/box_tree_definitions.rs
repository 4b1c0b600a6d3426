//! The table of named definitions used for delta reduction.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::box_tree_impl::box_tree_ast::ExprNode;
use crate::box_tree_impl::box_tree_recursive_descent_parsing::parse;

/// Map from a definition's name to the expression it expands to.
pub type DefinitionMap = HashMap<String, ExprNode>;

/// Source text of the built-in definitions, in definition order.
pub const DEFINITION_SOURCES: [(&str, &str); 12] = [
    ("⊤", "λx.λy.x"),
    ("⊥", "λx.λy.y"),
    ("∧", "λp.λq.p q p"),
    ("∨", "λp.λq.p p q"),
    ("↓", "λn.λf.λx.n (λg.λh.h (g f)) (λu.x) (λu.u)"),
    ("↑", "λn.λf.λx.f (n f x)"),
    ("+", "λm.λn.m ↑ n"),
    ("*", "λm.λn.m (+ n) 0"),
    ("is0", "λn.n (λx.⊥) ⊤"),
    ("-", "λm.λn.n ↓ m"),
    ("≤", "λm.λn.is0 (- m n)"),
    ("pair", "λx.λy.λf.f x y"),
];

/// Parses every entry of `DEFINITION_SOURCES` into a fresh map.
///
/// # Panics
///
/// Panics if a built-in definition fails to parse. The table is fixed at
/// compile time, so this is a programming error rather than bad input.
pub fn build_default_definitions() -> DefinitionMap {
    let mut out = DefinitionMap::new();

    for (def_name, def_source) in DEFINITION_SOURCES {
        let def_body = parse(def_source).unwrap_or_else(|parse_error| {
            panic!("Built-in definition {} is malformed: {}", def_name, parse_error)
        });
        out.insert(String::from(def_name), def_body);
    }

    return out;
}

lazy_static! {
    static ref DEFAULT_DEFINITIONS: DefinitionMap = build_default_definitions();
}

/// The built-in definitions, parsed once on first use and shared read-only
/// afterwards.
pub fn default_definitions() -> &'static DefinitionMap {
    return &DEFAULT_DEFINITIONS;
}
