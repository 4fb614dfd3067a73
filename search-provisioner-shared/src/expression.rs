//! Expressions used as skill input sources.
//!
//! The remote pipeline has no if/else. Branches are written as parallel
//! skills whose inputs are selected by a conditional skill, and the
//! condition itself is one of these small expressions. The provisioner only
//! serializes them; `evaluate` exists so branch selection can be checked
//! locally.

use std::fmt;

use serde_json::Value;

/// Expression tree rendered into the `= ...` source syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// The explicit null sentinel marking a branch as not taken.
    Null,
    /// A string literal.
    Literal(String),
    /// A reference to a value in the enrichment tree.
    FieldRef(String),
    /// String equality between two sub-expressions.
    Equals(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn null() -> Self {
        Expr::Null
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn field(path: impl Into<String>) -> Self {
        Expr::FieldRef(path.into())
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Expr::Equals(Box::new(left), Box::new(right))
    }

    /// `$(path) == 'value'`
    pub fn field_equals(path: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::equals(Expr::field(path), Expr::literal(value))
    }

    /// Every enrichment path this expression reads.
    pub fn field_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_refs(&mut refs);
        refs
    }

    fn collect_refs<'a>(&'a self, refs: &mut Vec<&'a str>) {
        match self {
            Expr::FieldRef(path) => refs.push(path),
            Expr::Equals(left, right) => {
                left.collect_refs(refs);
                right.collect_refs(refs);
            }
            Expr::Null | Expr::Literal(_) => {}
        }
    }

    /// Evaluate against values looked up by path. Missing values resolve to null.
    pub fn evaluate(&self, resolve: &impl Fn(&str) -> Value) -> Value {
        match self {
            Expr::Null => Value::Null,
            Expr::Literal(value) => Value::String(value.clone()),
            Expr::FieldRef(path) => resolve(path),
            Expr::Equals(left, right) => {
                Value::Bool(left.evaluate(resolve) == right.evaluate(resolve))
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Null => f.write_str("null"),
            Expr::Literal(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Expr::FieldRef(path) => write!(f, "$({})", path),
            Expr::Equals(left, right) => write!(f, "{} == {}", left, right),
        }
    }
}
