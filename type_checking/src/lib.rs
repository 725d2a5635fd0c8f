//! Static type checking of Java-like expressions against a class hierarchy
//! with single inheritance.
//!
//! A caller builds a [`TypeSystem`], builds an [`Expr`] tree referring to
//! its types and calls [`Expr::check_types`] on the root. Once that
//! succeeded, [`Expr::static_type`] gives the type of any node in the tree.
#![warn(rust_2018_idioms)]
#![warn(
    clippy::print_stdout,
    clippy::unimplemented,
    clippy::doc_markdown,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::use_self,
    clippy::use_debug
)]

pub mod builtin_types;
pub mod checker;
pub mod expr;
pub mod type_error;
pub mod type_system;

pub use self::{
    builtin_types::BuiltinTypes,
    expr::Expr,
    type_error::TypeError,
    type_system::{CheckedType, ClassDef, ClassDefId, ClassMethodDef, ConstructorDef, TypeSystem},
};
