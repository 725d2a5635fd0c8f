//! Expression trees handed to the checker.
//!
//! The tree is built by the caller (usually a front-end that already
//! resolved every type name) and is never mutated afterwards. Children are
//! owned, so a tree cannot contain cycles.

use crate::{
    type_error::TypeError,
    type_system::{CheckedType, TypeSystem},
};
use itertools::Itertools;
use std::fmt;
use strtab::Symbol;

/// Token of the `null` literal.
pub const NULL_LITERAL: &str = "null";

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'src> {
    /// Read of a variable, e.g. `x` in `x.foo()`.
    Variable {
        name: Symbol<'src>,
        declared_ty: CheckedType<'src>,
    },
    /// Literal value as written in the source, e.g. `5` or `null`.
    Literal {
        value: String,
        ty: CheckedType<'src>,
    },
    /// `receiver.method_name(args...)`
    MethodCall {
        receiver: Box<Expr<'src>>,
        method_name: Symbol<'src>,
        args: Vec<Expr<'src>>,
    },
    /// `new instantiated_ty(args...)`
    ConstructorCall {
        instantiated_ty: CheckedType<'src>,
        args: Vec<Expr<'src>>,
    },
}

impl<'src> Expr<'src> {
    pub fn var(name: Symbol<'src>, declared_ty: CheckedType<'src>) -> Expr<'src> {
        Expr::Variable { name, declared_ty }
    }

    pub fn literal(value: &str, ty: CheckedType<'src>) -> Expr<'src> {
        Expr::Literal {
            value: value.to_string(),
            ty,
        }
    }

    /// The `null` literal is an ordinary literal of the null type. Nothing
    /// in the checker treats it specially.
    pub fn null() -> Expr<'src> {
        Expr::literal(NULL_LITERAL, CheckedType::Null)
    }

    pub fn new_object(instantiated_ty: CheckedType<'src>, args: Vec<Expr<'src>>) -> Expr<'src> {
        Expr::ConstructorCall {
            instantiated_ty,
            args,
        }
    }

    /// Wraps `self` as the receiver of a call, so calls can be chained like
    /// `x.foo().bar(y)`.
    pub fn method_call(self, method_name: Symbol<'src>, args: Vec<Expr<'src>>) -> Expr<'src> {
        Expr::MethodCall {
            receiver: Box::new(self),
            method_name,
            args,
        }
    }

    /// The compile-time type of this expression.
    ///
    /// Only meaningful once [`Expr::check_types`] succeeded for this tree: a
    /// method call on an unchecked tree may name a method that does not
    /// exist, which is reported as the same error `check_types` would give.
    pub fn static_type(&self, ts: &TypeSystem<'src>) -> Result<CheckedType<'src>, TypeError> {
        match self {
            Expr::Variable { declared_ty, .. } => Ok(*declared_ty),
            Expr::Literal { ty, .. } => Ok(*ty),
            Expr::MethodCall {
                receiver,
                method_name,
                ..
            } => {
                let receiver_ty = receiver.static_type(ts)?;
                Ok(receiver_ty.method_named(*method_name, ts)?.return_ty)
            }
            Expr::ConstructorCall {
                instantiated_ty, ..
            } => Ok(*instantiated_ty),
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expr<'src>> {
        match self {
            Expr::Variable { .. } | Expr::Literal { .. } => vec![],
            Expr::MethodCall { receiver, args, .. } => {
                let mut children = Vec::with_capacity(args.len() + 1);
                children.push(&**receiver);
                children.extend(args);
                children
            }
            Expr::ConstructorCall { args, .. } => args.iter().collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Variable { .. } => "variable",
            Expr::Literal { .. } => "literal",
            Expr::MethodCall { .. } => "method call",
            Expr::ConstructorCall { .. } => "constructor call",
        }
    }
}

/// Prints the expression in Java syntax.
impl<'src> fmt::Display for Expr<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable { name, .. } => write!(f, "{}", name),
            Expr::Literal { value, .. } => write!(f, "{}", value),
            Expr::MethodCall {
                receiver,
                method_name,
                args,
            } => write!(f, "{}.{}({})", receiver, method_name, args.iter().join(", ")),
            Expr::ConstructorCall {
                instantiated_ty,
                args,
            } => write!(f, "new {}({})", instantiated_ty, args.iter().join(", ")),
        }
    }
}
