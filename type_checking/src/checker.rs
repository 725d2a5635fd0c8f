//! Validation of expression trees.
//!
//! Checking is a postorder walk: all children of a node are checked (left to
//! right) before the node's own operation is validated against the static
//! types of those children. The walk stops at the first violation.

use crate::{
    expr::Expr,
    type_error::{TypeError, TypeNames},
    type_system::{CheckedType, TypeSystem},
};
use strtab::Symbol;

impl<'src> Expr<'src> {
    /// Validates this expression and all of its descendants.
    ///
    /// Read-only and idempotent: checking the same tree twice gives the same
    /// result, and several trees may be checked concurrently against one
    /// type system.
    pub fn check_types(&self, ts: &TypeSystem<'src>) -> Result<(), TypeError> {
        log::trace!("checking {} `{}`", self.kind(), self);

        for child in self.children() {
            child.check_types(ts)?;
        }

        let result = match self {
            // leaves are well-typed by construction
            Expr::Variable { .. } | Expr::Literal { .. } => Ok(()),
            Expr::MethodCall {
                receiver,
                method_name,
                args,
            } => check_method_call(receiver, *method_name, args, ts),
            Expr::ConstructorCall {
                instantiated_ty,
                args,
            } => check_constructor_call(instantiated_ty, args, ts),
        };

        if let Err(err) = &result {
            log::debug!("`{}` is ill-typed: {}", self, err);
        }
        result
    }
}

fn check_method_call<'src>(
    receiver: &Expr<'src>,
    method_name: Symbol<'src>,
    args: &[Expr<'src>],
    ts: &TypeSystem<'src>,
) -> Result<(), TypeError> {
    let receiver_ty = receiver.static_type(ts)?;

    if !receiver_ty.is_subtype_of(&ts.object_type(), ts) {
        return Err(TypeError::NoMethods {
            ty: receiver_ty.to_string(),
        });
    }

    let expected = &receiver_ty.method_named(method_name, ts)?.params;
    if expected.len() != args.len() {
        return Err(TypeError::MethodArgCountDoesNotMatch {
            ty: receiver_ty.to_string(),
            method_name: method_name.to_string(),
            expected_args: expected.len(),
            actual_args: args.len(),
        });
    }

    let actual = static_types(args, ts)?;
    check_arg_types(expected, &actual, ts, |expected, actual| {
        TypeError::MethodArgTypesDoNotMatch {
            ty: receiver_ty.to_string(),
            method_name: method_name.to_string(),
            expected,
            actual,
        }
    })
}

fn check_constructor_call<'src>(
    instantiated_ty: &CheckedType<'src>,
    args: &[Expr<'src>],
    ts: &TypeSystem<'src>,
) -> Result<(), TypeError> {
    if !instantiated_ty.is_instantiable(ts) {
        return Err(TypeError::NotInstantiable {
            ty: instantiated_ty.to_string(),
        });
    }

    let expected = instantiated_ty.constructor_params(ts);
    if expected.len() != args.len() {
        return Err(TypeError::ConstructorArgCountDoesNotMatch {
            ty: instantiated_ty.to_string(),
            expected_args: expected.len(),
            actual_args: args.len(),
        });
    }

    let actual = static_types(args, ts)?;
    check_arg_types(expected, &actual, ts, |expected, actual| {
        TypeError::ConstructorArgTypesDoNotMatch {
            ty: instantiated_ty.to_string(),
            expected,
            actual,
        }
    })
}

fn static_types<'src>(
    args: &[Expr<'src>],
    ts: &TypeSystem<'src>,
) -> Result<Vec<CheckedType<'src>>, TypeError> {
    args.iter().map(|arg| arg.static_type(ts)).collect()
}

/// Requires `actual[i] <: expected[i]` for every `i`. Only the first failing
/// index is reported, but the error lists all expected and all actual types.
fn check_arg_types<'src, F>(
    expected: &[CheckedType<'src>],
    actual: &[CheckedType<'src>],
    ts: &TypeSystem<'src>,
    mismatch: F,
) -> Result<(), TypeError>
where
    F: FnOnce(TypeNames, TypeNames) -> TypeError,
{
    debug_assert_eq!(expected.len(), actual.len());

    let first_mismatch = expected
        .iter()
        .zip(actual)
        .position(|(expected_ty, actual_ty)| !actual_ty.is_subtype_of(expected_ty, ts));

    match first_mismatch {
        Some(idx) => {
            log::debug!(
                "argument {} has type {}, expected {}",
                idx,
                actual[idx],
                expected[idx]
            );
            Err(mismatch(TypeNames::of(expected), TypeNames::of(actual)))
        }
        None => Ok(()),
    }
}
