//! The JSON description of a class hierarchy and the expressions to check
//! against it.
//!
//! ```json
//! {
//!   "prelude": false,
//!   "classes": [
//!     { "name": "Animal", "instantiable": true,
//!       "methods": [{ "name": "feed", "params": ["Animal"], "returns": "void" }] },
//!     { "name": "Dog", "extends": "Animal", "instantiable": true, "constructor": [] }
//!   ],
//!   "expressions": [
//!     { "kind": "call", "receiver": { "kind": "new", "type": "Dog" },
//!       "method": "feed", "args": [{ "kind": "null" }] }
//!   ]
//! }
//! ```
//!
//! A class entry named `Object` adds members to the root class instead of
//! declaring a new one.

use failure::{Error, Fail, ResultExt};
use serde_derive::Deserialize;
use strtab::StringTable;
use type_checking::{
    type_system::{DeclarationError, OBJECT_CLASS_NAME},
    BuiltinTypes, CheckedType, ClassDef, ClassMethodDef, ConstructorDef, Expr, TypeSystem,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramFile {
    /// Adds `String` and the usual `Object` methods.
    #[serde(default)]
    pub prelude: bool,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    #[serde(default)]
    pub expressions: Vec<ExprDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    /// Defaults to `Object`. Must be declared before this class.
    #[serde(default, rename = "extends")]
    pub superclass: Option<String>,
    #[serde(default)]
    pub instantiable: bool,
    /// Parameter types. An instantiable class without one gets the
    /// implicit constructor without parameters.
    #[serde(default)]
    pub constructor: Option<Vec<String>>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    pub returns: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ExprDecl {
    Variable {
        name: String,
        #[serde(rename = "type")]
        ty: String,
    },
    Literal {
        value: String,
        #[serde(rename = "type")]
        ty: String,
    },
    Null,
    Call {
        receiver: Box<ExprDecl>,
        method: String,
        #[serde(default)]
        args: Vec<ExprDecl>,
    },
    New {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        args: Vec<ExprDecl>,
    },
}

#[derive(Debug, Fail)]
pub enum ProgramError {
    #[fail(display = "'{}' is a built-in type and cannot be declared as a class", name)]
    ReservedTypeName { name: String },
    #[fail(display = "class '{}' cannot have a superclass", name)]
    RootWithSuperclass { name: String },
}

/// Builds the type system described by `program`. Expressions are not
/// touched, see [`build_expr`].
pub fn load_type_system<'p>(
    program: &'p ProgramFile,
    strtab: &mut StringTable<'p>,
) -> Result<TypeSystem<'p>, Error> {
    let mut type_system = TypeSystem::new(strtab);

    if program.prelude {
        BuiltinTypes::add_to(&mut type_system, strtab).context("cannot add the prelude")?;
    }

    // first pass: declare all classes, so that member signatures can refer to
    // classes declared further down
    for class_decl in &program.classes {
        declare_class(class_decl, &mut type_system, strtab)
            .with_context(|_| format!("in declaration of class '{}'", class_decl.name))?;
    }

    // second pass: member signatures
    for class_decl in &program.classes {
        add_members(class_decl, &mut type_system, strtab)
            .with_context(|_| format!("in declaration of class '{}'", class_decl.name))?;
    }

    Ok(type_system)
}

fn declare_class<'p>(
    class_decl: &'p ClassDecl,
    type_system: &mut TypeSystem<'p>,
    strtab: &mut StringTable<'p>,
) -> Result<(), Error> {
    if CheckedType::from_keyword(&class_decl.name).is_some() {
        return Err(ProgramError::ReservedTypeName {
            name: class_decl.name.clone(),
        }
        .into());
    }

    if class_decl.name == OBJECT_CLASS_NAME {
        if class_decl.superclass.is_some() {
            return Err(ProgramError::RootWithSuperclass {
                name: class_decl.name.clone(),
            }
            .into());
        }
        let object = type_system.object();
        type_system.class_mut(object).is_instantiable = class_decl.instantiable;
        return Ok(());
    }

    let superclass = type_system.resolve_class(
        class_decl
            .superclass
            .as_ref()
            .map(String::as_str)
            .unwrap_or(OBJECT_CLASS_NAME),
    )?;

    let mut class_def = ClassDef::new(strtab.intern(&class_decl.name), superclass);
    class_def.is_instantiable = class_decl.instantiable;
    type_system.add_class_def(class_def)?;

    Ok(())
}

fn add_members<'p>(
    class_decl: &'p ClassDecl,
    type_system: &mut TypeSystem<'p>,
    strtab: &mut StringTable<'p>,
) -> Result<(), Error> {
    let class_id = type_system.resolve_class(&class_decl.name)?;

    if let Some(params) = &class_decl.constructor {
        let params = resolve_types(params, type_system)?;
        type_system
            .class_mut(class_id)
            .set_constructor(ConstructorDef::new(params));
    }

    for method_decl in &class_decl.methods {
        let method = ClassMethodDef::new(
            strtab.intern(&method_decl.name),
            resolve_types(&method_decl.params, type_system)
                .with_context(|_| format!("in signature of method '{}'", method_decl.name))?,
            resolve_type(&method_decl.returns, type_system)
                .with_context(|_| format!("in signature of method '{}'", method_decl.name))?,
        );
        type_system.class_mut(class_id).add_method(method)?;
    }

    Ok(())
}

pub fn resolve_type<'p>(
    name: &str,
    type_system: &TypeSystem<'p>,
) -> Result<CheckedType<'p>, DeclarationError> {
    match CheckedType::from_keyword(name) {
        Some(ty) => Ok(ty),
        None => type_system.resolve_class(name).map(CheckedType::from),
    }
}

fn resolve_types<'p>(
    names: &[String],
    type_system: &TypeSystem<'p>,
) -> Result<Vec<CheckedType<'p>>, DeclarationError> {
    names
        .iter()
        .map(|name| resolve_type(name, type_system))
        .collect()
}

/// Turns an expression description into an expression tree, resolving all
/// type names against `type_system`. Method names are not resolved here,
/// that is the checker's job.
pub fn build_expr<'p>(
    expr_decl: &'p ExprDecl,
    type_system: &TypeSystem<'p>,
    strtab: &mut StringTable<'p>,
) -> Result<Expr<'p>, DeclarationError> {
    Ok(match expr_decl {
        ExprDecl::Variable { name, ty } => {
            Expr::var(strtab.intern(name), resolve_type(ty, type_system)?)
        }
        ExprDecl::Literal { value, ty } => Expr::literal(value, resolve_type(ty, type_system)?),
        ExprDecl::Null => Expr::null(),
        ExprDecl::Call {
            receiver,
            method,
            args,
        } => {
            let receiver = build_expr(receiver, type_system, strtab)?;
            let args = build_exprs(args, type_system, strtab)?;
            receiver.method_call(strtab.intern(method), args)
        }
        ExprDecl::New { ty, args } => {
            let ty = resolve_type(ty, type_system)?;
            Expr::new_object(ty, build_exprs(args, type_system, strtab)?)
        }
    })
}

fn build_exprs<'p>(
    expr_decls: &'p [ExprDecl],
    type_system: &TypeSystem<'p>,
    strtab: &mut StringTable<'p>,
) -> Result<Vec<Expr<'p>>, DeclarationError> {
    expr_decls
        .iter()
        .map(|arg| build_expr(arg, type_system, strtab))
        .collect()
}
