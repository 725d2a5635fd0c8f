use crate::type_system::CheckedType;
use failure::Fail;
use itertools::Itertools;
use std::fmt;
use strtab::Symbol;

/// The first violation found while checking an expression tree.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum TypeError {
    #[fail(display = "Type {} does not have methods", ty)]
    NoMethods { ty: String },
    #[fail(display = "{} has no method named {}{}", ty, method_name, suggestion)]
    NoSuchMethod {
        ty: String,
        method_name: String,
        suggestion: Suggestion,
    },
    #[fail(
        display = "Wrong number of arguments for {}.{}(): expected {}, got {}",
        ty, method_name, expected_args, actual_args
    )]
    MethodArgCountDoesNotMatch {
        ty: String,
        method_name: String,
        expected_args: usize,
        actual_args: usize,
    },
    #[fail(
        display = "{}.{}() expects arguments of type {}, but got {}",
        ty, method_name, expected, actual
    )]
    MethodArgTypesDoNotMatch {
        ty: String,
        method_name: String,
        expected: TypeNames,
        actual: TypeNames,
    },
    #[fail(display = "Type {} is not instantiable", ty)]
    NotInstantiable { ty: String },
    #[fail(
        display = "Wrong number of arguments for {} constructor: expected {}, got {}",
        ty, expected_args, actual_args
    )]
    ConstructorArgCountDoesNotMatch {
        ty: String,
        expected_args: usize,
        actual_args: usize,
    },
    #[fail(
        display = "{} constructor expects arguments of type {}, but got {}",
        ty, expected, actual
    )]
    ConstructorArgTypesDoNotMatch {
        ty: String,
        expected: TypeNames,
        actual: TypeNames,
    },
}

/// A parenthesized, comma separated list of type names, e.g. `(Animal, int)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNames(pub Vec<String>);

impl TypeNames {
    pub fn of<'a, 'src: 'a, I>(types: I) -> TypeNames
    where
        I: IntoIterator<Item = &'a CheckedType<'src>>,
    {
        TypeNames(types.into_iter().map(ToString::to_string).collect())
    }
}

impl fmt::Display for TypeNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

/// A "did you mean" hint appended to a message. Displays as nothing if there
/// is no similar name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suggestion(pub Option<String>);

impl Suggestion {
    pub fn none() -> Suggestion {
        Suggestion(None)
    }

    pub fn from_candidates<'f, I>(name: &str, candidates: I) -> Suggestion
    where
        I: IntoIterator<Item = Symbol<'f>>,
    {
        Suggestion(strtab::most_similar(name, candidates).map(|sym| sym.to_string()))
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => write!(f, " (did you mean `{}`?)", name),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_are_parenthesized() {
        assert_eq!("()", TypeNames(vec![]).to_string());
        assert_eq!(
            "(int, null)",
            TypeNames::of(&[CheckedType::Int, CheckedType::Null]).to_string()
        );
    }

    #[test]
    fn messages() {
        let err = TypeError::MethodArgTypesDoNotMatch {
            ty: "Dog".to_string(),
            method_name: "feed".to_string(),
            expected: TypeNames(vec!["Animal".to_string()]),
            actual: TypeNames(vec!["int".to_string()]),
        };
        assert_eq!(
            "Dog.feed() expects arguments of type (Animal), but got (int)",
            err.to_string()
        );

        let err = TypeError::ConstructorArgCountDoesNotMatch {
            ty: "Dog".to_string(),
            expected_args: 0,
            actual_args: 1,
        };
        assert_eq!(
            "Wrong number of arguments for Dog constructor: expected 0, got 1",
            err.to_string()
        );

        let err = TypeError::NoSuchMethod {
            ty: "Dog".to_string(),
            method_name: "barc".to_string(),
            suggestion: Suggestion(Some("bark".to_string())),
        };
        assert_eq!(
            "Dog has no method named barc (did you mean `bark`?)",
            err.to_string()
        );
    }
}
