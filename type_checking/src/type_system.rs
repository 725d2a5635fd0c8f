use crate::type_error::{Suggestion, TypeError};
use failure::Fail;
use std::{
    collections::{hash_map::Entry, HashMap},
    fmt,
};
use strtab::{StringTable, Symbol};

/// Name of the root of every class hierarchy.
pub const OBJECT_CLASS_NAME: &str = "Object";

#[derive(Debug, Fail, Clone, PartialEq)]
pub enum DeclarationError {
    #[fail(display = "redefinition of class '{}'", name)]
    ClassAlreadyDeclared { name: String },
    #[fail(display = "class '{}' does not exist{}", name, suggestion)]
    ClassDoesNotExist { name: String, suggestion: Suggestion },
    #[fail(
        display = "redefinition of method '{}' in class '{}'",
        method_name, class_name
    )]
    MethodAlreadyDeclared {
        class_name: String,
        method_name: String,
    },
}

/// Owns every class of one hierarchy.
///
/// Classes refer to their superclass through a [`ClassDefId`] instead of a
/// reference, so the arena is the only owner. The root class `Object` is
/// created together with the type system and is the only class without a
/// superclass.
#[derive(Debug)]
pub struct TypeSystem<'src> {
    defined_classes: HashMap<Symbol<'src>, ClassDef<'src>>,
    object: ClassDefId<'src>,
}

impl<'src> TypeSystem<'src> {
    pub fn new(strtab: &mut StringTable<'src>) -> TypeSystem<'src> {
        let name = strtab.intern(OBJECT_CLASS_NAME);
        let object = ClassDef {
            name,
            superclass: None,
            methods: HashMap::new(),
            constructor: None,
            is_instantiable: false,
        };

        let mut defined_classes = HashMap::new();
        defined_classes.insert(name, object);

        TypeSystem {
            defined_classes,
            object: ClassDefId { id: name },
        }
    }

    pub fn object(&self) -> ClassDefId<'src> {
        self.object
    }

    pub fn object_type(&self) -> CheckedType<'src> {
        self.object.into()
    }

    /// Registers a class. Its superclass must already be registered, so the
    /// superclass chain of every class ends at `Object` and cannot loop.
    pub fn add_class_def(
        &mut self,
        class_def: ClassDef<'src>,
    ) -> Result<ClassDefId<'src>, DeclarationError> {
        if let Some(superclass) = class_def.superclass {
            if !self.defined_classes.contains_key(&superclass.id) {
                return Err(DeclarationError::ClassDoesNotExist {
                    name: superclass.to_string(),
                    suggestion: Suggestion::none(),
                });
            }
        }

        match self.defined_classes.entry(class_def.name) {
            Entry::Occupied(_) => Err(DeclarationError::ClassAlreadyDeclared {
                name: class_def.name.to_string(),
            }),
            Entry::Vacant(e) => {
                let id = ClassDefId { id: class_def.name };
                log::debug!("declared class {}", id);
                e.insert(class_def);
                Ok(id)
            }
        }
    }

    pub fn class_mut(&mut self, id: ClassDefId<'src>) -> &mut ClassDef<'src> {
        self.defined_classes
            .get_mut(&id.id)
            .expect("Ids always point to existing classes")
    }

    pub fn class(&self, id: ClassDefId<'src>) -> &ClassDef<'src> {
        self.defined_classes
            .get(&id.id)
            .expect("Ids always point to existing classes")
    }

    /// Finds a class by name. A missing class is reported with a suggestion
    /// among the declared class names.
    pub fn resolve_class(&self, name: &str) -> Result<ClassDefId<'src>, DeclarationError> {
        self.defined_classes
            .keys()
            .find(|sym| **sym == name)
            .map(|sym| ClassDefId { id: *sym })
            .ok_or_else(|| DeclarationError::ClassDoesNotExist {
                name: name.to_string(),
                suggestion: Suggestion::from_candidates(name, self.defined_classes.keys().cloned()),
            })
    }

    pub fn class_ids<'a>(&'a self) -> impl Iterator<Item = ClassDefId<'src>> + 'a {
        self.defined_classes.keys().map(|name| ClassDefId { id: *name })
    }

    /// Iterates over `id` and then its superclasses, ending with `Object`.
    pub fn ancestors(&self, id: ClassDefId<'src>) -> Ancestors<'_, 'src> {
        Ancestors {
            type_system: self,
            next: Some(id),
            remaining: self.defined_classes.len(),
        }
    }
}

/// Walks a superclass chain. The walk never takes more steps than there are
/// classes; running out of steps means the chain loops.
pub struct Ancestors<'ts, 'src> {
    type_system: &'ts TypeSystem<'src>,
    next: Option<ClassDefId<'src>>,
    remaining: usize,
}

impl<'ts, 'src> Iterator for Ancestors<'ts, 'src> {
    type Item = &'ts ClassDef<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        if self.remaining == 0 {
            panic!("cyclic class hierarchy involving class {}", id);
        }
        self.remaining -= 1;

        let class = self.type_system.class(id);
        self.next = class.superclass;
        Some(class)
    }
}

/// A `ClassDefId` refers to a class definition.
///
/// Having an instance of this struct ensures that
/// the type system that issued this instance can
/// provide the definition of that class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClassDefId<'src> {
    id: Symbol<'src>,
}

impl<'src> From<ClassDefId<'src>> for CheckedType<'src> {
    fn from(id: ClassDefId<'src>) -> CheckedType<'src> {
        CheckedType::TypeRef(id)
    }
}

impl<'src> fmt::Display for ClassDefId<'src> {
    fn fmt(&self, f: &'_ mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<'src> ClassDefId<'src> {
    pub fn as_str(&self) -> &'src str {
        self.id.as_str()
    }

    pub fn id(&self) -> Symbol<'src> {
        self.id
    }
}

#[derive(Debug)]
pub struct ClassDef<'src> {
    name: Symbol<'src>,
    superclass: Option<ClassDefId<'src>>,
    methods: HashMap<Symbol<'src>, ClassMethodDef<'src>>,
    constructor: Option<ConstructorDef<'src>>,
    /// False for abstract classes and interfaces.
    pub is_instantiable: bool,
}

impl<'src> ClassDef<'src> {
    /// An abstract class without methods. Use [`ClassDef::instantiable`] for
    /// concrete classes.
    pub fn new(name: Symbol<'src>, superclass: ClassDefId<'src>) -> ClassDef<'src> {
        ClassDef {
            name,
            superclass: Some(superclass),
            methods: HashMap::new(),
            constructor: None,
            is_instantiable: false,
        }
    }

    /// A concrete class with the given constructor.
    pub fn instantiable(
        name: Symbol<'src>,
        superclass: ClassDefId<'src>,
        constructor: ConstructorDef<'src>,
    ) -> ClassDef<'src> {
        ClassDef {
            is_instantiable: true,
            constructor: Some(constructor),
            ..ClassDef::new(name, superclass)
        }
    }

    pub fn id(&self) -> ClassDefId<'src> {
        ClassDefId { id: self.name }
    }

    pub fn name(&self) -> Symbol<'src> {
        self.name
    }

    pub fn superclass(&self) -> Option<ClassDefId<'src>> {
        self.superclass
    }

    pub fn add_method(&mut self, method: ClassMethodDef<'src>) -> Result<(), DeclarationError> {
        match self.methods.entry(method.name) {
            Entry::Occupied(_) => {
                return Err(DeclarationError::MethodAlreadyDeclared {
                    class_name: self.name.to_string(),
                    method_name: method.name.to_string(),
                })
            }
            Entry::Vacant(e) => e.insert(method),
        };
        Ok(())
    }

    /// Methods declared by this class itself, not inherited ones.
    pub fn method(&self, name: Symbol<'src>) -> Option<&ClassMethodDef<'src>> {
        self.methods.get(&name)
    }

    pub fn iter_methods<'a>(&'a self) -> impl Iterator<Item = &'a ClassMethodDef<'src>> + 'a {
        self.methods.values()
    }

    /// `None` for an instantiable class means the implicit constructor
    /// without parameters.
    pub fn constructor(&self) -> Option<&ConstructorDef<'src>> {
        self.constructor.as_ref()
    }

    pub fn set_constructor(&mut self, constructor: ConstructorDef<'src>) {
        self.constructor = Some(constructor);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMethodDef<'src> {
    pub name: Symbol<'src>,
    pub params: Vec<CheckedType<'src>>,
    pub return_ty: CheckedType<'src>,
}

impl<'src> ClassMethodDef<'src> {
    pub fn new(
        name: Symbol<'src>,
        params: Vec<CheckedType<'src>>,
        return_ty: CheckedType<'src>,
    ) -> ClassMethodDef<'src> {
        ClassMethodDef {
            name,
            params,
            return_ty,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstructorDef<'src> {
    pub params: Vec<CheckedType<'src>>,
}

impl<'src> ConstructorDef<'src> {
    pub fn new(params: Vec<CheckedType<'src>>) -> ConstructorDef<'src> {
        ConstructorDef { params }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckedType<'src> {
    Void,
    Boolean,
    Int,
    Double,
    /// Type of the `null` literal, the bottom of all reference types.
    Null,
    TypeRef(ClassDefId<'src>),
}

impl<'src> CheckedType<'src> {
    /// Looks up a primitive type or `null` by its keyword.
    pub fn from_keyword(keyword: &str) -> Option<CheckedType<'src>> {
        use self::CheckedType::*;
        match keyword {
            "void" => Some(Void),
            "boolean" => Some(Boolean),
            "int" => Some(Int),
            "double" => Some(Double),
            "null" => Some(Null),
            _ => None,
        }
    }

    pub fn is_subtype_of(&self, other: &CheckedType<'src>, ts: &TypeSystem<'src>) -> bool {
        use self::CheckedType::*;
        match (self, other) {
            _ if self == other => true,
            (Null, TypeRef(_)) => true,
            (TypeRef(class_id), TypeRef(other_id)) => ts
                .ancestors(*class_id)
                .any(|ancestor| ancestor.id() == *other_id),
            _ => false,
        }
    }

    /// Finds the method the nearest class in the superclass chain declares
    /// under `name`.
    pub fn method_named<'ts>(
        &self,
        name: Symbol<'src>,
        ts: &'ts TypeSystem<'src>,
    ) -> Result<&'ts ClassMethodDef<'src>, TypeError> {
        let class_id = match self {
            CheckedType::TypeRef(class_id) => *class_id,
            _ => {
                return Err(TypeError::NoSuchMethod {
                    ty: self.to_string(),
                    method_name: name.to_string(),
                    suggestion: Suggestion::none(),
                })
            }
        };

        ts.ancestors(class_id)
            .find_map(|class| class.method(name))
            .ok_or_else(|| TypeError::NoSuchMethod {
                ty: self.to_string(),
                method_name: name.to_string(),
                suggestion: Suggestion::from_candidates(
                    name.as_str(),
                    ts.ancestors(class_id)
                        .flat_map(|class| class.iter_methods().map(|method| method.name)),
                ),
            })
    }

    pub fn is_instantiable(&self, ts: &TypeSystem<'src>) -> bool {
        match self {
            CheckedType::TypeRef(class_id) => ts.class(*class_id).is_instantiable,
            _ => false,
        }
    }

    /// Parameter types of the constructor. Empty for the implicit
    /// constructor and for types that cannot be instantiated at all.
    pub fn constructor_params<'ts>(&self, ts: &'ts TypeSystem<'src>) -> &'ts [CheckedType<'src>] {
        match self {
            CheckedType::TypeRef(class_id) => ts
                .class(*class_id)
                .constructor()
                .map(|constructor| constructor.params.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }
}

impl<'src> fmt::Display for CheckedType<'src> {
    fn fmt(&self, f: &'_ mut fmt::Formatter<'_>) -> fmt::Result {
        use self::CheckedType::*;
        match self {
            Void => write!(f, "void"),
            Boolean => write!(f, "boolean"),
            Int => write!(f, "int"),
            Double => write!(f, "double"),
            Null => write!(f, "null"),
            TypeRef(name) => write!(f, "{}", name),
        }
    }
}
