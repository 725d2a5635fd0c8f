use crate::type_system::*;
use strtab::StringTable;

/// A minimal `java.lang` prelude: the usual `Object` methods and a `String`
/// class to return from `toString()`.
pub struct BuiltinTypes<'src> {
    pub object: CheckedType<'src>,
    pub string: CheckedType<'src>,
}

impl<'src> BuiltinTypes<'src> {
    pub fn add_to(
        type_system: &mut TypeSystem<'src>,
        strtab: &mut StringTable<'src>,
    ) -> Result<BuiltinTypes<'src>, DeclarationError> {
        let object_id = type_system.object();
        let object: CheckedType<'src> = object_id.into();

        let string_id = {
            let mut string_class_def = ClassDef::instantiable(
                strtab.intern("String"),
                object_id,
                ConstructorDef::default(),
            );
            string_class_def.add_method(ClassMethodDef::new(
                strtab.intern("length"),
                vec![],
                CheckedType::Int,
            ))?;
            let string: CheckedType<'src> = string_class_def.id().into();
            string_class_def.add_method(ClassMethodDef::new(
                strtab.intern("concat"),
                vec![string],
                string,
            ))?;
            type_system.add_class_def(string_class_def)?
        };
        let string: CheckedType<'src> = string_id.into();

        let object_class_def = type_system.class_mut(object_id);
        object_class_def.add_method(ClassMethodDef::new(
            strtab.intern("toString"),
            vec![],
            string,
        ))?;
        object_class_def.add_method(ClassMethodDef::new(
            strtab.intern("equals"),
            vec![object],
            CheckedType::Boolean,
        ))?;
        object_class_def.add_method(ClassMethodDef::new(
            strtab.intern("hashCode"),
            vec![],
            CheckedType::Int,
        ))?;

        Ok(BuiltinTypes { object, string })
    }
}
