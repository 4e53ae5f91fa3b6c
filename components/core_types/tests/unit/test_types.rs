//! Unit tests for the process-wide type registry

use core_types::{
    define_type, get_type_by_name, is_a, register_type, registry, type_name, Instance, TypeId,
    Value,
};
use std::sync::Arc;

fn instance_of(ty: TypeId) -> Value {
    Value::Object(Arc::new(Instance::new(ty, vec![])))
}

#[cfg(test)]
mod subtype_tests {
    use super::*;

    #[test]
    fn test_subtype_reflexive_and_transitive() {
        let a = define_type("unit.subtype.A", None).unwrap();
        let b = define_type("unit.subtype.B", Some(a)).unwrap();
        let c = define_type("unit.subtype.C", None).unwrap();
        let b_instance = instance_of(b);

        assert!(is_a(&b_instance, TypeId::OBJECT));
        assert!(is_a(&b_instance, a));
        assert!(is_a(&b_instance, b));
        assert!(!is_a(&b_instance, c));
    }

    #[test]
    fn test_builtin_values() {
        assert!(is_a(&Value::Nil, TypeId::NIL));
        assert!(is_a(&Value::Float(1.0), TypeId::NUMBER));
        assert!(is_a(&Value::Type(TypeId::OBJECT), TypeId::TYPE));
        assert!(!is_a(&Value::Bool(true), TypeId::NUMBER));
    }

    #[test]
    fn test_is_a_unknown_type_is_false() {
        assert!(!is_a(&instance_of(TypeId(u32::MAX)), TypeId::OBJECT));
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let id = define_type("unit.registry.Point", None).unwrap();
        assert_eq!(get_type_by_name("unit.registry.Point"), Some(id));
        assert_eq!(type_name(id).as_deref(), Some("unit.registry.Point"));
        assert_eq!(get_type_by_name("unit.registry.Missing"), None);
    }

    #[test]
    fn test_register_alias_and_replace() {
        let id = define_type("unit.registry.Real", None).unwrap();
        register_type("unit.registry.Alias", id);
        assert_eq!(get_type_by_name("unit.registry.Alias"), Some(id));

        register_type("unit.registry.Alias", TypeId::STRING);
        assert_eq!(get_type_by_name("unit.registry.Alias"), Some(TypeId::STRING));
    }

    #[test]
    fn test_subclasses_are_appended_in_order() {
        let parent = define_type("unit.registry.Parent", None).unwrap();
        let first = define_type("unit.registry.First", Some(parent)).unwrap();
        let second = define_type("unit.registry.Second", Some(parent)).unwrap();
        assert_eq!(registry().subclasses(parent), &[first, second]);
        assert_eq!(registry().parent(second), Some(parent));
    }
}
