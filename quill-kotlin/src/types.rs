//! Well-known Kotlin types.

use quill_core::{ClassName, TypeName};

pub fn any() -> ClassName {
    ClassName::new("kotlin", "Any")
}

/// `kotlin.Any?`, the implicit upper bound of every type variable.
pub fn nullable_any() -> TypeName {
    any().to_type().nullable()
}

pub fn unit() -> ClassName {
    ClassName::new("kotlin", "Unit")
}

pub fn string() -> ClassName {
    ClassName::new("kotlin", "String")
}

pub fn int() -> ClassName {
    ClassName::new("kotlin", "Int")
}

pub fn long() -> ClassName {
    ClassName::new("kotlin", "Long")
}

pub fn boolean() -> ClassName {
    ClassName::new("kotlin", "Boolean")
}

pub fn double() -> ClassName {
    ClassName::new("kotlin", "Double")
}

pub fn list() -> ClassName {
    ClassName::new("kotlin.collections", "List")
}

pub fn mutable_list() -> ClassName {
    ClassName::new("kotlin.collections", "MutableList")
}

pub fn map() -> ClassName {
    ClassName::new("kotlin.collections", "Map")
}

pub fn set() -> ClassName {
    ClassName::new("kotlin.collections", "Set")
}

pub(crate) fn is_unit(ty: &TypeName) -> bool {
    matches!(ty, TypeName::Class { class, nullable: false } if *class == unit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unit() {
        assert!(is_unit(&unit().to_type()));
        assert!(!is_unit(&unit().to_type().nullable()));
        assert!(!is_unit(&string().to_type()));
    }
}
