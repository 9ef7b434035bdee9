/// Identity of a class type. Two class types are the same type only if they
/// come from the same declaration, so equality is equality of arena ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassId(pub usize);

/// Type descriptor. Field lists of class types live in the symbol table's
/// class arena, addressed by `ClassId`.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    None,
    Int,
    Char,

    /// The distinguished type of the `null` constant.
    Null,

    Class(ClassId),
    Array(Box<Type>),
}

impl Type {
    pub fn array_of(elem: Type) -> Type {
        Type::Array(Box::new(elem))
    }

    pub fn is_ref_type(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_) | Type::Null)
    }

    /// A value of `self` may be stored into a slot of type `dest`.
    pub fn assignable_to(&self, dest: &Type) -> bool {
        self == dest || (*self == Type::Null && matches!(dest, Type::Class(_)))
    }

    /// The two types may be compared with each other.
    pub fn compatible_with(&self, other: &Type) -> bool {
        self == other
            || (*self == Type::Null && other.is_ref_type())
            || (*other == Type::Null && self.is_ref_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_equality_is_structural() {
        assert_eq!(Type::array_of(Type::Int), Type::array_of(Type::Int));
        assert_ne!(Type::array_of(Type::Int), Type::array_of(Type::Char));
    }

    #[test]
    fn class_equality_is_identity() {
        assert_eq!(Type::Class(ClassId(0)), Type::Class(ClassId(0)));
        assert_ne!(Type::Class(ClassId(0)), Type::Class(ClassId(1)));
    }

    #[test]
    fn null_is_assignable_to_classes_only() {
        assert!(Type::Null.assignable_to(&Type::Class(ClassId(3))));
        assert!(!Type::Null.assignable_to(&Type::Int));
        assert!(!Type::Int.assignable_to(&Type::Char));
    }

    #[test]
    fn null_compares_with_reference_types() {
        assert!(Type::Null.compatible_with(&Type::Class(ClassId(0))));
        assert!(Type::array_of(Type::Int).compatible_with(&Type::Null));
        assert!(!Type::Null.compatible_with(&Type::Int));
    }
}
