use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Con,
    Var,
    Type,
    Meth,
    Prog,
}

/// Universe pseudo-methods that compile to special code at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// int-to-char conversion, compiles to nothing.
    Chr,
    /// char-to-int conversion, compiles to nothing.
    Ord,
    /// array length, compiles to one instruction.
    Len,
}

/// A declared name. Kind-specific fields keep their defaults for the kinds
/// they do not apply to.
#[derive(Debug, Clone)]
pub struct Obj {
    pub kind: ObjKind,
    pub name: String,
    pub ty: Type,

    /// Value of a constant.
    pub val: i32,

    /// Slot address of a variable, entry pc of a method.
    pub adr: i32,

    /// Nesting level of a variable; globals live on level 0.
    pub level: i32,

    /// Number of formal parameters of a method.
    pub n_pars: usize,

    /// Parameters and locals of a method, in declaration order.
    pub locals: Vec<Obj>,

    pub builtin: Option<Builtin>,
}

impl Obj {
    pub fn new(kind: ObjKind, name: &str, ty: Type) -> Obj {
        Obj {
            kind,
            name: name.to_string(),
            ty,
            val: 0,
            adr: 0,
            level: 0,
            n_pars: 0,
            locals: Vec::new(),
            builtin: None,
        }
    }

    /// Sentinel substituted after "not found" and "already declared" so
    /// dependent analysis keeps going without follow-up errors.
    pub fn no_obj() -> Obj {
        Obj::new(ObjKind::Var, "noObj", Type::None)
    }
}
