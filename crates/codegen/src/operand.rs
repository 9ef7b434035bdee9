use crate::code::CompOp;
use crate::label::Label;

use mjc_errors::Message;
use mjc_symtab::obj::{Obj, ObjKind};
use mjc_symtab::types::Type;

use derive_more::Display;

/// Where a compiled value currently resides. Determines which instructions
/// may load or store it.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Con,
    Local,
    Static,
    Stack,
    Fld,
    Elem,
    Meth,
    Type,
}

/// Descriptor of a value during code generation.
#[derive(Debug, Clone)]
pub struct Operand {
    pub kind: OperandKind,
    pub ty: Type,

    /// Value of a constant operand.
    pub val: i32,

    /// Slot address, field offset or method entry pc.
    pub adr: i32,

    /// Backing symbol of a method operand.
    pub obj: Option<Obj>,
}

impl Operand {
    pub fn constant(val: i32) -> Operand {
        Operand {
            kind: OperandKind::Con,
            ty: Type::Int,
            val,
            adr: 0,
            obj: None,
        }
    }

    /// A value that is already on the expression stack.
    pub fn on_stack(ty: Type) -> Operand {
        Operand {
            kind: OperandKind::Stack,
            ty,
            val: 0,
            adr: 0,
            obj: None,
        }
    }

    pub fn from_obj(obj: &Obj) -> Result<Operand, Message> {
        let kind = match obj.kind {
            ObjKind::Con => {
                return Ok(Operand {
                    kind: OperandKind::Con,
                    ty: obj.ty.clone(),
                    val: obj.val,
                    adr: 0,
                    obj: None,
                })
            }
            ObjKind::Var => {
                if obj.level == 0 {
                    OperandKind::Static
                } else {
                    OperandKind::Local
                }
            }
            ObjKind::Meth => OperandKind::Meth,
            ObjKind::Type => OperandKind::Type,
            ObjKind::Prog => return Err(Message::NoOperand),
        };

        Ok(Operand {
            kind,
            ty: obj.ty.clone(),
            val: 0,
            adr: obj.adr,
            obj: if kind == OperandKind::Meth {
                Some(obj.clone())
            } else {
                None
            },
        })
    }

    pub fn can_be_assigned_to(&self) -> bool {
        matches!(
            self.kind,
            OperandKind::Local | OperandKind::Static | OperandKind::Fld | OperandKind::Elem
        )
    }
}

/// Result of a boolean condition. No boolean value ever reaches the
/// expression stack; `&&` and `||` compose by chaining these jump lists.
#[derive(Debug)]
pub struct Condition {
    /// Comparison that still has to be turned into the final jump.
    pub op: CompOp,

    /// Jump chain taken when the condition evaluates true.
    pub t_label: Label,

    /// Jump chain taken when the condition evaluates false.
    pub f_label: Label,
}

impl Condition {
    pub fn new(op: CompOp) -> Condition {
        Condition {
            op,
            t_label: Label::new(),
            f_label: Label::new(),
        }
    }
}
