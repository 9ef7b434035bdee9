pub mod code;
pub mod label;
pub mod operand;

pub use code::{Code, CompOp, OpCode};
pub use label::Label;
pub use operand::{Condition, Operand, OperandKind};
