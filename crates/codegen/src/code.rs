use crate::label::Label;
use crate::operand::{Operand, OperandKind};

use mjc_errors::Message;
use mjc_symtab::obj::Builtin;
use mjc_symtab::types::Type;

use std::io;

/// Dense, 1-based opcode catalog of the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Load = 1,
    Load0,
    Load1,
    Load2,
    Load3,
    Store,
    Store0,
    Store1,
    Store2,
    Store3,
    GetStatic,
    PutStatic,
    GetField,
    PutField,
    Const0,
    Const1,
    Const2,
    Const3,
    Const4,
    Const5,
    ConstM1,
    Const,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Shl,
    Shr,
    Inc,
    New,
    NewArray,
    ALoad,
    AStore,
    BALoad,
    BAStore,
    ArrayLength,
    Pop,
    Dup,
    Dup2,
    Jmp,
    Jeq,
    Jne,
    Jlt,
    Jle,
    Jgt,
    Jge,
    Call,
    Return,
    Enter,
    Exit,
    Read,
    Print,
    BRead,
    BPrint,
    Trap,
    Nop,
}

impl OpCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Comparison operators of conditional jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompOp {
    pub fn invert(self) -> CompOp {
        match self {
            CompOp::Eq => CompOp::Ne,
            CompOp::Ne => CompOp::Eq,
            CompOp::Lt => CompOp::Ge,
            CompOp::Le => CompOp::Gt,
            CompOp::Gt => CompOp::Le,
            CompOp::Ge => CompOp::Lt,
        }
    }

    pub fn jump_opcode(self) -> OpCode {
        match self {
            CompOp::Eq => OpCode::Jeq,
            CompOp::Ne => OpCode::Jne,
            CompOp::Lt => OpCode::Jlt,
            CompOp::Le => OpCode::Jle,
            CompOp::Gt => OpCode::Jgt,
            CompOp::Ge => OpCode::Jge,
        }
    }
}

/// Growable bytecode buffer plus the two header values the parser fills in
/// while it walks the program.
pub struct Code {
    buf: Vec<u8>,

    /// Entry pc of `main`, -1 while not yet fixed.
    pub main_pc: i32,

    /// Static data size in words.
    pub data_size: i32,
}

impl Code {
    pub fn new() -> Code {
        Code {
            buf: Vec::with_capacity(100),
            main_pc: -1,
            data_size: 0,
        }
    }

    /// Next free offset in the buffer.
    pub fn pc(&self) -> usize {
        self.buf.len()
    }

    pub fn buf(&self) -> &[u8] {
        &self.buf
    }

    // ----- code storage management

    pub fn put(&mut self, x: u8) {
        self.buf.push(x);
    }

    pub fn put_op(&mut self, op: OpCode) {
        self.put(op.code());
    }

    pub fn put2(&mut self, x: i32) {
        self.put((x >> 8) as u8);
        self.put(x as u8);
    }

    pub fn put4(&mut self, x: i32) {
        self.put2(x >> 16);
        self.put2(x);
    }

    /// Overwrites a previously emitted 2-byte field without moving the pc.
    pub fn put2_at(&mut self, pos: usize, x: i32) {
        self.buf[pos] = (x >> 8) as u8;
        self.buf[pos + 1] = x as u8;
    }

    // ----- value loading and storing

    /// Pushes the operand's value with the cheapest fitting instruction.
    /// The operand ends up with kind `Stack` in every case, even after a
    /// reported error, so dependent analysis continues.
    pub fn load(&mut self, x: &mut Operand) -> Result<(), Message> {
        let result = match x.kind {
            OperandKind::Con => {
                self.load_const(x.val);
                Ok(())
            }
            OperandKind::Local => {
                match x.adr {
                    0 => self.put_op(OpCode::Load0),
                    1 => self.put_op(OpCode::Load1),
                    2 => self.put_op(OpCode::Load2),
                    3 => self.put_op(OpCode::Load3),
                    _ => {
                        self.put_op(OpCode::Load);
                        self.put(x.adr as u8);
                    }
                }
                Ok(())
            }
            OperandKind::Static => {
                self.put_op(OpCode::GetStatic);
                self.put2(x.adr);
                Ok(())
            }
            OperandKind::Stack => Ok(()),
            OperandKind::Fld => {
                self.put_op(OpCode::GetField);
                self.put2(x.adr);
                Ok(())
            }
            OperandKind::Elem => {
                if x.ty == Type::Char {
                    self.put_op(OpCode::BALoad);
                } else {
                    self.put_op(OpCode::ALoad);
                }
                Ok(())
            }
            OperandKind::Meth | OperandKind::Type => Err(Message::NoVal),
        };

        x.kind = OperandKind::Stack;

        result
    }

    pub fn load_const(&mut self, n: i32) {
        match n {
            -1 => self.put_op(OpCode::ConstM1),
            0 => self.put_op(OpCode::Const0),
            1 => self.put_op(OpCode::Const1),
            2 => self.put_op(OpCode::Const2),
            3 => self.put_op(OpCode::Const3),
            4 => self.put_op(OpCode::Const4),
            5 => self.put_op(OpCode::Const5),
            _ => {
                self.put_op(OpCode::Const);
                self.put4(n);
            }
        }
    }

    /// Generates `x = y`. The store form mirrors `load`'s dispatch on the
    /// destination kind.
    pub fn assign(&mut self, x: &Operand, y: &mut Operand) -> Result<(), Message> {
        self.load(y)?;

        match x.kind {
            OperandKind::Local => {
                match x.adr {
                    0 => self.put_op(OpCode::Store0),
                    1 => self.put_op(OpCode::Store1),
                    2 => self.put_op(OpCode::Store2),
                    3 => self.put_op(OpCode::Store3),
                    _ => {
                        self.put_op(OpCode::Store);
                        self.put(x.adr as u8);
                    }
                }
                Ok(())
            }
            OperandKind::Static => {
                self.put_op(OpCode::PutStatic);
                self.put2(x.adr);
                Ok(())
            }
            OperandKind::Fld => {
                self.put_op(OpCode::PutField);
                self.put2(x.adr);
                Ok(())
            }
            OperandKind::Elem => {
                if x.ty == Type::Char {
                    self.put_op(OpCode::BAStore);
                } else {
                    self.put_op(OpCode::AStore);
                }
                Ok(())
            }
            // The parser rejects these before calling; fallback check.
            _ => Err(Message::CannotAssignTo(x.kind.to_string())),
        }
    }

    /// Increments `x` by `n`. Locals get the fused instruction; any other
    /// storable kind goes through the duplicate-address/load/add/store path
    /// so the address is computed exactly once.
    pub fn inc(&mut self, x: &mut Operand, n: i32) -> Result<(), Message> {
        if x.kind == OperandKind::Local {
            self.put_op(OpCode::Inc);
            self.put(x.adr as u8);
            self.put(n as u8);
            return Ok(());
        }

        self.prepare_compound_lhs(x)?;
        self.load_const(n);
        self.put_op(OpCode::Add);
        self.assign(x, &mut Operand::on_stack(Type::Int))
    }

    /// Loads the left-hand side of a compound assignment while keeping its
    /// addressing on the stack: a field address is duplicated, an array
    /// base+index pair is duplicated as two words. The operand keeps its
    /// original kind so the following store still knows where to put the
    /// result.
    pub fn prepare_compound_lhs(&mut self, x: &mut Operand) -> Result<(), Message> {
        let kind = x.kind;

        match kind {
            OperandKind::Fld => self.put_op(OpCode::Dup),
            OperandKind::Elem => self.put_op(OpCode::Dup2),
            _ => {}
        }

        let result = self.load(x);
        x.kind = kind;

        result
    }

    // ----- calls and jumps

    /// Emits the call for an already loaded argument list. The conversion
    /// builtins compile to nothing, `len` to one instruction, everything
    /// else to a pc-relative call.
    pub fn method_call(&mut self, x: &Operand) {
        match x.obj.as_ref().and_then(|obj| obj.builtin) {
            Some(Builtin::Chr) | Some(Builtin::Ord) => {}
            Some(Builtin::Len) => self.put_op(OpCode::ArrayLength),
            None => {
                self.put_op(OpCode::Call);
                let from = self.pc() as i32 - 1;
                self.put2(x.adr - from);
            }
        }
    }

    pub fn jump(&mut self, label: &mut Label) {
        self.put_op(OpCode::Jmp);
        label.put(self);
    }

    /// Conditional jump taken when the comparison holds.
    pub fn t_jump(&mut self, op: CompOp, to: &mut Label) {
        self.put_op(op.jump_opcode());
        to.put(self);
    }

    /// Conditional jump taken when the comparison fails; emits the inverted
    /// comparison.
    pub fn f_jump(&mut self, op: CompOp, to: &mut Label) {
        self.put_op(op.invert().jump_opcode());
        to.put(self);
    }

    // ----- output

    /// Serializes the fixed 14-byte header followed by the code bytes.
    pub fn write(&self, out: &mut impl io::Write) -> io::Result<()> {
        out.write_all(&[b'M', b'J'])?;
        out.write_all(&(self.pc() as i32).to_be_bytes())?;
        out.write_all(&self.data_size.to_be_bytes())?;
        out.write_all(&self.main_pc.to_be_bytes())?;
        out.write_all(&self.buf)?;
        out.flush()
    }
}

impl Default for Code {
    fn default() -> Code {
        Code::new()
    }
}
