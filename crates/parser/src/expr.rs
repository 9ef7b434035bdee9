use crate::Parser;

use mjc_codegen::{OpCode, Operand, OperandKind};
use mjc_errors::Message;
use mjc_lexer::token::TokenKind;
use mjc_symtab::obj::ObjKind;
use mjc_symtab::types::Type;

impl<'a> Parser<'a> {
    /// Expr = [ "-" ] Term { Addop Term } .
    /// A negated constant folds into the operand; anything else emits `neg`.
    pub(crate) fn expr(&mut self) -> Operand {
        let mut x;
        if self.sym() == TokenKind::Minus {
            self.scan();
            x = self.term();

            if x.ty != Type::Int {
                self.error(Message::NoIntOperand);
            }

            if x.kind == OperandKind::Con {
                x.val = -x.val;
            } else {
                self.load(&mut x);
                self.code.put_op(OpCode::Neg);
            }
        } else {
            x = self.term();
        }

        while self.sym() == TokenKind::Plus || self.sym() == TokenKind::Minus {
            let op = self.addop();
            self.load(&mut x);
            let mut y = self.term();
            self.load(&mut y);
            if x.ty != Type::Int || y.ty != Type::Int {
                self.error(Message::NoIntOperand);
            }
            self.code.put_op(op);
        }

        x
    }

    /// Term = Factor { Mulop Factor } .
    fn term(&mut self) -> Operand {
        let mut x = self.factor();

        while matches!(
            self.sym(),
            TokenKind::Times | TokenKind::Slash | TokenKind::Rem
        ) {
            let op = self.mulop();
            self.load(&mut x);
            let mut y = self.factor();
            self.load(&mut y);
            if x.ty != Type::Int || y.ty != Type::Int {
                self.error(Message::NoIntOperand);
            }
            self.code.put_op(op);
        }

        x
    }

    /// Factor = Designator [ ActPars ] | number | charConst
    /// | "new" ident [ "[" Expr "]" ] | "(" Expr ")" .
    fn factor(&mut self) -> Operand {
        match self.sym() {
            TokenKind::Identifier => {
                let mut x = self.designator();
                if self.sym() == TokenKind::LPar {
                    if x.kind != OperandKind::Meth {
                        self.error(Message::NoMeth);
                    } else if x.ty == Type::None {
                        self.error(Message::InvalidCall);
                    }
                    self.act_pars(&mut x);
                    self.code.method_call(&x);
                    x.kind = OperandKind::Stack;
                }
                x
            }
            TokenKind::Number => {
                self.scan();
                Operand::constant(self.t.value)
            }
            TokenKind::CharConst => {
                self.scan();
                let mut x = Operand::constant(self.t.value);
                x.ty = Type::Char;
                x
            }
            TokenKind::New => {
                self.scan();
                self.check(TokenKind::Identifier);
                let name = self.t.text.clone();
                let obj = self.find(&name);
                if obj.kind != ObjKind::Type {
                    self.error(Message::NoType);
                }
                let mut ty = obj.ty.clone();

                if self.sym() == TokenKind::LBrack {
                    self.scan();
                    let mut x = self.expr();
                    if x.ty != Type::Int {
                        self.error(Message::ArraySize);
                    }
                    self.load(&mut x);
                    self.code.put_op(OpCode::NewArray);
                    // element width tag: 0 for byte-sized char, 1 for word
                    if ty == Type::Char {
                        self.code.put(0);
                    } else {
                        self.code.put(1);
                    }
                    ty = Type::array_of(ty);
                    self.check(TokenKind::RBrack);
                } else {
                    match &ty {
                        Type::Class(id) => {
                            let n_fields = self.tab.class_fields(*id).len();
                            self.code.put_op(OpCode::New);
                            self.code.put2(n_fields as i32);
                        }
                        _ => {
                            self.error(Message::NoClassType);
                            self.code.put_op(OpCode::New);
                            self.code.put2(0);
                        }
                    }
                }

                Operand::on_stack(ty)
            }
            TokenKind::LPar => {
                self.scan();
                let x = self.expr();
                self.check(TokenKind::RPar);
                x
            }
            _ => {
                self.error(Message::InvalidFact);
                Operand::on_stack(Type::Int)
            }
        }
    }

    /// Designator = ident { "." ident | "[" Expr "]" } .
    /// Field and element selectors load the base reference (and index) and
    /// leave an addressed `Fld`/`Elem` operand.
    pub(crate) fn designator(&mut self) -> Operand {
        self.check(TokenKind::Identifier);
        let name = self.t.text.clone();
        let obj = self.find(&name);
        let mut x = self.operand(&obj);

        while self.sym() == TokenKind::Period || self.sym() == TokenKind::LBrack {
            if self.sym() == TokenKind::Period {
                if !matches!(x.ty, Type::Class(_)) {
                    self.error(Message::NoClass);
                }
                self.scan();
                self.load(&mut x);
                self.check(TokenKind::Identifier);
                let name = self.t.text.clone();
                let field = self.find_field(&name, &x.ty);
                x.kind = OperandKind::Fld;
                x.ty = field.ty;
                x.adr = field.adr;
            } else {
                self.scan();
                self.load(&mut x);
                let mut y = self.expr();
                let elem_ty = match &x.ty {
                    Type::Array(elem) => (**elem).clone(),
                    _ => {
                        self.error(Message::NoArray);
                        Type::None
                    }
                };
                if y.ty != Type::Int {
                    self.error(Message::ArrayIndex);
                }
                self.load(&mut y);
                x.kind = OperandKind::Elem;
                x.ty = elem_ty;
                self.check(TokenKind::RBrack);
            }
        }

        x
    }

    /// Addop = "+" | "-" .
    fn addop(&mut self) -> OpCode {
        let op = match self.sym() {
            TokenKind::Plus => OpCode::Add,
            TokenKind::Minus => OpCode::Sub,
            _ => {
                self.error(Message::AddOp);
                return OpCode::Nop;
            }
        };
        self.scan();
        op
    }

    /// Mulop = "*" | "/" | "%" .
    fn mulop(&mut self) -> OpCode {
        let op = match self.sym() {
            TokenKind::Times => OpCode::Mul,
            TokenKind::Slash => OpCode::Div,
            TokenKind::Rem => OpCode::Rem,
            _ => {
                self.error(Message::MulOp);
                return OpCode::Nop;
            }
        };
        self.scan();
        op
    }
}
