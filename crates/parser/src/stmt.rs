use crate::{starts_assignop, starts_factor, starts_statement, Parser};

use mjc_codegen::{CompOp, Condition, Label, OpCode, Operand, OperandKind};
use mjc_errors::Message;
use mjc_lexer::token::TokenKind;
use mjc_symtab::obj::{Builtin, Obj};
use mjc_symtab::types::Type;

impl<'a> Parser<'a> {
    /// Block = "{" { Statement } "}" .
    pub(crate) fn block(&mut self) {
        self.check(TokenKind::LBrace);
        while self.sym() != TokenKind::RBrace && self.sym() != TokenKind::Eof {
            if starts_statement(self.sym()) {
                self.statement();
            } else {
                self.recover_stat();
            }
        }
        self.check(TokenKind::RBrace);
    }

    pub(crate) fn statement(&mut self) {
        match self.sym() {
            TokenKind::Identifier => {
                let mut x = self.designator();

                if starts_assignop(self.sym()) {
                    if !x.can_be_assigned_to() {
                        self.error(Message::CannotAssignTo(x.kind.to_string()));
                    }

                    let op = self.assignop();
                    if matches!(
                        op,
                        OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Rem
                    ) {
                        self.prepare_compound_lhs(&mut x);
                    }
                    let mut y = self.expr();

                    if op != OpCode::Store && (x.ty != Type::Int || y.ty != Type::Int) {
                        self.error(Message::NoIntOperand);
                    }

                    if y.ty.assignable_to(&x.ty) {
                        match op {
                            OpCode::Store => self.assign(&x, &mut y),
                            OpCode::Add
                            | OpCode::Sub
                            | OpCode::Mul
                            | OpCode::Div
                            | OpCode::Rem => {
                                self.load(&mut y);
                                self.code.put_op(op);
                                self.assign(&x, &mut y);
                            }
                            _ => {}
                        }
                    } else {
                        self.error(Message::IncompTypes);
                    }
                } else if self.sym() == TokenKind::LPar {
                    self.act_pars(&mut x);
                    self.code.method_call(&x);
                    if x.ty != Type::None {
                        // discard the unused return value
                        self.code.put_op(OpCode::Pop);
                    }
                } else if self.sym() == TokenKind::PlusPlus {
                    if !x.can_be_assigned_to() {
                        self.error(Message::CannotAssignTo(x.kind.to_string()));
                    }
                    if x.ty != Type::Int {
                        self.error(Message::NoIntOperand);
                    }
                    self.scan();
                    self.emit_inc(&mut x, 1);
                } else if self.sym() == TokenKind::MinusMinus {
                    if !x.can_be_assigned_to() {
                        self.error(Message::CannotAssignTo(x.kind.to_string()));
                    }
                    if x.ty != Type::Int {
                        self.error(Message::NoIntOperand);
                    }
                    self.scan();
                    self.emit_inc(&mut x, -1);
                } else {
                    self.error(Message::DesignFollow);
                }
                self.check(TokenKind::Semicolon);
            }

            TokenKind::If => {
                self.scan();
                self.check(TokenKind::LPar);
                let mut x = self.condition();
                self.check(TokenKind::RPar);
                self.code.f_jump(x.op, &mut x.f_label);
                x.t_label.here(&mut self.code);
                self.statement();
                if self.sym() == TokenKind::Else {
                    let mut end = Label::new();
                    self.code.jump(&mut end);
                    x.f_label.here(&mut self.code);
                    self.scan();
                    self.statement();
                    end.here(&mut self.code);
                } else {
                    x.f_label.here(&mut self.code);
                }
            }

            TokenKind::While => {
                self.scan();
                let enclosing = self.break_label.take();
                self.break_stack.push(enclosing);
                self.break_label = Some(Label::new());

                self.check(TokenKind::LPar);
                let mut top = Label::new();
                top.here(&mut self.code);
                let mut x = self.condition();
                self.code.f_jump(x.op, &mut x.f_label);
                x.t_label.here(&mut self.code);
                self.check(TokenKind::RPar);
                self.statement();
                self.code.jump(&mut top);
                x.f_label.here(&mut self.code);

                if let Some(mut label) = self.break_label.take() {
                    label.here(&mut self.code);
                }
                self.break_label = self.break_stack.pop().unwrap_or(None);
            }

            TokenKind::Break => {
                self.scan();
                match self.break_label.take() {
                    Some(mut label) => {
                        self.code.jump(&mut label);
                        self.break_label = Some(label);
                    }
                    None => self.error(Message::NoLoop),
                }
                self.check(TokenKind::Semicolon);
            }

            TokenKind::Return => {
                self.scan();
                let m_ty = self.tab.obj(self.cur_method).ty.clone();
                if self.sym() == TokenKind::Minus || starts_factor(self.sym()) {
                    if m_ty == Type::None {
                        self.error(Message::ReturnVoid);
                    }
                    let mut x = self.expr();
                    self.load(&mut x);
                    if !x.ty.assignable_to(&m_ty) {
                        self.error(Message::NonMatchingReturnType);
                    }
                } else if m_ty != Type::None {
                    self.error(Message::ReturnNoVal);
                }
                self.code.put_op(OpCode::Exit);
                self.code.put_op(OpCode::Return);
                self.check(TokenKind::Semicolon);
            }

            TokenKind::Read => {
                self.scan();
                self.check(TokenKind::LPar);
                let x = self.designator();
                if !x.can_be_assigned_to() {
                    self.error(Message::CannotAssignTo(x.kind.to_string()));
                }

                if x.ty == Type::Int {
                    self.code.put_op(OpCode::Read);
                    self.assign(&x, &mut Operand::on_stack(Type::Int));
                } else if x.ty == Type::Char {
                    self.code.put_op(OpCode::BRead);
                    self.assign(&x, &mut Operand::on_stack(Type::Char));
                } else {
                    self.error(Message::ReadValue);
                }

                self.check(TokenKind::RPar);
                self.check(TokenKind::Semicolon);
            }

            TokenKind::Print => {
                self.scan();
                self.check(TokenKind::LPar);
                let mut x = self.expr();
                self.load(&mut x);

                let mut width = 0;
                if self.sym() == TokenKind::Comma {
                    self.scan();
                    self.check(TokenKind::Number);
                    width = self.t.value;
                }
                self.code.load_const(width);

                if x.ty == Type::Int {
                    self.code.put_op(OpCode::Print);
                } else if x.ty == Type::Char {
                    self.code.put_op(OpCode::BPrint);
                } else {
                    self.error(Message::PrintValue);
                }

                self.check(TokenKind::RPar);
                self.check(TokenKind::Semicolon);
            }

            TokenKind::LBrace => self.block(),
            TokenKind::Semicolon => self.scan(),
            TokenKind::None => {}

            _ => self.error(Message::InvalidStat),
        }
    }

    /// Assignop = "=" | "+=" | "-=" | "*=" | "/=" | "%=" .
    /// Returns the arithmetic opcode of a compound assignment, `Store` for
    /// plain assignment.
    fn assignop(&mut self) -> OpCode {
        let op = match self.sym() {
            TokenKind::Assign => OpCode::Store,
            TokenKind::PlusAssign => OpCode::Add,
            TokenKind::MinusAssign => OpCode::Sub,
            TokenKind::TimesAssign => OpCode::Mul,
            TokenKind::SlashAssign => OpCode::Div,
            TokenKind::RemAssign => OpCode::Rem,
            _ => {
                self.error(Message::AssignOp);
                return OpCode::Nop;
            }
        };
        self.scan();
        op
    }

    /// ActPars = "(" [ Expr { "," Expr } ] ")" .
    /// Loads the arguments in order and checks them against the formal
    /// parameters of the callee.
    pub(crate) fn act_pars(&mut self, x: &mut Operand) {
        self.check(TokenKind::LPar);

        if x.kind != OperandKind::Meth {
            self.error(Message::NoMeth);
            x.obj = Some(Obj::no_obj());
        }
        let obj = match &x.obj {
            Some(obj) => obj.clone(),
            None => Obj::no_obj(),
        };
        // `len` accepts any array; its formal is typed as arr of none.
        let is_len = obj.builtin == Some(Builtin::Len);
        let n_formal = obj.n_pars;

        let mut formals = obj.locals.iter();
        let mut fp = formals.next();
        let mut n_actual = 0;

        if self.sym() == TokenKind::Minus || starts_factor(self.sym()) {
            let mut y = self.expr();
            self.load(&mut y);
            n_actual += 1;
            if let Some(f) = fp {
                if !is_len && !y.ty.assignable_to(&f.ty) {
                    self.error(Message::ParamType);
                }
            }

            while self.sym() == TokenKind::Comma {
                self.scan();
                let mut y = self.expr();
                self.load(&mut y);
                n_actual += 1;
                fp = formals.next();
                if let Some(f) = fp {
                    if !y.ty.assignable_to(&f.ty) {
                        self.error(Message::ParamType);
                    }
                }
            }
        }

        if n_actual > n_formal {
            self.error(Message::MoreActualParams);
        } else if n_actual < n_formal {
            self.error(Message::LessActualParams);
        }
        self.check(TokenKind::RPar);
    }

    /// Condition = CondTerm { "||" CondTerm } .
    /// The true chain of the whole condition accumulates one taken jump per
    /// `||`; the false chain is the last term's.
    pub(crate) fn condition(&mut self) -> Condition {
        let mut x = self.cond_term();
        while self.sym() == TokenKind::Or {
            self.code.t_jump(x.op, &mut x.t_label);
            self.scan();
            x.f_label.here(&mut self.code);
            let y = self.cond_term();
            x.f_label = y.f_label;
            x.op = y.op;
        }
        x
    }

    /// CondTerm = CondFact { "&&" CondFact } .
    fn cond_term(&mut self) -> Condition {
        let mut x = self.cond_fact();
        while self.sym() == TokenKind::And {
            self.code.f_jump(x.op, &mut x.f_label);
            self.scan();
            let y = self.cond_fact();
            x.op = y.op;
        }
        x
    }

    /// CondFact = Expr Relop Expr .
    fn cond_fact(&mut self) -> Condition {
        let mut x = self.expr();
        self.load(&mut x);
        let op = self.relop();
        let mut y = self.expr();
        self.load(&mut y);

        if !x.ty.compatible_with(&y.ty) {
            self.error(Message::IncompTypes);
        }
        if x.ty.is_ref_type() && op != CompOp::Eq && op != CompOp::Ne {
            self.error(Message::EqCheck);
        }

        Condition::new(op)
    }

    /// Relop = "==" | "!=" | ">" | ">=" | "<" | "<=" .
    fn relop(&mut self) -> CompOp {
        let op = match self.sym() {
            TokenKind::Eql => CompOp::Eq,
            TokenKind::Neq => CompOp::Ne,
            TokenKind::Gtr => CompOp::Gt,
            TokenKind::Geq => CompOp::Ge,
            TokenKind::Lss => CompOp::Lt,
            TokenKind::Leq => CompOp::Le,
            _ => {
                self.error(Message::RelOp);
                return CompOp::Eq;
            }
        };
        self.scan();
        op
    }
}
