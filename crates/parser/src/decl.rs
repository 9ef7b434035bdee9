use crate::{Parser, MAX_FIELDS, MAX_GLOBALS, MAX_LOCALS};

use mjc_codegen::{OpCode, Operand, OperandKind};
use mjc_errors::Message;
use mjc_lexer::token::TokenKind;
use mjc_symtab::obj::{Obj, ObjKind};
use mjc_symtab::types::Type;
use mjc_symtab::ObjHandle;

use thin_vec::ThinVec;

impl<'a> Parser<'a> {
    /// Program = "program" ident { ConstDecl | GlobalVarDecl | ClassDecl
    /// | SingletonDecl } "{" { MethodDecl } "}" .
    pub(crate) fn program(&mut self) {
        self.check(TokenKind::Program);
        self.check(TokenKind::Identifier);

        let name = self.t.text.clone();
        let prog = self.insert(ObjKind::Prog, &name, Type::None);
        self.tab.open_scope();

        // Implicit static initializer at pc 0. Global and singleton
        // initializers are emitted into it as their declarations parse.
        self.insert(ObjKind::Meth, "<clinit>", Type::None);
        self.code.put_op(OpCode::Enter);
        self.code.put(0);
        self.code.put(0);

        loop {
            match self.sym() {
                TokenKind::Final => self.const_decl(),
                TokenKind::Identifier => self.global_var_decl(),
                TokenKind::Class => self.class_decl(),
                TokenKind::Singleton => self.singleton_decl(),
                TokenKind::LBrace | TokenKind::Eof => break,
                _ => self.recover_decl(),
            }
        }
        self.check(TokenKind::LBrace);

        self.code.put_op(OpCode::Exit);
        self.code.put_op(OpCode::Return);

        loop {
            match self.sym() {
                TokenKind::Identifier | TokenKind::Void => self.method_decl(),
                TokenKind::RBrace | TokenKind::Eof => break,
                _ => self.recover_method_decl(),
            }
        }
        self.check(TokenKind::RBrace);

        if self.code.main_pc == -1 {
            self.error(Message::MainNotFound);
        }

        self.code.data_size = self.tab.cur_scope().n_vars() as i32;
        let scope = self.tab.close_scope();
        self.tab.obj_mut(prog).locals = scope.into_locals();
    }

    /// ConstDecl = "final" Type ident "=" ( number | charConst ) ";" .
    pub(crate) fn const_decl(&mut self) {
        self.check(TokenKind::Final);
        let ty = self.type_();
        self.check(TokenKind::Identifier);

        let name = self.t.text.clone();
        let con = self.insert(ObjKind::Con, &name, ty.clone());

        self.check(TokenKind::Assign);
        match self.sym() {
            TokenKind::Number => {
                if ty != Type::Int {
                    self.error(Message::ConstType);
                }
                self.scan();
            }
            TokenKind::CharConst => {
                if ty != Type::Char {
                    self.error(Message::ConstType);
                }
                self.scan();
            }
            _ => self.error(Message::ConstDecl),
        }

        let val = self.t.value;
        self.tab.obj_mut(con).val = val;
        self.check(TokenKind::Semicolon);
    }

    /// GlobalVarDecl = Type ident { "," ident } [ "=" Expr ] ";" .
    /// An initializer value is stored into every declared variable.
    pub(crate) fn global_var_decl(&mut self) {
        let mut decls: ThinVec<ObjHandle> = ThinVec::new();

        let ty = self.type_();
        self.check(TokenKind::Identifier);
        let name = self.t.text.clone();
        decls.push(self.insert(ObjKind::Var, &name, ty.clone()));

        while self.sym() == TokenKind::Comma {
            self.scan();
            self.check(TokenKind::Identifier);
            let name = self.t.text.clone();
            decls.push(self.insert(ObjKind::Var, &name, ty.clone()));
        }

        if self.sym() == TokenKind::Assign {
            self.scan();
            let mut x = self.expr();

            for i in 0..decls.len() {
                let obj = self.tab.obj(decls[i]).clone();
                if i < decls.len() - 1 {
                    // keep a copy on the stack for the next store
                    self.load(&mut x);
                    self.code.put_op(OpCode::Dup);
                }
                let dest = self.operand(&obj);
                self.assign(&dest, &mut x);
            }
        }

        self.check(TokenKind::Semicolon);
        if self.tab.cur_scope().n_vars() > MAX_GLOBALS {
            self.error(Message::TooManyGlobals);
        }
    }

    /// VarDecl = Type ident { "," ident } ";" .
    pub(crate) fn var_decl(&mut self) {
        let ty = self.type_();
        self.check(TokenKind::Identifier);
        let name = self.t.text.clone();
        self.insert(ObjKind::Var, &name, ty.clone());

        while self.sym() == TokenKind::Comma {
            self.scan();
            self.check(TokenKind::Identifier);
            let name = self.t.text.clone();
            self.insert(ObjKind::Var, &name, ty.clone());
        }
        self.check(TokenKind::Semicolon);
    }

    /// ClassDecl = "class" ident "{" { VarDecl } "}" .
    pub(crate) fn class_decl(&mut self) {
        self.check(TokenKind::Class);
        self.check(TokenKind::Identifier);

        let name = self.t.text.clone();
        let class_id = self.tab.new_class();
        self.insert(ObjKind::Type, &name, Type::Class(class_id));

        self.check(TokenKind::LBrace);
        self.tab.open_scope();

        while self.sym() == TokenKind::Identifier {
            self.var_decl();
        }
        if self.tab.cur_scope().n_vars() > MAX_FIELDS {
            self.error(Message::TooManyFields);
        }

        let fields = self.tab.cur_scope().locals().to_vec();
        self.tab.set_class_fields(class_id, fields);

        self.check(TokenKind::RBrace);
        self.tab.close_scope();
    }

    /// SingletonDecl = "singleton" ident "{" { VarDecl } "}"
    /// [ SingletonInitializers ] .
    /// Declares a variable of a fresh class type and allocates the object
    /// eagerly in the static initializer.
    pub(crate) fn singleton_decl(&mut self) {
        self.check(TokenKind::Singleton);
        self.check(TokenKind::Identifier);

        let name = self.t.text.clone();
        let class_id = self.tab.new_class();
        let singleton = self.insert(ObjKind::Var, &name, Type::Class(class_id));

        self.check(TokenKind::LBrace);
        self.tab.open_scope();

        while self.sym() == TokenKind::Identifier {
            self.var_decl();
        }

        let n_fields = self.tab.cur_scope().n_vars();
        self.code.put_op(OpCode::New);
        self.code.put2(n_fields as i32);

        let obj = self.tab.obj(singleton).clone();
        let dest = self.operand(&obj);
        self.assign(&dest, &mut Operand::on_stack(Type::None));

        if n_fields > MAX_FIELDS {
            self.error(Message::TooManyFields);
        }

        let fields = self.tab.cur_scope().locals().to_vec();
        self.tab.set_class_fields(class_id, fields);

        self.check(TokenKind::RBrace);
        self.tab.close_scope();

        if self.sym() == TokenKind::LPar {
            self.singleton_initializers(singleton);
        }
    }

    /// SingletonInitializers = "(" Expr { "," Expr } ")" .
    /// Assigns the values to the singleton's fields in declaration order.
    fn singleton_initializers(&mut self, singleton: ObjHandle) {
        self.check(TokenKind::LPar);

        let obj = self.tab.obj(singleton).clone();
        let fields: Vec<Obj> = match &obj.ty {
            Type::Class(id) => self.tab.class_fields(*id).to_vec(),
            _ => Vec::new(),
        };
        let n_fields = fields.len();
        let mut field_iter = fields.iter();
        let mut n_inits = 0;

        loop {
            let mut owner = self.operand(&obj);
            self.load(&mut owner);

            let mut y = self.expr();
            n_inits += 1;

            if let Some(field) = field_iter.next() {
                if !y.ty.assignable_to(&field.ty) {
                    self.error(Message::ParamType);
                }
                let dest = Operand {
                    kind: OperandKind::Fld,
                    ty: field.ty.clone(),
                    val: 0,
                    adr: field.adr,
                    obj: None,
                };
                self.assign(&dest, &mut y);
            }

            if self.sym() != TokenKind::Comma {
                break;
            }
            self.scan();
        }

        if n_inits > n_fields {
            self.error(Message::MoreInitializers);
        } else if n_inits < n_fields {
            self.error(Message::LessInitializers);
        }
        self.check(TokenKind::RPar);
    }

    /// MethodDecl = ( Type | "void" ) ident "(" [ FormPars ] ")"
    /// { VarDecl } Block .
    pub(crate) fn method_decl(&mut self) {
        let mut ty = Type::None;
        match self.sym() {
            TokenKind::Identifier => {
                ty = self.type_();
                if ty != Type::Int && ty != Type::Char {
                    self.error(Message::InvalidMethReturnType);
                }
            }
            TokenKind::Void => self.scan(),
            _ => self.error(Message::InvalidMethDecl),
        }
        self.check(TokenKind::Identifier);

        let name = self.t.text.clone();
        let meth = self.insert(ObjKind::Meth, &name, ty.clone());
        self.cur_method = meth;

        self.tab.open_scope();
        self.check(TokenKind::LPar);

        let mut n_pars = 0;
        if self.sym() == TokenKind::Identifier {
            n_pars = self.form_pars();
        }
        self.check(TokenKind::RPar);
        self.tab.obj_mut(meth).n_pars = n_pars;

        if name == "main" {
            self.code.main_pc = self.code.pc() as i32;
            if ty != Type::None {
                self.error(Message::MainNotVoid);
            }
            if n_pars != 0 {
                self.error(Message::MainWithParams);
            }
        }

        while self.sym() == TokenKind::Identifier {
            self.var_decl();
        }

        let n_vars = self.tab.cur_scope().n_vars();
        let locals = self.tab.cur_scope().locals().to_vec();
        let entry = self.code.pc() as i32;
        {
            // Entry address and locals must be in place before the body
            // parses so recursive calls resolve against them.
            let obj = self.tab.obj_mut(meth);
            obj.adr = entry;
            obj.locals = locals;
        }

        self.code.put_op(OpCode::Enter);
        self.code.put(n_pars as u8);
        self.code.put(n_vars as u8);

        if name == "main" {
            // Run the static initializer before main's body. The call
            // displacement targets pc 0.
            let mut init = Operand::on_stack(ty.clone());
            init.adr = 0;
            self.code.method_call(&init);
        }

        if n_vars > MAX_LOCALS {
            self.error(Message::TooManyLocals);
        }

        self.block();

        let m_ty = self.tab.obj(meth).ty.clone();
        if m_ty == Type::None {
            self.code.put_op(OpCode::Exit);
            self.code.put_op(OpCode::Return);
        } else {
            // Falling out of a value-returning method traps at runtime.
            self.code.put_op(OpCode::Trap);
            self.code.put(1);
        }

        self.tab.close_scope();
    }

    /// FormPars = Type ident { "," Type ident } .
    fn form_pars(&mut self) -> usize {
        let mut n = 0;

        let ty = self.type_();
        self.check(TokenKind::Identifier);
        n += 1;
        let name = self.t.text.clone();
        self.insert(ObjKind::Var, &name, ty);

        while self.sym() == TokenKind::Comma {
            self.scan();
            let ty = self.type_();
            self.check(TokenKind::Identifier);
            n += 1;
            let name = self.t.text.clone();
            self.insert(ObjKind::Var, &name, ty);
        }

        n
    }

    /// Type = ident [ "[" "]" ] .
    pub(crate) fn type_(&mut self) -> Type {
        self.check(TokenKind::Identifier);
        let name = self.t.text.clone();
        let obj = self.find(&name);

        if obj.kind != ObjKind::Type {
            self.error(Message::NoType);
        }

        let mut ty = obj.ty;
        if self.sym() == TokenKind::LBrack {
            self.scan();
            self.check(TokenKind::RBrack);
            ty = Type::array_of(ty);
        }

        ty
    }
}
