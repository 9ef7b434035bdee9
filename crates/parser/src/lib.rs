mod decl;
mod expr;
mod stmt;

use mjc_codegen::{Code, Label, Operand};
use mjc_errors::{Errors, Message};
use mjc_lexer::token::{Token, TokenKind};
use mjc_lexer::Scanner;
use mjc_symtab::obj::{Obj, ObjKind};
use mjc_symtab::types::Type;
use mjc_symtab::{ObjHandle, Tab};

/// Maximum number of global variables per program.
const MAX_GLOBALS: usize = 32767;

/// Maximum number of fields per class.
const MAX_FIELDS: usize = 32767;

/// Maximum number of local variables (including parameters) per method.
const MAX_LOCALS: usize = 127;

/// Tokens that must be consumed after a reported error before the next
/// diagnostic may be reported.
const MIN_ERROR_DIST: u32 = 3;

/// Recursive-descent driver: one procedure per grammar rule, each consuming
/// tokens, querying or mutating the symbol table, checking types and
/// emitting code inline. One compilation is one `Parser`.
pub struct Parser<'a> {
    scanner: Scanner<'a>,

    pub tab: Tab,
    pub code: Code,

    /// Last recognized token.
    t: Token,

    /// Lookahead token, not yet recognized.
    la: Token,

    /// Tokens consumed since the last reported error.
    error_dist: u32,

    /// Break target of the innermost enclosing loop.
    break_label: Option<Label>,
    break_stack: Vec<Option<Label>>,

    cur_method: ObjHandle,
}

impl<'a> Parser<'a> {
    pub fn new(scanner: Scanner<'a>) -> Parser<'a> {
        Parser {
            scanner,
            tab: Tab::new(),
            code: Code::new(),
            t: Token::new(TokenKind::None, 1, 1),
            // Pseudo token so a scanner error on the very first symbol
            // still has a lookahead to report against.
            la: Token::new(TokenKind::None, 1, 1),
            error_dist: MIN_ERROR_DIST,
            break_label: None,
            break_stack: Vec::new(),
            cur_method: ObjHandle::NONE,
        }
    }

    /// Runs the single compilation pass.
    pub fn parse(&mut self) {
        self.scan();
        self.program();
        self.check(TokenKind::Eof);
    }

    pub fn errors(&self) -> &Errors {
        &self.scanner.errors
    }

    /// Hands out the compilation results, consuming the parser.
    pub fn finish(self) -> (Code, Errors) {
        (self.code, self.scanner.errors)
    }

    // ----- token handling

    pub(crate) fn sym(&self) -> TokenKind {
        self.la.kind
    }

    /// Reads ahead one symbol.
    pub(crate) fn scan(&mut self) {
        self.t = std::mem::replace(&mut self.la, self.scanner.next());
        self.error_dist += 1;
    }

    /// Verifies the lookahead and reads ahead.
    pub(crate) fn check(&mut self, expected: TokenKind) {
        if self.sym() == expected {
            self.scan();
        } else {
            self.error(Message::TokenExpected(expected.label().to_string()));
        }
    }

    /// Reports a diagnostic at the lookahead position. Suppressed while
    /// fewer than `MIN_ERROR_DIST` tokens have been consumed since the last
    /// report, which keeps one malformed construct from cascading.
    pub(crate) fn error(&mut self, message: Message) {
        if self.error_dist >= MIN_ERROR_DIST {
            self.scanner
                .errors
                .error(self.la.line, self.la.column, message);
        }
        self.error_dist = 0;
    }

    // ----- symbol table access, error-reporting wrappers

    pub(crate) fn insert(&mut self, kind: ObjKind, name: &str, ty: Type) -> ObjHandle {
        match self.tab.insert(kind, name, ty) {
            Ok(handle) => handle,
            Err(message) => {
                self.error(message);
                ObjHandle::NONE
            }
        }
    }

    pub(crate) fn find(&mut self, name: &str) -> Obj {
        match self.tab.find(name) {
            Ok(obj) => obj,
            Err(message) => {
                self.error(message);
                Obj::no_obj()
            }
        }
    }

    pub(crate) fn find_field(&mut self, name: &str, ty: &Type) -> Obj {
        match self.tab.find_field(name, ty) {
            Ok(obj) => obj,
            Err(message) => {
                self.error(message);
                Obj::no_obj()
            }
        }
    }

    pub(crate) fn operand(&mut self, obj: &Obj) -> Operand {
        match Operand::from_obj(obj) {
            Ok(x) => x,
            Err(message) => {
                self.error(message);
                Operand::on_stack(obj.ty.clone())
            }
        }
    }

    // ----- emitter access, error-reporting wrappers

    pub(crate) fn load(&mut self, x: &mut Operand) {
        if let Err(message) = self.code.load(x) {
            self.error(message);
        }
    }

    pub(crate) fn assign(&mut self, x: &Operand, y: &mut Operand) {
        if let Err(message) = self.code.assign(x, y) {
            self.error(message);
        }
    }

    pub(crate) fn emit_inc(&mut self, x: &mut Operand, n: i32) {
        if let Err(message) = self.code.inc(x, n) {
            self.error(message);
        }
    }

    pub(crate) fn prepare_compound_lhs(&mut self, x: &mut Operand) {
        if let Err(message) = self.code.prepare_compound_lhs(x) {
            self.error(message);
        }
    }

    // ----- panic-mode recovery

    pub(crate) fn recover_decl(&mut self) {
        self.error(Message::InvalidDecl);
        loop {
            self.scan();
            if matches!(
                self.sym(),
                TokenKind::Final
                    | TokenKind::Identifier
                    | TokenKind::Class
                    | TokenKind::Singleton
                    | TokenKind::LBrace
                    | TokenKind::Eof
            ) {
                break;
            }
        }
        self.error_dist = 0;
    }

    pub(crate) fn recover_method_decl(&mut self) {
        self.error(Message::InvalidMethDecl);
        loop {
            self.scan();
            if matches!(
                self.sym(),
                TokenKind::Identifier | TokenKind::Void | TokenKind::RBrace | TokenKind::Eof
            ) {
                break;
            }
        }
        self.error_dist = 0;
    }

    pub(crate) fn recover_stat(&mut self) {
        self.error(Message::InvalidStat);
        loop {
            self.scan();
            if matches!(
                self.sym(),
                TokenKind::If
                    | TokenKind::While
                    | TokenKind::Break
                    | TokenKind::Return
                    | TokenKind::Read
                    | TokenKind::Print
                    | TokenKind::Semicolon
                    | TokenKind::RBrace
                    | TokenKind::Eof
            ) {
                break;
            }
        }
        self.error_dist = 0;
    }
}

// ----- first sets

pub(crate) fn starts_statement(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::If
            | TokenKind::While
            | TokenKind::Break
            | TokenKind::Return
            | TokenKind::Read
            | TokenKind::Print
            | TokenKind::LBrace
            | TokenKind::Semicolon
    )
}

pub(crate) fn starts_assignop(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::TimesAssign
            | TokenKind::SlashAssign
            | TokenKind::RemAssign
    )
}

pub(crate) fn starts_factor(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::CharConst
            | TokenKind::New
            | TokenKind::LPar
    )
}
