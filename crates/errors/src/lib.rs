use derive_more::Display;

/// Fixed catalog of diagnostic templates. Every variant carries at most one
/// substitution parameter, already rendered into the message by `Display`.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Message {
    // ----- lexical
    #[display(fmt = "empty character constant")]
    EmptyCharConst,
    #[display(fmt = "undefined escape character sequence '\\{}'", _0)]
    UndefinedEscape(char),
    #[display(fmt = "missing ' at end of character constant")]
    MissingQuote,
    #[display(fmt = "invalid character {}", _0)]
    InvalidChar(char),
    #[display(fmt = "{} too big for integer constant", _0)]
    BigNum(String),
    #[display(fmt = "unexpected end of file in comment")]
    EofInComment,
    #[display(fmt = "unexpected end of file in char")]
    EofInChar,
    #[display(fmt = "illegal line end in character constant")]
    IllegalLineEnd,

    // ----- syntactic
    #[display(fmt = "additive operator (+ or -) expected")]
    AddOp,
    #[display(fmt = "assignment operator (=, +=, -=, *=, /=, %=) expected")]
    AssignOp,
    #[display(fmt = "number or character constant expected")]
    ConstDecl,
    #[display(fmt = "assignment, method call, increment (++) or decrement (--) expected")]
    DesignFollow,
    #[display(
        fmt = "invalid start of factor: identifier, number, character constant, new or ( expected"
    )]
    InvalidFact,
    #[display(fmt = "multiplicative operator (*, /, %) expected")]
    MulOp,
    #[display(fmt = "relational operator (==, !=, >, >=, <, <=) expected")]
    RelOp,
    #[display(fmt = "{} expected", _0)]
    TokenExpected(String),

    // ----- panic-mode recovery
    #[display(fmt = "invalid global declaration")]
    InvalidDecl,
    #[display(
        fmt = "invalid start of statement: identifier, if, while, do, break, return, read, print, '{{' or ; expected"
    )]
    InvalidStat,
    #[display(fmt = "invalid start of method decl: type name or void expected")]
    InvalidMethDecl,

    // ----- name resolution and declarations
    #[display(fmt = "value does not match constant type")]
    ConstType,
    #[display(fmt = "{} already declared", _0)]
    DeclName(String),
    #[display(fmt = "main method must not have any parameters")]
    MainWithParams,
    #[display(fmt = "main method must return void")]
    MainNotVoid,
    #[display(fmt = "{} is not a field", _0)]
    NoField(String),
    #[display(fmt = "type expected")]
    NoType,
    #[display(fmt = "{} not found", _0)]
    NotFound(String),
    #[display(fmt = "too many fields")]
    TooManyFields,
    #[display(fmt = "too many global variables")]
    TooManyGlobals,
    #[display(fmt = "too many local variables")]
    TooManyLocals,

    // ----- operand and type checks
    #[display(fmt = "array index must be an integer")]
    ArrayIndex,
    #[display(fmt = "array size must be an integer")]
    ArraySize,
    #[display(fmt = "cannot store to operand kind {}", _0)]
    CannotAssignTo(String),
    #[display(fmt = "incompatible types")]
    IncompTypes,
    #[display(fmt = "invalid call of void method")]
    InvalidCall,
    #[display(fmt = "mainPC is -1, main not found")]
    MainNotFound,
    #[display(fmt = "indexed object is not an array")]
    NoArray,
    #[display(fmt = "dereferenced object is not a class")]
    NoClass,
    #[display(fmt = "class type expected")]
    NoClassType,
    #[display(fmt = "operand(s) must be of type int")]
    NoIntOperand,
    #[display(fmt = "cannot create code operand for this kind of symbol table object")]
    NoOperand,
    #[display(fmt = "value expected")]
    NoVal,
    #[display(fmt = "can only print int or char values")]
    PrintValue,
    #[display(fmt = "can only read int or char values")]
    ReadValue,

    // ----- methods, calls and control flow
    #[display(fmt = "only (un)equality checks are allowed for reference types")]
    EqCheck,
    #[display(fmt = "methods may only return int or char")]
    InvalidMethReturnType,
    #[display(fmt = "less actual than formal parameters")]
    LessActualParams,
    #[display(fmt = "more actual than formal parameters")]
    MoreActualParams,
    #[display(fmt = "less initializers than fields")]
    LessInitializers,
    #[display(fmt = "more initializers than fields")]
    MoreInitializers,
    #[display(fmt = "break is not within a loop")]
    NoLoop,
    #[display(fmt = "called object is not a method")]
    NoMeth,
    #[display(fmt = "parameter type mismatch")]
    ParamType,
    #[display(fmt = "return expression required")]
    ReturnNoVal,
    #[display(fmt = "return type must match method type")]
    NonMatchingReturnType,
    #[display(fmt = "void method must not return a value")]
    ReturnVoid,
}

/// Ordered, append-only list of formatted diagnostics.
#[derive(Debug, Default)]
pub struct Errors {
    messages: Vec<String>,
}

impl Errors {
    pub fn new() -> Errors {
        Errors {
            messages: Vec::new(),
        }
    }

    pub fn error(&mut self, line: u32, column: u32, message: Message) {
        self.messages
            .push(format!("-- line {} col {}: {}", line, column, message));
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }

    pub fn all(&self) -> &[String] {
        &self.messages
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();

        for message in self.messages.iter() {
            out.push_str(message);
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_position_prefix() {
        let mut errors = Errors::new();

        errors.error(3, 7, Message::NotFound("foo".to_string()));

        assert_eq!(errors.count(), 1);
        assert_eq!(errors.all()[0], "-- line 3 col 7: foo not found");
    }

    #[test]
    fn keeps_insertion_order() {
        let mut errors = Errors::new();

        errors.error(1, 1, Message::MainNotFound);
        errors.error(2, 5, Message::IncompTypes);

        assert_eq!(
            errors.dump(),
            "-- line 1 col 1: mainPC is -1, main not found\n-- line 2 col 5: incompatible types\n"
        );
    }

    #[test]
    fn parameter_is_substituted() {
        assert_eq!(
            Message::DeclName("x".to_string()).to_string(),
            "x already declared"
        );
        assert_eq!(
            Message::UndefinedEscape('q').to_string(),
            "undefined escape character sequence '\\q'"
        );
    }
}
