use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,

    /// Lexeme of identifiers, numbers and character constants.
    pub text: String,

    /// Numeric value of numbers and character constants.
    pub value: i32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, column: u32) -> Token {
        Token {
            kind,
            line,
            column,
            text: String::new(),
            value: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    None,

    Identifier,
    Number,
    CharConst,

    // Keywords
    Program,
    Class,
    Singleton,
    If,
    Else,
    While,
    Read,
    Print,
    Return,
    Break,
    Void,
    Final,
    New,

    // Operators
    Plus,
    Minus,
    Times,
    Slash,
    Rem,
    PlusPlus,
    MinusMinus,
    PlusAssign,
    MinusAssign,
    TimesAssign,
    SlashAssign,
    RemAssign,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    And,
    Or,
    Assign,

    // Punctuation
    Semicolon,
    Comma,
    Period,
    LPar,
    RPar,
    LBrack,
    RBrack,
    LBrace,
    RBrace,

    Eof,
}

impl TokenKind {
    /// Label used in "X expected" diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            TokenKind::None => "none",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::CharConst => "character constant",
            TokenKind::Program => "program",
            TokenKind::Class => "class",
            TokenKind::Singleton => "singleton",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Read => "read",
            TokenKind::Print => "print",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Void => "void",
            TokenKind::Final => "final",
            TokenKind::New => "new",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Slash => "/",
            TokenKind::Rem => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::TimesAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::Eql => "==",
            TokenKind::Neq => "!=",
            TokenKind::Lss => "<",
            TokenKind::Leq => "<=",
            TokenKind::Gtr => ">",
            TokenKind::Geq => ">=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Assign => "=",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Period => ".",
            TokenKind::LPar => "(",
            TokenKind::RPar => ")",
            TokenKind::LBrack => "[",
            TokenKind::RBrack => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
