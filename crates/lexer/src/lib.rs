pub mod token;

use token::{Token, TokenKind};

use mjc_errors::{Errors, Message};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use std::str::Chars;

static KEYWORDS: Lazy<FxHashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut keywords = FxHashMap::default();

    keywords.insert("program", TokenKind::Program);
    keywords.insert("class", TokenKind::Class);
    keywords.insert("singleton", TokenKind::Singleton);
    keywords.insert("if", TokenKind::If);
    keywords.insert("else", TokenKind::Else);
    keywords.insert("while", TokenKind::While);
    keywords.insert("read", TokenKind::Read);
    keywords.insert("print", TokenKind::Print);
    keywords.insert("return", TokenKind::Return);
    keywords.insert("break", TokenKind::Break);
    keywords.insert("void", TokenKind::Void);
    keywords.insert("final", TokenKind::Final);
    keywords.insert("new", TokenKind::New);

    keywords
});

/// Pull-based scanner. `next()` produces one token per call and keeps
/// line/column bookkeeping in sync with the reading position.
pub struct Scanner<'a> {
    chars: Chars<'a>,

    /// Lookahead character (not yet part of any token).
    ch: Option<char>,

    /// Most recently consumed character.
    prev: Option<char>,

    line: u32,
    column: u32,

    /// All diagnostics of the compilation funnel into this sink.
    pub errors: Errors,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        let mut scanner = Scanner {
            chars: source.chars(),
            ch: None,
            prev: None,
            line: 1,
            column: 0,
            errors: Errors::new(),
        };

        scanner.next_ch();

        scanner
    }

    /// Reports a lexical error and resets the token payload so a malformed
    /// token never carries a half-parsed value.
    fn error(&mut self, t: &mut Token, message: Message) {
        self.errors.error(t.line, t.column, message);

        t.value = 0;
        t.text.clear();
    }

    fn next_ch(&mut self) {
        self.prev = self.ch;
        self.ch = self.chars.next();
        self.column += 1;

        if self.ch == Some('\n') {
            self.line += 1;
            self.column = 0;
        }
    }

    /// Returns the next token. Yields `TokenKind::Eof` repeatedly once the
    /// input is exhausted.
    pub fn next(&mut self) -> Token {
        while matches!(self.ch, Some(c) if c.is_whitespace()) {
            self.next_ch();
        }

        let mut t = Token::new(TokenKind::None, self.line, self.column);

        let ch = match self.ch {
            Some(ch) => ch,
            None => {
                t.kind = TokenKind::Eof;
                return t;
            }
        };

        match ch {
            'a'..='z' | 'A'..='Z' => self.read_name(&mut t),
            '0'..='9' => self.read_number(&mut t),
            '\'' => self.read_char_const(&mut t),

            ';' => self.single(&mut t, TokenKind::Semicolon),
            ',' => self.single(&mut t, TokenKind::Comma),
            '.' => self.single(&mut t, TokenKind::Period),
            '(' => self.single(&mut t, TokenKind::LPar),
            ')' => self.single(&mut t, TokenKind::RPar),
            '[' => self.single(&mut t, TokenKind::LBrack),
            ']' => self.single(&mut t, TokenKind::RBrack),
            '{' => self.single(&mut t, TokenKind::LBrace),
            '}' => self.single(&mut t, TokenKind::RBrace),

            '+' => {
                self.next_ch();
                if self.ch == Some('+') {
                    self.single(&mut t, TokenKind::PlusPlus);
                } else if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::PlusAssign);
                } else {
                    t.kind = TokenKind::Plus;
                }
            }
            '-' => {
                self.next_ch();
                if self.ch == Some('-') {
                    self.single(&mut t, TokenKind::MinusMinus);
                } else if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::MinusAssign);
                } else {
                    t.kind = TokenKind::Minus;
                }
            }
            '*' => {
                self.next_ch();
                if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::TimesAssign);
                } else {
                    t.kind = TokenKind::Times;
                }
            }
            '%' => {
                self.next_ch();
                if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::RemAssign);
                } else {
                    t.kind = TokenKind::Rem;
                }
            }
            '=' => {
                self.next_ch();
                if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::Eql);
                } else {
                    t.kind = TokenKind::Assign;
                }
            }
            '!' => {
                self.next_ch();
                if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::Neq);
                } else {
                    self.error(&mut t, Message::InvalidChar('!'));
                }
            }
            '<' => {
                self.next_ch();
                if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::Leq);
                } else {
                    t.kind = TokenKind::Lss;
                }
            }
            '>' => {
                self.next_ch();
                if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::Geq);
                } else {
                    t.kind = TokenKind::Gtr;
                }
            }
            '&' => {
                self.next_ch();
                if self.ch == Some('&') {
                    self.single(&mut t, TokenKind::And);
                } else {
                    self.error(&mut t, Message::InvalidChar('&'));
                }
            }
            '|' => {
                self.next_ch();
                if self.ch == Some('|') {
                    self.single(&mut t, TokenKind::Or);
                } else {
                    self.error(&mut t, Message::InvalidChar('|'));
                }
            }
            '/' => {
                self.next_ch();
                if self.ch == Some('*') {
                    self.skip_comment(&mut t);
                    return self.next();
                } else if self.ch == Some('=') {
                    self.single(&mut t, TokenKind::SlashAssign);
                } else {
                    t.kind = TokenKind::Slash;
                }
            }

            _ => {
                self.error(&mut t, Message::InvalidChar(ch));
                self.next_ch();
            }
        }

        t
    }

    fn single(&mut self, t: &mut Token, kind: TokenKind) {
        self.next_ch();
        t.kind = kind;
    }

    fn read_name(&mut self, t: &mut Token) {
        let mut name = String::new();

        while let Some(c) = self.ch {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            self.next_ch();
        }

        t.kind = *KEYWORDS
            .get(name.as_str())
            .unwrap_or(&TokenKind::Identifier);
        t.text = name;
    }

    fn read_number(&mut self, t: &mut Token) {
        let mut digits = String::new();

        while let Some(c) = self.ch {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.next_ch();
        }

        t.kind = TokenKind::Number;
        t.text = digits;

        match t.text.parse::<i32>() {
            Ok(value) => t.value = value,
            Err(_) => {
                let digits = t.text.clone();
                self.error(t, Message::BigNum(digits));
            }
        }
    }

    fn read_char_const(&mut self, t: &mut Token) {
        self.next_ch();
        t.kind = TokenKind::CharConst;

        match self.ch {
            // '' with nothing in between
            Some('\'') => {
                self.error(t, Message::EmptyCharConst);
                self.next_ch();
                return;
            }

            // a raw line end inside the constant
            Some('\r') | Some('\n') => {
                self.error(t, Message::IllegalLineEnd);
                self.next_ch();
                return;
            }

            Some('\\') => {
                self.next_ch();
                match self.ch {
                    Some('n') => {
                        t.text = "\n".to_string();
                        t.value = '\n' as i32;
                        self.next_ch();
                    }
                    Some('r') => {
                        t.text = "\r".to_string();
                        t.value = '\r' as i32;
                        self.next_ch();
                    }
                    Some('\'') => {
                        t.text = "'".to_string();
                        t.value = '\'' as i32;
                        self.next_ch();
                    }
                    Some('\\') => {
                        t.text = "\\".to_string();
                        t.value = '\\' as i32;
                        self.next_ch();
                    }
                    Some(other) => {
                        self.error(t, Message::UndefinedEscape(other));
                        self.next_ch();
                    }
                    // Leave prev at '\\' for the closing-quote check.
                    None => {}
                }
            }

            Some(ch) => {
                t.text = ch.to_string();
                t.value = ch as i32;
                self.next_ch();
            }

            // Leave prev at the opening quote for the closing-quote check.
            None => {}
        }

        if self.ch == Some('\'') {
            self.next_ch();
        } else if self.ch.is_none() && matches!(self.prev, Some('\'') | Some('\\')) {
            self.error(t, Message::EofInChar);
        } else {
            self.error(t, Message::MissingQuote);
        }
    }

    /// Skips a block comment. Comments nest.
    fn skip_comment(&mut self, t: &mut Token) {
        self.next_ch();
        let mut depth = 1;

        while depth > 0 {
            while !matches!(self.ch, Some('/') | Some('*') | None) {
                self.next_ch();
            }

            match self.ch {
                None => {
                    self.error(t, Message::EofInComment);
                    break;
                }
                Some('/') => {
                    self.next_ch();
                    if self.ch == Some('*') {
                        depth += 1;
                        self.next_ch();
                    }
                }
                _ => {
                    self.next_ch();
                    if self.ch == Some('/') {
                        depth -= 1;
                        self.next_ch();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut kinds = Vec::new();

        loop {
            let t = scanner.next();
            if t.kind == TokenKind::Eof {
                break;
            }
            kinds.push(t.kind);
        }

        kinds
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("program Foo final while x_1"),
            vec![
                TokenKind::Program,
                TokenKind::Identifier,
                TokenKind::Final,
                TokenKind::While,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(
            kinds("++ -- += -= *= /= %= == != <= >= && ||"),
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::PlusAssign,
                TokenKind::MinusAssign,
                TokenKind::TimesAssign,
                TokenKind::SlashAssign,
                TokenKind::RemAssign,
                TokenKind::Eql,
                TokenKind::Neq,
                TokenKind::Leq,
                TokenKind::Geq,
                TokenKind::And,
                TokenKind::Or,
            ]
        );
    }

    #[test]
    fn single_operators_do_not_swallow_lookahead() {
        assert_eq!(
            kinds("a=b<c"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::Lss,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn lone_ampersand_is_invalid() {
        let mut scanner = Scanner::new("a & b");

        assert_eq!(scanner.next().kind, TokenKind::Identifier);
        assert_eq!(scanner.next().kind, TokenKind::None);
        assert_eq!(scanner.next().kind, TokenKind::Identifier);
        assert_eq!(scanner.errors.count(), 1);
        assert_eq!(scanner.errors.all()[0], "-- line 1 col 3: invalid character &");
    }

    #[test]
    fn number_value_and_position() {
        let mut scanner = Scanner::new("  42");
        let t = scanner.next();

        assert_eq!(t.kind, TokenKind::Number);
        assert_eq!(t.value, 42);
        assert_eq!((t.line, t.column), (1, 3));
        assert_eq!(scanner.errors.count(), 0);
    }

    #[test]
    fn overflowing_number_resets_to_zero() {
        let mut scanner = Scanner::new("2147483648");
        let t = scanner.next();

        assert_eq!(t.kind, TokenKind::Number);
        assert_eq!(t.value, 0);
        assert_eq!(scanner.errors.count(), 1);
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: 2147483648 too big for integer constant"
        );
    }

    #[test]
    fn max_and_min_adjacent_values() {
        let mut scanner = Scanner::new("2147483647");
        assert_eq!(scanner.next().value, 2147483647);
        assert_eq!(scanner.errors.count(), 0);
    }

    #[test]
    fn char_constants() {
        let mut scanner = Scanner::new(r"'a' '\n' '\\' '\''");

        let t = scanner.next();
        assert_eq!(t.kind, TokenKind::CharConst);
        assert_eq!(t.value, 'a' as i32);

        assert_eq!(scanner.next().value, '\n' as i32);
        assert_eq!(scanner.next().value, '\\' as i32);
        assert_eq!(scanner.next().value, '\'' as i32);
        assert_eq!(scanner.errors.count(), 0);
    }

    #[test]
    fn empty_char_constant() {
        let mut scanner = Scanner::new("''");
        let t = scanner.next();

        assert_eq!(t.kind, TokenKind::CharConst);
        assert_eq!(t.value, 0);
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: empty character constant"
        );
    }

    #[test]
    fn undefined_escape() {
        let mut scanner = Scanner::new(r"'\q'");
        scanner.next();

        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: undefined escape character sequence '\\q'"
        );
    }

    #[test]
    fn missing_quote() {
        let mut scanner = Scanner::new("'ab'");
        let t = scanner.next();

        assert_eq!(t.kind, TokenKind::CharConst);
        assert_eq!(t.value, 0);
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: missing ' at end of character constant"
        );
    }

    #[test]
    fn eof_inside_char_constant() {
        let mut scanner = Scanner::new("'");
        scanner.next();
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: unexpected end of file in char"
        );

        let mut scanner = Scanner::new("'\\");
        scanner.next();
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: unexpected end of file in char"
        );
    }

    #[test]
    fn illegal_line_end_in_char_constant() {
        let mut scanner = Scanner::new("'\na'");
        scanner.next();
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: illegal line end in character constant"
        );
    }

    #[test]
    fn comments_nest_and_vanish() {
        assert_eq!(
            kinds("a /* x /* y */ z */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn unterminated_comment() {
        let mut scanner = Scanner::new("/* open /* deeper */");

        assert_eq!(scanner.next().kind, TokenKind::Eof);
        assert_eq!(
            scanner.errors.all()[0],
            "-- line 1 col 1: unexpected end of file in comment"
        );
    }

    #[test]
    fn eof_is_sticky() {
        let mut scanner = Scanner::new("x");

        scanner.next();
        assert_eq!(scanner.next().kind, TokenKind::Eof);
        assert_eq!(scanner.next().kind, TokenKind::Eof);
    }

    #[test]
    fn line_and_column_tracking() {
        let mut scanner = Scanner::new("a\n  b");

        let a = scanner.next();
        assert_eq!((a.line, a.column), (1, 1));

        let b = scanner.next();
        assert_eq!((b.line, b.column), (2, 3));
    }
}
