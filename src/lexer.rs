//! Lexer for ECMAScript 5 source code
//!
//! Converts source text into a stream of tokens.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::string_dict::StringDict;
use crate::value::JsString;

/// Source span information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Token types for ECMAScript 5
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(JsString),
    True,
    False,
    Null,

    Identifier(JsString),

    // Keywords
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    This,
    Typeof,
    Instanceof,
    In,
    Void,
    Delete,
    With,
    Debugger,
    /// Future reserved words (`class`, `const`, `enum`, ...)
    Reserved(JsString),

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --
    Eq,         // =
    EqEq,       // ==
    EqEqEq,     // ===
    BangEq,     // !=
    BangEqEq,   // !==
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    LtLt,       // <<
    GtGt,       // >>
    GtGtGt,     // >>>
    Amp,        // &
    AmpAmp,     // &&
    Pipe,       // |
    PipePipe,   // ||
    Caret,      // ^
    Tilde,      // ~
    Bang,       // !
    Question,   // ?

    // Assignment Operators
    PlusEq,   // +=
    MinusEq,  // -=
    StarEq,   // *=
    SlashEq,  // /=
    PercentEq, // %=
    AmpEq,    // &=
    PipeEq,   // |=
    CaretEq,  // ^=
    LtLtEq,   // <<=
    GtGtEq,   // >>=
    GtGtGtEq, // >>>=

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Dot,       // .
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;

    // Special
    Eof,
    /// Malformed input; the parser reports it with the span
    Invalid(String),
}

/// A token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(pos: usize, line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
        }
    }
}

/// Lexer state checkpoint for backtracking
#[derive(Clone)]
pub struct LexerCheckpoint {
    current_pos: usize,
    line: u32,
    column: u32,
    saw_newline: bool,
}

/// Lexer for tokenizing ECMAScript source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Base offset added to char_indices positions after a restore
    chars_base_offset: usize,
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    /// Tracks if we just saw a newline (for ASI)
    saw_newline: bool,
    string_dict: &'a mut StringDict,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            chars_base_offset: 0,
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            saw_newline: false,
            string_dict,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get mutable reference to the string dictionary for interning
    pub fn string_dict(&mut self) -> &mut StringDict {
        self.string_dict
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            current_pos: self.current_pos,
            line: self.line,
            column: self.column,
            saw_newline: self.saw_newline,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.current_pos = checkpoint.current_pos;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.saw_newline = checkpoint.saw_newline;
        self.chars_base_offset = checkpoint.current_pos;
        self.chars = self
            .source
            .get(checkpoint.current_pos..)
            .unwrap_or("")
            .char_indices()
            .peekable();
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let Some((_pos, ch)) = self.advance() else {
            return Token::eof(self.current_pos, self.line, self.column);
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,

            '.' => {
                if matches!(self.peek(), Some('0'..='9')) {
                    self.scan_number('.')
                } else {
                    TokenKind::Dot
                }
            }
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_assignable(TokenKind::Star, TokenKind::StarEq),
            '/' => self.scan_assignable(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.scan_assignable(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.scan_assignable(TokenKind::Caret, TokenKind::CaretEq),
            '=' => self.scan_equality(TokenKind::Eq, TokenKind::EqEq, TokenKind::EqEqEq),
            '!' => self.scan_equality(TokenKind::Bang, TokenKind::BangEq, TokenKind::BangEqEq),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_doubled('&', TokenKind::Amp, TokenKind::AmpAmp, TokenKind::AmpEq),
            '|' => self.scan_doubled('|', TokenKind::Pipe, TokenKind::PipePipe, TokenKind::PipeEq),

            '"' | '\'' => self.scan_string(ch),

            '0'..='9' => self.scan_number(ch),

            c if is_id_start(c) => self.scan_identifier(c),
            '\\' => TokenKind::Invalid("unicode escapes in identifiers are not supported".into()),

            c => TokenKind::Invalid(format!("Unexpected character '{c}'")),
        };

        Token::new(kind, self.make_span())
    }

    /// Check if there was a newline before the current token
    pub fn had_newline_before(&self) -> bool {
        self.saw_newline
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = self.chars_base_offset + pos + ch.len_utf8();
            if is_line_terminator(ch) {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let slice = self.source.get(self.current_pos..)?;
        let mut iter = slice.chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn skip_whitespace_and_comments(&mut self) {
        self.saw_newline = false;

        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}') => {
                    self.advance();
                }
                Some('\n' | '\u{2028}' | '\u{2029}') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if is_line_terminator(ch) {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                Some((_, '*')) if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some((_, c)) if is_line_terminator(c) => {
                                    self.saw_newline = true;
                                }
                                Some(_) => {}
                                None => break,
                            }
                        }
                    }
                    _ => break,
                },
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.match_char('+') {
            TokenKind::PlusPlus
        } else if self.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.match_char('-') {
            TokenKind::MinusMinus
        } else if self.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    /// `op` or `op=`
    fn scan_assignable(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        if self.match_char('=') { assign } else { plain }
    }

    /// `op`, `op=` or `op==`
    fn scan_equality(&mut self, single: TokenKind, double: TokenKind, triple: TokenKind) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') { triple } else { double }
        } else {
            single
        }
    }

    /// `&`, `&&`, `&=` and the `|` family
    fn scan_doubled(
        &mut self,
        ch: char,
        single: TokenKind,
        double: TokenKind,
        assign: TokenKind,
    ) -> TokenKind {
        if self.match_char(ch) {
            double
        } else if self.match_char('=') {
            assign
        } else {
            single
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            if self.match_char('=') {
                TokenKind::LtLtEq
            } else {
                TokenKind::LtLt
            }
        } else if self.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                if self.match_char('=') {
                    TokenKind::GtGtGtEq
                } else {
                    TokenKind::GtGtGt
                }
            } else if self.match_char('=') {
                TokenKind::GtGtEq
            } else {
                TokenKind::GtGt
            }
        } else if self.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => match self.advance() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'b')) => value.push('\x08'),
                    Some((_, 'f')) => value.push('\x0C'),
                    Some((_, 'v')) => value.push('\x0B'),
                    Some((_, '0')) if !matches!(self.peek(), Some('0'..='9')) => value.push('\0'),
                    Some((_, 'x')) => match self.scan_hex_escape(2).and_then(char::from_u32) {
                        Some(ch) => value.push(ch),
                        None => return TokenKind::Invalid("Invalid hexadecimal escape".into()),
                    },
                    Some((_, 'u')) => match self.scan_hex_escape(4) {
                        Some(unit) => self.push_code_unit(&mut value, unit),
                        None => return TokenKind::Invalid("Invalid Unicode escape".into()),
                    },
                    Some((_, '\r')) => {
                        self.match_char('\n');
                    }
                    Some((_, c)) if is_line_terminator(c) => {}
                    Some((_, c)) => value.push(c),
                    None => return TokenKind::Invalid("Unterminated string literal".into()),
                },
                Some((_, c)) if is_line_terminator(c) => {
                    return TokenKind::Invalid("Unterminated string literal".into());
                }
                Some((_, c)) => value.push(c),
                None => return TokenKind::Invalid("Unterminated string literal".into()),
            }
        }

        TokenKind::String(self.string_dict.get_or_insert(&value))
    }

    /// `\uD83D\uDE00` surrogate pairs combine into one scalar; lone
    /// surrogates become U+FFFD.
    fn push_code_unit(&mut self, value: &mut String, unit: u32) {
        if (0xD800..0xDC00).contains(&unit) && self.peek() == Some('\\') {
            let checkpoint = self.checkpoint();
            self.advance();
            if self.match_char('u')
                && let Some(low) = self.scan_hex_escape(4)
                && (0xDC00..0xE000).contains(&low)
            {
                let scalar = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                value.push(char::from_u32(scalar).unwrap_or('\u{FFFD}'));
                return;
            }
            self.restore(checkpoint);
        }
        value.push(char::from_u32(unit).unwrap_or('\u{FFFD}'));
    }

    fn scan_hex_escape(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.advance();
            code = code * 16 + digit;
        }
        Some(code)
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut num_str = String::new();

        if first == '0' && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            let mut value = 0.0;
            let mut digits = 0;
            while let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) {
                self.advance();
                value = value * 16.0 + f64::from(digit);
                digits += 1;
            }
            if digits == 0 {
                return TokenKind::Invalid("Invalid hexadecimal literal".into());
            }
            return self.finish_number(value);
        }

        if first == '.' {
            num_str.push_str("0.");
        } else {
            num_str.push(first);
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            if self.peek() == Some('.') {
                self.advance();
                num_str.push('.');
            }
        }

        // Fraction (the leading '.' has been consumed by now)
        if num_str.ends_with('.') {
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let checkpoint = self.checkpoint();
            self.advance();
            let mut exponent = String::from("e");
            if let Some(sign @ ('+' | '-')) = self.peek() {
                exponent.push(sign);
                self.advance();
            }
            let mut digits = 0;
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    exponent.push(ch);
                    self.advance();
                    digits += 1;
                } else {
                    break;
                }
            }
            if digits == 0 {
                self.restore(checkpoint);
                return TokenKind::Invalid("Invalid exponent in numeric literal".into());
            }
            num_str.push_str(&exponent);
        }

        let trimmed = num_str.strip_suffix('.').unwrap_or(&num_str);
        self.finish_number(trimmed.parse().unwrap_or(f64::NAN))
    }

    /// A numeric literal must not run straight into an identifier (`3in`)
    fn finish_number(&mut self, value: f64) -> TokenKind {
        match self.peek() {
            Some(c) if is_id_start(c) || c.is_ascii_digit() => {
                TokenKind::Invalid("Identifier starts immediately after numeric literal".into())
            }
            _ => TokenKind::Number(value),
        }
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match name.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,

            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "in" => TokenKind::In,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "with" => TokenKind::With,
            "debugger" => TokenKind::Debugger,

            "class" | "const" | "enum" | "export" | "extends" | "import" | "super" => {
                TokenKind::Reserved(self.string_dict.get_or_insert(&name))
            }

            _ => TokenKind::Identifier(self.string_dict.get_or_insert(&name)),
        }
    }
}

impl TokenKind {
    /// Keywords are valid property names after `.` and in object literals
    pub fn keyword_name(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Var => "var",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Throw => "throw",
            TokenKind::New => "new",
            TokenKind::This => "this",
            TokenKind::Typeof => "typeof",
            TokenKind::Instanceof => "instanceof",
            TokenKind::In => "in",
            TokenKind::Void => "void",
            TokenKind::Delete => "delete",
            TokenKind::With => "with",
            TokenKind::Debugger => "debugger",
            _ => return None,
        })
    }
}

pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Check if a character can start an identifier
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Check if a character can continue an identifier
fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new(source, &mut dict);
        let mut tokens = vec![];
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token.kind);
        }
        tokens
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("42"), vec![TokenKind::Number(42.0)]);
        assert_eq!(lex("3.25"), vec![TokenKind::Number(3.25)]);
        assert_eq!(lex(".5"), vec![TokenKind::Number(0.5)]);
        assert_eq!(lex("5."), vec![TokenKind::Number(5.0)]);
        assert_eq!(lex("1e10"), vec![TokenKind::Number(1e10)]);
        assert_eq!(lex("2E-3"), vec![TokenKind::Number(0.002)]);
        assert_eq!(lex("0xff"), vec![TokenKind::Number(255.0)]);
    }

    #[test]
    fn test_member_access_on_number_literal() {
        assert_eq!(
            lex("1..toString"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Dot,
                TokenKind::Identifier(JsString::from("toString"))
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lex(r#""hello""#),
            vec![TokenKind::String(JsString::from("hello"))]
        );
        assert_eq!(
            lex(r#"'world'"#),
            vec![TokenKind::String(JsString::from("world"))]
        );
        assert_eq!(
            lex(r#""line\nbreak""#),
            vec![TokenKind::String(JsString::from("line\nbreak"))]
        );
        assert_eq!(
            lex(r#""\x41B""#),
            vec![TokenKind::String(JsString::from("AB"))]
        );
        assert_eq!(
            lex(r#""\uD83D\uDE00""#),
            vec![TokenKind::String(JsString::from("\u{1F600}"))]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(matches!(lex("'abc").as_slice(), [TokenKind::Invalid(_)]));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("+ - * / %"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent
            ]
        );
        assert_eq!(lex("=== !== == !="), vec![
            TokenKind::EqEqEq,
            TokenKind::BangEqEq,
            TokenKind::EqEq,
            TokenKind::BangEq
        ]);
        assert_eq!(lex(">>>= >>= <<="), vec![
            TokenKind::GtGtGtEq,
            TokenKind::GtGtEq,
            TokenKind::LtLtEq
        ]);
        assert_eq!(lex("&& || & | ^ ~"), vec![
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
            TokenKind::Amp,
            TokenKind::Pipe,
            TokenKind::Caret,
            TokenKind::Tilde
        ]);
        assert_eq!(lex("++ -- += -="), vec![
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::PlusEq,
            TokenKind::MinusEq
        ]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            lex("var with foo $bar _baz"),
            vec![
                TokenKind::Var,
                TokenKind::With,
                TokenKind::Identifier(JsString::from("foo")),
                TokenKind::Identifier(JsString::from("$bar")),
                TokenKind::Identifier(JsString::from("_baz")),
            ]
        );
        assert_eq!(
            lex("class"),
            vec![TokenKind::Reserved(JsString::from("class"))]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("1 // comment\n2"),
            vec![TokenKind::Number(1.0), TokenKind::Number(2.0)]
        );
        assert_eq!(
            lex("1 /* a /* b */ 2"),
            vec![TokenKind::Number(1.0), TokenKind::Number(2.0)]
        );
    }

    #[test]
    fn test_newline_tracking() {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new("a\nb /* \n */ c d", &mut dict);
        lexer.next_token();
        assert!(!lexer.had_newline_before());
        lexer.next_token();
        assert!(lexer.had_newline_before());
        lexer.next_token();
        assert!(lexer.had_newline_before());
        lexer.next_token();
        assert!(!lexer.had_newline_before());
    }

    #[test]
    fn test_spans() {
        let mut dict = StringDict::new();
        let mut lexer = Lexer::new("x\n  yy", &mut dict);
        let first = lexer.next_token();
        assert_eq!((first.span.line, first.span.column), (1, 1));
        let second = lexer.next_token();
        assert_eq!((second.span.line, second.span.column), (2, 3));
        assert_eq!((second.span.start, second.span.end), (4, 6));
    }
}
