use crate::ScriptError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Skill,
    Let,
    If,
    Else,
    And,
    Or,
    Not,
    True,
    False,
    Ident(String),
    Number(f64),
    Str(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Ellipsis,
    Assign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn error(&self, line: u32, column: u32, message: impl Into<String>) -> ScriptError {
        ScriptError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_at(1) == Some('/') {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, line: u32, column: u32) -> Result<TokenKind, ScriptError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            // a '.' only belongs to the number when a digit follows it
            let fraction_dot = ch == '.' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit());
            if ch.is_ascii_digit() || fraction_dot {
                self.advance();
            } else {
                break;
            }
        }
        let raw: String = self.input[start..self.pos].iter().collect();
        raw.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(line, column, format!("invalid number literal `{raw}`")))
    }

    fn read_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let word: String = self.input[start..self.pos].iter().collect();
        match word.as_str() {
            "skill" => TokenKind::Skill,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Ident(word),
        }
    }

    fn read_string(&mut self, line: u32, column: u32) -> Result<TokenKind, ScriptError> {
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(TokenKind::Str(out)),
                Some('\n') | None => return Err(self.error(line, column, "unterminated string")),
                Some(c) => out.push(c),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ScriptError> {
        self.skip_trivia();
        let (line, column) = (self.line, self.column);
        let Some(ch) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
        };

        let kind = if ch.is_ascii_digit() {
            self.read_number(line, column)?
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            self.read_ident()
        } else {
            self.advance();
            match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semicolon,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '"' => self.read_string(line, column)?,
                '.' => {
                    if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                        self.advance();
                        self.advance();
                        TokenKind::Ellipsis
                    } else {
                        TokenKind::Dot
                    }
                }
                '=' => self.with_eq(TokenKind::Eq, TokenKind::Assign),
                '!' => self.with_eq(TokenKind::Ne, TokenKind::Not),
                '<' => self.with_eq(TokenKind::Le, TokenKind::Lt),
                '>' => self.with_eq(TokenKind::Ge, TokenKind::Gt),
                other => {
                    return Err(self.error(line, column, format!("unexpected character `{other}`")));
                }
            }
        };
        Ok(Token { kind, line, column })
    }

    fn with_eq(&mut self, paired: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            paired
        } else {
            single
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, TokenKind};

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().expect("token");
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_operators_and_keywords() {
        assert_eq!(
            kinds("let d = a.location; // trailing\nd <= 1.5 != !x"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("d".into()),
                TokenKind::Assign,
                TokenKind::Ident("a".into()),
                TokenKind::Dot,
                TokenKind::Ident("location".into()),
                TokenKind::Semicolon,
                TokenKind::Ident("d".into()),
                TokenKind::Le,
                TokenKind::Number(1.5),
                TokenKind::Ne,
                TokenKind::Not,
                TokenKind::Ident("x".into()),
            ]
        );
    }

    #[test]
    fn lexes_ellipsis_and_strings() {
        assert_eq!(
            kinds("assets... \"y\""),
            vec![
                TokenKind::Ident("assets".into()),
                TokenKind::Ellipsis,
                TokenKind::Str("y".into()),
            ]
        );
    }

    #[test]
    fn reports_position_of_bad_character() {
        let mut lexer = Lexer::new("skill\n  @");
        lexer.next_token().expect("skill");
        let err = lexer.next_token().expect_err("bad char");
        assert_eq!(err.to_string(), "2:3: unexpected character `@`");
    }
}
