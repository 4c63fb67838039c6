use crate::ast::{
    AssetBinding, BinaryOp, Block, Expr, Literal, ParamDecl, ParamKind, Program, UnaryOp,
};
use crate::ScriptError;
use crate::lexer::{Lexer, Token, TokenKind};

/// Deepest expression nesting a skill may use. Every later pass walks the
/// tree recursively, so the parser is where depth gets bounded.
pub const MAX_NESTING: usize = 128;

pub struct Parser {
    lexer: Lexer,
    current: Token,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, ScriptError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    fn next_token(&mut self) -> Result<(), ScriptError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::Syntax {
            line: self.current.line,
            column: self.current.column,
            message: message.into(),
        }
    }

    fn enter(&mut self) -> Result<(), ScriptError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!(
                "expression nested more than {MAX_NESTING} levels deep"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ScriptError> {
        if self.current.kind == kind {
            self.next_token()
        } else {
            Err(self.error(format!("expected {kind:?}, got {:?}", self.current.kind)))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ScriptError> {
        if let TokenKind::Ident(name) = &self.current.kind {
            let name = name.clone();
            self.next_token()?;
            Ok(name)
        } else {
            Err(self.error(format!("expected {what}, got {:?}", self.current.kind)))
        }
    }

    // ------------------------------------------------------------
    // skill header
    // ------------------------------------------------------------

    pub fn parse_program(&mut self) -> Result<Program, ScriptError> {
        self.expect(TokenKind::Skill)?;
        let name = self.expect_ident("skill name")?;
        self.expect(TokenKind::LParen)?;
        let assets = self.parse_assets()?;

        let mut params = Vec::new();
        if self.check(&TokenKind::Semicolon) {
            self.next_token()?;
            loop {
                params.push(self.parse_param()?);
                if self.check(&TokenKind::Comma) {
                    self.next_token()?;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.error("unexpected input after skill body"));
        }
        Ok(Program {
            name,
            assets,
            params,
            body,
        })
    }

    fn parse_assets(&mut self) -> Result<AssetBinding, ScriptError> {
        let first = self.expect_ident("asset parameter")?;
        if self.check(&TokenKind::Ellipsis) {
            self.next_token()?;
            return Ok(AssetBinding::Variadic(first));
        }
        let mut names = vec![first];
        while self.check(&TokenKind::Comma) {
            self.next_token()?;
            names.push(self.expect_ident("asset parameter")?);
        }
        Ok(AssetBinding::Fixed(names))
    }

    fn parse_param(&mut self) -> Result<ParamDecl, ScriptError> {
        let name = self.expect_ident("parameter name")?;
        let mut kind = None;
        if self.check(&TokenKind::Colon) {
            self.next_token()?;
            let type_name = self.expect_ident("parameter type")?;
            kind = Some(match type_name.as_str() {
                "number" => ParamKind::Number,
                "string" => ParamKind::Text,
                other => return Err(self.error(format!("unknown parameter type `{other}`"))),
            });
        }

        let mut default = None;
        if self.check(&TokenKind::Assign) {
            self.next_token()?;
            default = Some(self.parse_param_default()?);
        }

        let inferred = match &default {
            Some(Literal::Number(_)) => Some(ParamKind::Number),
            Some(Literal::Text(_)) => Some(ParamKind::Text),
            _ => None,
        };
        let kind = match (kind, inferred) {
            (Some(k), Some(i)) if k != i => {
                return Err(self.error(format!("default of `{name}` does not match its type")));
            }
            (Some(k), _) | (None, Some(k)) => k,
            (None, None) => {
                return Err(self.error(format!("parameter `{name}` needs a type or a default")));
            }
        };
        Ok(ParamDecl {
            name,
            kind,
            default,
        })
    }

    fn parse_param_default(&mut self) -> Result<Literal, ScriptError> {
        let negative = self.check(&TokenKind::Minus);
        if negative {
            self.next_token()?;
        }
        let literal = match &self.current.kind {
            TokenKind::Number(v) => Literal::Number(if negative { -v } else { *v }),
            TokenKind::Str(s) if !negative => Literal::Text(s.clone()),
            other => {
                return Err(self.error(format!(
                    "expected number or string default, got {other:?}"
                )));
            }
        };
        self.next_token()?;
        Ok(literal)
    }

    // ------------------------------------------------------------
    // blocks and expressions
    // ------------------------------------------------------------

    fn parse_block(&mut self) -> Result<Block, ScriptError> {
        self.expect(TokenKind::LBrace)?;
        let mut lets = Vec::new();
        while self.check(&TokenKind::Let) {
            self.next_token()?;
            let name = self.expect_ident("binding name")?;
            self.expect(TokenKind::Assign)?;
            let value = self.parse_expression(0)?;
            self.expect(TokenKind::Semicolon)?;
            lets.push((name, value));
        }
        let value = self.parse_expression(0)?;
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            lets,
            value: Box::new(value),
        })
    }

    fn parse_expression(&mut self, prec: u8) -> Result<Expr, ScriptError> {
        let outer = self.depth;
        self.enter()?;
        let mut left = self.parse_unary()?;
        // each operator in a left-associative chain deepens the tree by one
        while prec < self.get_precedence() {
            self.enter()?;
            left = self.parse_infix(left)?;
        }
        self.depth = outer;
        Ok(left)
    }

    fn get_precedence(&self) -> u8 {
        match self.current.kind {
            TokenKind::Star | TokenKind::Slash => 5,
            TokenKind::Plus | TokenKind::Minus => 4,
            TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Le
            | TokenKind::Ge
            | TokenKind::Eq
            | TokenKind::Ne => 3,
            TokenKind::And => 2,
            TokenKind::Or => 1,
            _ => 0,
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ScriptError> {
        let prec = self.get_precedence();
        let op = match self.current.kind {
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return Ok(left),
        };
        self.next_token()?;
        let right = self.parse_expression(prec)?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn parse_unary(&mut self) -> Result<Expr, ScriptError> {
        let outer = self.depth;
        let expr = match self.current.kind {
            TokenKind::Minus => {
                self.enter()?;
                self.next_token()?;
                Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?))
            }
            TokenKind::Not => {
                self.enter()?;
                self.next_token()?;
                Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?))
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)?
            }
        };
        self.depth = outer;
        Ok(expr)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr, ScriptError> {
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.enter()?;
                    self.next_token()?;
                    let field = self.expect_ident("field name")?;
                    expr = Expr::Field(Box::new(expr), field);
                }
                TokenKind::LBracket => {
                    self.enter()?;
                    self.next_token()?;
                    let index = self.parse_expression(0)?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ScriptError> {
        match self.current.kind.clone() {
            TokenKind::Number(v) => {
                self.next_token()?;
                Ok(Expr::Literal(Literal::Number(v)))
            }
            TokenKind::Str(s) => {
                self.next_token()?;
                Ok(Expr::Literal(Literal::Text(s)))
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(&TokenKind::True);
                self.next_token()?;
                Ok(Expr::Literal(Literal::Bool(value)))
            }
            TokenKind::LParen => {
                self.next_token()?;
                let inner = self.parse_expression(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::Ident(name) => {
                self.next_token()?;
                if !self.check(&TokenKind::LParen) {
                    return Ok(Expr::Var(name));
                }
                self.next_token()?;
                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    args.push(self.parse_expression(0)?);
                    while self.check(&TokenKind::Comma) {
                        self.next_token()?;
                        args.push(self.parse_expression(0)?);
                    }
                }
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Call(name, args))
            }
            other => Err(self.error(format!("unexpected token {other:?}"))),
        }
    }

    fn parse_if(&mut self) -> Result<Expr, ScriptError> {
        let outer = self.depth;
        self.enter()?;
        self.expect(TokenKind::If)?;
        let cond = self.parse_expression(0)?;
        let then = self.parse_block()?;
        self.expect(TokenKind::Else)?;
        let otherwise = if self.check(&TokenKind::If) {
            // `else if` chains nest as a block holding only the inner `if`
            Block {
                lets: Vec::new(),
                value: Box::new(self.parse_if()?),
            }
        } else {
            self.parse_block()?
        };
        self.depth = outer;
        Ok(Expr::If {
            cond: Box::new(cond),
            then,
            otherwise,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ScriptError;
    use crate::ast::{AssetBinding, BinaryOp, Expr, Literal, ParamKind};

    use super::{MAX_NESTING, Parser};

    #[test]
    fn parses_header_with_params() {
        let program = Parser::new("skill near(a, b; min_dist = 1.0, label: string) { 1.0 }")
            .expect("lexer")
            .parse_program()
            .expect("parse");
        assert_eq!(program.name, "near");
        assert_eq!(
            program.assets,
            AssetBinding::Fixed(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(program.params.len(), 2);
        assert_eq!(program.params[0].kind, ParamKind::Number);
        assert_eq!(program.params[1].kind, ParamKind::Text);
        assert_eq!(program.params[1].default, None);
    }

    #[test]
    fn arithmetic_is_left_associative_with_precedence() {
        let program = Parser::new("skill s(xs...) { 1 - 2 - 3 * 4 }")
            .expect("lexer")
            .parse_program()
            .expect("parse");
        let Expr::Binary(BinaryOp::Sub, left, right) = *program.body.value else {
            panic!("expected subtraction at the root");
        };
        assert!(matches!(*left, Expr::Binary(BinaryOp::Sub, _, _)));
        assert!(matches!(*right, Expr::Binary(BinaryOp::Mul, _, _)));
    }

    #[test]
    fn else_if_chains() {
        let program = Parser::new(
            "skill s(a, b) { if 1 < 2 { 1.0 } else if 2 < 3 { 0.5 } else { 0.0 } }",
        )
        .expect("lexer")
        .parse_program()
        .expect("parse");
        let Expr::If { otherwise, .. } = *program.body.value else {
            panic!("expected if");
        };
        assert!(matches!(*otherwise.value, Expr::If { .. }));
    }

    #[test]
    fn negative_default() {
        let program = Parser::new("skill s(a; offset = -2.5) { offset }")
            .expect("lexer")
            .parse_program()
            .expect("parse");
        assert_eq!(program.params[0].default, Some(Literal::Number(-2.5)));
    }

    #[test]
    fn rejects_untyped_param_and_trailing_input() {
        assert!(Parser::new("skill s(a; axis) { 1 }")
            .expect("lexer")
            .parse_program()
            .is_err());
        let err = Parser::new("skill s(a) { 1 } extra")
            .expect("lexer")
            .parse_program()
            .expect_err("trailing");
        assert_eq!(err.to_string(), "1:18: unexpected input after skill body");
    }

    fn parse(source: &str) -> Result<(), ScriptError> {
        Parser::new(source)?.parse_program().map(|_| ())
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let depth = MAX_NESTING - 1;
        let source = format!("skill s(a) {{ {}1{} }}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn runaway_nesting_is_a_syntax_error() {
        let sources = [
            format!("skill s(a) {{ {}1{} }}", "(".repeat(5000), ")".repeat(5000)),
            format!("skill s(a) {{ {}1 }}", "-".repeat(5000)),
            format!("skill s(a) {{ 1{} }}", " + 1".repeat(5000)),
            format!("skill s(a) {{ a{} }}", ".location".repeat(5000)),
            format!("skill s(a) {{ {}{{ 1 }} }}", "if true { 1 } else ".repeat(5000)),
        ];
        for source in &sources {
            let err = parse(source).expect_err("too deep");
            assert!(
                matches!(&err, ScriptError::Syntax { message, .. } if message.contains("nested")),
                "{err}"
            );
        }
    }
}
