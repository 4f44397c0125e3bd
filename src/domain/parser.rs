//! Script parser.
//!
//! Recursive descent over the token stream. Top-level statements are
//! classified by their leading token and handled independently; tokens that
//! start no recognised statement are skipped. A call argument that is not an
//! expression (an `options=[...]` list, say) is dropped. A missing required
//! token inside a call, parenthesis or index aborts the parse with a `ParseError`.

use tracing::{error, info, warn};

use crate::domain::ast::{
    Argument, BinaryOp, Direction, EntryCondition, ExitCondition, Expr, InputConfig, Literal,
    NodeId, ParsedStrategy, UnaryOp,
};
use crate::domain::error::ParseError;
use crate::domain::lexer::tokenize;
use crate::domain::token::{Token, TokenKind};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: usize,
    strategy: ParsedStrategy,
    /// Set when `primary` meets a token no expression can start with.
    stray_token: bool,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
            next_id: 0,
            stray_token: false,
            strategy: ParsedStrategy {
                source: source.to_string(),
                ..ParsedStrategy::default()
            },
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// The token stream always ends in `Eof`; looking past it yields `Eof`.
    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("expected {}", expected)))
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        let tok = self.peek();
        let found = match tok.kind {
            TokenKind::Eof | TokenKind::Newline => tok.kind.to_string(),
            _ => format!("'{}'", tok.value),
        };
        ParseError {
            message: format!("{}, found {}", message, found),
            line: tok.line,
            column: tok.column,
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    // --- statements ---

    fn parse_program(mut self) -> Result<ParsedStrategy, ParseError> {
        while !self.check(TokenKind::Eof) {
            self.statement()?;
        }
        Ok(self.strategy)
    }

    fn statement(&mut self) -> Result<(), ParseError> {
        let tok = self.peek().clone();
        let next = self.peek_at(1).kind;
        match tok.kind {
            TokenKind::VersionPragma => {
                self.advance();
                if let Ok(version) = tok.value.parse() {
                    self.strategy.version = version;
                }
            }
            TokenKind::Keyword if tok.value == "strategy" || tok.value == "indicator" => {
                self.declaration()?;
            }
            TokenKind::Keyword if tok.value == "var" || tok.value == "varip" => {
                self.var_declaration()?;
            }
            TokenKind::Keyword if tok.value == "if" => {
                self.advance();
                let condition = self.expression()?;
                let key = format!("condition_{}", self.strategy.conditions.len());
                self.strategy.conditions.insert(key, condition);
            }
            TokenKind::BuiltinFunction
                if tok.value.starts_with("input") && next == TokenKind::LParen =>
            {
                self.advance();
                let args = self.call_args()?;
                let config = input_config(&tok.value, &args);
                let name = config
                    .title
                    .clone()
                    .unwrap_or_else(|| format!("input_{}", self.strategy.inputs.len()));
                self.strategy.inputs.insert(name, config);
            }
            TokenKind::BuiltinFunction
                if tok.value.starts_with("strategy.") && next == TokenKind::LParen =>
            {
                self.strategy_call()?;
            }
            TokenKind::BuiltinFunction if tok.value.starts_with("ta.") => {
                self.expression()?;
            }
            TokenKind::Identifier
                if next == TokenKind::Assign || next == TokenKind::ColonAssign =>
            {
                self.advance();
                self.advance();
                self.assignment(tok.value)?;
            }
            _ => {
                self.advance();
            }
        }
        Ok(())
    }

    fn declaration(&mut self) -> Result<(), ParseError> {
        self.advance();
        let args = self.call_args()?;
        let title = args
            .iter()
            .filter(|a| a.name.is_none() || a.name.as_deref() == Some("title"))
            .find_map(|a| a.value.as_text());
        if let Some(title) = title {
            self.strategy.name = title.to_string();
        }
        if let Some(desc) = named(&args, "description").and_then(Expr::as_text) {
            self.strategy.description = desc.to_string();
        }
        Ok(())
    }

    /// `var [type] name = expr`
    fn var_declaration(&mut self) -> Result<(), ParseError> {
        self.advance();
        if self.check(TokenKind::Identifier) && self.peek_at(1).is(TokenKind::Identifier) {
            self.advance();
        }
        let name = self.expect(TokenKind::Identifier, "variable name")?.value;
        if !self.eat(TokenKind::ColonAssign) {
            self.expect(TokenKind::Assign, "'='")?;
        }
        self.assignment(name)
    }

    fn assignment(&mut self, name: String) -> Result<(), ParseError> {
        let value = self.expression()?;
        if let Expr::Call {
            name: func, args, ..
        } = &value
            && func.starts_with("input")
        {
            let config = input_config(func, args);
            self.strategy.inputs.insert(name.clone(), config);
        }
        self.strategy.variables.insert(name, value);
        Ok(())
    }

    fn strategy_call(&mut self) -> Result<(), ParseError> {
        let function = self.advance().value;
        let args = self.call_args()?;
        let positional: Vec<&Expr> = args
            .iter()
            .filter(|a| a.name.is_none())
            .map(|a| &a.value)
            .collect();
        let pick = |key: &str, index: usize| -> Option<Expr> {
            named(&args, key)
                .or_else(|| positional.get(index).copied())
                .cloned()
        };
        let id = pick("id", 0).and_then(|e| e.as_text().map(str::to_string));
        let guard = named(&args, "when").cloned();

        if function.contains("entry") {
            let direction = pick("direction", 1)
                .map(|e| direction_of(&e))
                .unwrap_or(Direction::Long);
            self.strategy.entry_conditions.push(EntryCondition {
                id,
                function,
                direction,
                guard,
                quantity: pick("qty", 2),
                target: pick("limit", 3),
                stop: pick("stop", 4),
            });
        } else if function.contains("exit") || function.contains("close") {
            self.strategy
                .exit_conditions
                .push(ExitCondition { function, id, guard });
        }
        Ok(())
    }

    // --- calls ---

    fn call_args(&mut self) -> Result<Vec<Argument>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        let mut first = true;
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                return Ok(args);
            }
            if !first {
                self.expect(TokenKind::Comma, "',' or ')'")?;
                self.skip_newlines();
                if self.eat(TokenKind::RParen) {
                    return Ok(args);
                }
            }
            first = false;
            let name = if matches!(self.peek().kind, TokenKind::Identifier | TokenKind::Keyword)
                && self.peek_at(1).is(TokenKind::Assign)
            {
                let name = self.advance().value;
                self.advance();
                Some(name)
            } else {
                None
            };
            let start = self.pos;
            let indicators = self.strategy.indicators.len();
            self.stray_token = false;
            match self.expression() {
                Ok(value) => args.push(Argument { name, value }),
                Err(e) if self.stray_token => {
                    self.pos = start;
                    self.strategy.indicators.truncate(indicators);
                    if !self.skip_argument() {
                        return Err(e);
                    }
                    self.stray_token = false;
                    warn!(
                        line = e.line,
                        column = e.column,
                        argument = name.as_deref().unwrap_or("-"),
                        "skipped unsupported call argument"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Skip to the `,` or `)` that ends the current argument, leaving it
    /// unconsumed. False when the call is never closed.
    fn skip_argument(&mut self) -> bool {
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => return false,
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket if depth > 0 => depth -= 1,
                TokenKind::Comma | TokenKind::RParen if depth == 0 => return true,
                TokenKind::RBracket if depth == 0 => return false,
                _ => {}
            }
            self.advance();
        }
    }

    fn call(&mut self, name: String) -> Result<Expr, ParseError> {
        let args = self.call_args()?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let is_indicator = name.starts_with("ta.");
        let expr = Expr::Call { id, name, args };
        if is_indicator {
            self.strategy.indicators.push(expr.clone());
        }
        Ok(expr)
    }

    fn indexed(&mut self, name: String) -> Result<Expr, ParseError> {
        self.advance();
        let offset = self.expression()?;
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::Indexed {
            name,
            offset: Box::new(offset),
        })
    }

    // --- expressions, lowest precedence first ---

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.ternary()
    }

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.logical_or()?;
        if !self.eat(TokenKind::Question) {
            return Ok(condition);
        }
        let when_true = self.ternary()?;
        self.expect(TokenKind::Colon, "':'")?;
        let when_false = self.ternary()?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        })
    }

    fn binary_level<F>(
        &mut self,
        operand: F,
        op_for: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<Expr, ParseError>
    where
        F: Fn(&mut Self) -> Result<Expr, ParseError>,
    {
        let mut left = operand(self)?;
        while let Some(op) = op_for(self.peek().kind) {
            self.advance();
            let right = operand(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::logical_and, |k| {
            (k == TokenKind::Or).then_some(BinaryOp::Or)
        })
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::comparison, |k| {
            (k == TokenKind::And).then_some(BinaryOp::And)
        })
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::additive, |k| match k {
            TokenKind::Equal => Some(BinaryOp::Eq),
            TokenKind::NotEqual => Some(BinaryOp::Ne),
            TokenKind::Greater => Some(BinaryOp::Gt),
            TokenKind::Less => Some(BinaryOp::Lt),
            TokenKind::GreaterEqual => Some(BinaryOp::Ge),
            TokenKind::LessEqual => Some(BinaryOp::Le),
            _ => None,
        })
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::multiplicative, |k| match k {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.binary_level(Self::unary, |k| match k {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.primary(),
        };
        self.advance();
        let operand = self.unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek().clone();
        let next = self.peek_at(1).kind;
        match tok.kind {
            TokenKind::Number => {
                let value = tok.value.parse::<f64>().map_err(|_| ParseError {
                    message: format!("invalid number '{}'", tok.value),
                    line: tok.line,
                    column: tok.column,
                })?;
                self.advance();
                Ok(Expr::number(value))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::text(tok.value))
            }
            TokenKind::Bool => {
                self.advance();
                Ok(Expr::Literal(Literal::Bool(tok.value == "true")))
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.expression()?;
                self.skip_newlines();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::BuiltinFunction | TokenKind::Identifier | TokenKind::BuiltinVariable
                if next == TokenKind::LParen =>
            {
                self.advance();
                self.call(tok.value)
            }
            TokenKind::Keyword if tok.value == "na" && next == TokenKind::LParen => {
                self.advance();
                self.call(tok.value)
            }
            TokenKind::Identifier | TokenKind::BuiltinVariable
                if next == TokenKind::LBracket =>
            {
                self.advance();
                self.indexed(tok.value)
            }
            TokenKind::Identifier | TokenKind::BuiltinVariable | TokenKind::BuiltinFunction => {
                self.advance();
                Ok(Expr::SeriesRef(tok.value))
            }
            TokenKind::Keyword if tok.value == "na" => {
                self.advance();
                Ok(Expr::SeriesRef(tok.value))
            }
            _ => {
                self.stray_token = true;
                Err(self.error_here("unexpected token in expression".to_string()))
            }
        }
    }
}

fn named<'a>(args: &'a [Argument], key: &str) -> Option<&'a Expr> {
    args.iter()
        .find(|a| a.name.as_deref() == Some(key))
        .map(|a| &a.value)
}

/// Literal value of an argument, folding a negated number.
fn literal_of(expr: &Expr) -> Option<Literal> {
    match expr {
        Expr::Literal(lit) => Some(lit.clone()),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match operand.as_ref() {
            Expr::Literal(Literal::Number(n)) => Some(Literal::Number(-n)),
            _ => None,
        },
        _ => None,
    }
}

fn input_config(kind: &str, args: &[Argument]) -> InputConfig {
    let positional: Vec<&Expr> = args
        .iter()
        .filter(|a| a.name.is_none())
        .map(|a| &a.value)
        .collect();
    let default = named(args, "defval")
        .and_then(literal_of)
        .or_else(|| positional.iter().find_map(|e| literal_of(e)));
    let title = named(args, "title")
        .or_else(|| positional.get(1).copied())
        .and_then(Expr::as_text)
        .map(str::to_string);
    let params = args
        .iter()
        .filter_map(|a| {
            let name = a.name.as_deref()?;
            if name == "defval" || name == "title" {
                return None;
            }
            Some((name.to_string(), literal_of(&a.value)?))
        })
        .collect();
    InputConfig {
        kind: kind.to_string(),
        default,
        title,
        params,
    }
}

/// Only an explicit short (`"short"` or `strategy.short`) selects Short.
fn direction_of(expr: &Expr) -> Direction {
    match expr {
        Expr::Literal(Literal::Text(s)) if s.eq_ignore_ascii_case("short") => Direction::Short,
        Expr::SeriesRef(name) if name == "strategy.short" => Direction::Short,
        _ => Direction::Long,
    }
}

/// Parse a script, returning the diagnostic on failure.
pub fn try_parse(source: &str) -> Result<ParsedStrategy, ParseError> {
    Parser::new(source).parse_program()
}

/// Parse a script. Failure is logged and reported as `None`.
pub fn parse(source: &str) -> Option<ParsedStrategy> {
    match try_parse(source) {
        Ok(strategy) => {
            info!(
                name = %strategy.name,
                entries = strategy.entry_conditions.len(),
                exits = strategy.exit_conditions.len(),
                indicators = strategy.indicators.len(),
                "parsed strategy"
            );
            Some(strategy)
        }
        Err(e) => {
            error!(line = e.line, column = e.column, "failed to parse script: {}", e.message);
            None
        }
    }
}
