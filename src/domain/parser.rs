//! Expression parser and evaluator for formula bodies.
//!
//! This module implements a recursive descent parser for the formula
//! expression language. Formula bodies arrive here with all cell references
//! already resolved to numeric text, so the grammar has no reference or range
//! forms: it is numbers, strings, booleans, operators, and calls into the
//! function table. The evaluator walks the resulting tree directly; no name
//! outside the function table can ever be resolved, which is what makes the
//! engine safe against arbitrary expression text typed into a cell.
//!
//! # BNF Grammar
//!
//! ```bnf
//! Expression     ::= Equality
//! Equality       ::= Comparison ( ( "=" | "==" | "<>" | "!=" ) Comparison )*
//! Comparison     ::= Addition ( ( "<" | "<=" | ">" | ">=" ) Addition )*
//! Addition       ::= Multiplication ( ( "+" | "-" ) Multiplication )*
//! Multiplication ::= Power ( ( "*" | "/" | "%" ) Power )*
//! Power          ::= Unary ( ( "**" | "^" ) Power )?
//! Unary          ::= ( "+" | "-" ) Unary | Primary
//! Primary        ::= Number | String | Boolean | FunctionCall | "(" Expression ")"
//! FunctionCall   ::= Identifier "(" ArgumentList? ")"
//! ArgumentList   ::= Expression ( "," Expression )*
//! Boolean        ::= "TRUE" | "FALSE"
//! Number         ::= [0-9]+ ( "." [0-9]+ )?
//! String         ::= '"' [^"]* '"' | "'" [^']* "'"
//! Identifier     ::= [A-Za-z][A-Za-z0-9_]*
//! ```
//!
//! Power is right-associative; unary operators bind tighter than any binary
//! operator; parentheses override precedence. Identifiers are matched whole
//! and case-sensitively against the function table.

use super::errors::{EvalError, EvalResult};
use super::functions::FunctionRegistry;
use super::models::Value;

/// A token of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Str(String),
    Bool(bool),
    Identifier(String),

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Power,

    // Comparison operators
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    NotEqual,
    Equal,

    // Delimiters
    LeftParen,
    RightParen,
    Comma,

    // End of input
    Eof,
}

/// An abstract syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),

    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },

    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOp {
    Equal,
    NotEqual,

    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    Power,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Lexical analyzer for formula bodies.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> EvalResult<f64> {
        let mut number_str = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                number_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some('.') {
            number_str.push('.');
            self.advance();

            while let Some(ch) = self.current_char {
                if ch.is_ascii_digit() {
                    number_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        number_str
            .parse::<f64>()
            .map_err(|_| EvalError::Syntax(format!("Invalid number: {}", number_str)))
    }

    /// Reads an identifier as spelled; the function table is case-sensitive,
    /// so no case folding happens here.
    fn read_identifier(&mut self) -> String {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        identifier
    }

    fn read_string(&mut self, quote: char) -> EvalResult<String> {
        self.advance();
        let mut contents = String::new();

        loop {
            match self.current_char {
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(contents);
                }
                Some(ch) => {
                    contents.push(ch);
                    self.advance();
                }
                None => return Err(EvalError::Syntax("Unterminated string literal".to_string())),
            }
        }
    }

    pub fn next_token(&mut self) -> EvalResult<Token> {
        self.skip_whitespace();

        match self.current_char {
            None => Ok(Token::Eof),

            Some(ch) => match ch {
                '0'..='9' => {
                    let number = self.read_number()?;
                    Ok(Token::Number(number))
                }

                'A'..='Z' | 'a'..='z' => {
                    let identifier = self.read_identifier();
                    match identifier.as_str() {
                        "TRUE" => Ok(Token::Bool(true)),
                        "FALSE" => Ok(Token::Bool(false)),
                        _ => Ok(Token::Identifier(identifier)),
                    }
                }

                '"' | '\'' => {
                    let contents = self.read_string(ch)?;
                    Ok(Token::Str(contents))
                }

                '+' => {
                    self.advance();
                    Ok(Token::Plus)
                }

                '-' => {
                    self.advance();
                    Ok(Token::Minus)
                }

                '*' => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.advance();
                        Ok(Token::Power)
                    } else {
                        Ok(Token::Multiply)
                    }
                }

                '/' => {
                    self.advance();
                    Ok(Token::Divide)
                }

                '%' => {
                    self.advance();
                    Ok(Token::Modulo)
                }

                '^' => {
                    self.advance();
                    Ok(Token::Power)
                }

                '<' => {
                    self.advance();
                    match self.current_char {
                        Some('=') => {
                            self.advance();
                            Ok(Token::LessEqual)
                        }
                        Some('>') => {
                            self.advance();
                            Ok(Token::NotEqual)
                        }
                        _ => Ok(Token::Less),
                    }
                }

                '>' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        Ok(Token::GreaterEqual)
                    } else {
                        Ok(Token::Greater)
                    }
                }

                '=' => {
                    self.advance();
                    // "=" and "==" are the same equality operator
                    if self.current_char == Some('=') {
                        self.advance();
                    }
                    Ok(Token::Equal)
                }

                '!' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        Ok(Token::NotEqual)
                    } else {
                        Err(EvalError::Syntax("Unexpected character: '!'".to_string()))
                    }
                }

                '(' => {
                    self.advance();
                    Ok(Token::LeftParen)
                }

                ')' => {
                    self.advance();
                    Ok(Token::RightParen)
                }

                ',' => {
                    self.advance();
                    Ok(Token::Comma)
                }

                _ => Err(EvalError::Syntax(format!("Unexpected character: '{}'", ch))),
            },
        }
    }
}

/// Recursive descent parser for formula expressions.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    pub fn new(input: &str) -> EvalResult<Self> {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token()?;

        Ok(Self {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> EvalResult<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> EvalResult<()> {
        if std::mem::discriminant(&self.current_token) == std::mem::discriminant(&expected) {
            self.advance()
        } else {
            Err(EvalError::Syntax(format!(
                "Expected {:?}, found {:?}",
                expected, self.current_token
            )))
        }
    }

    /// Parses the whole input as a single expression.
    pub fn parse(&mut self) -> EvalResult<Expr> {
        let expr = self.parse_equality()?;

        if self.current_token != Token::Eof {
            return Err(EvalError::Syntax(format!(
                "Unexpected token at end: {:?}",
                self.current_token
            )));
        }

        Ok(expr)
    }

    fn parse_equality(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_comparison()?;

        while matches!(self.current_token, Token::Equal | Token::NotEqual) {
            let op = match self.current_token {
                Token::Equal => BinaryOp::Equal,
                Token::NotEqual => BinaryOp::NotEqual,
                _ => unreachable!(),
            };
            self.advance()?;
            let right = self.parse_comparison()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator: op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_addition()?;

        while matches!(
            self.current_token,
            Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual
        ) {
            let op = match self.current_token {
                Token::Less => BinaryOp::Less,
                Token::LessEqual => BinaryOp::LessEqual,
                Token::Greater => BinaryOp::Greater,
                Token::GreaterEqual => BinaryOp::GreaterEqual,
                _ => unreachable!(),
            };
            self.advance()?;
            let right = self.parse_addition()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator: op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_addition(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_multiplication()?;

        while matches!(self.current_token, Token::Plus | Token::Minus) {
            let op = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };
            self.advance()?;
            let right = self.parse_multiplication()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator: op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplication(&mut self) -> EvalResult<Expr> {
        let mut left = self.parse_power()?;

        while matches!(
            self.current_token,
            Token::Multiply | Token::Divide | Token::Modulo
        ) {
            let op = match self.current_token {
                Token::Multiply => BinaryOp::Multiply,
                Token::Divide => BinaryOp::Divide,
                Token::Modulo => BinaryOp::Modulo,
                _ => unreachable!(),
            };
            self.advance()?;
            let right = self.parse_power()?;
            left = Expr::Binary {
                left: Box::new(left),
                operator: op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_power(&mut self) -> EvalResult<Expr> {
        let left = self.parse_unary()?;

        if matches!(self.current_token, Token::Power) {
            self.advance()?;
            // Right-associative
            let right = self.parse_power()?;
            Ok(Expr::Binary {
                left: Box::new(left),
                operator: BinaryOp::Power,
                right: Box::new(right),
            })
        } else {
            Ok(left)
        }
    }

    fn parse_unary(&mut self) -> EvalResult<Expr> {
        match self.current_token {
            Token::Plus => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    operator: UnaryOp::Plus,
                    operand: Box::new(operand),
                })
            }
            Token::Minus => {
                self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    operator: UnaryOp::Minus,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        match &self.current_token {
            Token::Number(value) => {
                let value = *value;
                self.advance()?;
                Ok(Expr::Number(value))
            }

            Token::Str(contents) => {
                let contents = contents.clone();
                self.advance()?;
                Ok(Expr::Str(contents))
            }

            Token::Bool(value) => {
                let value = *value;
                self.advance()?;
                Ok(Expr::Bool(value))
            }

            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;

                // The only identifiers in the grammar are function calls;
                // anything not followed by an argument list is unknown.
                if self.current_token == Token::LeftParen {
                    self.advance()?;
                    let args = self.parse_argument_list()?;
                    self.expect(Token::RightParen)?;
                    Ok(Expr::FunctionCall { name, args })
                } else {
                    Err(EvalError::Syntax(format!("Unknown identifier: {}", name)))
                }
            }

            Token::LeftParen => {
                self.advance()?;
                let expr = self.parse_equality()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }

            _ => Err(EvalError::Syntax(format!(
                "Unexpected token: {:?}",
                self.current_token
            ))),
        }
    }

    fn parse_argument_list(&mut self) -> EvalResult<Vec<Expr>> {
        let mut args = Vec::new();

        if self.current_token == Token::RightParen {
            return Ok(args);
        }

        args.push(self.parse_equality()?);

        while self.current_token == Token::Comma {
            self.advance()?;
            args.push(self.parse_equality()?);
        }

        Ok(args)
    }
}

/// Tree-walking evaluator.
///
/// The only environment an expression can touch is the function registry;
/// there is no variable scope, no host-language namespace, and no I/O.
pub struct ExpressionEvaluator<'a> {
    registry: &'a FunctionRegistry,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn evaluate(&self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::Str(contents) => Ok(Value::Text(contents.clone())),
            Expr::Bool(value) => Ok(Value::Bool(*value)),

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                Self::apply_binary(*operator, left_val, right_val)
            }

            Expr::Unary { operator, operand } => {
                let operand_val = self.evaluate(operand)?;
                let number = operand_val.as_number().ok_or_else(|| {
                    EvalError::TypeMismatch("Unary +/- needs a numeric operand".to_string())
                })?;

                match operator {
                    UnaryOp::Plus => Ok(Value::Number(number)),
                    UnaryOp::Minus => Ok(Value::Number(-number)),
                }
            }

            Expr::FunctionCall { name, args } => {
                let function = self
                    .registry
                    .get(name)
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;

                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.evaluate(arg)?);
                }
                function(&arg_values)
            }
        }
    }

    fn apply_binary(operator: BinaryOp, left: Value, right: Value) -> EvalResult<Value> {
        match operator {
            BinaryOp::Add => match (&left, &right) {
                (Value::Text(a), Value::Text(b)) => Ok(Value::Text(format!("{}{}", a, b))),
                _ => {
                    let (a, b) = numeric_pair("+", &left, &right)?;
                    Ok(Value::Number(a + b))
                }
            },

            BinaryOp::Subtract => {
                let (a, b) = numeric_pair("-", &left, &right)?;
                Ok(Value::Number(a - b))
            }

            BinaryOp::Multiply => {
                let (a, b) = numeric_pair("*", &left, &right)?;
                Ok(Value::Number(a * b))
            }

            BinaryOp::Divide => {
                let (a, b) = numeric_pair("/", &left, &right)?;
                if b == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(Value::Number(a / b))
                }
            }

            BinaryOp::Modulo => {
                let (a, b) = numeric_pair("%", &left, &right)?;
                if b == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(Value::Number(a % b))
                }
            }

            BinaryOp::Power => {
                let (a, b) = numeric_pair("**", &left, &right)?;
                Ok(Value::Number(a.powf(b)))
            }

            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                let ordering = match (&left, &right) {
                    (Value::Text(a), Value::Text(b)) => a.cmp(b),
                    _ => {
                        let (a, b) = numeric_pair("comparison", &left, &right)?;
                        a.partial_cmp(&b).ok_or_else(|| {
                            EvalError::TypeMismatch("Incomparable numbers".to_string())
                        })?
                    }
                };
                let result = match operator {
                    BinaryOp::Less => ordering.is_lt(),
                    BinaryOp::LessEqual => ordering.is_le(),
                    BinaryOp::Greater => ordering.is_gt(),
                    BinaryOp::GreaterEqual => ordering.is_ge(),
                    _ => unreachable!(),
                };
                Ok(Value::Bool(result))
            }

            BinaryOp::Equal => Ok(Value::Bool(values_equal(&left, &right))),
            BinaryOp::NotEqual => Ok(Value::Bool(!values_equal(&left, &right))),
        }
    }
}

/// Equality is defined across all value types: numerics (including booleans)
/// compare numerically, text compares as text, and mixing the two is simply
/// unequal, never an error.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => match (left, right) {
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        },
    }
}

fn numeric_pair(op: &str, left: &Value, right: &Value) -> EvalResult<(f64, f64)> {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvalError::TypeMismatch(format!(
            "Operator '{}' needs numeric operands",
            op
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> EvalResult<Value> {
        let registry = FunctionRegistry::new();
        let mut parser = Parser::new(input)?;
        let ast = parser.parse()?;
        ExpressionEvaluator::new(&registry).evaluate(&ast)
    }

    #[test]
    fn test_lexer_numbers() {
        let mut lexer = Lexer::new("42 3.14 0.5");

        assert_eq!(lexer.next_token().unwrap(), Token::Number(42.0));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(3.14));
        assert_eq!(lexer.next_token().unwrap(), Token::Number(0.5));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_lexer_operators() {
        let mut lexer = Lexer::new("+ - * / % ** ^ < <= > >= <> = == !=");

        assert_eq!(lexer.next_token().unwrap(), Token::Plus);
        assert_eq!(lexer.next_token().unwrap(), Token::Minus);
        assert_eq!(lexer.next_token().unwrap(), Token::Multiply);
        assert_eq!(lexer.next_token().unwrap(), Token::Divide);
        assert_eq!(lexer.next_token().unwrap(), Token::Modulo);
        assert_eq!(lexer.next_token().unwrap(), Token::Power);
        assert_eq!(lexer.next_token().unwrap(), Token::Power);
        assert_eq!(lexer.next_token().unwrap(), Token::Less);
        assert_eq!(lexer.next_token().unwrap(), Token::LessEqual);
        assert_eq!(lexer.next_token().unwrap(), Token::Greater);
        assert_eq!(lexer.next_token().unwrap(), Token::GreaterEqual);
        assert_eq!(lexer.next_token().unwrap(), Token::NotEqual);
        assert_eq!(lexer.next_token().unwrap(), Token::Equal);
        assert_eq!(lexer.next_token().unwrap(), Token::Equal);
        assert_eq!(lexer.next_token().unwrap(), Token::NotEqual);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_lexer_identifiers_preserve_case() {
        let mut lexer = Lexer::new("SUM sum Sum_1");

        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("SUM".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("sum".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("Sum_1".to_string()));
    }

    #[test]
    fn test_lexer_booleans() {
        let mut lexer = Lexer::new("TRUE FALSE True");

        assert_eq!(lexer.next_token().unwrap(), Token::Bool(true));
        assert_eq!(lexer.next_token().unwrap(), Token::Bool(false));
        // Only the uppercase spellings are literals
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("True".to_string()));
    }

    #[test]
    fn test_lexer_strings() {
        let mut lexer = Lexer::new("\"hello\" 'world'");

        assert_eq!(lexer.next_token().unwrap(), Token::Str("hello".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Token::Str("world".to_string()));

        let mut lexer = Lexer::new("\"unterminated");
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn test_lexer_rejects_stray_characters() {
        assert!(Lexer::new("@").next_token().is_err());
        assert!(Lexer::new(":").next_token().is_err());
        assert!(Lexer::new("!").next_token().is_err());
    }

    #[test]
    fn test_parser_literals() {
        let mut parser = Parser::new("42").unwrap();
        assert_eq!(parser.parse().unwrap(), Expr::Number(42.0));

        let mut parser = Parser::new("\"hi\"").unwrap();
        assert_eq!(parser.parse().unwrap(), Expr::Str("hi".to_string()));

        let mut parser = Parser::new("TRUE").unwrap();
        assert_eq!(parser.parse().unwrap(), Expr::Bool(true));
    }

    #[test]
    fn test_parser_operator_precedence() {
        // 2 + 3 * 4 parses as 2 + (3 * 4)
        let mut parser = Parser::new("2 + 3 * 4").unwrap();
        let expr = parser.parse().unwrap();
        match expr {
            Expr::Binary {
                left,
                operator: BinaryOp::Add,
                right,
            } => {
                assert_eq!(*left, Expr::Number(2.0));
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        operator: BinaryOp::Multiply,
                        ..
                    }
                ));
            }
            _ => panic!("Expected addition at top level"),
        }
    }

    #[test]
    fn test_parser_power_right_associative() {
        // 2 ** 3 ** 2 parses as 2 ** (3 ** 2)
        let mut parser = Parser::new("2 ** 3 ** 2").unwrap();
        let expr = parser.parse().unwrap();
        match expr {
            Expr::Binary {
                operator: BinaryOp::Power,
                right,
                ..
            } => {
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        operator: BinaryOp::Power,
                        ..
                    }
                ));
            }
            _ => panic!("Expected power at top level"),
        }
    }

    #[test]
    fn test_parser_function_calls() {
        let mut parser = Parser::new("SUM(1, 2, 3)").unwrap();
        let expr = parser.parse().unwrap();
        match expr {
            Expr::FunctionCall { name, args } => {
                assert_eq!(name, "SUM");
                assert_eq!(args.len(), 3);
            }
            _ => panic!("Expected function call"),
        }

        let mut parser = Parser::new("SUM()").unwrap();
        let expr = parser.parse().unwrap();
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "SUM".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_parser_rejects_bare_identifiers() {
        let mut parser = Parser::new("a1 + 1").unwrap();
        assert!(parser.parse().is_err());

        let mut parser = Parser::new("SUMMARY").unwrap();
        assert!(parser.parse().is_err());
    }

    #[test]
    fn test_parser_error_handling() {
        let mut parser = Parser::new("2 +").unwrap();
        assert!(parser.parse().is_err());

        let mut parser = Parser::new("(2 + 3").unwrap();
        assert!(parser.parse().is_err());

        let mut parser = Parser::new("SUM(").unwrap();
        assert!(parser.parse().is_err());

        let mut parser = Parser::new("2 3").unwrap();
        assert!(parser.parse().is_err());
    }

    #[test]
    fn test_eval_arithmetic() {
        assert_eq!(eval("2+3*4"), Ok(Value::Number(14.0)));
        assert_eq!(eval("(2+3)*4"), Ok(Value::Number(20.0)));
        assert_eq!(eval("10-3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("15/3"), Ok(Value::Number(5.0)));
        assert_eq!(eval("10%3"), Ok(Value::Number(1.0)));
        assert_eq!(eval("2**3"), Ok(Value::Number(8.0)));
        assert_eq!(eval("3^2"), Ok(Value::Number(9.0)));
        assert_eq!(eval("2**3**2"), Ok(Value::Number(512.0)));
        assert_eq!(eval("-5+10"), Ok(Value::Number(5.0)));
        assert_eq!(eval("2--3"), Ok(Value::Number(5.0)));
    }

    #[test]
    fn test_eval_division_by_zero() {
        assert_eq!(eval("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("10%0"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_eval_comparisons_produce_booleans() {
        assert_eq!(eval("1>0"), Ok(Value::Bool(true)));
        assert_eq!(eval("0>1"), Ok(Value::Bool(false)));
        assert_eq!(eval("5<=5"), Ok(Value::Bool(true)));
        assert_eq!(eval("5<>5"), Ok(Value::Bool(false)));
        assert_eq!(eval("5=5"), Ok(Value::Bool(true)));
        assert_eq!(eval("5==5"), Ok(Value::Bool(true)));
        assert_eq!(eval("5!=4"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_eval_text_operations() {
        assert_eq!(eval("\"ab\"+\"cd\""), Ok(Value::Text("abcd".to_string())));
        assert_eq!(eval("\"abc\"=\"abc\""), Ok(Value::Bool(true)));
        assert_eq!(eval("\"a\"<\"b\""), Ok(Value::Bool(true)));
        assert!(matches!(eval("\"a\"+1"), Err(EvalError::TypeMismatch(_))));
        assert!(matches!(eval("\"a\"<1"), Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn test_eval_equality_across_types() {
        assert_eq!(eval("\"a\"=1"), Ok(Value::Bool(false)));
        assert_eq!(eval("\"a\"<>1"), Ok(Value::Bool(true)));
        assert_eq!(eval("TRUE=1"), Ok(Value::Bool(true)));
        assert_eq!(eval("FALSE=0"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_eval_unary_needs_numbers() {
        assert_eq!(eval("-(2+3)"), Ok(Value::Number(-5.0)));
        assert_eq!(eval("+7"), Ok(Value::Number(7.0)));
        assert_eq!(eval("-TRUE"), Ok(Value::Number(-1.0)));
        assert!(matches!(eval("-\"a\""), Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn test_eval_function_calls() {
        assert_eq!(eval("SUM(1,2,3)"), Ok(Value::Number(6.0)));
        assert_eq!(eval("IF(1>0, \"yes\", \"no\")"), Ok(Value::Text("yes".to_string())));
        assert_eq!(eval("IF(0>1, \"yes\", \"no\")"), Ok(Value::Text("no".to_string())));
        assert_eq!(eval("NOT(AND(1, 0))"), Ok(Value::Bool(true)));
        assert_eq!(eval("SUM(1, SUM(2, 3))"), Ok(Value::Number(6.0)));
    }

    #[test]
    fn test_eval_unknown_function() {
        assert_eq!(
            eval("CHECKSUM(1,2)"),
            Err(EvalError::UnknownFunction("CHECKSUM".to_string()))
        );
        assert_eq!(
            eval("sum(1,2)"),
            Err(EvalError::UnknownFunction("sum".to_string()))
        );
    }

    #[test]
    fn test_eval_booleans_coerce_in_arithmetic() {
        assert_eq!(eval("(1>0)+1"), Ok(Value::Number(2.0)));
        assert_eq!(eval("TRUE+TRUE"), Ok(Value::Number(2.0)));
    }
}
