//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with proper operator
//! precedence. The input is the expression text that follows the `=` marker.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use cellgraph_core::Position;

/// Deepest nesting of parentheses and unary signs accepted
const MAX_NESTING: usize = 256;

/// Tallest expression tree accepted
const MAX_HEIGHT: usize = 1024;

/// Parse an expression into an AST
///
/// # Example
/// ```rust
/// use cellgraph_formula::parse_formula;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("A1*(B2-3)").unwrap();
/// assert!(parse_formula("1+").is_err());
/// ```
pub fn parse_formula(expression: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(expression)?;
    let parsed = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token != Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token
        )));
    }

    Ok(parsed.expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    CellRef(String),

    Plus,
    Minus,
    Star,
    Slash,

    LeftParen,
    RightParen,

    Eof,
}

/// An expression together with the height of its tree
struct Parsed {
    expr: FormulaExpr,
    height: usize,
}

impl Parsed {
    fn leaf(expr: FormulaExpr) -> Self {
        Self { expr, height: 1 }
    }

    fn unary(op: UnaryOperator, operand: Parsed) -> FormulaResult<Self> {
        let height = check_height(operand.height + 1)?;
        Ok(Self {
            expr: FormulaExpr::UnaryOp {
                op,
                operand: Box::new(operand.expr),
            },
            height,
        })
    }

    fn binary(op: BinaryOperator, left: Parsed, right: Parsed) -> FormulaResult<Self> {
        let height = check_height(left.height.max(right.height) + 1)?;
        Ok(Self {
            expr: FormulaExpr::BinaryOp {
                op,
                left: Box::new(left.expr),
                right: Box::new(right.expr),
            },
            height,
        })
    }
}

fn check_height(height: usize) -> FormulaResult<usize> {
    if height > MAX_HEIGHT {
        return Err(FormulaError::Parse("formula too long to evaluate".into()));
    }
    Ok(height)
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    /// Open parentheses and unary signs around the current position
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_uppercase() {
            return Ok(self.scan_cell_ref());
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at offset {}",
            c, self.pos
        )))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        let num: f64 = num_str
            .parse()
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))?;
        if !num.is_finite() {
            return Err(FormulaError::Parse(format!("Number out of range '{}'", num_str)));
        }
        Ok(Token::Number(num))
    }

    fn scan_cell_ref(&mut self) -> Token {
        let start = self.pos;
        while self.peek_char().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.advance();
        }
        Token::CellRef(self.input[start..self.pos].to_string())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if &self.current_token == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected, self.current_token
            )))
        }
    }

    /// Run `parse` one nesting level deeper
    fn nested(
        &mut self,
        parse: fn(&mut Self) -> FormulaResult<Parsed>,
    ) -> FormulaResult<Parsed> {
        if self.nesting >= MAX_NESTING {
            return Err(FormulaError::Parse("formula nested too deeply".into()));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: +, -
    // 4. Primary: numbers, cell references, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Parsed> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Parsed> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = Parsed::binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Parsed> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_unary()?;
            left = Parsed::binary(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Parsed> {
        let op = match self.current_token {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.consume()?;
        let operand = self.nested(Self::parse_unary)?;
        Parsed::unary(op, operand)
    }

    fn parse_primary(&mut self) -> FormulaResult<Parsed> {
        match self.consume()? {
            Token::Number(n) => Ok(Parsed::leaf(FormulaExpr::Number(n))),

            Token::CellRef(text) => {
                let pos = Position::parse_unchecked(&text)
                    .map_err(|e| FormulaError::InvalidReference(format!("'{}': {}", text, e)))?;
                Ok(Parsed::leaf(FormulaExpr::CellRef(pos)))
            }

            Token::LeftParen => {
                let inner = self.nested(Self::parse_expression)?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }

            token => Err(FormulaError::Parse(format!("Unexpected token: {:?}", token))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(row: u32, col: u32) -> Box<FormulaExpr> {
        Box::new(FormulaExpr::CellRef(Position::new(row, col)))
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("3.25").unwrap(), FormulaExpr::Number(3.25));
        assert_eq!(parse_formula(".5").unwrap(), FormulaExpr::Number(0.5));
        assert_eq!(parse_formula("1e3").unwrap(), FormulaExpr::Number(1000.0));
        assert_eq!(parse_formula("2E-1").unwrap(), FormulaExpr::Number(0.2));
    }

    #[test]
    fn test_parse_precedence() {
        // Should parse as 1+(2*3)
        let ast = parse_formula("1+2*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, FormulaExpr::Number(1.0));
            assert!(matches!(
                *right,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        // 1-2-3 is (1-2)-3
        let ast = parse_formula("1-2-3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Subtract);
            assert!(matches!(*left, FormulaExpr::BinaryOp { .. }));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_formula("-A1").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: cell(0, 0),
            }
        );

        let ast = parse_formula("+-1").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Plus,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(
            parse_formula("B2").unwrap(),
            FormulaExpr::CellRef(Position::new(1, 1))
        );
        assert_eq!(
            parse_formula(" A1 + ZZ10 ").unwrap(),
            FormulaExpr::BinaryOp {
                op: BinaryOperator::Add,
                left: cell(0, 0),
                right: cell(9, 701),
            }
        );
    }

    #[test]
    fn test_parse_out_of_range_reference() {
        let ast = parse_formula("A99999").unwrap();
        assert_eq!(ast, FormulaExpr::CellRef(Position::new(99998, 0)));
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("(1+2)*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse_formula(&nested(200)).unwrap(), FormulaExpr::Number(1.0));

        let err = parse_formula(&nested(50_000)).unwrap_err();
        assert_eq!(err, FormulaError::Parse("formula nested too deeply".into()));

        let signs = format!("{}1", "-".repeat(50_000));
        assert!(parse_formula(&signs).is_err());
    }

    #[test]
    fn test_parse_height_limit() {
        let sum = |terms: usize| vec!["A1"; terms].join("+");
        assert!(parse_formula(&sum(500)).is_ok());

        let err = parse_formula(&sum(50_000)).unwrap_err();
        assert_eq!(err, FormulaError::Parse("formula too long to evaluate".into()));
    }

    #[test]
    fn test_parse_errors() {
        let malformed = [
            "", " ", "1+", "(1", "1)", "*2", "a1", "A", "A1B", "1 2", "1e", "SUM(A1)", "\"x\"",
            "1 % 2",
        ];
        for text in malformed {
            assert!(parse_formula(text).is_err(), "expected error for {:?}", text);
        }
    }
}
