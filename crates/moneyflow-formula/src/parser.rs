//! Formula parser
//!
//! A recursive descent parser for Money Flow formulas: numbers, cell
//! references, `+ - * /` with the usual precedence, unary signs, parentheses
//! and function calls taking ranges (`SUM(D2:D8)`).

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use moneyflow_core::{CellAddress, CellRange};

/// Parse a formula string into an AST
///
/// The formula must start with `=`. Parsing is case-insensitive: the text is
/// upper-cased before tokenizing, so `=sum(d2:d8)` and `=SUM(D2:D8)` agree.
///
/// # Example
/// ```rust
/// use moneyflow_formula::parse_formula;
///
/// let ast = parse_formula("=D2-E2").unwrap();
/// let ast = parse_formula("=SUM(D2:D8)").unwrap();
/// let ast = parse_formula("=(D2+D4)*0.15").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let formula = formula.trim();

    let formula = formula
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let upper = formula.to_ascii_uppercase();
    let mut parser = FormulaParser::new(&upper);
    let expr = parser.parse_expression()?;

    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Deepest nesting of parentheses, signs, calls and operator chains
const MAX_NESTING_DEPTH: usize = 256;

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    CellRef(String),
    Identifier(String),

    Plus,
    Minus,
    Star,
    Slash,
    Colon,
    Comma,
    LeftParen,
    RightParen,

    /// A character no formula may contain
    Invalid(char),
    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    depth: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            depth: 0,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.current_token = self.scan_token();
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Token::Eof,
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return token;
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return self.scan_identifier_or_ref();
        }

        self.advance();
        Token::Invalid(c)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent, only when digits follow (`2E` alone is a number then a name)
        if self.peek_char() == Some('E') {
            let sign = matches!(self.peek_char_at(1), Some('+') | Some('-'));
            let digit_at = if sign { 2 } else { 1 };
            if self
                .peek_char_at(digit_at)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..digit_at {
                    self.advance();
                }
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse::<f64>() {
            Ok(n) => Token::Number(n),
            Err(_) => Token::Invalid('.'),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // Letters then digits is a reference, unless it names a function (LOG10(...))
        if Self::is_cell_reference(text) && self.peek_non_whitespace() != Some('(') {
            return Token::CellRef(text.to_string());
        }

        Token::Identifier(text.to_string())
    }

    fn is_cell_reference(text: &str) -> bool {
        let bytes = text.as_bytes();
        let mut i = 0;

        if bytes.get(i) == Some(&b'$') {
            i += 1;
        }

        let letter_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        if i == letter_start {
            return false;
        }

        if bytes.get(i) == Some(&b'$') {
            i += 1;
        }

        let digit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digit_start {
            return false;
        }

        i == bytes.len()
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn peek_non_whitespace(&self) -> Option<char> {
        self.input[self.pos..].chars().find(|c| !c.is_whitespace())
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> Token {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    /// Go one level deeper; the caller restores `depth` on success
    fn descend(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(FormulaError::Parse("Formula nested too deeply".into()));
        }
        Ok(())
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: -, +
    // 4. Range: :
    // 5. Primary: numbers, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let base = self.depth;
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            // Each operator deepens the left-leaning tree
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let base = self.depth;
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            // Each operator deepens the left-leaning tree
            self.descend()?;
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        self.depth = base;
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        if matches!(self.current_token(), Token::Minus) {
            self.consume();
            self.descend()?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            return Ok(FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        // Prefix plus (no-op)
        if matches!(self.current_token(), Token::Plus) {
            self.consume();
            self.descend()?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            return Ok(operand);
        }

        self.parse_range()
    }

    fn parse_range(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_primary()?;

        if !matches!(self.current_token(), Token::Colon) {
            return Ok(left);
        }

        self.consume();
        let right = self.parse_primary()?;

        match (left, right) {
            (FormulaExpr::CellRef(start), FormulaExpr::CellRef(end)) => {
                Ok(FormulaExpr::RangeRef(CellRange::new(start, end)))
            }
            _ => Err(FormulaError::Parse(
                "Both ends of a range must be cell references".into(),
            )),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.consume() {
            Token::Number(n) => Ok(FormulaExpr::Number(n)),

            Token::LeftParen => {
                self.descend()?;
                let expr = self.parse_expression()?;
                self.depth -= 1;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::CellRef(ref_str) => Self::parse_cell_reference(&ref_str),

            Token::Identifier(name) => {
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Err(FormulaError::Parse(format!("Unknown name: {}", name)))
                }
            }

            token => Err(FormulaError::Parse(format!("Unexpected token: {:?}", token))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&Token::LeftParen)?;
        self.descend()?;

        let mut args = Vec::new();

        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_expression()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume();
                args.push(self.parse_expression()?);
            }
        }

        self.expect(&Token::RightParen)?;
        self.depth -= 1;

        Ok(FormulaExpr::Function { name, args })
    }

    fn parse_cell_reference(ref_str: &str) -> FormulaResult<FormulaExpr> {
        let address = CellAddress::parse(ref_str).map_err(|e| {
            FormulaError::InvalidReference(format!("'{}': {}", ref_str, e))
        })?;

        Ok(FormulaExpr::CellRef(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(s: &str) -> FormulaExpr {
        FormulaExpr::CellRef(CellAddress::parse(s).unwrap())
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("=3.25").unwrap(), FormulaExpr::Number(3.25));
        assert_eq!(parse_formula("=.5").unwrap(), FormulaExpr::Number(0.5));
        assert_eq!(parse_formula("=1e3").unwrap(), FormulaExpr::Number(1000.0));
        assert_eq!(parse_formula("=2.5E-1").unwrap(), FormulaExpr::Number(0.25));
    }

    #[test]
    fn test_parse_requires_equals() {
        assert!(matches!(parse_formula("D2-E2"), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_parse_subtraction_of_references() {
        assert_eq!(
            parse_formula("=D2-E2").unwrap(),
            FormulaExpr::BinaryOp {
                op: BinaryOperator::Subtract,
                left: Box::new(cell("D2")),
                right: Box::new(cell("E2")),
            }
        );
    }

    #[test]
    fn test_parse_precedence() {
        // 1+(2*3)
        if let FormulaExpr::BinaryOp { op, left, right } = parse_formula("=1+2*3").unwrap() {
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

        // (1+2)*3
        if let FormulaExpr::BinaryOp { op, left, .. } = parse_formula("=(1+2)*3").unwrap() {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        assert_eq!(
            parse_formula("=-D2").unwrap(),
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(cell("D2")),
            }
        );
        assert_eq!(parse_formula("=+5").unwrap(), FormulaExpr::Number(5.0));
        assert!(parse_formula("=1--5").is_ok());
    }

    #[test]
    fn test_parse_sum_range_case_insensitive() {
        let expected = FormulaExpr::Function {
            name: "SUM".into(),
            args: vec![FormulaExpr::RangeRef(CellRange::parse("D2:D8").unwrap())],
        };
        assert_eq!(parse_formula("=SUM(D2:D8)").unwrap(), expected);
        assert_eq!(parse_formula("=sum(d2:d8)").unwrap(), expected);
        assert_eq!(parse_formula("= Sum( D2 : D8 )").unwrap(), expected);
    }

    #[test]
    fn test_parse_function_arguments() {
        if let FormulaExpr::Function { name, args } = parse_formula("=MAX(D2:D8,E9,100)").unwrap()
        {
            assert_eq!(name, "MAX");
            assert_eq!(args.len(), 3);
        } else {
            panic!("Expected Function");
        }

        if let FormulaExpr::Function { args, .. } = parse_formula("=SUM()").unwrap() {
            assert!(args.is_empty());
        } else {
            panic!("Expected Function");
        }
    }

    #[test]
    fn test_reference_like_function_name() {
        // LOG10 looks like a reference but is called
        assert!(matches!(
            parse_formula("=LOG10(100)").unwrap(),
            FormulaExpr::Function { .. }
        ));
    }

    #[test]
    fn test_absolute_markers_ignored() {
        assert_eq!(parse_formula("=$D$2").unwrap(), cell("D2"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("=SUM(").is_err());
        assert!(parse_formula("=SUM(D2:").is_err());
        assert!(parse_formula("=").is_err());
        assert!(parse_formula("=1+").is_err());
        assert!(parse_formula("=(1+2").is_err());
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("=D2 & E2").is_err());
        assert!(parse_formula("=TOTAL").is_err());
        assert!(parse_formula("=1:2").is_err());
        assert!(parse_formula("=2^3").is_err());
    }

    #[test]
    fn test_parse_invalid_reference() {
        assert!(matches!(
            parse_formula("=D0+1"),
            Err(FormulaError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_references_expand_ranges() {
        let ast = parse_formula("=SUM(D2:E3)+F9").unwrap();
        let refs: Vec<String> = ast.references().iter().map(|a| a.to_string()).collect();
        assert_eq!(refs, vec!["D2", "E2", "D3", "E3", "F9"]);
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let too_deep = |text: String| {
            matches!(
                parse_formula(&text),
                Err(FormulaError::Parse(msg)) if msg.contains("nested too deeply")
            )
        };

        assert!(too_deep(format!("={}", "(".repeat(10_000))));
        assert!(too_deep(format!("={}1{}", "(".repeat(300), ")".repeat(300))));
        assert!(too_deep(format!("={}1", "-".repeat(5_000))));
        assert!(too_deep(format!("={}1", "+".repeat(5_000))));
        assert!(too_deep(format!("={}1{}", "SUM(".repeat(300), ")".repeat(300))));
        assert!(too_deep(format!("=1{}", "+1".repeat(5_000))));
    }

    #[test]
    fn test_moderate_nesting_parses() {
        assert!(parse_formula(&format!("={}1{}", "(".repeat(50), ")".repeat(50))).is_ok());
        assert!(parse_formula(&format!("={}1", "-".repeat(50))).is_ok());
        assert!(parse_formula(&format!("=1{}", "+D2".repeat(100))).is_ok());
        // Depth is restored after each group
        let siblings = vec![format!("{}1{}", "(".repeat(100), ")".repeat(100)); 10].join("+");
        assert!(parse_formula(&format!("={}", siblings)).is_ok());
    }

    #[test]
    fn test_dot_is_not_part_of_a_name() {
        assert!(matches!(
            parse_formula("=D2.5"),
            Err(FormulaError::Parse(msg)) if msg.starts_with("Unexpected")
        ));
    }
}
