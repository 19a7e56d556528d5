//! Filter expression parser

use smallvec::SmallVec;
use std::fmt;
use std::mem;

use crate::error::{FilterError, Result};
use crate::query::ast::{Clause, ExpressionNode, Literal, Operator};

/// Symbolic operators, longest spelling first
const SYMBOL_OPERATORS: [(&str, Operator); 7] = [
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    ("<=", Operator::LessEqual),
    (">=", Operator::GreaterEqual),
    ("=", Operator::Equal),
    ("<", Operator::Less),
    (">", Operator::Greater),
];

const CONTAINS_KEYWORD: &str = "Contains";

/// Check whether a string is a well-formed filter expression
pub fn is_valid_expression(expression: &str) -> bool {
    parse(expression).is_ok()
}

/// Parse a filter expression into an AST
pub fn parse(expression: &str) -> Result<ExpressionNode> {
    if expression.trim().is_empty() {
        return Err(FilterError::EmptyExpression);
    }

    let tokens = tokenize(expression)?;
    parse_tokens(&tokens)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Clause(&'a str),
    And,
    Or,
    OpenParen,
    CloseParen,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Clause(text) => f.write_str(text),
            Token::And => f.write_str("&&"),
            Token::Or => f.write_str("||"),
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
        }
    }
}

type Tokens<'a> = SmallVec<[Token<'a>; 16]>;

fn tokenize(expression: &str) -> Result<Tokens<'_>> {
    let bytes = expression.as_bytes();
    let mut tokens = Tokens::new();
    let mut paren_depth = 0usize;
    let mut quote_start: Option<usize> = None;
    let mut clause_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if quote_start.is_some() {
            if b == b'"' {
                quote_start = None;
            }
            i += 1;
            continue;
        }

        let token = match b {
            b'"' => {
                quote_start = Some(i);
                None
            }
            b'(' => {
                paren_depth += 1;
                Some((Token::OpenParen, 1))
            }
            b')' => {
                if paren_depth == 0 {
                    return Err(FilterError::UnbalancedParentheses(i));
                }
                paren_depth -= 1;
                Some((Token::CloseParen, 1))
            }
            b'&' if bytes.get(i + 1) == Some(&b'&') => Some((Token::And, 2)),
            b'|' if bytes.get(i + 1) == Some(&b'|') => Some((Token::Or, 2)),
            _ => None,
        };

        match token {
            Some((token, width)) => {
                push_clause(&mut tokens, &expression[clause_start..i]);
                tokens.push(token);
                i += width;
                clause_start = i;
            }
            None => i += 1,
        }
    }

    if let Some(pos) = quote_start {
        return Err(FilterError::UnterminatedQuote(pos));
    }
    if paren_depth != 0 {
        return Err(FilterError::UnbalancedParentheses(expression.len()));
    }

    push_clause(&mut tokens, &expression[clause_start..]);
    Ok(tokens)
}

fn push_clause<'a>(tokens: &mut Tokens<'a>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        tokens.push(Token::Clause(text));
    }
}

/// Operands and connectives of one parenthesized level
#[derive(Default)]
struct Group<'a> {
    operands: Vec<ExpressionNode>,
    connectives: Vec<Token<'a>>,
}

impl<'a> Group<'a> {
    #[inline]
    fn awaiting_operand(&self) -> bool {
        self.operands.len() == self.connectives.len()
    }

    fn expect_operand(&self, before: Token<'a>) -> Result<()> {
        if self.awaiting_operand() {
            Ok(())
        } else {
            Err(FilterError::MissingConnective(format!("before '{}'", before)))
        }
    }

    /// Fold from the right: `A && B || C` becomes `A && (B || C)`
    fn finish(mut self, grouped: bool) -> Result<ExpressionNode> {
        if self.awaiting_operand() {
            return Err(match self.connectives.last() {
                Some(connective) => {
                    FilterError::MissingOperand(format!("'{}' has no right operand", connective))
                }
                None if grouped => FilterError::EmptyGroup,
                None => FilterError::MissingOperand(String::new()),
            });
        }

        let Some(mut node) = self.operands.pop() else {
            return Err(FilterError::EmptyGroup);
        };
        while let (Some(connective), Some(left)) = (self.connectives.pop(), self.operands.pop()) {
            let (left, right) = (Box::new(left), Box::new(node));
            node = match connective {
                Token::And => ExpressionNode::And(left, right),
                _ => ExpressionNode::Or(left, right),
            };
        }
        Ok(node)
    }
}

// No precedence: the first top-level connective splits the expression
fn parse_tokens(tokens: &[Token<'_>]) -> Result<ExpressionNode> {
    let mut current = Group::default();
    let mut enclosing: Vec<Group<'_>> = Vec::new();

    for &token in tokens {
        match token {
            Token::Clause(text) => {
                current.expect_operand(token)?;
                current
                    .operands
                    .push(ExpressionNode::Clause(parse_clause(text)?));
            }
            Token::OpenParen => {
                current.expect_operand(token)?;
                enclosing.push(mem::take(&mut current));
            }
            Token::CloseParen => {
                let outer = enclosing
                    .pop()
                    .ok_or(FilterError::UnbalancedParentheses(0))?;
                let inner = mem::replace(&mut current, outer);
                current.operands.push(inner.finish(true)?);
            }
            Token::And | Token::Or => {
                if current.awaiting_operand() {
                    return Err(FilterError::MissingOperand(format!(
                        "'{}' has no left operand",
                        token
                    )));
                }
                current.connectives.push(token);
            }
        }
    }

    if !enclosing.is_empty() {
        return Err(FilterError::UnbalancedParentheses(0));
    }
    current.finish(false)
}

/// Parse a single `[EventName::]Property Operator Literal` clause
pub fn parse_clause(text: &str) -> Result<Clause> {
    let clause = text.trim();
    if clause.is_empty() {
        return Err(FilterError::EmptyExpression);
    }

    let (event_name, rest) = split_qualifier(clause)?;

    let property_len = rest
        .find(|c: char| !is_property_char(c))
        .unwrap_or(rest.len());
    if property_len == 0 {
        return Err(FilterError::MissingProperty(clause.to_string()));
    }
    let property = &rest[..property_len];

    let (operator, remainder) = match_operator(rest[property_len..].trim_start())
        .ok_or_else(|| FilterError::InvalidOperator(clause.to_string()))?;

    let literal_text = remainder.trim();
    if literal_text.is_empty() {
        return Err(FilterError::MissingLiteral(clause.to_string()));
    }
    let literal = parse_literal(literal_text)
        .ok_or_else(|| FilterError::InvalidLiteral(clause.to_string()))?;

    Ok(Clause {
        event_name: event_name.map(str::to_string),
        property: property.to_string(),
        operator,
        literal,
    })
}

/// Split off an `EventName::` prefix; `::` must touch both names
fn split_qualifier(clause: &str) -> Result<(Option<&str>, &str)> {
    let head_len = clause
        .find(|c: char| c.is_whitespace() || is_operator_char(c))
        .unwrap_or(clause.len());
    let head = &clause[..head_len];

    match head.find("::") {
        Some(0) => Err(FilterError::InvalidQualifier(clause.to_string())),
        Some(pos) => {
            let rest = &clause[pos + 2..];
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Err(FilterError::InvalidQualifier(clause.to_string()));
            }
            Ok((Some(&clause[..pos]), rest))
        }
        None if clause[head_len..].trim_start().starts_with("::") => {
            Err(FilterError::InvalidQualifier(clause.to_string()))
        }
        None => Ok((None, clause)),
    }
}

fn match_operator(text: &str) -> Option<(Operator, &str)> {
    for (symbol, operator) in SYMBOL_OPERATORS {
        if let Some(rest) = text.strip_prefix(symbol) {
            return Some((operator, rest));
        }
    }

    let keyword_len = CONTAINS_KEYWORD.len();
    let head = text.get(..keyword_len)?;
    let rest = &text[keyword_len..];
    if head.eq_ignore_ascii_case(CONTAINS_KEYWORD) && rest.starts_with(char::is_whitespace) {
        return Some((Operator::Contains, rest));
    }

    None
}

fn parse_literal(text: &str) -> Option<Literal> {
    if let Some(quoted) = text.strip_prefix('"') {
        let content = quoted.strip_suffix('"')?;
        if content.contains('"') {
            return None;
        }
        return Some(Literal::new(content));
    }

    if text.contains('"')
        || text.contains(is_operator_char)
        || text.chars().any(char::is_whitespace)
    {
        return None;
    }
    Some(Literal::new(text))
}

#[inline]
fn is_property_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

#[inline]
fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(expr: &str) -> Clause {
        match &parse(expr).unwrap() {
            ExpressionNode::Clause(clause) => clause.clone(),
            other => panic!("Expected single clause for {}, got {:?}", expr, other),
        }
    }

    #[test]
    fn test_parse_simple_clause() {
        let clause = single("Depth >= 10");
        assert_eq!(clause.event_name, None);
        assert_eq!(clause.property, "Depth");
        assert_eq!(clause.operator, Operator::GreaterEqual);
        assert_eq!(clause.literal.text, "10");
    }

    #[test]
    fn test_parse_qualified_clause() {
        let clause = single("GC/Start::Depth >= 10");
        assert_eq!(clause.event_name.as_deref(), Some("GC/Start"));
        assert_eq!(clause.property, "Depth");
        assert_eq!(clause.operator, Operator::GreaterEqual);
    }

    #[test]
    fn test_parse_all_operators() {
        let operators = [
            ("Depth=5", Operator::Equal),
            ("Depth==5", Operator::Equal),
            ("Depth!=5", Operator::NotEqual),
            ("Depth<5", Operator::Less),
            ("Depth<=5", Operator::LessEqual),
            ("Depth>5", Operator::Greater),
            ("Depth>=5", Operator::GreaterEqual),
            ("Depth Contains 5", Operator::Contains),
            ("Depth contains 5", Operator::Contains),
        ];

        for (expr, expected) in operators {
            assert_eq!(single(expr).operator, expected, "Failed for: {}", expr);
        }
    }

    #[test]
    fn test_whitespace_around_operator() {
        for expr in [
            "Depth >= 10",
            "Depth>= 10",
            "Depth >=10",
            "Depth>=10",
            "(Depth >= 10)",
            "(Depth>= 10)",
            "(Depth >=10)",
            "(Depth>=10)",
        ] {
            let clause = single(expr);
            assert_eq!(clause.property, "Depth", "Failed for: {}", expr);
            assert_eq!(clause.operator, Operator::GreaterEqual, "Failed for: {}", expr);
            assert_eq!(clause.literal.text, "10", "Failed for: {}", expr);
        }
    }

    #[test]
    fn test_comma_literal_kept_verbatim() {
        let clause = single("ThreadID = 1,001");
        assert_eq!(clause.literal.text, "1,001");
        assert_eq!(
            clause.literal.number,
            Some(crate::query::evaluator::Number::Integer(1001))
        );
    }

    #[test]
    fn test_quoted_literal() {
        let clause = single("Name == \"Idle (0) && more\"");
        assert_eq!(clause.literal.text, "Idle (0) && more");

        let clause = single("Name == \"\"");
        assert_eq!(clause.literal.text, "");

        let clause = single("Depth == \"10=5\"");
        assert_eq!(clause.literal.text, "10=5");
    }

    #[test]
    fn test_invalid_expressions() {
        let invalid = [
            "",
            " ",
            "Depth 1000",
            "> 1000",
            "Depth <",
            "Depth ^ 100",
            "Depth < = 100",
            "Depth <= = 100",
            "GC:: Depth = 100",
            "GC ::Depth = 100",
            "GC :: Depth = 100",
            "::Depth = 100",
            "GC::",
            "Depth == 10 20",
            "Depth Contains10",
            "Name == \"open",
            "Name == a\"b",
            "Depth=10=5",
            "Depth == 1<2",
            "Name Contains a!=b",
        ];

        for expr in invalid {
            assert!(!is_valid_expression(expr), "Should reject: {:?}", expr);
        }
    }

    #[test]
    fn test_invalid_structure() {
        assert!(matches!(parse("()"), Err(FilterError::EmptyGroup)));
        assert!(matches!(
            parse("(Depth > 1"),
            Err(FilterError::UnbalancedParentheses(_))
        ));
        assert!(matches!(
            parse("Depth > 1)"),
            Err(FilterError::UnbalancedParentheses(9))
        ));
        assert!(matches!(
            parse("Depth > 1 &&"),
            Err(FilterError::MissingOperand(_))
        ));
        assert!(matches!(
            parse("|| Depth > 1"),
            Err(FilterError::MissingOperand(_))
        ));
        assert!(matches!(
            parse("(Depth > 1) (Depth < 5)"),
            Err(FilterError::MissingConnective(_))
        ));
        assert!(matches!(
            parse("GC ::Depth = 100"),
            Err(FilterError::InvalidQualifier(_))
        ));
        assert!(matches!(
            parse("Depth ^ 100"),
            Err(FilterError::InvalidOperator(_))
        ));
        assert!(matches!(
            parse("Depth <"),
            Err(FilterError::MissingLiteral(_))
        ));
        assert!(matches!(
            parse("> 1000"),
            Err(FilterError::MissingProperty(_))
        ));
    }

    #[test]
    fn test_parse_and_or() {
        assert!(matches!(
            parse("(Depth >= 10) && (Depth <= 20)").unwrap(),
            ExpressionNode::And(_, _)
        ));
        assert!(matches!(
            parse("Depth <= 10 || Depth <= 20").unwrap(),
            ExpressionNode::Or(_, _)
        ));
    }

    #[test]
    fn test_first_connective_splits() {
        // A && B || C groups as A && (B || C)
        match &parse("A == 1 && B == 2 || C == 3").unwrap() {
            ExpressionNode::And(left, right) => {
                assert!(matches!(**left, ExpressionNode::Clause(_)));
                assert!(matches!(**right, ExpressionNode::Or(_, _)));
            }
            other => panic!("Expected AND at the root, got {:?}", other),
        }

        // A || B && C groups as A || (B && C)
        match &parse("A == 1 || B == 2 && C == 3").unwrap() {
            ExpressionNode::Or(_, right) => {
                assert!(matches!(**right, ExpressionNode::And(_, _)));
            }
            other => panic!("Expected OR at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_group_on_left() {
        match &parse("(A == 1 || B == 2) && C == 3").unwrap() {
            ExpressionNode::And(left, _) => {
                assert!(matches!(**left, ExpressionNode::Or(_, _)));
            }
            other => panic!("Expected AND at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_deep_nesting() {
        let expr = "((((((Depth >= 1) && (Depth <= 9)) || (Depth == 20)) && (Name != x)) || (GC/Start::Depth == 100)) && (Depth != 5))";
        let node = parse(expr).unwrap();
        assert_eq!(node.clause_count(), 6);
        assert_eq!(node.depth(), 6);
    }

    #[test]
    fn test_thousand_nested_groups() {
        let levels = 1_000;
        let expr = format!("{}Depth > 1{}", "(".repeat(levels), ")".repeat(levels));
        assert!(matches!(parse(&expr).unwrap(), ExpressionNode::Clause(_)));

        let mut expr = "Depth == 0".to_string();
        for i in 1..levels {
            expr = format!("({} || Depth == {})", expr, i);
        }
        let node = parse(&expr).unwrap();
        assert_eq!(node.clause_count(), levels);
        assert_eq!(node.depth(), levels);
        assert!(matches!(node, ExpressionNode::Or(_, _)));
    }

    #[test]
    fn test_long_chain_parses() {
        let expr = (0..10_000)
            .map(|i| format!("ThreadID == {}", i))
            .collect::<Vec<_>>()
            .join(" && ");
        let node = parse(&expr).unwrap();
        assert_eq!(node.clause_count(), 10_000);
        assert_eq!(node.depth(), 10_000);

        let unfinished = format!("{} &&", expr);
        assert!(matches!(
            parse(&unfinished),
            Err(FilterError::MissingOperand(_))
        ));
    }

    #[test]
    fn test_redundant_parentheses() {
        let node = parse("((((Depth > 1))))").unwrap();
        assert!(matches!(node, ExpressionNode::Clause(_)));
    }

    #[test]
    fn test_literal_with_double_colon() {
        let clause = single("Name == a::b");
        assert_eq!(clause.event_name, None);
        assert_eq!(clause.literal.text, "a::b");
    }

    #[test]
    fn test_validation_is_idempotent() {
        for expr in ["Depth >= 10", "Depth <", "(A == 1) && B != 2"] {
            assert_eq!(is_valid_expression(expr), is_valid_expression(expr));
        }
    }
}
