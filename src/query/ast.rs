//! Abstract Syntax Tree for filter expressions
//!
//! Chains of clauses build trees as deep as they are long, so every walk
//! over [`ExpressionNode`] (including clone, comparison and drop) keeps its
//! own stack instead of recursing.

use serde::Serialize;
use std::fmt;
use std::mem;

use crate::query::evaluator::Number;

/// Node of a parsed filter expression
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionNode {
    /// Single comparison like "GC/Start::Depth >= 2"
    Clause(Clause),
    /// AND operation
    And(Box<ExpressionNode>, Box<ExpressionNode>),
    /// OR operation
    Or(Box<ExpressionNode>, Box<ExpressionNode>),
}

impl ExpressionNode {
    /// Number of clause leaves below this node
    pub fn clause_count(&self) -> usize {
        let mut pending = vec![self];
        let mut count = 0;

        while let Some(node) = pending.pop() {
            match node {
                ExpressionNode::Clause(_) => count += 1,
                ExpressionNode::And(l, r) | ExpressionNode::Or(l, r) => {
                    pending.push(l);
                    pending.push(r);
                }
            }
        }
        count
    }

    /// Longest root-to-leaf path, counting the leaf
    pub fn depth(&self) -> usize {
        let mut pending = vec![(self, 1usize)];
        let mut deepest = 0;

        while let Some((node, level)) = pending.pop() {
            match node {
                ExpressionNode::Clause(_) => deepest = deepest.max(level),
                ExpressionNode::And(l, r) | ExpressionNode::Or(l, r) => {
                    pending.push((&**l, level + 1));
                    pending.push((&**r, level + 1));
                }
            }
        }
        deepest
    }

    /// Leaf that owns no heap memory, left behind when children are detached
    fn placeholder() -> Self {
        ExpressionNode::Clause(Clause {
            event_name: None,
            property: String::new(),
            operator: Operator::Equal,
            literal: Literal {
                text: String::new(),
                number: None,
            },
        })
    }

    /// Move non-leaf children into `out`, leaving placeholders
    fn detach_children(&mut self, out: &mut Vec<ExpressionNode>) {
        if let ExpressionNode::And(l, r) | ExpressionNode::Or(l, r) = self {
            for child in [l, r] {
                if !matches!(**child, ExpressionNode::Clause(_)) {
                    out.push(mem::replace(&mut **child, ExpressionNode::placeholder()));
                }
            }
        }
    }
}

impl Drop for ExpressionNode {
    fn drop(&mut self) {
        let mut detached = Vec::new();
        self.detach_children(&mut detached);

        // Each popped node only has leaf children left when it goes out of scope
        while let Some(mut node) = detached.pop() {
            node.detach_children(&mut detached);
        }
    }
}

impl Clone for ExpressionNode {
    fn clone(&self) -> Self {
        enum Step<'a> {
            Visit(&'a ExpressionNode),
            Join(&'a ExpressionNode),
        }

        let mut steps = vec![Step::Visit(self)];
        let mut built: Vec<ExpressionNode> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(node) => match node {
                    ExpressionNode::Clause(clause) => {
                        built.push(ExpressionNode::Clause(clause.clone()))
                    }
                    ExpressionNode::And(l, r) | ExpressionNode::Or(l, r) => {
                        steps.push(Step::Join(node));
                        steps.push(Step::Visit(r));
                        steps.push(Step::Visit(l));
                    }
                },
                Step::Join(node) => {
                    let (Some(right), Some(left)) = (built.pop(), built.pop()) else {
                        continue;
                    };
                    let (left, right) = (Box::new(left), Box::new(right));
                    built.push(match node {
                        ExpressionNode::And(..) => ExpressionNode::And(left, right),
                        _ => ExpressionNode::Or(left, right),
                    });
                }
            }
        }

        built.pop().unwrap_or_else(ExpressionNode::placeholder)
    }
}

impl PartialEq for ExpressionNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs = vec![(self, other)];

        while let Some(pair) = pairs.pop() {
            match pair {
                (ExpressionNode::Clause(a), ExpressionNode::Clause(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (ExpressionNode::And(al, ar), ExpressionNode::And(bl, br))
                | (ExpressionNode::Or(al, ar), ExpressionNode::Or(bl, br)) => {
                    pairs.push((&**ar, &**br));
                    pairs.push((&**al, &**bl));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Atomic property comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    /// Restricts the clause to events with exactly this name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub property: String,
    pub operator: Operator,
    pub literal: Literal,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// Equal (= or ==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Greater than (>)
    Greater,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Substring match (Contains)
    Contains,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Contains => "Contains",
        }
    }

    /// Relational operators compare numerically
    #[inline]
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Operator::Less | Operator::LessEqual | Operator::Greater | Operator::GreaterEqual
        )
    }
}

/// Right-hand side of a clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    /// Text as written, without surrounding quotes
    pub text: String,
    /// Numeric reading with grouping commas removed, if any
    #[serde(skip)]
    pub number: Option<Number>,
}

impl Literal {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let number = Number::parse(&text);
        Self { text, number }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(event_name) = &self.event_name {
            write!(f, "{}::", event_name)?;
        }
        write!(f, "{} {} ", self.property, self.operator)?;

        let text = &self.literal.text;
        let needs_quotes = text.is_empty()
            || text.chars().any(|c| c.is_whitespace() || matches!(c, '(' | ')'))
            || text.contains("&&")
            || text.contains("||")
            || text.contains(['<', '>', '=', '!']);
        if needs_quotes {
            write!(f, "\"{}\"", text)
        } else {
            f.write_str(text)
        }
    }
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Piece<'a> {
            Node(&'a ExpressionNode),
            Text(&'static str),
        }

        let mut pieces = vec![Piece::Node(self)];
        while let Some(piece) = pieces.pop() {
            match piece {
                Piece::Text(text) => f.write_str(text)?,
                Piece::Node(ExpressionNode::Clause(clause)) => write!(f, "{}", clause)?,
                Piece::Node(ExpressionNode::And(l, r)) => pieces.extend([
                    Piece::Text(")"),
                    Piece::Node(r),
                    Piece::Text(" && "),
                    Piece::Node(l),
                    Piece::Text("("),
                ]),
                Piece::Node(ExpressionNode::Or(l, r)) => pieces.extend([
                    Piece::Text(")"),
                    Piece::Node(r),
                    Piece::Text(" || "),
                    Piece::Node(l),
                    Piece::Text("("),
                ]),
            }
        }
        Ok(())
    }
}
