//! Filter expression evaluator

use smallvec::SmallVec;
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::event::CandidateEvent;
use crate::query::ast::{Clause, ExpressionNode, Operator};

/// Evaluate an expression node against a candidate event.
///
/// Walks left operands on an explicit stack and only visits a right operand
/// when the left one did not already decide the result.
pub fn check<E: CandidateEvent + ?Sized>(root: &ExpressionNode, event: &E) -> bool {
    let mut pending: SmallVec<[&ExpressionNode; 16]> = SmallVec::new();
    let mut node = root;

    loop {
        let value = loop {
            match node {
                ExpressionNode::Clause(clause) => break check_clause(clause, event),
                ExpressionNode::And(left, _) | ExpressionNode::Or(left, _) => {
                    pending.push(node);
                    node = &**left;
                }
            }
        };

        // Unwind until a connective needs its right operand
        loop {
            match pending.pop() {
                None => return value,
                Some(ExpressionNode::And(_, right)) if value => {
                    node = &**right;
                    break;
                }
                Some(ExpressionNode::Or(_, right)) if !value => {
                    node = &**right;
                    break;
                }
                Some(_) => {}
            }
        }
    }
}

/// Evaluate a single clause against a candidate event
pub fn check_clause<E: CandidateEvent + ?Sized>(clause: &Clause, event: &E) -> bool {
    if let Some(qualifier) = &clause.event_name {
        if qualifier != event.event_name() {
            return false;
        }
    }

    let Some(actual) = event.property(&clause.property) else {
        return false;
    };
    let expected = &clause.literal;

    match clause.operator {
        Operator::Equal => actual == expected.text.as_str(),
        Operator::NotEqual => actual != expected.text.as_str(),
        Operator::Contains => actual.contains(expected.text.as_str()),
        op => {
            let (Some(lhs), Some(rhs)) = (Number::parse(&actual), expected.number) else {
                return false;
            };
            match lhs.compare(rhs) {
                Some(ordering) => match op {
                    Operator::Less => ordering == Ordering::Less,
                    Operator::LessEqual => ordering != Ordering::Greater,
                    Operator::Greater => ordering == Ordering::Greater,
                    Operator::GreaterEqual => ordering != Ordering::Less,
                    _ => false,
                },
                None => false,
            }
        }
    }
}

/// Numeric reading of a property value or literal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Wide enough for every i64 and u64 payload field
    Integer(i128),
    Float(f64),
}

impl Number {
    /// Parse decimal, `0x` hexadecimal or floating point text.
    /// Grouping commas ("1,001") are ignored.
    pub fn parse(text: &str) -> Option<Number> {
        let text: Cow<'_, str> = if text.contains(',') {
            Cow::Owned(text.chars().filter(|&c| c != ',').collect())
        } else {
            Cow::Borrowed(text)
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (negative, digits) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let value = i128::from_str_radix(hex, 16).ok()?;
            let value = if negative { value.checked_neg()? } else { value };
            return Some(Number::Integer(value));
        }

        if let Ok(i) = text.parse::<i128>() {
            return Some(Number::Integer(i));
        }

        // Reject "inf"/"nan" spellings; only plain numerals count
        if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    /// Integers and floats compare exactly, without rounding the integer
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(&b)),
            (Number::Integer(a), Number::Float(b)) => compare_integer_float(a, b),
            (Number::Float(a), Number::Integer(b)) => {
                compare_integer_float(b, a).map(Ordering::reverse)
            }
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
        }
    }
}

/// 2^127, the first float past the i128 range
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

fn compare_integer_float(a: i128, b: f64) -> Option<Ordering> {
    if b.is_nan() {
        return None;
    }
    if b >= I128_LIMIT {
        return Some(Ordering::Less);
    }
    if b < -I128_LIMIT {
        return Some(Ordering::Greater);
    }

    let floor = b.floor();
    Some(match a.cmp(&(floor as i128)) {
        Ordering::Equal if b > floor => Ordering::Less,
        ordering => ordering,
    })
}
