//! Evaluation of array dimension expressions.
//!
//! Only a flat sum of unsigned literals is understood: `4096`, `0x1000`,
//! `4096+4096`, `0x800 + 2048`. Anything symbolic is rejected.

use crate::error::{Error, Result};

/// Largest capacity a single allocation can hold
pub const MAX_CAPACITY: usize = isize::MAX as usize;

/// Evaluates the dimension `expression` of array `name` into its capacity.
///
/// Sums above [`MAX_CAPACITY`] fail with [`Error::CapacityOverflow`].
pub fn evaluate(name: &str, expression: &str) -> Result<usize> {
    let overflow = || Error::CapacityOverflow {
        name: name.to_string(),
        expression: expression.to_string(),
    };
    let mut total: usize = 0;

    for raw in expression.split('+') {
        let term = raw.trim();
        let value =
            parse_term(term).ok_or_else(|| Error::malformed_size(name, term, expression))?;
        total = total.checked_add(value).ok_or_else(overflow)?;
    }

    if total > MAX_CAPACITY {
        return Err(overflow());
    }
    Ok(total)
}

/// Parses one unsigned decimal or `0x`-prefixed hex literal.
fn parse_term(term: &str) -> Option<usize> {
    let (digits, radix) = match term.get(..2) {
        Some("0x" | "0X") => (&term[2..], 16),
        _ => (term, 10),
    };

    // from_str_radix accepts a leading '+', which is not a literal here
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    usize::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_literals() {
        assert_eq!(evaluate("a", "4").unwrap(), 4);
        assert_eq!(evaluate("a", "0x1000").unwrap(), 4096);
        assert_eq!(evaluate("a", "0XfF").unwrap(), 255);
        assert_eq!(evaluate("a", "0").unwrap(), 0);
        assert_eq!(evaluate("a", "007").unwrap(), 7);
    }

    #[test]
    fn test_sums() {
        assert_eq!(evaluate("a", "4+4").unwrap(), 8);
        assert_eq!(evaluate("a", " 4096 + 4096 ").unwrap(), 8192);
        assert_eq!(evaluate("a", "0x800+\n2048 + 0").unwrap(), 4096);
    }

    #[test]
    fn test_malformed_terms() {
        for (expr, bad) in [
            ("N", "N"),
            ("4096 + N", "N"),
            ("4*4", "4*4"),
            ("(4)", "(4)"),
            ("-1", "-1"),
            ("4+", ""),
            ("0x", "0x"),
            ("0xZZ", "0xZZ"),
            ("1.5", "1.5"),
        ] {
            match evaluate("table", expr) {
                Err(Error::MalformedSizeExpression {
                    name,
                    term,
                    expression,
                }) => {
                    assert_eq!(name, "table");
                    assert_eq!(term, bad, "expression {:?}", expr);
                    assert_eq!(expression, expr);
                }
                other => panic!("expected malformed size for {:?}, got {:?}", expr, other),
            }
        }
    }

    #[test]
    fn test_overflow() {
        let expr = format!("{} + 1", usize::MAX);
        assert!(matches!(
            evaluate("big", &expr),
            Err(Error::CapacityOverflow { .. })
        ));
    }

    #[test]
    fn test_capacity_above_allocation_limit() {
        let expr = format!("{:#x}", usize::MAX);
        match evaluate("big", &expr) {
            Err(Error::CapacityOverflow { name, expression }) => {
                assert_eq!(name, "big");
                assert_eq!(expression, expr);
            }
            other => panic!("expected CapacityOverflow, got {:?}", other),
        }

        let limit = MAX_CAPACITY.to_string();
        assert_eq!(evaluate("edge", &limit).unwrap(), MAX_CAPACITY);
        assert!(evaluate("edge", &format!("{} + 1", limit)).is_err());
    }
}
