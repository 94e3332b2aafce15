//! Structural pattern matching for `case` (`spec.md` §4.6).
//!
//! No teacher analogue: `ouros` has no structural pattern matching (Python's
//! `match` statement was not in the retrieved slice of that crate). Built
//! directly from the spec's match table, in the recursive-descent style the
//! teacher uses elsewhere for tree-shaped data (`expressions.rs`).

use std::collections::HashMap;

use crate::ast::Pattern;
use crate::value::Value;

/// Bindings accumulated while matching a pattern against a value.
pub type MatchFrame = HashMap<String, Value>;

/// Attempts to match `pattern` against `value`, threading `frame`.
///
/// - `Wildcard` always matches and binds nothing.
/// - `Ident(x)` always matches and binds `x` to `value` (linearity is not
///   enforced: a name used twice in one pattern just rebinds).
/// - `Sexp(t, ps)` matches `Sexp(t', vs)` only when `t == t'` and the arities
///   agree; children are matched left-to-right, any mismatch aborting the
///   whole match.
/// - Any other shape pairing is a mismatch.
#[must_use]
pub fn match_pattern(pattern: &Pattern, value: &Value, mut frame: MatchFrame) -> Option<MatchFrame> {
    match pattern {
        Pattern::Wildcard => Some(frame),
        Pattern::Ident(name) => {
            frame.insert(name.clone(), value.clone());
            Some(frame)
        }
        Pattern::Sexp(tag, patterns) => {
            let Value::Sexp(value_tag, children) = value else {
                return None;
            };
            if tag != value_tag || patterns.len() != children.len() {
                return None;
            }
            for (p, v) in patterns.iter().zip(children.iter()) {
                frame = match_pattern(p, v, frame)?;
            }
            Some(frame)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_anything_and_binds_nothing() {
        let frame = match_pattern(&Pattern::Wildcard, &Value::Int(5), MatchFrame::new()).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn ident_binds_the_whole_value() {
        let frame = match_pattern(
            &Pattern::Ident("x".to_owned()),
            &Value::Int(5),
            MatchFrame::new(),
        )
        .unwrap();
        assert_eq!(frame.get("x"), Some(&Value::Int(5)));
    }

    #[test]
    fn sexp_pattern_matches_tag_and_arity() {
        let pat = Pattern::Sexp(
            "Pair".to_owned(),
            vec![Pattern::Ident("a".to_owned()), Pattern::Wildcard],
        );
        let val = Value::Sexp(
            "Pair".to_owned(),
            vec![Value::Int(1), Value::Sexp("Nil".to_owned(), vec![])],
        );
        let frame = match_pattern(&pat, &val, MatchFrame::new()).unwrap();
        assert_eq!(frame.get("a"), Some(&Value::Int(1)));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn sexp_pattern_rejects_wrong_tag() {
        let pat = Pattern::Sexp("Pair".to_owned(), vec![]);
        let val = Value::Sexp("Nil".to_owned(), vec![]);
        assert!(match_pattern(&pat, &val, MatchFrame::new()).is_none());
    }

    #[test]
    fn sexp_pattern_rejects_arity_mismatch() {
        let pat = Pattern::Sexp("Pair".to_owned(), vec![Pattern::Wildcard]);
        let val = Value::Sexp("Pair".to_owned(), vec![Value::Int(1), Value::Int(2)]);
        assert!(match_pattern(&pat, &val, MatchFrame::new()).is_none());
    }

    #[test]
    fn duplicate_idents_last_binding_wins() {
        let pat = Pattern::Sexp(
            "Pair".to_owned(),
            vec![Pattern::Ident("x".to_owned()), Pattern::Ident("x".to_owned())],
        );
        let val = Value::Sexp("Pair".to_owned(), vec![Value::Int(1), Value::Int(2)]);
        let frame = match_pattern(&pat, &val, MatchFrame::new()).unwrap();
        assert_eq!(frame.get("x"), Some(&Value::Int(2)));
    }
}
