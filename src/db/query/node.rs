use crate::{db::codec::Payload, error::InternalError, value::Value};

///
/// QueryOp
/// How a predicate chains onto the nodes before it. The first node of a
/// query is the root; there is no precedence beyond left-to-right order.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum QueryOp {
    Root,
    And,
    Or,
}

///
/// QueryNode
///
/// One parsed equality predicate: `attribute = value`. Numeric literals
/// parse as numbers; everything else is a string literal with surrounding
/// quotes stripped.
///

#[derive(Clone, Debug)]
pub(crate) struct QueryNode {
    pub attribute: String,
    pub op: QueryOp,
    pub expected: Value,
}

impl QueryNode {
    pub(crate) fn parse(expression: &str, op: QueryOp) -> Result<Self, InternalError> {
        let Some((attribute, raw)) = expression.split_once('=') else {
            return Err(InternalError::query_unsupported(format!(
                "malformed predicate '{expression}': expected 'attribute = value'"
            )));
        };

        let attribute = attribute.trim();
        if attribute.is_empty() {
            return Err(InternalError::query_unsupported(format!(
                "malformed predicate '{expression}': empty attribute"
            )));
        }

        Ok(Self {
            attribute: attribute.to_string(),
            op,
            expected: Value::parse_literal(raw),
        })
    }

    /// Evaluate this predicate against one raw payload. A missing
    /// attribute never matches.
    pub(crate) fn matches(&self, payload: &Payload) -> bool {
        payload
            .get(&self.attribute)
            .is_some_and(|actual| self.expected.loose_eq(actual))
    }
}

/// Left-to-right boolean fold of a predicate chain over one payload.
/// No precedence: each node folds its result into the running value.
pub(crate) fn eval_chain(nodes: &[QueryNode], payload: &Payload) -> bool {
    let mut qualified = false;
    for node in nodes {
        let hit = node.matches(payload);
        qualified = match node.op {
            QueryOp::Root => hit,
            QueryOp::And => qualified && hit,
            QueryOp::Or => qualified || hit,
        };
    }

    qualified
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(pairs: &[(&str, Value)]) -> Payload {
        let mut p = Payload::default();
        for (name, value) in pairs {
            p.insert(name, value.clone());
        }
        p
    }

    #[test]
    fn parses_numeric_expression() {
        let node = QueryNode::parse("qty = 3", QueryOp::Root).expect("parse");
        assert_eq!(node.attribute, "qty");
        assert_eq!(node.expected, Value::Int(3));
    }

    #[test]
    fn parses_quoted_string_expression() {
        let node = QueryNode::parse("status = 'open'", QueryOp::And).expect("parse");
        assert_eq!(node.expected, Value::Text("open".into()));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let node = QueryNode::parse("note = 'a=b'", QueryOp::Root).expect("parse");
        assert_eq!(node.attribute, "note");
        assert_eq!(node.expected, Value::Text("a=b".into()));
    }

    #[test]
    fn rejects_expression_without_equals() {
        let err = QueryNode::parse("status", QueryOp::Root).unwrap_err();
        assert_eq!(err.origin, crate::error::ErrorOrigin::Query);
    }

    #[test]
    fn missing_attribute_never_matches() {
        let node = QueryNode::parse("ghost = 1", QueryOp::Root).expect("parse");
        assert!(!node.matches(&payload(&[("qty", Value::Int(1))])));
    }

    #[test]
    fn numeric_literals_match_across_int_and_float() {
        let node = QueryNode::parse("price = 2", QueryOp::Root).expect("parse");
        assert!(node.matches(&payload(&[("price", Value::Float(2.0))])));
    }

    #[test]
    fn chain_folds_left_to_right_without_precedence() {
        let nodes = vec![
            QueryNode::parse("a = 1", QueryOp::Root).expect("parse"),
            QueryNode::parse("b = 2", QueryOp::Or).expect("parse"),
            QueryNode::parse("c = 3", QueryOp::And).expect("parse"),
        ];

        // (a=1 OR b=2) AND c=3 under sequential folding.
        let hit = payload(&[
            ("a", Value::Int(1)),
            ("b", Value::Int(0)),
            ("c", Value::Int(3)),
        ]);
        let miss = payload(&[
            ("a", Value::Int(1)),
            ("b", Value::Int(2)),
            ("c", Value::Int(0)),
        ]);

        assert!(eval_chain(&nodes, &hit));
        assert!(!eval_chain(&nodes, &miss));
    }
}
