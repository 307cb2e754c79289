use serde::{Deserialize, Serialize};

///
/// Value
///
/// Tagged scalar used everywhere a field value crosses the engine:
/// payload cells, index bucket keys, and query literals.
///
/// `List` exists only as the flattened form of multi-valued references
/// (a list of primary keys); it is not a queryable or indexable scalar.
///
/// The untagged serde representation maps each variant onto the natural
/// JSON primitive, so payloads stay a plain flat JSON object.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    List(Vec<Value>),
}

impl Value {
    /// Canonical string form used as an index bucket key.
    ///
    /// Scalars only; a `List` never reaches an index bucket because the
    /// schema validator rejects non-scalar indexed fields.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::canonical).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }

    /// Parse a query literal.
    ///
    /// Numeric literals parse as numbers (integers stay integers); anything
    /// else is a string literal with surrounding single quotes stripped.
    #[must_use]
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Int(n);
        }
        if let Ok(n) = trimmed.parse::<f64>() {
            return Self::Float(n);
        }

        let text = trimmed
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap_or(trimmed);

        Self::Text(text.to_string())
    }

    /// Equality with numeric widening: `Int` and `Float` compare by value,
    /// so the literal `2` matches a float field holding `2.0`.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_))
    }

    #[must_use]
    const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn canonical_forms_are_stable() {
        assert_eq!(Value::Int(42).canonical(), "42");
        assert_eq!(Value::Float(2.5).canonical(), "2.5");
        assert_eq!(Value::Float(2.0).canonical(), "2");
        assert_eq!(Value::Text("base_1".into()).canonical(), "base_1");
        assert_eq!(Value::Bool(true).canonical(), "true");
    }

    #[test]
    fn parses_integer_literals_as_int() {
        assert_eq!(Value::parse_literal(" 7 "), Value::Int(7));
        assert_eq!(Value::parse_literal("-3"), Value::Int(-3));
    }

    #[test]
    fn parses_decimal_literals_as_float() {
        assert_eq!(Value::parse_literal("2.5"), Value::Float(2.5));
    }

    #[test]
    fn parses_quoted_literals_with_quotes_stripped() {
        assert_eq!(
            Value::parse_literal("'hello world'"),
            Value::Text("hello world".into())
        );
    }

    #[test]
    fn parses_bare_text_verbatim() {
        assert_eq!(Value::parse_literal("open"), Value::Text("open".into()));
    }

    #[test]
    fn loose_eq_widens_numerics() {
        assert!(Value::Int(2).loose_eq(&Value::Float(2.0)));
        assert!(!Value::Int(2).loose_eq(&Value::Float(2.5)));
        assert!(!Value::Int(1).loose_eq(&Value::Text("1".into())));
    }

    #[test]
    fn json_round_trip_preserves_variants() {
        let values = vec![
            Value::Int(1),
            Value::Float(1.5),
            Value::Text("x".into()),
            Value::Bool(false),
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())]),
        ];
        let json = serde_json::to_string(&values).expect("serialize");
        let back: Vec<Value> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, values);
    }
}
