use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A constructor argument value.
///
/// Values read from a configuration provider always arrive as
/// [`Literal::Str`]; the typed accessors parse them on demand so a
/// component can declare an integer parameter and still be configured from
/// a string source.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Literal {
    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, parsing strings.
    pub fn to_i64(&self) -> Result<i64, TypeError> {
        match self {
            Literal::Int(i) => Ok(*i),
            Literal::Str(s) => s.trim().parse().map_err(|_| self.kind_error("integer")),
            Literal::Bool(_) => Err(self.kind_error("integer")),
        }
    }

    /// The value as a boolean, parsing `"true"`/`"false"`.
    pub fn to_bool(&self) -> Result<bool, TypeError> {
        match self {
            Literal::Bool(b) => Ok(*b),
            Literal::Str(s) => match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(self.kind_error("boolean")),
            },
            Literal::Int(_) => Err(self.kind_error("boolean")),
        }
    }

    fn kind_error(&self, expected: &'static str) -> TypeError {
        TypeError::LiteralKind {
            expected,
            actual: self.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::Str(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::Str(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(i64::from(value))
    }
}

impl From<u32> for Literal {
    fn from(value: u32) -> Self {
        Literal::Int(i64::from(value))
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_values_parse_to_int_and_bool() {
        assert_eq!(Literal::from("9").to_i64().unwrap(), 9);
        assert_eq!(Literal::from(" 12 ").to_i64().unwrap(), 12);
        assert!(Literal::from("true").to_bool().unwrap());
        assert!(Literal::from("nine").to_i64().is_err());
        assert!(Literal::Int(1).to_bool().is_err());
    }

    #[test]
    fn untagged_serde() {
        let lits: Vec<Literal> = serde_json::from_str(r#"["a", 3, false]"#).unwrap();
        assert_eq!(
            lits,
            vec![Literal::from("a"), Literal::Int(3), Literal::Bool(false)]
        );
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Literal::from("/data").to_string(), "\"/data\"");
        assert_eq!(Literal::Int(6).to_string(), "6");
    }
}
