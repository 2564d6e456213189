use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Name of a constructible component.
///
/// Components are looked up by name in the capability registries, so a
/// `ComponentRef` plays the part a type reference plays in a reflective
/// runtime. Names are lowercase ASCII words joined by `-`, e.g.
/// `"local-fs"` or `"hashed-key"`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentRef(Cow<'static, str>);

impl ComponentRef {
    /// Wrap a built-in name. The name is not validated.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Parse and validate a component name.
    pub fn parse(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(Cow::Owned(name)))
    }

    /// The component name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(name: &str) -> Result<(), TypeError> {
    let fail = |reason| {
        Err(TypeError::InvalidComponentName {
            name: name.to_string(),
            reason,
        })
    };
    if name.is_empty() {
        return fail("empty");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return fail("leading or trailing '-'");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return fail("only lowercase ASCII letters, digits and '-' are allowed");
    }
    Ok(())
}

impl TryFrom<String> for ComponentRef {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ComponentRef> for String {
    fn from(value: ComponentRef) -> Self {
        value.0.into_owned()
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentRef({})", self.0)
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_kebab_case() {
        let c = ComponentRef::parse("local-fs").unwrap();
        assert_eq!(c.as_str(), "local-fs");
        assert_eq!(c, ComponentRef::from_static("local-fs"));
    }

    #[test]
    fn parse_rejects_bad_names() {
        assert!(ComponentRef::parse("").is_err());
        assert!(ComponentRef::parse("-fs").is_err());
        assert!(ComponentRef::parse("Local").is_err());
        assert!(ComponentRef::parse("a b").is_err());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let c: ComponentRef = serde_json::from_str("\"gzip\"").unwrap();
        assert_eq!(c.as_str(), "gzip");
        assert!(serde_json::from_str::<ComponentRef>("\"GZip\"").is_err());
    }

    #[test]
    fn display_is_bare_name() {
        assert_eq!(ComponentRef::from_static("zstd").to_string(), "zstd");
    }

    proptest::proptest! {
        #[test]
        fn valid_names_survive_parse(name in "[a-z][a-z0-9]{0,6}(-[a-z0-9]{1,6}){0,3}") {
            let c = ComponentRef::parse(name.clone()).unwrap();
            proptest::prop_assert_eq!(c.as_str(), name.as_str());
        }
    }
}
