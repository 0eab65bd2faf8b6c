//! Identifier wrappers for OPNsense resources.
//!
//! OPNsense assigns a UUID to every rule, alias and NAT entry. The values are
//! treated as opaque: they are never validated before being placed in a
//! request path, so whatever the appliance returned can be sent back as is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate opaque identifier wrapper types.
macro_rules! uuid_type {
    ($(#[$meta:meta])* $name:ident, $doc:expr) => {
        $(#[$meta])*
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier exactly as given.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Converts into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

uuid_type!(RuleUuid, "Firewall filter rule UUID");
uuid_type!(AliasUuid, "Firewall alias UUID");
uuid_type!(NatRuleUuid, "Source NAT rule UUID");

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_opaque_ids_are_not_validated() {
        let rule = RuleUuid::from("abc");
        assert_eq!(rule.as_str(), "abc");
        assert_eq!(rule.to_string(), "abc");
    }

    #[test]
    fn test_new_keeps_value_verbatim() {
        let nat = NatRuleUuid::new(VALID_UUID);
        assert_eq!(nat.as_ref(), VALID_UUID);
    }

    #[test]
    fn test_serialize_transparent() {
        let alias = AliasUuid::from(VALID_UUID.to_string());
        let json = serde_json::to_string(&alias).unwrap();
        assert_eq!(json, format!("\"{VALID_UUID}\""));

        let back: AliasUuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alias);
    }

    #[test]
    fn test_into_inner() {
        let rule = RuleUuid::new("u1");
        assert_eq!(rule.into_inner(), "u1".to_string());
    }
}
