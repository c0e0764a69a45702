//! Domain identifier types for move trees, sessions and stored blobs.
//!
//! These types provide type-safe wrappers around the string identifiers that
//! cross the crate boundary (wire format, storage keys, session handles).

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert the identifier into its inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

string_id! {
    /// Identifier of a node inside one move tree.
    ///
    /// Opaque to callers; unique only within the tree that allocated it.
    ///
    /// # Examples
    ///
    /// ```
    /// use movetree::identifiers::NodeId;
    ///
    /// let id = NodeId::new("n3");
    /// assert_eq!(id.as_str(), "n3");
    /// assert_eq!(id, "n3");
    /// ```
    NodeId
}

string_id! {
    /// Identifier of a live solving/playing session.
    SessionId
}

string_id! {
    /// Opaque reference returned by a tree store for a persisted blob.
    StorageRef
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn node_id_borrows_as_str_for_map_lookup() {
        let mut map = HashMap::new();
        map.insert(NodeId::new("root"), 1);
        assert_eq!(map.get("root"), Some(&1));
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&SessionId::new("s-1")).unwrap();
        assert_eq!(json, "\"s-1\"");
        let back: StorageRef = serde_json::from_str("\"blob-7\"").unwrap();
        assert_eq!(back, "blob-7");
    }
}
