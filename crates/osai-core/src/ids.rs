//! Branded ID newtypes.
//!
//! Sessions and jobs get distinct ID types so a job id can never be passed
//! where a session id is expected. Fresh ids are UUID v7 (time-ordered).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

branded_id!(
    /// Identity of one logical agent conversation, owned by a connection.
    SessionId
);

branded_id!(
    /// Identity of one in-flight orchestrator run.
    JobId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn new_ids_are_unique() {
        let ids: HashSet<JobId> = (0..100).map(|_| JobId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn new_id_is_uuid_v7() {
        let id = SessionId::new();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = JobId::from("job-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"job-1\"");
        let back: JobId = serde_json::from_str("\"job-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn borrow_allows_str_lookup() {
        let mut map = HashMap::new();
        let _ = map.insert(JobId::from("abc"), 1);
        assert_eq!(map.get("abc"), Some(&1));
    }

    #[test]
    fn display_matches_inner() {
        let id = SessionId::from("s-42");
        assert_eq!(id.to_string(), "s-42");
        assert_eq!(id.into_inner(), "s-42");
    }
}
