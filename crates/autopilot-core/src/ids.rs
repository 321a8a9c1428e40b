use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn from_raw(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Tracker-assigned identifier of a work item, e.g. `ENG-12`.
    WorkItemId
);

string_id!(
    /// Name of a background multiplexer session.
    SessionName
);

impl SessionName {
    /// Build the name for a new agent session.
    ///
    /// `seq` must be unique per process; it disambiguates launches for the
    /// same item within one second. Characters that tmux treats as target
    /// separators (`.` and `:`) are replaced with `-`.
    pub fn generate(work_item: &WorkItemId, at: chrono::DateTime<chrono::Local>, seq: u64) -> Self {
        let raw = format!(
            "claude-{}-{}-{seq}",
            work_item.as_str(),
            at.format("%Y%m%d-%H%M%S")
        );
        Self(raw.replace(['.', ':'], "-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> chrono::DateTime<chrono::Local> {
        chrono::Local.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap()
    }

    #[test]
    fn generated_name_encodes_item_and_timestamp() {
        let name = SessionName::generate(&WorkItemId::from_raw("ENG-12"), at(), 1);
        assert_eq!(name.as_str(), "claude-ENG-12-20261016-090507-1");
    }

    #[test]
    fn generated_names_differ_by_sequence() {
        let id = WorkItemId::from_raw("ENG-12");
        let a = SessionName::generate(&id, at(), 1);
        let b = SessionName::generate(&id, at(), 2);
        assert_ne!(a, b);
    }

    #[test]
    fn generated_name_strips_target_separators() {
        let name = SessionName::generate(&WorkItemId::from_raw("web.app:7"), at(), 3);
        assert!(!name.as_str().contains('.'), "got: {name}");
        assert!(!name.as_str().contains(':'), "got: {name}");
        assert!(name.as_str().starts_with("claude-web-app-7-"));
    }

    #[test]
    fn display_and_from_str_roundtrip() {
        let id = WorkItemId::from_raw("ENG-1");
        let parsed: WorkItemId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serializes_transparently() {
        let id = WorkItemId::from_raw("ENG-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ENG-1\"");
    }
}
