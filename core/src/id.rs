//! Identifiers.

use core::fmt;
use core::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new, process-unique identifier.
            pub fn new() -> $name {
                $name(Uuid::new_v4())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map($name)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                $name(uuid)
            }
        }
    };
}

uuid_id! {
    /// Identifies a context (a window, menu, menu bar, context menu, or the dock).
    ///
    /// Native callbacks pass this back in its hyphenated string form.
    ContextId
}

uuid_id! {
    /// Identifies an element in a mounted markup tree.
    ///
    /// Stable across re-renders of the same logical node, so patches can target the native
    /// counterpart.
    ElementId
}

#[test]
fn test_id_string_round_trip() {
    let id = ContextId::new();
    let parsed: ContextId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
    assert_ne!(ContextId::new(), ContextId::new(), "ids should be unique");
    assert!("not an id".parse::<ElementId>().is_err());
}
