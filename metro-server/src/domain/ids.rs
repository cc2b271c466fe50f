//! Identifier types.
//!
//! Timetable identifiers are opaque strings (e.g. `IDFM:463193`). Wrapping
//! each kind in its own type keeps a platform id from being passed where a
//! station id is expected.

use std::fmt;

use serde::Serialize;

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting empty or padded strings.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                if s.is_empty() {
                    return Err(InvalidId {
                        kind: $kind,
                        reason: "must not be empty",
                    });
                }
                if s.trim() != s {
                    return Err(InvalidId {
                        kind: $kind,
                        reason: "must not have surrounding whitespace",
                    });
                }
                Ok(Self(s.to_string()))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// One directional stopping point of one line at one station.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_server::domain::PlatformId;
    ///
    /// let id = PlatformId::parse("IDFM:463193").unwrap();
    /// assert_eq!(id.as_str(), "IDFM:463193");
    ///
    /// assert!(PlatformId::parse("").is_err());
    /// assert!(PlatformId::parse(" IDFM:1").is_err());
    /// ```
    PlatformId,
    "platform"
);

string_id!(
    /// A physical station grouping one or more platforms.
    StationId,
    "station"
);

string_id!(
    /// A metro line (a timetable route).
    LineId,
    "line"
);

string_id!(
    /// One scheduled run of a train along a line.
    TripId,
    "trip"
);
