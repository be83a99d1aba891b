//! Numeric id newtypes for ladder entities.
//!
//! All ids are integer surrogates assigned by the store. Newtypes keep a
//! team id from being passed where a league id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $inner:ty) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            pub fn as_inner(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(v: $inner) -> Self {
                Self(v)
            }
        }
    };
}

id_type!(
    /// Surrogate id of a ranked team.
    TeamId,
    u64
);

id_type!(
    /// Id of an underlying player account. One account may sit on several
    /// teams; distinct-player counts deduplicate on this.
    AccountId,
    u64
);

id_type!(
    /// Id of a league row (season + region + queue + team type + league type).
    LeagueId,
    u64
);

id_type!(
    /// Id of a tier within a league.
    TierId,
    u64
);

id_type!(
    /// Id of a ladder division within a tier.
    DivisionId,
    u64
);

id_type!(
    /// Season number. Ranking and population scopes are always
    /// season-relative.
    SeasonId,
    u32
);
