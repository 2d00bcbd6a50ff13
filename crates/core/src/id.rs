//! Strongly-typed identifiers for remote records.
//!
//! Each id wraps the UUID the remote store assigned to the row. Parsing
//! failures name the kind of record so form errors stay readable.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! record_ids {
    ($($(#[$meta:meta])* $name:ident => $label:literal;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh time-ordered id for rows built on the client.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(raw: &str) -> Result<Self, DomainError> {
                Uuid::parse_str(raw.trim())
                    .map(Self)
                    .map_err(|e| DomainError::invalid_id(format!("{} {raw:?}: {e}", $label)))
            }
        }
    )+};
}

record_ids! {
    /// Row id in `products`.
    ProductId => "product id";
    /// Row id in `customers`.
    CustomerId => "customer id";
    /// Row id in `orders`.
    OrderId => "order id";
    /// Row id in `categories`.
    CategoryId => "category id";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_through_display() {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_tolerates_surrounding_whitespace() {
        let id = OrderId::new();
        let parsed: OrderId = format!(" {id}\n").parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_failure_names_the_record_kind() {
        let err = "not-a-uuid".parse::<CustomerId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) if msg.starts_with("customer id \"not-a-uuid\"") => {}
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }
}
