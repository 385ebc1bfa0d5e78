use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an identifier cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier value.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw identifier value.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| ParseIdError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

store_id!(
    /// Identifier of a product record, assigned by the store on creation.
    ProductId,
    "product"
);

store_id!(
    /// Identifier of an order, assigned by the store when the order is placed.
    OrderId,
    "order"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_preserves_value() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&OrderId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: OrderId = serde_json::from_str("7").unwrap();
        assert_eq!(back, OrderId::new(7));
    }

    #[test]
    fn parse_rejects_non_numeric_text() {
        assert_eq!("15".parse::<ProductId>().unwrap(), ProductId::new(15));

        let err = "abc".parse::<OrderId>().unwrap_err();
        assert_eq!(err.kind, "order");
        assert_eq!(err.value, "abc");
    }

    #[test]
    fn display_prints_raw_value() {
        assert_eq!(ProductId::new(999).to_string(), "999");
    }
}
