//! Newtype IDs for users and orders.
//!
//! Both tables use `SERIAL` primary keys, so every ID wraps an `i32`.
//! Distinct types keep a user ID from being passed where an order ID is
//! expected, e.g. when an order is reassigned to another user.

/// Defines an `i32`-backed ID newtype.
///
/// The generated type is `Copy`, serializes as a bare integer, parses from a
/// decimal string (query parameters arrive as text) and, with the `postgres`
/// feature, binds directly as an `INTEGER` column.
///
/// ```rust
/// # use ecommerce_core::define_id;
/// define_id!(InvoiceId);
///
/// let id: InvoiceId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw database identifier.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw database identifier.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(UserId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_query_text() {
        let id: UserId = "17".parse().unwrap();
        assert_eq!(id, UserId::new(17));

        let padded: OrderId = " 3 ".parse().unwrap();
        assert_eq!(padded.as_i32(), 3);
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!("abc".parse::<UserId>().is_err());
        assert!("".parse::<OrderId>().is_err());
        assert!("1.5".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&OrderId::new(9)).unwrap();
        assert_eq!(json, "9");

        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderId::new(9));
    }

    #[test]
    fn test_display() {
        assert_eq!(UserId::new(5).to_string(), "5");
    }
}
