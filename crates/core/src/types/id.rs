//! Newtype ids for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe id wrappers that prevent
//! accidentally mixing ids from different entity types.
//!
//! Every id is a random string of [`ID_LENGTH`] lowercase alphanumeric
//! characters. Ids double as storage file names, so the accepted alphabet is
//! deliberately narrow.

use rand::seq::IndexedRandom;

/// Length of every generated entity id.
pub const ID_LENGTH: usize = 20;

/// Characters an entity id may consist of.
pub const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Errors that can occur when parsing an entity id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The input is not exactly [`ID_LENGTH`] characters long.
    #[error("id must be exactly {ID_LENGTH} characters")]
    WrongLength,
    /// The input contains a character outside [`ID_ALPHABET`].
    #[error("id contains an invalid character: {0:?}")]
    InvalidCharacter(char),
}

/// Produce a fresh random id string from [`ID_ALPHABET`].
#[must_use]
pub fn random_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .filter_map(|_| ID_ALPHABET.choose(&mut rng).copied())
        .map(char::from)
        .collect()
}

/// Validate that a string is a well-formed entity id.
///
/// # Errors
///
/// Returns an [`IdError`] if the length or character set is wrong.
pub fn validate_id(s: &str) -> Result<(), IdError> {
    if s.len() != ID_LENGTH {
        return Err(IdError::WrongLength);
    }
    if let Some(c) = s
        .chars()
        .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit())
    {
        return Err(IdError::InvalidCharacter(c));
    }
    Ok(())
}

/// Macro to define a type-safe id wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `generate()` for fresh random ids, `parse()` for validated input,
///   `as_str()` for the raw value
/// - A `Display` implementation
///
/// # Example
///
/// ```rust
/// # use pronto_core::define_id;
/// define_id!(CartId);
/// define_id!(OrderId);
///
/// let cart_id = CartId::generate();
/// let order_id = OrderId::generate();
///
/// // These are different types, so this won't compile:
/// // let _: CartId = order_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self($crate::types::id::random_id())
            }

            /// Parse an id from caller-supplied input, validating length and
            /// character set.
            ///
            /// # Errors
            ///
            /// Returns an `IdError` if the input is not a well-formed id.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let s = s.trim();
                $crate::types::id::validate_id(s)?;
                Ok(Self(s.to_owned()))
            }

            /// Get the underlying id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the id and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity ids
define_id!(CartId);
define_id!(TokenId);
define_id!(OrderId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_shape() {
        let id = random_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(validate_id(&id).is_ok());
    }

    #[test]
    fn test_generate_is_valid() {
        let id = CartId::generate();
        assert!(CartId::parse(id.as_str()).is_ok());
    }

    #[test]
    fn test_generated_ids_differ() {
        // Collisions over a 36^20 space would point at a broken generator.
        assert_ne!(OrderId::generate(), OrderId::generate());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(TokenId::parse("short").unwrap_err(), IdError::WrongLength);
        assert_eq!(
            TokenId::parse(&"a".repeat(21)).unwrap_err(),
            IdError::WrongLength
        );
    }

    #[test]
    fn test_parse_invalid_character() {
        let input = format!("{}/", "a".repeat(19));
        assert_eq!(
            TokenId::parse(&input).unwrap_err(),
            IdError::InvalidCharacter('/')
        );

        let upper = format!("{}A", "a".repeat(19));
        assert_eq!(
            TokenId::parse(&upper).unwrap_err(),
            IdError::InvalidCharacter('A')
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let raw = "a".repeat(20);
        let id = TokenId::parse(&format!("  {raw} ")).unwrap();
        assert_eq!(id.as_str(), raw);
    }

    #[test]
    fn test_serde_transparent() {
        let id = OrderId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let parsed: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
