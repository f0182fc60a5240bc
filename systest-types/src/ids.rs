//! Identity types for network entities.
//!
//! Blobbers, allocations and wallets are all identified by 64-character
//! lowercase hex strings on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SystestError;

/// Length of a hex-encoded identifier.
const ID_HEX_LEN: usize = 64;

fn validate(s: &str) -> Result<(), SystestError> {
    if s.len() != ID_HEX_LEN || s.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(SystestError::InvalidId(s.to_string()));
    }
    hex::decode(s).map_err(|_| SystestError::InvalidId(s.to_string()))?;
    Ok(())
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse and validate an identifier.
            pub fn parse(s: &str) -> Result<Self, SystestError> {
                validate(s)?;
                Ok(Self(s.to_string()))
            }

            /// Create an identifier without validation.
            ///
            /// The network occasionally returns non-hex ids for genesis
            /// entities; responses are decoded through this path.
            pub fn new_unchecked(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Create a random identifier (for fakes and tests).
            pub fn random() -> Self {
                let bytes: [u8; 32] = rand::random();
                Self(hex::encode(bytes))
            }

            /// Borrow the hex string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether this id is well formed.
            pub fn is_valid(&self) -> bool {
                validate(&self.0).is_ok()
            }
        }

        impl FromStr for $name {
            type Err = SystestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let short = self.0.get(..8).unwrap_or(&self.0);
                write!(f, concat!(stringify!($name), "({})"), short)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

hex_id!(
    /// Identifier of a blobber (storage provider node).
    BlobberId
);

hex_id!(
    /// Identifier of a storage allocation.
    AllocationId
);

hex_id!(
    /// Identifier of a wallet / client.
    ClientId
);
