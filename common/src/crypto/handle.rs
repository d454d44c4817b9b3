use primitive_types::U256;
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Error, Formatter};
use thiserror::Error;

pub const HANDLE_SIZE: usize = 32; // 32 bytes / 256 bits

#[derive(Debug, Error)]
pub enum HandleError {
    #[error("invalid decimal handle encoding")]
    InvalidDecimal,
}

// Opaque on-chain reference to a ciphertext, not the ciphertext itself.
// Read calls return it as a decimal-string-encoded u256; the write path
// re-encodes it as a 0x-prefixed hex string.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct CiphertextHandle([u8; HANDLE_SIZE]);

impl CiphertextHandle {
    pub const fn new(bytes: [u8; HANDLE_SIZE]) -> Self {
        CiphertextHandle(bytes)
    }

    pub const fn zero() -> Self {
        CiphertextHandle::new([0; HANDLE_SIZE])
    }

    // The zero handle is what an account without a counter maps to
    pub fn is_zero(&self) -> bool {
        self.0 == [0; HANDLE_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; HANDLE_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; HANDLE_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    // Parse the decimal u256 encoding used by read-only contract calls
    pub fn from_dec_str(s: &str) -> Result<Self, HandleError> {
        let value = U256::from_dec_str(s).map_err(|_| HandleError::InvalidDecimal)?;
        Ok(CiphertextHandle::new(value.to_big_endian()))
    }

    pub fn to_dec_string(&self) -> String {
        U256::from_big_endian(&self.0).to_string()
    }
}

impl Default for CiphertextHandle {
    fn default() -> Self {
        CiphertextHandle::zero()
    }
}

impl Display for CiphertextHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        // Displayed the way the chain returns it
        write!(f, "{}", self.to_dec_string())
    }
}

impl Serialize for CiphertextHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CiphertextHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(SerdeError::custom)?;
        let bytes: [u8; HANDLE_SIZE] = bytes
            .try_into()
            .map_err(|_| SerdeError::custom("invalid handle length"))?;
        Ok(CiphertextHandle::new(bytes))
    }
}
