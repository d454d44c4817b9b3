mod address;
mod handle;

pub use address::{Address, ADDRESS_SIZE};
pub use handle::{CiphertextHandle, HANDLE_SIZE};

// Encode arbitrary bytes as a 0x-prefixed lowercase hex string,
// the form expected by the contract write path
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
