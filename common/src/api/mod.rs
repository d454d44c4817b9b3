use serde::{Deserialize, Serialize};

use crate::crypto::CiphertextHandle;

// Output of the encryption client: ciphertext handles plus the
// zero-knowledge proof that the inputs were well-formed.
// Held in component state between the encrypt and submit actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedInput {
    pub handles: Vec<CiphertextHandle>,
    #[serde(with = "hex")]
    pub input_proof: Vec<u8>,
}

impl EncryptedInput {
    // The first handle, i.e. the one produced for the single add8 input
    pub fn primary_handle(&self) -> Option<&CiphertextHandle> {
        self.handles.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HANDLE_SIZE;

    #[test]
    fn test_primary_handle() {
        let input = EncryptedInput {
            handles: vec![CiphertextHandle::new([7; HANDLE_SIZE])],
            input_proof: vec![1, 2, 3],
        };
        assert_eq!(
            input.primary_handle(),
            Some(&CiphertextHandle::new([7; HANDLE_SIZE]))
        );

        let empty = EncryptedInput {
            handles: vec![],
            input_proof: vec![],
        };
        assert!(empty.primary_handle().is_none());
    }
}
