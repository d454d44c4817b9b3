pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Bit width of the confidential counter ciphertext (euint8)
pub const COUNTER_BIT_WIDTH: usize = 8;
