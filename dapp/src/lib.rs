pub mod app;
pub mod chain;
pub mod config;
pub mod devnet;
pub mod error;
pub mod fhe;
pub mod manifest;
pub mod reencrypt;
pub mod state;
pub mod view;
