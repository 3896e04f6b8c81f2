//! Soroban RPC node client

pub mod api;
#[cfg(feature = "clap")]
pub mod clap;
pub mod client;
pub mod error;

pub use client::{SorobanRpcClient, SorobanRpcConfig, SorobanRpcConfigBuilder};
