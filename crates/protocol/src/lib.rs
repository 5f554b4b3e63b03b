//! Wire types shared between the wallet connection core and injected providers.
//!
//! Everything here is plain serde data: what gets sent through an EIP-1193
//! `request()` call, what a Solana wallet's `connect()` may hand back, and the
//! events a provider emits. No behavior lives in this crate.
//!
//! # Main Types
//!
//! - [`NetworkFamily`] - EVM or Solana
//! - [`ChainId`] / [`ChainRef`] - EVM chain identifiers and the session's chain
//! - [`RequestArguments`] - EIP-1193 `request()` payload
//! - [`ProviderRpcError`] - Error object a provider rejects with
//! - [`ConnectResponse`] - Classified Solana `connect()` result
//! - [`ProviderEvent`] - `accountsChanged` / `chainChanged` / `disconnect`

pub mod chain;
pub mod eip1193;
pub mod events;
pub mod family;
pub mod solana;

pub use chain::{AddChainParameter, ChainId, ChainRef, NativeCurrency, SwitchChainParameter};
pub use eip1193::{ProviderRpcError, RequestArguments, codes, methods};
pub use events::ProviderEvent;
pub use family::NetworkFamily;
pub use solana::{ConnectOptions, ConnectResponse};
