//! Boundary between the wallet connection core and whatever hosts it.
//!
//! The core never touches `window` directly. It sees injected wallets through
//! the [`Eip1193Provider`] and [`SolanaProvider`] traits, reads the page through
//! [`Environment`], persists through [`KeyValueStore`] and waits through
//! [`Timer`]. The browser bindings implement these over `wasm-bindgen`; the
//! [`scripted`] module implements them in memory for the CLI and for tests.
//!
//! All traits are `?Send`: the host is a single-threaded event loop and
//! provider handles are reference counted with [`Rc`](std::rc::Rc).

pub mod environment;
pub mod error;
pub mod provider;
pub mod scripted;
pub mod store;
pub mod timer;

pub use environment::{
	Environment, EvmObject, InjectedEthereum, InjectedObject, Launcher, SolanaNamespace, SolanaObject,
};
pub use error::{Error, Result};
pub use provider::{
	EVM_FLAGS, Eip1193Provider, ProviderEvents, ProviderFlags, ProviderHandle, SOLANA_FLAGS,
	SolanaProvider,
};
pub use store::{KeyValueStore, MemoryStore};
#[cfg(feature = "tokio-timer")]
pub use timer::TokioTimer;
pub use timer::Timer;
