//! ww: wallet detection, selection and connection for the Wild West launchpad.
//!
//! The site talks to whatever wallets the browser injected: EVM providers at
//! `window.ethereum` (and its `providers` array) and Solana adapters at
//! `window.solana`, `window.phantom.solana`, `window.solflare` and friends.
//! This crate turns that zoo into one session.
//!
//! # Flow
//!
//! ```text
//! connect(family?)
//!   -> ProviderRegistry::enumerate   classify injected objects into WalletKind
//!   -> WalletSelector::select        single / remembered / in-app browser / prompt
//!   -> ConnectionNegotiator          eth_requestAccounts or Solana connect()
//!   -> ChainSwitchProtocol           EVM only: switch, or add then switch
//!   -> WalletService commit          marker, SessionEvent::Connected, notification
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use ww::{WalletService, NetworkFamily};
//!
//! let service = WalletService::builder(env, timer)
//!     .store(store)
//!     .prompt(prompt)
//!     .build();
//!
//! if service.connect(Some(NetworkFamily::Solana)).await {
//!     println!("{:?}", service.current_account());
//! }
//! ```
//!
//! Everything is single-threaded (`Rc`, `?Send` futures); hosts drive it
//! from a browser event loop or a current-thread tokio runtime.

pub mod bridge;
pub mod chain_switch;
pub mod config;
pub mod deeplink;
pub mod device;
pub mod error;
pub mod events;
pub mod machine;
pub mod negotiator;
pub mod notify;
pub mod preferences;
pub mod prompt;
pub mod registry;
pub mod selector;
pub mod session;
pub mod wallet;

pub use bridge::{CancelHandle, CancelToken, DeepLinkBridge, cancel_pair};
pub use chain_switch::{ChainSwitchProtocol, EndpointResolver, StaticEndpoints};
pub use config::{ChainChangePolicy, DeepLinkConfig, WalletConfig};
pub use deeplink::WalletLinks;
pub use device::DeviceProfile;
pub use error::{ConnectError, Result};
pub use events::{DisconnectReason, EventStream, SessionEvent};
pub use machine::{WalletService, WalletServiceBuilder};
pub use negotiator::{ConnectionNegotiator, Negotiated};
pub use notify::{Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use preferences::{MARKER_KEY, PREFERENCES_KEY, PreferenceStore};
pub use prompt::{PromptChoice, ScriptedPrompt, SelectionPrompt};
pub use registry::{Capabilities, ProviderDescriptor, ProviderRegistry, classify_evm};
pub use selector::{Selection, SelectionReason, WalletSelector};
pub use session::{SessionSnapshot, SessionStatus};
pub use wallet::WalletKind;
pub use ww_protocol::{ChainId, ChainRef, NetworkFamily};
