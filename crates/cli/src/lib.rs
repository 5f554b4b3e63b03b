//! `ww`: drives the wallet connection flow from a shell.
//!
//! The page is a JSON fixture (`--env`) loaded into
//! [`ww_runtime::scripted::ScriptedEnvironment`]; preferences and the
//! last-connected marker persist in `storage.json` the way the site keeps
//! them in `localStorage`.

pub mod cli;
pub mod commands;
pub mod context_store;
pub mod error;
pub mod logging;
pub mod notify;
pub mod output;
pub mod prompt;
pub mod styles;
