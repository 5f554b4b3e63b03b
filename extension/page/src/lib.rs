//! Browser bindings for the wallet connection core.
//!
//! Built with `wasm-pack` and loaded by the launchpad page. The page creates
//! one [`WalletClient`] and drives it:
//!
//! ```js
//! import init, { WalletClient } from "./ww_ext_page.js";
//! await init();
//! const wallet = new WalletClient({ chooseWallet, onStatus });
//! wallet.onEvent((event) => console.log(event.type));
//! if (await wallet.connect("solana")) {
//!   console.log(wallet.currentAccount);
//! }
//! ```

use wasm_bindgen::prelude::*;

pub mod client;
pub mod env;
pub mod host;
pub mod js;
pub mod logging;
pub mod provider;

pub use client::WalletClient;
pub use env::WindowEnvironment;
pub use host::{CallbackPrompt, ConsoleNotifier, JsLauncher, JsTimer, LocalStorageStore};
pub use provider::{JsEvmProvider, JsSolanaProvider};

#[wasm_bindgen(start)]
pub fn start() {
	console_error_panic_hook::set_once();
}
