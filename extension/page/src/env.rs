//! The live page: `window.ethereum`, Solana namespaces, user agent.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Object};
use wasm_bindgen::JsValue;
use web_sys::Window;
use ww_runtime::{
	EVM_FLAGS, Eip1193Provider, Environment, EvmObject, InjectedEthereum, InjectedObject, ProviderFlags,
	SOLANA_FLAGS, SolanaNamespace, SolanaObject, SolanaProvider,
};

use crate::js;
use crate::provider::{JsEvmProvider, JsSolanaProvider};

const AUTO_CONNECT_BLOCKED: &str = "WALLET_AUTO_CONNECTION_BLOCKED";

/// Wrappers handed out so far, keyed by JS object identity. The same
/// injected object must map to the same `Rc` so handle comparisons see
/// `window.phantom.solana` and `window.solana` as one wallet.
struct WrapperCache<P> {
	entries: RefCell<Vec<(JsValue, Rc<P>)>>,
}

impl<P> Default for WrapperCache<P> {
	fn default() -> Self {
		Self {
			entries: RefCell::new(Vec::new()),
		}
	}
}

impl<P> WrapperCache<P> {
	fn get_or_insert(&self, object: &JsValue, wrap: impl FnOnce(JsValue) -> P) -> Rc<P> {
		let mut entries = self.entries.borrow_mut();
		if let Some((_, wrapper)) = entries.iter().find(|(known, _)| Object::is(known, object)) {
			return Rc::clone(wrapper);
		}
		let wrapper = Rc::new(wrap(object.clone()));
		entries.push((object.clone(), Rc::clone(&wrapper)));
		wrapper
	}
}

/// [`Environment`] over `web_sys::window()`.
pub struct WindowEnvironment {
	window: Window,
	evm: WrapperCache<JsEvmProvider>,
	solana: WrapperCache<JsSolanaProvider>,
}

impl WindowEnvironment {
	/// `None` outside a window context (workers, node).
	pub fn new() -> Option<Self> {
		Some(Self::from_window(web_sys::window()?))
	}

	pub fn from_window(window: Window) -> Self {
		Self {
			window,
			evm: WrapperCache::default(),
			solana: WrapperCache::default(),
		}
	}

	fn global(&self) -> &JsValue {
		self.window.as_ref()
	}

	fn flags(object: &JsValue, known: &[&str]) -> ProviderFlags {
		known
			.iter()
			.copied()
			.filter(|flag| js::truthy(object, flag))
			.collect()
	}

	fn wrap_evm(&self, object: &JsValue) -> EvmObject {
		let handle: Rc<dyn Eip1193Provider> = self.evm.get_or_insert(object, JsEvmProvider::new);
		InjectedObject::new(Self::flags(object, EVM_FLAGS), handle)
	}

	fn wrap_solana(&self, object: &JsValue) -> SolanaObject {
		let handle: Rc<dyn SolanaProvider> = self.solana.get_or_insert(object, JsSolanaProvider::new);
		InjectedObject::new(Self::flags(object, SOLANA_FLAGS), handle)
	}
}

impl Environment for WindowEnvironment {
	fn auto_connect_blocked(&self) -> bool {
		js::truthy(self.global(), AUTO_CONNECT_BLOCKED)
	}

	fn user_agent(&self) -> String {
		self.window.navigator().user_agent().unwrap_or_default()
	}

	fn page_url(&self) -> Option<String> {
		self.window.location().href().ok()
	}

	fn ethereum(&self) -> Option<InjectedEthereum> {
		let root = js::get(self.global(), "ethereum")?;
		let providers = js::get(&root, "providers")
			.filter(Array::is_array)
			.map(|list| {
				Array::from(&list)
					.iter()
					.filter(|p| p.is_object())
					.map(|p| self.wrap_evm(&p))
					.collect()
			});

		Some(InjectedEthereum {
			root: self.wrap_evm(&root),
			providers,
		})
	}

	fn solana(&self, namespace: SolanaNamespace) -> Option<SolanaObject> {
		let object = js::get_path(self.global(), &namespace.path().join("."))?;
		object.is_object().then(|| self.wrap_solana(&object))
	}
}
