use std::rc::Rc;

use ww::{DeviceProfile, NetworkFamily, ProviderRegistry};
use ww_runtime::Environment;
use ww_runtime::scripted::ScriptedEnvironment;

use crate::context_store::ContextState;
use crate::output::{DetectData, FamilyProviders};

/// Enumerates `family`, or both families, without touching any wallet.
pub fn execute(env: &Rc<ScriptedEnvironment>, state: &ContextState, family: Option<NetworkFamily>) -> DetectData {
	let registry = ProviderRegistry::new(env.clone());
	let preferences = state.preferences();
	let families = match family {
		Some(family) => vec![family],
		None => NetworkFamily::ALL.to_vec(),
	};

	let families = families
		.into_iter()
		.map(|family| {
			let providers = registry.enumerate(family);
			tracing::info!(target = "ww.cli", %family, count = providers.len(), "detected providers");
			FamilyProviders {
				family,
				count: providers.len(),
				providers,
				preferred: preferences.preferred(family),
			}
		})
		.collect();

	DetectData {
		device: DeviceProfile::detect(&env.user_agent()),
		auto_connect_blocked: env.auto_connect_blocked(),
		families,
	}
}
