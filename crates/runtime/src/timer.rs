use std::time::Duration;

use async_trait::async_trait;

/// Host clock. Browsers back this with `setTimeout`.
#[async_trait(?Send)]
pub trait Timer {
	async fn sleep(&self, duration: Duration);
}

/// [`Timer`] on tokio's clock.
#[cfg(feature = "tokio-timer")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "tokio-timer")]
#[async_trait(?Send)]
impl Timer for TokioTimer {
	async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}
