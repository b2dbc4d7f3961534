use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::workflows::moderation::{PropertyGateway, PropertyId};

/// View-count ping for an opened listing page. Dropping the handle cancels a ping that has not
/// completed yet.
#[derive(Debug)]
pub struct ViewPing {
    handle: Option<JoinHandle<()>>,
}

impl ViewPing {
    /// Must be called from within a tokio runtime.
    pub fn spawn<G>(gateway: Arc<G>, property_id: PropertyId) -> Self
    where
        G: PropertyGateway + ?Sized + 'static,
    {
        let handle = tokio::spawn(async move {
            match gateway.record_view(&property_id).await {
                Ok(()) => debug!(property = %property_id, "view recorded"),
                Err(err) => warn!(property = %property_id, error = %err, "view ping failed"),
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Waits for the ping instead of cancelling it. Returns false if it was aborted or panicked.
    pub async fn join(mut self) -> bool {
        match self.handle.take() {
            Some(handle) => handle.await.is_ok(),
            None => false,
        }
    }
}

impl Drop for ViewPing {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
