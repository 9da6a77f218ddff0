//! Handler bridging the HTTP layer to the action provider.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use s3action_http::dispatch::ActionHandler;
use s3action_model::action::SemanticAction;

use crate::provider::S3ActionProvider;

/// Handler that bridges the HTTP layer to the [`S3ActionProvider`].
#[derive(Debug)]
pub struct SemanticActionHandler {
    provider: Arc<S3ActionProvider>,
}

impl SemanticActionHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<S3ActionProvider>) -> Self {
        Self { provider }
    }
}

impl ActionHandler for SemanticActionHandler {
    fn handle_action(
        &self,
        action: SemanticAction,
    ) -> Pin<Box<dyn Future<Output = SemanticAction> + Send>> {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { provider.execute(action).await })
    }
}
