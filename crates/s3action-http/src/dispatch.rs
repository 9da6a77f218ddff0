//! Action handler trait and dispatch.

use std::future::Future;
use std::pin::Pin;

use s3action_model::action::SemanticAction;

/// Trait that the business layer must implement.
///
/// The handler receives a parsed, type-checked envelope and returns it
/// settled: `Completed` with a result or `Failed` with an error. Business
/// failures never escape as `Err`; the HTTP layer always answers 200 for
/// whatever envelope comes back.
pub trait ActionHandler: Send + Sync + 'static {
    /// Execute an action and return the settled envelope.
    fn handle_action(
        &self,
        action: SemanticAction,
    ) -> Pin<Box<dyn Future<Output = SemanticAction> + Send>>;
}

/// Dispatch an action to the handler.
pub async fn dispatch_action<H: ActionHandler>(handler: &H, action: SemanticAction) -> SemanticAction {
    tracing::debug!(
        action_type = %action.action_type,
        identifier = ?action.identifier,
        "dispatching semantic action"
    );
    handler.handle_action(action).await
}
