use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use tracing::error;

use crate::guard::ReconcileReport;
use crate::state::AppState;

/// Load the settings and run one pass on the blocking pool
pub async fn reconcile_now(state: &Arc<AppState>) -> Option<ReconcileReport> {
    let task_state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || {
        let config = task_state.store.load()?;
        Ok::<_, crate::error::GuardError>(task_state.reconciler.run(&config))
    })
    .await;
    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(err)) => {
            error!(%err, "failed to load settings, nothing reconciled");
            return None;
        }
        Err(err) => {
            error!(%err, "reconcile task panicked");
            return None;
        }
    };
    *state.last_report.write() = Some(report.clone());
    Some(report)
}

/// Reconcile both files before every request is handled
pub async fn lifecycle_middleware_fn(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    reconcile_now(&state).await;
    next.run(request).await
}
