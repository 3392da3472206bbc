//! Caller-driven cancellation for the async entry points.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::VcError;

/// Run `fut` unless `token` fires first.
///
/// On cancellation the operation future is dropped, which drops every
/// in-flight loader, suite and status call with it. The caller gets
/// [`VcError::Cancelled`], never a partial result.
pub(crate) async fn with_cancellation<T, F>(
    token: Option<&CancellationToken>,
    fut: F,
) -> Result<T, VcError>
where
    F: Future<Output = Result<T, VcError>>,
{
    let Some(token) = token else {
        return fut.await;
    };
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("operation cancelled by caller");
            Err(VcError::Cancelled)
        }
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_token_runs_to_completion() {
        let out = with_cancellation(None, async { Ok::<_, VcError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        let out = with_cancellation(Some(&token), async { Ok::<_, VcError>(7) }).await;
        assert!(matches!(out, Err(VcError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelling_mid_flight_drops_the_operation() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let pending = async {
            trigger.cancel();
            std::future::pending::<()>().await;
            Ok::<_, VcError>(())
        };
        let out = with_cancellation(Some(&token), pending).await;
        assert!(matches!(out, Err(VcError::Cancelled)));
    }
}
