use std::future::Future;
use std::time::Duration;

/// Why an upstream call gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    TimedOut,
    Failed(String),
}

impl std::fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(msg) => f.write_str(msg),
        }
    }
}

/// Run `op` with a deadline, retrying once on failure
pub async fn call_with_retry<T, F, Fut>(
    label: &str,
    timeout: Duration,
    mut op: F,
) -> Result<T, UpstreamFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    const ATTEMPTS: usize = 2;
    let mut last = UpstreamFailure::TimedOut;

    for attempt in 1..=ATTEMPTS {
        match tokio::time::timeout(timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(call = label, attempt, error = %e, "upstream call failed");
                last = UpstreamFailure::Failed(e.to_string());
            }
            Err(_) => {
                tracing::warn!(call = label, attempt, ?timeout, "upstream call timed out");
                last = UpstreamFailure::TimedOut;
            }
        }
    }

    Err(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = call_with_retry("test", Duration::from_secs(1), || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("flaky")
            }
            Ok(7)
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_two_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = call_with_retry("test", Duration::from_secs(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("down")
        })
        .await;
        assert_eq!(result, Err(UpstreamFailure::Failed("down".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout() {
        let result: Result<(), _> = call_with_retry("test", Duration::from_millis(10), || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(())
        })
        .await;
        assert_eq!(result, Err(UpstreamFailure::TimedOut));
    }
}
