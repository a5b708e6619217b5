use std::future::Future;

use storage::repository::StorageError;

/// How persistence calls react to transient failures.
///
/// Only idempotent operations go through a policy; a toggle is never retried
/// because a lost acknowledgement would flip the flag twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    Never,
    /// One silent retry on `StorageError::Connection`.
    #[default]
    Once,
}

impl RetryPolicy {
    pub(crate) async fn run<T, F, Fut>(self, op: &str, mut call: F) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        match call().await {
            Err(err) if self == RetryPolicy::Once && err.is_transient() => {
                log::warn!("{op} failed: {err}; retrying once");
                call().await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[tokio::test]
    async fn once_retries_a_single_connection_failure() {
        let calls = Cell::new(0);
        let result = RetryPolicy::Once
            .run("read module", || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n == 1 {
                        Err(StorageError::Connection("reset".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn once_gives_up_after_second_failure() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::Once
            .run("read module", || {
                calls.set(calls.get() + 1);
                async { Err(StorageError::Connection("down".into())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = RetryPolicy::Once
            .run("read module", || {
                calls.set(calls.get() + 1);
                async { Err(StorageError::Conflict) }
            })
            .await;
        assert!(matches!(result, Err(StorageError::Conflict)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn never_does_not_retry() {
        let calls = Cell::new(0);
        let _: Result<(), _> = RetryPolicy::Never
            .run("read module", || {
                calls.set(calls.get() + 1);
                async { Err(StorageError::Connection("down".into())) }
            })
            .await;
        assert_eq!(calls.get(), 1);
    }
}
