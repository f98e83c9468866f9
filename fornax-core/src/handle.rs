use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;

/// Process-wide, lazily initialized pipeline handle.
///
/// Concurrent first callers block until the single initialization finishes;
/// afterwards every caller receives a clone of the same `Arc`. A failed
/// initialization leaves the cell empty, so a later call may try again.
pub struct ModelCell<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> ModelCell<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Returns the handle, running `init` first if the cell is empty.
    pub async fn get_or_load<F, Fut>(&self, init: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.cell
            .get_or_try_init(|| async { Ok(Arc::new(init().await?)) })
            .await
            .map(Arc::clone)
    }

    /// The handle, if it has been initialized.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().map(Arc::clone)
    }
}

impl<T> Default for ModelCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn initializes_exactly_once() {
        let cell = ModelCell::new();
        let loads = AtomicUsize::new(0);

        let first = cell
            .get_or_load(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(17u32)
            })
            .await
            .unwrap();
        let second = cell
            .get_or_load(|| async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(99u32)
            })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 17);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_first_callers_share_one_initialization() {
        let cell = ModelCell::new();
        let loads = AtomicUsize::new(0);

        let init = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(1u8)
        };
        let (a, b, c) = tokio::join!(
            cell.get_or_load(init),
            cell.get_or_load(init),
            cell.get_or_load(init)
        );

        let a = a.unwrap();
        assert!(Arc::ptr_eq(&a, &b.unwrap()));
        assert!(Arc::ptr_eq(&a, &c.unwrap()));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_initialization_leaves_the_cell_empty() {
        let cell: ModelCell<u32> = ModelCell::new();

        let failed = cell
            .get_or_load(|| async { Err(anyhow::anyhow!("registry unreachable")) })
            .await;
        assert!(failed.is_err());
        assert!(cell.get().is_none());

        let recovered = cell.get_or_load(|| async { Ok(5u32) }).await.unwrap();
        assert_eq!(*recovered, 5);
    }
}
