use std::sync::Arc;

use futures::future::BoxFuture;

use compass_core::error::Result;

/// The async work of one stage: consume the accumulated state, return the
/// extended state. Stage functions suspend only for their own external I/O;
/// the engine awaits them one at a time.
pub type StageFn<S> = Arc<dyn Fn(S) -> BoxFuture<'static, Result<S>> + Send + Sync>;

/// A named unit of work in a graph. Immutable after graph construction.
pub struct Stage<S> {
    pub name: String,
    pub func: StageFn<S>,
}

impl<S> Stage<S> {
    pub fn new(name: impl Into<String>, func: StageFn<S>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<S> Clone for Stage<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<S> std::fmt::Debug for Stage<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

/// Wrap an async closure as a `StageFn`.
///
/// ```
/// # use compass_graph::stage::stage_fn;
/// let double = stage_fn(|state: i64| async move { Ok(state * 2) });
/// ```
pub fn stage_fn<S, F, Fut>(f: F) -> StageFn<S>
where
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<S>> + Send + 'static,
{
    Arc::new(move |state| Box::pin(f(state)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_fn_wraps_async_closure() {
        let add_one = stage_fn(|state: i64| async move { Ok(state + 1) });
        let stage = Stage::new("add_one", add_one);
        assert_eq!(stage.name, "add_one");
        assert_eq!((stage.func)(41).await.unwrap(), 42);
    }

    #[test]
    fn test_stage_debug_shows_name() {
        let stage = Stage::new("scan_news", stage_fn(|s: ()| async move { Ok(s) }));
        assert!(format!("{stage:?}").contains("scan_news"));
    }
}
