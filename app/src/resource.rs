//! Observable value with a loading flag and a simulated fetch delay.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub struct Loadable<T> {
    pub data: T,
    pub loading: bool,
}

type Loader<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Result of a simulated fetch. Each (re)load waits `delay` before calling
/// the loader; dropping the resource cancels any fetch still in flight.
pub struct Resource<T> {
    state: Arc<watch::Sender<Loadable<T>>>,
    view: watch::Receiver<Loadable<T>>,
    loader: Option<Loader<T>>,
    delay: Duration,
    lifecycle: CancellationToken,
    in_flight: Mutex<CancellationToken>,
}

impl<T> Resource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts loading immediately; `initial` is shown until the first
    /// fetch completes.
    ///
    /// # Panics
    ///
    /// When called outside a tokio runtime. [`Resource::ready`] has no such
    /// requirement.
    pub fn spawn<F>(initial: T, delay: Duration, loader: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let resource = Self::build(initial, true, Some(Arc::new(loader)), delay);
        resource.fetch();
        resource
    }

    /// Already-resolved resource with nothing to fetch.
    pub fn ready(data: T) -> Self {
        Self::build(data, false, None, Duration::ZERO)
    }

    fn build(data: T, loading: bool, loader: Option<Loader<T>>, delay: Duration) -> Self {
        let (sender, view) = watch::channel(Loadable { data, loading });
        let lifecycle = CancellationToken::new();
        let in_flight = Mutex::new(lifecycle.child_token());
        Self {
            state: Arc::new(sender),
            view,
            loader,
            delay,
            lifecycle,
            in_flight,
        }
    }

    fn fetch(&self) {
        let Some(loader) = self.loader.clone() else {
            return;
        };

        let token = self.lifecycle.child_token();
        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight.cancel();
            *in_flight = token.clone();
        }

        self.state.send_modify(|state| state.loading = true);
        let state = self.state.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => trace!("Fetch cancelled"),
                _ = tokio::time::sleep(delay) => {
                    let data = loader();
                    state.send_replace(Loadable { data, loading: false });
                }
            }
        });
    }

    /// Re-runs the loader after the same delay. A fetch still in flight is
    /// superseded.
    pub fn refresh(&self) {
        self.fetch();
    }

    pub fn get(&self) -> Loadable<T> {
        self.view.borrow().clone()
    }

    pub fn data(&self) -> T {
        self.view.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.view.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<Loadable<T>> {
        self.view.clone()
    }

    /// Waits for the current fetch to finish and returns its data.
    pub async fn loaded(&mut self) -> T {
        // the sender lives as long as `self`, so this only returns once loaded
        let _ = self.view.wait_for(|state| !state.loading).await;
        self.data()
    }
}

impl<T> Drop for Resource<T> {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_loads_after_delay() {
        let mut resource = Resource::spawn(Vec::new(), DELAY, || vec![1, 2, 3]);
        assert_eq!(
            resource.get(),
            Loadable {
                data: Vec::new(),
                loading: true
            }
        );

        tokio::time::sleep(DELAY / 2).await;
        assert!(resource.is_loading());

        assert_eq!(resource.loaded().await, vec![1, 2, 3]);
        assert!(!resource.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_never_loads() {
        let mut resource = Resource::ready(Some(5));
        assert!(!resource.is_loading());
        assert_eq!(resource.loaded().await, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_reruns_loader() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut resource = Resource::spawn(0, DELAY, move || {
            counter.fetch_add(1, Ordering::SeqCst) + 1
        });
        assert_eq!(resource.loaded().await, 1);

        resource.refresh();
        assert!(resource.is_loading());
        assert_eq!(resource.loaded().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_supersedes_in_flight_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut resource = Resource::spawn(0, DELAY, move || {
            counter.fetch_add(1, Ordering::SeqCst) + 1
        });
        tokio::time::sleep(DELAY / 2).await;
        resource.refresh();

        assert_eq!(resource.loaded().await, 1);
        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let resource = Resource::spawn(0, DELAY, move || counter.fetch_add(1, Ordering::SeqCst));
        drop(resource);

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
