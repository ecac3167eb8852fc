use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

/// A set of shared callbacks keyed by `Arc` identity
///
/// Registering the same `Arc` twice keeps one entry. Dispatch iterates a
/// snapshot, so a callback may register or unregister while being called.
pub(crate) struct CallbackSet<F: ?Sized> {
    callbacks: Mutex<Vec<Arc<F>>>,
}

impl<F: ?Sized> CallbackSet<F> {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Returns false if the callback was already registered
    pub(crate) fn insert(&self, callback: Arc<F>) -> bool {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        if callbacks.iter().any(|c| Arc::ptr_eq(c, &callback)) {
            return false;
        }
        callbacks.push(callback);
        true
    }

    /// Returns false if the callback was not registered
    pub(crate) fn remove(&self, callback: &Arc<F>) -> bool {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = callbacks.len();
        callbacks.retain(|c| !Arc::ptr_eq(c, callback));
        callbacks.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<F>> {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Call every registered callback, logging instead of unwinding on panic
    pub(crate) fn for_each(&self, mut call: impl FnMut(&F)) {
        for callback in self.snapshot() {
            if catch_unwind(AssertUnwindSafe(|| call(&callback))).is_err() {
                tracing::error!("Callback panicked, continuing with remaining callbacks");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Cb = dyn Fn() + Send + Sync;

    #[test]
    fn same_callback_fires_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let cb: Arc<Cb> = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let set = CallbackSet::<Cb>::new();
        assert!(set.insert(cb.clone()));
        assert!(!set.insert(cb.clone()));
        set.for_each(|f| f());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(set.remove(&cb));
        assert!(!set.remove(&cb));
        set.for_each(|f| f());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_callback_does_not_stop_others() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let set = CallbackSet::<Cb>::new();
        set.insert(Arc::new(|| panic!("boom")));
        set.insert(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        set.for_each(|f| f());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_may_unregister_itself_during_dispatch() {
        let set = Arc::new(CallbackSet::<Cb>::new());
        let slot: Arc<Mutex<Option<Arc<Cb>>>> = Arc::new(Mutex::new(None));

        let set_ref = set.clone();
        let slot_ref = slot.clone();
        let cb: Arc<Cb> = Arc::new(move || {
            if let Some(me) = slot_ref.lock().unwrap().take() {
                set_ref.remove(&me);
            }
        });
        *slot.lock().unwrap() = Some(cb.clone());
        set.insert(cb);

        set.for_each(|f| f());
        assert_eq!(set.len(), 0);
    }
}
