//! Single-threaded observable used for store subscriptions.
//!
//! A [`Subject`] keeps a list of observers and calls each of them on
//! [`Subject::notify`]. Subscribing returns a [`Subscription`] guard; dropping
//! the guard unregisters the observer, so a consumer that owns its guard is
//! released automatically when it is torn down.
//!
//! Observers are invoked with the subject's borrow released, so an observer
//! may subscribe or unsubscribe while a notification is in flight.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Observer<T> = Rc<dyn Fn(&T)>;

struct SubjectInner<T> {
    next_id: u64,
    observers: Vec<(u64, Observer<T>)>,
}

/// Observable value stream.
pub struct Subject<T> {
    inner: Rc<RefCell<SubjectInner<T>>>,
}

impl<T: 'static> Subject<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SubjectInner {
                next_id: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// Registers an observer. It stays registered until the guard is dropped
    /// or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, Rc::new(observer)));
            id
        };

        let weak: Weak<RefCell<SubjectInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().observers.retain(|(oid, _)| *oid != id);
                }
            })),
        }
    }

    /// Calls every registered observer with `value`, in registration order.
    pub fn notify(&self, value: &T) {
        let observers: Vec<Observer<T>> = self
            .inner
            .borrow()
            .observers
            .iter()
            .map(|(_, o)| Rc::clone(o))
            .collect();
        for observer in observers {
            observer(value);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.inner.borrow().observers.len())
            .finish()
    }
}

/// Registration guard returned by [`Subject::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unregisters the observer now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
