//! Invalidation event plumbing.
//!
//! Layouts raise measure/arrange invalidation through [`EventSource`];
//! hosts subscribe with a callback and get back an [`EventToken`] used for
//! explicit revocation. No implicit lifetime coupling: a listener stays
//! registered until its token is revoked or the source is dropped.

use smallvec::SmallVec;

/// Handle returned by [`EventSource::subscribe`]; pass it back to
/// [`EventSource::revoke`] to unregister the listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventToken(u64);

/// Inline capacity for listener registries. A layout rarely has more than
/// one or two subscribers (its host), so 2 avoids heap allocation in the
/// common case.
type ListenerVec<T> = SmallVec<[(EventToken, Box<dyn FnMut(&T)>); 2]>;

/// A single-threaded listener registry.
pub struct EventSource<T> {
    listeners: ListenerVec<T>,
    next_token: u64,
}

impl<T> Default for EventSource<T> {
    fn default() -> Self {
        Self {
            listeners: SmallVec::new(),
            next_token: 0,
        }
    }
}

impl<T> EventSource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its revocation token.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> EventToken {
        let token = EventToken(self.next_token);
        self.next_token += 1;
        self.listeners.push((token, Box::new(listener)));
        token
    }

    /// Unregisters the listener for `token`. Returns true if it was
    /// registered.
    pub fn revoke(&mut self, token: EventToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(t, _)| *t != token);
        self.listeners.len() != before
    }

    /// Invokes every registered listener with `args`.
    pub fn raise(&mut self, args: &T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(args);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> std::fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSource")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_and_raise() {
        let hits = Rc::new(Cell::new(0));
        let mut source = EventSource::<()>::new();
        let hits_clone = Rc::clone(&hits);
        source.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));

        source.raise(&());
        source.raise(&());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_revoke_stops_delivery() {
        let hits = Rc::new(Cell::new(0));
        let mut source = EventSource::<()>::new();
        let hits_clone = Rc::clone(&hits);
        let token = source.subscribe(move |_| hits_clone.set(hits_clone.get() + 1));

        source.raise(&());
        assert!(source.revoke(token));
        source.raise(&());
        assert_eq!(hits.get(), 1);
        // Revoking twice is a no-op.
        assert!(!source.revoke(token));
    }

    #[test]
    fn test_tokens_are_distinct() {
        let mut source = EventSource::<u32>::new();
        let a = source.subscribe(|_| {});
        let b = source.subscribe(|_| {});
        assert_ne!(a, b);
        assert!(source.revoke(a));
        assert_eq!(source.listener_count(), 1);
        assert!(source.revoke(b));
        assert_eq!(source.listener_count(), 0);
    }
}
