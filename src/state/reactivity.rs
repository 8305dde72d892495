// ============================================================================
// REACTIVITY - Sistema de notificaciones/subscribers para reactividad
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Callback<T> = Rc<dyn Fn(&T)>;

/// Lista de subscribers notificados, en orden de suscripción, con el nuevo valor
pub struct Notifier<T> {
    subscribers: RefCell<Vec<Callback<T>>>,
}

impl<T> Notifier<T> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Suscribirse a cambios
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&T) + 'static,
    {
        self.subscribers.borrow_mut().push(Rc::new(callback));
    }

    /// Notificar a todos los subscribers.
    /// Se itera sobre una copia: un subscriber puede suscribir a otro o
    /// provocar una notificación anidada sin chocar con el borrow.
    pub fn notify(&self, value: &T) {
        let subscribers: Vec<Callback<T>> = self.subscribers.borrow().clone();
        for callback in subscribers {
            callback(value);
        }
    }
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_every_subscriber_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let notifier = Notifier::new();

        for tag in ["first", "second"] {
            let seen = seen.clone();
            notifier.subscribe(move |value: &u32| seen.borrow_mut().push((tag, *value)));
        }
        notifier.notify(&7);

        assert_eq!(*seen.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn subscriber_may_subscribe_during_notify() {
        let notifier = Rc::new(Notifier::new());
        let late_calls = Rc::new(RefCell::new(0));
        {
            let inner = notifier.clone();
            let late_calls = late_calls.clone();
            notifier.subscribe(move |_: &u32| {
                let late_calls = late_calls.clone();
                inner.subscribe(move |_: &u32| *late_calls.borrow_mut() += 1);
            });
        }

        notifier.notify(&1);
        assert_eq!(*late_calls.borrow(), 0);

        notifier.notify(&2);
        assert_eq!(*late_calls.borrow(), 1);
    }
}
