// ============================================================================
// EVENT HANDLING
// ============================================================================
// `on_click` devuelve el Closure en vez de hacer forget(). Quien renderiza lo
// guarda en un `ListenerSlot` y lo suelta en el siguiente render, cuando el
// botón ya salió del DOM. Nunca soltar un listener desde su propio handler.
// ============================================================================

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent};

pub type ClickListener = Closure<dyn FnMut(MouseEvent)>;

pub fn on_click<F>(element: &Element, handler: F) -> Result<ClickListener, JsValue>
where
    F: FnMut(MouseEvent) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(MouseEvent)>);
    element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    Ok(closure)
}

/// Listeners de una zona que se re-renderiza
pub struct ListenerSlot<T> {
    held: RefCell<Vec<T>>,
}

impl<T> ListenerSlot<T> {
    pub fn new() -> Self {
        Self {
            held: RefCell::new(Vec::new()),
        }
    }

    pub fn hold(&self, listener: T) {
        self.held.borrow_mut().push(listener);
    }

    /// Suelta todos los listeners guardados
    pub fn clear(&self) {
        let released = std::mem::take(&mut *self.held.borrow_mut());
        drop(released);
    }
}

impl<T> Default for ListenerSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn clear_releases_every_held_listener() {
        let dropped = Rc::new(Cell::new(0));
        let slot = ListenerSlot::new();

        slot.hold(Tracked(dropped.clone()));
        slot.hold(Tracked(dropped.clone()));
        assert_eq!(dropped.get(), 0);

        slot.clear();
        assert_eq!(dropped.get(), 2);

        // Cada render suelta solo los del anterior
        slot.hold(Tracked(dropped.clone()));
        slot.clear();
        assert_eq!(dropped.get(), 3);
    }

    #[test]
    fn dropping_the_slot_releases_what_it_holds() {
        let dropped = Rc::new(Cell::new(0));
        let slot = ListenerSlot::new();
        slot.hold(Tracked(dropped.clone()));

        drop(slot);

        assert_eq!(dropped.get(), 1);
    }
}
