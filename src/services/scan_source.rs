// ============================================================================
// SCAN SOURCE - Decodificación de QR con la cámara
// ============================================================================
// La sesión guarda el source activo dentro de `ActiveScan`, que libera la
// cámara en su drop. Toda salida de Scanning pasa por ese drop.
// ============================================================================

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::config::ScannerConfig;
use crate::dom::get_element_by_id;
use crate::utils::html5_qrcode_ffi::{self, Html5QrcodeScanner};

/// Recibe el texto decodificado. Puede llamarse muchas veces por activación
pub type DecodeHandler = Rc<dyn Fn(String)>;

pub trait ScanSource {
    /// Se monta en `container_id` y empieza a decodificar. Los frames sin
    /// código nunca llegan a `on_decoded`.
    fn activate(&mut self, container_id: &str, on_decoded: DecodeHandler) -> Result<(), String>;

    /// Deja de decodificar y libera la cámara
    fn deactivate(&mut self);
}

/// Source activado. Su drop lo desactiva exactamente una vez.
pub struct ActiveScan<S: ScanSource> {
    source: S,
}

impl<S: ScanSource> ActiveScan<S> {
    /// Activa `source`. Si falla no se retiene ni se libera nada.
    pub fn acquire(
        mut source: S,
        container_id: &str,
        on_decoded: DecodeHandler,
    ) -> Result<Self, String> {
        source.activate(container_id, on_decoded)?;
        Ok(Self { source })
    }

    pub fn release(self) {
        drop(self);
    }
}

impl<S: ScanSource> Drop for ActiveScan<S> {
    fn drop(&mut self) {
        self.source.deactivate();
    }
}

impl<S: ScanSource> std::fmt::Debug for ActiveScan<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveScan").finish_non_exhaustive()
    }
}

type SuccessClosure = Closure<dyn FnMut(String, JsValue)>;
type ErrorClosure = Closure<dyn FnMut(JsValue)>;

/// Scan source sobre html5-qrcode
pub struct Html5QrcodeSource {
    fps: u32,
    qrbox: u32,
    scanner: Option<Html5QrcodeScanner>,
    closures: Option<(SuccessClosure, ErrorClosure)>,
}

impl Html5QrcodeSource {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            fps: config.scanner_fps,
            qrbox: config.scanner_qrbox,
            scanner: None,
            closures: None,
        }
    }
}

impl ScanSource for Html5QrcodeSource {
    fn activate(&mut self, container_id: &str, on_decoded: DecodeHandler) -> Result<(), String> {
        if get_element_by_id(container_id).is_none() {
            return Err(format!("scan container #{} not found", container_id));
        }

        let config = html5_qrcode_ffi::scanner_config(self.fps, self.qrbox)
            .map_err(|e| format!("scanner config: {:?}", e))?;
        let scanner = Html5QrcodeScanner::new(container_id, &config, false)
            .map_err(|e| format!("Html5QrcodeScanner: {:?}", e))?;

        let on_success = Closure::wrap(Box::new(move |text: String, _result: JsValue| {
            log::info!("📱 [SCANNER] Código decodificado: {}", text);
            on_decoded(text);
        }) as Box<dyn FnMut(String, JsValue)>);

        // Se dispara en cada frame sin código
        let on_error = Closure::wrap(Box::new(move |_error: JsValue| {
            log::trace!("[SCANNER] frame sin código");
        }) as Box<dyn FnMut(JsValue)>);

        attach_or_release(
            || scanner.render(on_success.as_ref().unchecked_ref(), on_error.as_ref().unchecked_ref()),
            || {
                if let Err(e) = scanner.clear() {
                    log::warn!("⚠️ [SCANNER] clear() tras render fallido: {:?}", e);
                }
            },
        )?;

        log::info!("📷 [SCANNER] Scanner montado en #{}", container_id);
        self.scanner = Some(scanner);
        self.closures = Some((on_success, on_error));
        Ok(())
    }

    fn deactivate(&mut self) {
        let Some(scanner) = self.scanner.take() else {
            return;
        };
        let closures = self.closures.take();

        match scanner.clear() {
            Ok(promise) => {
                // Los frames en cola pueden llamar hasta que clear() se resuelva
                wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        log::error!("❌ [SCANNER] Error liberando la cámara: {:?}", e);
                    }
                    drop(closures);
                });
            }
            Err(e) => {
                log::error!("❌ [SCANNER] clear() lanzó: {:?}", e);
                drop(closures);
            }
        }
        log::info!("🛑 [SCANNER] Cámara liberada");
    }
}

/// Ejecuta `render`; si falla, `release` deshace lo que construyó el constructor
fn attach_or_release<E, R, L>(render: R, release: L) -> Result<(), String>
where
    E: std::fmt::Debug,
    R: FnOnce() -> Result<(), E>,
    L: FnOnce(),
{
    render().map_err(|e| {
        release();
        format!("render: {:?}", e)
    })
}

impl Drop for Html5QrcodeSource {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Counts {
        activations: Cell<usize>,
        deactivations: Cell<usize>,
        fail_with: RefCell<Option<String>>,
    }

    struct FakeSource(Rc<Counts>);

    impl ScanSource for FakeSource {
        fn activate(&mut self, _container_id: &str, _on_decoded: DecodeHandler) -> Result<(), String> {
            if let Some(reason) = self.0.fail_with.borrow().clone() {
                return Err(reason);
            }
            self.0.activations.set(self.0.activations.get() + 1);
            Ok(())
        }

        fn deactivate(&mut self) {
            self.0.deactivations.set(self.0.deactivations.get() + 1);
        }
    }

    fn noop_handler() -> DecodeHandler {
        Rc::new(|_| {})
    }

    #[test]
    fn dropping_guard_deactivates_once() {
        let counts = Rc::new(Counts::default());
        let guard = ActiveScan::acquire(FakeSource(counts.clone()), "qr-reader", noop_handler())
            .expect("activation");

        assert_eq!(counts.activations.get(), 1);
        assert_eq!(counts.deactivations.get(), 0);

        drop(guard);
        assert_eq!(counts.deactivations.get(), 1);
    }

    #[test]
    fn explicit_release_is_the_same_single_deactivation() {
        let counts = Rc::new(Counts::default());
        let guard = ActiveScan::acquire(FakeSource(counts.clone()), "qr-reader", noop_handler())
            .expect("activation");

        guard.release();
        assert_eq!(counts.deactivations.get(), 1);
    }

    #[test]
    fn failed_activation_holds_nothing() {
        let counts = Rc::new(Counts::default());
        *counts.fail_with.borrow_mut() = Some("scan container #qr-reader not found".into());

        let result = ActiveScan::acquire(FakeSource(counts.clone()), "qr-reader", noop_handler());

        assert_eq!(result.unwrap_err(), "scan container #qr-reader not found");
        assert_eq!(counts.deactivations.get(), 0);
    }

    #[test]
    fn failed_render_releases_the_constructed_scanner() {
        let released = Cell::new(0);

        let result = attach_or_release(|| Err("NotAllowedError"), || released.set(released.get() + 1));

        assert_eq!(result, Err("render: \"NotAllowedError\"".to_string()));
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn successful_render_keeps_the_scanner() {
        let released = Cell::new(0);

        let result = attach_or_release(|| Ok::<(), String>(()), || released.set(released.get() + 1));

        assert_eq!(result, Ok(()));
        assert_eq!(released.get(), 0);
    }
}
