// ============================================================================
// APP - Raíz de la aplicación del scanner
// ============================================================================

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;

use crate::config::CONFIG;
use crate::dom::get_element_by_id;
use crate::services::{FetchTransport, Html5QrcodeSource};
use crate::viewmodels::ScannerViewModel;
use crate::views::{ScannerActions, ScannerShell, render_scanner, render_shell};

pub type AppViewModel = ScannerViewModel<Html5QrcodeSource, FetchTransport>;

pub struct App {
    viewmodel: AppViewModel,
    shell: ScannerShell,
    actions: ScannerActions,
}

impl App {
    pub fn new() -> Result<Self, JsValue> {
        let root = get_element_by_id("app")
            .ok_or_else(|| JsValue::from_str("No #app element found"))?;

        let viewmodel = AppViewModel::from_config(
            &CONFIG,
            || Html5QrcodeSource::new(&CONFIG),
            FetchTransport::new(),
            Rc::new(|future: LocalBoxFuture<'static, ()>| {
                wasm_bindgen_futures::spawn_local(future)
            }),
        );

        let shell = render_shell(&root, &viewmodel.container_id())?;

        // Los botones llegan al viewmodel a través de APP: ningún listener
        // mantiene viva la sesión (ni la cámara).
        let actions = ScannerActions {
            on_start: Rc::new(|| crate::with_app(|app| app.viewmodel.start())),
            on_stop: Rc::new(|| crate::with_app(|app| app.viewmodel.stop())),
            on_reset: Rc::new(|| crate::with_app(|app| app.viewmodel.reset())),
        };

        // Varias transiciones en el mismo tick se renderizan una sola vez
        viewmodel.subscribe(|snapshot| {
            log::debug!("[APP] cambio de estado: {:?}", snapshot.phase);
            gloo_timers::callback::Timeout::new(0, crate::rerender_app).forget();
        });

        log::info!("🎫 [APP] Validando contra {}", CONFIG.validation_url);

        Ok(Self {
            viewmodel,
            shell,
            actions,
        })
    }

    /// Suelta la cámara sin destruir la sesión (página en el bfcache)
    pub fn suspend(&self) {
        self.viewmodel.stop();
    }

    pub fn render(&self) -> Result<(), JsValue> {
        render_scanner(&self.shell, &self.viewmodel.snapshot(), &self.actions)
    }
}
