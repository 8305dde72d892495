// ============================================================================
// TICKET SCANNER - Validación de tickets QR en el navegador (Rust + WASM)
// ============================================================================
// - Models: ticket + resultado de validación
// - Services: cliente de validación, transporte HTTP, cámara
// - State: máquina de estados de la sesión de escaneo
// - ViewModels: orquestación sesión ↔ validación
// - Views / DOM: solo renderizado
// ============================================================================

pub mod app;
pub mod config;
pub mod dom;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;
pub mod views;

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::app::App;
use crate::config::CONFIG;

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(CONFIG.log_level()));
    log::info!("🚀 [APP] Iniciando QR Ticket Scanner");

    let app = App::new()?;
    app.render()?;

    APP.with(|cell| {
        *cell.borrow_mut() = Some(app);
    });

    // Se registra una sola vez
    if let Some(win) = web_sys::window() {
        let closure = Closure::wrap(Box::new(move |e: web_sys::PageTransitionEvent| {
            on_pagehide(e.persisted());
        }) as Box<dyn FnMut(web_sys::PageTransitionEvent)>);
        win.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

// Con `persisted` la página entra en el bfcache y puede volver: solo se
// suelta la cámara. Si no, se destruye la app (la sesión libera la cámara
// si seguía escaneando).
fn on_pagehide(persisted: bool) {
    if persisted {
        log::info!("⏸️ [APP] pagehide (bfcache), deteniendo el escaneo");
        with_app(App::suspend);
    } else {
        log::info!("👋 [APP] pagehide, destruyendo el scanner");
        let app = APP.with(|cell| cell.borrow_mut().take());
        drop(app);
    }
}

/// Ejecuta `f` sobre la app viva, si existe
pub(crate) fn with_app<F>(f: F)
where
    F: FnOnce(&App),
{
    APP.with(|cell| match cell.borrow().as_ref() {
        Some(app) => f(app),
        None => log::warn!("⚠️ [APP] App no inicializada"),
    });
}

/// Re-renderizar el scanner con el estado actual de la sesión
pub fn rerender_app() {
    with_app(|app| {
        if let Err(e) = app.render() {
            log::error!("❌ [APP] Error al renderizar: {:?}", e);
        }
    });
}
