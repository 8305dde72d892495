// ============================================================================
// HTML5-QRCODE FFI - Bindings a la clase global Html5QrcodeScanner
// ============================================================================
// Solo wrappers sin estado. La librería la carga index.html.
// ============================================================================

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `Html5QrcodeScanner` de html5-qrcode (cámara, bucle de decodificación y UI)
    pub type Html5QrcodeScanner;

    #[wasm_bindgen(constructor, catch)]
    pub fn new(
        element_id: &str,
        config: &JsValue,
        verbose: bool,
    ) -> Result<Html5QrcodeScanner, JsValue>;

    /// Arranca la cámara y el bucle de decodificación
    #[wasm_bindgen(method, catch)]
    pub fn render(
        this: &Html5QrcodeScanner,
        on_success: &js_sys::Function,
        on_error: &js_sys::Function,
    ) -> Result<(), JsValue>;

    /// Para la cámara y quita la UI. Se resuelve cuando la cámara queda libre.
    #[wasm_bindgen(method, catch)]
    pub fn clear(this: &Html5QrcodeScanner) -> Result<js_sys::Promise, JsValue>;
}

/// Objeto `{ fps, qrbox }` para el constructor
pub fn scanner_config(fps: u32, qrbox: u32) -> Result<JsValue, JsValue> {
    let config = js_sys::Object::new();
    js_sys::Reflect::set(&config, &JsValue::from_str("fps"), &JsValue::from(fps))?;
    js_sys::Reflect::set(&config, &JsValue::from_str("qrbox"), &JsValue::from(qrbox))?;
    Ok(config.into())
}
