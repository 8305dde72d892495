// Utilidades compartidas

pub mod constants;
pub mod html5_qrcode_ffi;

pub use constants::*;
