// ============================================================================
// STATE MODULE - Máquina de estados de la sesión + notificaciones
// ============================================================================

pub mod reactivity;
pub mod scan_session;

pub use reactivity::*;
pub use scan_session::*;
