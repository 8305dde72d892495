// ============================================================================
// VIEWS - Solo renderizado DOM, sin cambios de estado
// ============================================================================

pub mod scanner;

pub use scanner::*;
