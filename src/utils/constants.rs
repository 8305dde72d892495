/// El servidor contesta pero no reconoce el ticket
pub const TICKET_NOT_FOUND: &str = "Ticket not found.";

/// Cualquier fallo de transporte: timeout, red, status no 2xx o body ilegible
pub const API_ERROR_TICKET_NOT_FOUND: &str = "API error. Ticket not found.";

/// No existe el contenedor de escaneo al activar la cámara
pub const SCANNER_INIT_FAILED: &str = "Scanner initialization failed";

/// Valor de `status` con el que la API confirma el ticket
pub const SUCCESS_STATUS: &str = "success";
