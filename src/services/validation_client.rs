// ============================================================================
// VALIDATION CLIENT - Un POST por cada payload QR decodificado (sin estado)
// ============================================================================
// Sin reintentos: un intento fallido es definitivo para ese escaneo, el
// usuario vuelve a escanear.
// ============================================================================

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ScannerConfig;
use crate::models::{Ticket, ValidationOutcome};
use crate::services::transport::Transport;
use crate::utils::constants::{API_ERROR_TICKET_NOT_FOUND, SUCCESS_STATUS, TICKET_NOT_FOUND};

#[derive(Serialize)]
struct ValidateTicketRequest<'a> {
    qrcode: &'a str,
}

#[derive(Deserialize)]
struct ValidateTicketResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    ticket: Option<Map<String, Value>>,
}

/// Cliente del endpoint remoto de consulta de tickets
#[derive(Debug, Clone)]
pub struct ValidationClient<T: Transport> {
    transport: T,
    endpoint: String,
    timeout: Duration,
}

impl<T: Transport> ValidationClient<T> {
    pub fn new(transport: T, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_config(transport: T, config: &ScannerConfig) -> Self {
        Self::new(transport, config.validation_url.clone(), config.request_timeout())
    }

    /// Consulta `payload`. Nunca falla: los errores de transporte vuelven
    /// como `Invalid` con el mensaje genérico de error de API.
    pub async fn validate(&self, payload: &str) -> ValidationOutcome {
        let body = match serde_json::to_value(ValidateTicketRequest { qrcode: payload }) {
            Ok(body) => body,
            Err(e) => {
                log::error!("❌ [API] No se pudo codificar la petición: {}", e);
                return ValidationOutcome::Invalid(API_ERROR_TICKET_NOT_FOUND.to_string());
            }
        };

        log::info!("🎫 [API] Validando ticket ({} caracteres)", payload.len());

        match self.transport.post_json(&self.endpoint, &body, self.timeout).await {
            Ok(response) => classify_response(response.status, &response.body),
            Err(e) => {
                log::error!("❌ [API] Falló la validación: {}", e);
                ValidationOutcome::Invalid(API_ERROR_TICKET_NOT_FOUND.to_string())
            }
        }
    }
}

/// Traduce el status HTTP y el body crudo a un resultado de validación
pub fn classify_response(status: u16, body: &str) -> ValidationOutcome {
    if !(200..300).contains(&status) {
        log::warn!("⚠️ [API] HTTP {} del endpoint de validación", status);
        return ValidationOutcome::Invalid(API_ERROR_TICKET_NOT_FOUND.to_string());
    }

    // JSON roto es error de API; JSON válido con otra forma es un "no"
    let document: Value = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("⚠️ [API] Body malformado: {}", e);
            return ValidationOutcome::Invalid(API_ERROR_TICKET_NOT_FOUND.to_string());
        }
    };

    if status == 200 {
        log::info!("✅ [API] Respuesta 200: {}", document);
    }

    let response: ValidateTicketResponse = match serde_json::from_value(document) {
        Ok(response) => response,
        Err(e) => {
            log::debug!("[API] Respuesta con forma inesperada: {}", e);
            return ValidationOutcome::Invalid(TICKET_NOT_FOUND.to_string());
        }
    };

    let succeeded = response.status.as_deref() == Some(SUCCESS_STATUS);
    let fields = response.ticket.filter(|fields| !fields.is_empty());

    match fields {
        Some(fields) if status == 200 && succeeded => {
            match serde_json::from_value::<Ticket>(Value::Object(fields)) {
                Ok(ticket) => ValidationOutcome::Valid(ticket),
                Err(e) => {
                    log::warn!("⚠️ [API] Ticket ilegible: {}", e);
                    ValidationOutcome::Invalid(TICKET_NOT_FOUND.to_string())
                }
            }
        }
        _ => ValidationOutcome::Invalid(TICKET_NOT_FOUND.to_string()),
    }
}
