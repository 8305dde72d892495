// ============================================================================
// SCAN SESSION - Máquina de estados (idle → scanning → processing → result)
// ============================================================================
// `dispatch` es la única forma de mutar la sesión. Los eventos fuera de la
// tabla se ignoran. La sesión no notifica a nadie: devuelve el snapshot y
// quien la contiene notifica cuando ya soltó el borrow.
//
//   Idle       --Start-------------------> Scanning    (activar source)
//   Scanning   --Stop--------------------> Idle        (liberar source)
//   Scanning   --Decoded(payload)--------> Processing  (liberar source, Validate)
//   Processing --ValidationResolved(o)---> Result
//   Result     --Reset-------------------> Idle
// ============================================================================

use std::fmt;

use crate::models::{Ticket, ValidationOutcome, Verdict};
use crate::services::scan_source::{ActiveScan, DecodeHandler, ScanSource};
use crate::utils::constants::SCANNER_INIT_FAILED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Processing,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Start,
    Stop,
    Decoded(String),
    ValidationResolved(ValidationOutcome),
    Reset,
}

impl ScanEvent {
    fn name(&self) -> &'static str {
        match self {
            ScanEvent::Start => "start",
            ScanEvent::Stop => "stop",
            ScanEvent::Decoded(_) => "decoded",
            ScanEvent::ValidationResolved(_) => "validation_resolved",
            ScanEvent::Reset => "reset",
        }
    }
}

/// Trabajo que debe hacer quien llamó tras una transición
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validar este payload y devolver el resultado como `ValidationResolved`
    Validate(String),
}

/// Vista de solo lectura de la sesión para la capa de presentación
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSnapshot {
    pub phase: Phase,
    pub result: Option<Verdict>,
    pub ticket: Option<Ticket>,
    pub error: Option<String>,
}

impl ScanSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            result: None,
            ticket: None,
            error: None,
        }
    }
}

/// Resultado de `dispatch`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub command: Option<Command>,
    /// Nuevo estado, `None` si el evento se ignoró
    pub snapshot: Option<ScanSnapshot>,
}

/// Estado transitorio de escaneo/validación de una pantalla.
///
/// Tiene como mucho un source activo, y solo en `Scanning`.
/// Al destruir la sesión se libera.
pub struct ScanSession<S: ScanSource> {
    phase: Phase,
    result: Option<Verdict>,
    ticket: Option<Ticket>,
    error: Option<String>,
    container_id: String,
    make_source: Box<dyn Fn() -> S>,
    on_decoded: DecodeHandler,
    active: Option<ActiveScan<S>>,
}

impl<S: ScanSource> ScanSession<S> {
    /// `make_source` crea un source nuevo en cada `Start`; `on_decoded` es lo
    /// que el source llama con el texto decodificado.
    pub fn new<F>(container_id: impl Into<String>, make_source: F, on_decoded: DecodeHandler) -> Self
    where
        F: Fn() -> S + 'static,
    {
        Self {
            phase: Phase::Idle,
            result: None,
            ticket: None,
            error: None,
            container_id: container_id.into(),
            make_source: Box::new(make_source),
            on_decoded,
            active: None,
        }
    }

    pub fn dispatch(&mut self, event: ScanEvent) -> Dispatch {
        let from = self.phase;
        let name = event.name();

        let command = match (self.phase, event) {
            (Phase::Idle, ScanEvent::Start) => {
                self.begin_scanning();
                None
            }
            (Phase::Scanning, ScanEvent::Stop) => {
                self.release_source();
                self.phase = Phase::Idle;
                None
            }
            (Phase::Scanning, ScanEvent::Decoded(payload)) => {
                // Liberar el source antes de cualquier await: ningún otro
                // decode puede lanzar una segunda validación.
                self.release_source();
                self.ticket = None;
                self.error = None;
                self.phase = Phase::Processing;
                Some(Command::Validate(payload))
            }
            (Phase::Processing, ScanEvent::ValidationResolved(outcome)) => {
                self.apply_outcome(outcome);
                None
            }
            (Phase::Result, ScanEvent::Reset) => {
                self.result = None;
                self.ticket = None;
                self.error = None;
                self.phase = Phase::Idle;
                None
            }
            (phase, _) => {
                log::debug!("[SESSION] '{}' ignorado en {:?}", name, phase);
                return Dispatch::default();
            }
        };

        log::info!("🔁 [SESSION] {:?} --{}--> {:?}", from, name, self.phase);
        Dispatch {
            command,
            snapshot: Some(self.snapshot()),
        }
    }

    pub fn start(&mut self) -> Dispatch {
        self.dispatch(ScanEvent::Start)
    }

    pub fn stop(&mut self) -> Dispatch {
        self.dispatch(ScanEvent::Stop)
    }

    pub fn decoded(&mut self, payload: impl Into<String>) -> Dispatch {
        self.dispatch(ScanEvent::Decoded(payload.into()))
    }

    pub fn validation_resolved(&mut self, outcome: ValidationOutcome) -> Dispatch {
        self.dispatch(ScanEvent::ValidationResolved(outcome))
    }

    pub fn reset(&mut self) -> Dispatch {
        self.dispatch(ScanEvent::Reset)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn result(&self) -> Option<Verdict> {
        self.result
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn is_source_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            phase: self.phase,
            result: self.result,
            ticket: self.ticket.clone(),
            error: self.error.clone(),
        }
    }

    fn begin_scanning(&mut self) {
        self.result = None;
        self.ticket = None;
        self.error = None;

        let source = (self.make_source)();
        match ActiveScan::acquire(source, &self.container_id, self.on_decoded.clone()) {
            Ok(active) => {
                self.active = Some(active);
                self.phase = Phase::Scanning;
            }
            Err(e) => {
                log::error!("❌ [SESSION] Error inicializando el scanner: {}", e);
                self.error = Some(SCANNER_INIT_FAILED.to_string());
                self.phase = Phase::Idle;
            }
        }
    }

    fn release_source(&mut self) {
        if let Some(active) = self.active.take() {
            active.release();
        }
    }

    fn apply_outcome(&mut self, outcome: ValidationOutcome) {
        self.result = Some(outcome.verdict());
        match outcome {
            ValidationOutcome::Valid(ticket) => {
                self.ticket = Some(ticket);
                self.error = None;
            }
            ValidationOutcome::Invalid(reason) => {
                self.ticket = None;
                self.error = Some(reason);
            }
        }
        self.phase = Phase::Result;
    }
}

impl<S: ScanSource> fmt::Debug for ScanSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanSession")
            .field("phase", &self.phase)
            .field("result", &self.result)
            .field("ticket", &self.ticket)
            .field("error", &self.error)
            .field("container_id", &self.container_id)
            .field("source_active", &self.active.is_some())
            .finish()
    }
}
