// ============================================================================
// SCANNER VIEW - Pantalla del scanner de tickets
// ============================================================================
// El shell (título, viewport, contenedor de escaneo) se construye una vez.
// Los hijos del contenedor son de html5-qrcode: los re-renders solo tocan
// el status y el panel.
// ============================================================================

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{
    ClickListener, ElementBuilder, ListenerSlot, append_child, clear_children, on_click, toggle_class,
};
use crate::models::{Ticket, Verdict};
use crate::state::{Phase, ScanSnapshot};

const HIDDEN_CLASS: &str = "hidden";

/// Callbacks de los botones del panel
#[derive(Clone)]
pub struct ScannerActions {
    pub on_start: Rc<dyn Fn()>,
    pub on_stop: Rc<dyn Fn()>,
    pub on_reset: Rc<dyn Fn()>,
}

/// Control principal bajo el viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    StartScan,
    StopScan,
    Validating,
    ScanAnother,
}

impl Control {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle => Control::StartScan,
            Phase::Scanning => Control::StopScan,
            Phase::Processing => Control::Validating,
            Phase::Result => Control::ScanAnother,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Control::StartScan => "Start Camera Scan",
            Control::StopScan => "Stop Scanning",
            Control::Validating => "Validating ticket...",
            Control::ScanAnother => "Scan Another Ticket",
        }
    }
}

/// Filas etiqueta/valor de la tarjeta del ticket
pub fn ticket_rows(ticket: &Ticket) -> Vec<(&'static str, String)> {
    vec![
        ("Event", ticket.event_name.clone()),
        ("Name", ticket.holder_name()),
        ("ID Number", ticket.identity_number.clone()),
        ("Email", ticket.email.clone()),
        ("Order ID", ticket.order_id.clone()),
    ]
}

pub fn verdict_banner(verdict: Verdict) -> (&'static str, &'static str) {
    match verdict {
        Verdict::Valid => ("alert alert-success", "✅ Ticket Valid"),
        Verdict::Invalid => ("alert alert-danger", "❌ Ticket Invalid"),
    }
}

/// Partes del shell que se re-renderizan
pub struct ScannerShell {
    status: Element,
    scan_container: Element,
    panel: Element,
    panel_listeners: ListenerSlot<ClickListener>,
}

/// Construye la parte fija de la pantalla dentro de `root`
pub fn render_shell(root: &Element, container_id: &str) -> Result<ScannerShell, JsValue> {
    clear_children(root);

    let card = ElementBuilder::new("div")?.class("scanner-card").build();

    let title = ElementBuilder::new("h1")?
        .class("scanner-title")
        .text("QR Ticket Scanner")
        .build();
    append_child(&card, &title)?;

    let status = ElementBuilder::new("div")?
        .id("scanner-status")?
        .class("scanner-status")
        .build();
    let scan_container = ElementBuilder::new("div")?
        .id(container_id)?
        .class("scan-container hidden")
        .build();
    let viewport = ElementBuilder::new("div")?
        .class("scanner-viewport")
        .child(status.clone())?
        .child(scan_container.clone())?
        .build();
    append_child(&card, &viewport)?;

    let panel = ElementBuilder::new("div")?
        .id("scanner-panel")?
        .class("scanner-panel")
        .build();
    append_child(&card, &panel)?;

    let footer = ElementBuilder::new("p")?
        .class("scanner-footer")
        .text("This scanner validates tickets by sending QR code data to the validation API. Make sure camera permissions are enabled for best results.")
        .build();
    append_child(&card, &footer)?;

    append_child(root, &card)?;

    Ok(ScannerShell {
        status,
        scan_container,
        panel,
        panel_listeners: ListenerSlot::new(),
    })
}

/// Re-renderiza el status y el panel para `snapshot`
pub fn render_scanner(
    shell: &ScannerShell,
    snapshot: &ScanSnapshot,
    actions: &ScannerActions,
) -> Result<(), JsValue> {
    toggle_class(
        &shell.scan_container,
        HIDDEN_CLASS,
        snapshot.phase != Phase::Scanning,
    )?;

    render_status(&shell.status, snapshot)?;
    render_panel(shell, snapshot, actions)
}

fn render_status(status: &Element, snapshot: &ScanSnapshot) -> Result<(), JsValue> {
    clear_children(status);

    let icon = match (snapshot.phase, snapshot.result) {
        (Phase::Idle, _) => ElementBuilder::new("div")?.class("icon icon-camera").text("📷").build(),
        (Phase::Scanning, _) => return Ok(()),
        (Phase::Processing, _) => ElementBuilder::new("div")?.class("spinner").build(),
        (Phase::Result, Some(Verdict::Valid)) => {
            ElementBuilder::new("div")?.class("icon icon-valid").text("✅").build()
        }
        (Phase::Result, _) => ElementBuilder::new("div")?.class("icon icon-invalid").text("❌").build(),
    };
    append_child(status, &icon)
}

fn render_panel(
    shell: &ScannerShell,
    snapshot: &ScanSnapshot,
    actions: &ScannerActions,
) -> Result<(), JsValue> {
    let panel = &shell.panel;
    // Los botones viejos ya no están en el DOM: sus listeners se pueden soltar
    clear_children(panel);
    shell.panel_listeners.clear();

    if let (Phase::Result, Some(verdict)) = (snapshot.phase, snapshot.result) {
        let (class, text) = verdict_banner(verdict);
        let banner = ElementBuilder::new("div")?.class(class).text(text).build();
        append_child(panel, &banner)?;
    }

    let control = Control::for_phase(snapshot.phase);
    let control_el = match control {
        Control::Validating => ElementBuilder::new("p")?
            .class("scanner-hint")
            .text(control.label())
            .build(),
        _ => {
            let class = if control == Control::StopScan {
                "btn btn-outline"
            } else {
                "btn btn-primary"
            };
            let button = ElementBuilder::new("button")?
                .class(class)
                .attr("type", "button")?
                .text(control.label())
                .build();

            let action = match control {
                Control::StartScan => actions.on_start.clone(),
                Control::StopScan => actions.on_stop.clone(),
                _ => actions.on_reset.clone(),
            };
            shell.panel_listeners.hold(on_click(&button, move |_e| action())?);
            button
        }
    };
    append_child(panel, &control_el)?;

    if let Some(error) = &snapshot.error {
        let alert = ElementBuilder::new("div")?
            .class("alert alert-warning")
            .text(error)
            .build();
        append_child(panel, &alert)?;
    }

    if let Some(ticket) = &snapshot.ticket {
        append_child(panel, &render_ticket_card(ticket)?)?;
    }

    Ok(())
}

fn render_ticket_card(ticket: &Ticket) -> Result<Element, JsValue> {
    let card = ElementBuilder::new("div")?
        .class("ticket-card")
        .child(
            ElementBuilder::new("h3")?
                .text("Ticket Information")
                .build(),
        )?
        .build();

    for (label, value) in ticket_rows(ticket) {
        let row = ElementBuilder::new("div")?
            .class("ticket-row")
            .child(ElementBuilder::new("span")?.class("ticket-label").text(label).build())?
            .child(ElementBuilder::new("span")?.class("ticket-value").text(&value).build())?
            .build();
        append_child(&card, &row)?;
    }

    Ok(card)
}
