// ============================================================================
// SCANNER VIEWMODEL - Conecta la sesión de escaneo con el cliente de validación
// ============================================================================
// Single-threaded: Rc + RefCell. El borrow de la sesión se suelta antes de
// notificar a los subscribers y antes de lanzar la validación, así que un
// subscriber puede volver a llamar al viewmodel.
// ============================================================================

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;

use crate::config::ScannerConfig;
use crate::services::scan_source::{DecodeHandler, ScanSource};
use crate::services::transport::Transport;
use crate::services::validation_client::ValidationClient;
use crate::state::reactivity::Notifier;
use crate::state::scan_session::{Command, ScanEvent, ScanSession, ScanSnapshot};

/// Ejecuta un future local desacoplado (`spawn_local` en el navegador)
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

struct Shared<S: ScanSource, T: Transport> {
    session: RefCell<ScanSession<S>>,
    observers: Notifier<ScanSnapshot>,
    client: ValidationClient<T>,
    spawner: Spawner,
}

/// Handle para la capa de presentación. Los clones comparten la sesión.
pub struct ScannerViewModel<S: ScanSource + 'static, T: Transport + 'static> {
    shared: Rc<Shared<S, T>>,
}

impl<S: ScanSource + 'static, T: Transport + 'static> Clone for ScannerViewModel<S, T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S: ScanSource + 'static, T: Transport + 'static> ScannerViewModel<S, T> {
    pub fn new<F>(
        container_id: impl Into<String>,
        make_source: F,
        client: ValidationClient<T>,
        spawner: Spawner,
    ) -> Self
    where
        F: Fn() -> S + 'static,
    {
        let container_id = container_id.into();
        let shared = Rc::new_cyclic(|weak: &Weak<Shared<S, T>>| {
            // Weak: el source no mantiene viva la sesión que lo contiene
            let weak = weak.clone();
            let on_decoded: DecodeHandler = Rc::new(move |payload: String| {
                if let Some(shared) = weak.upgrade() {
                    Self::handle(&shared, ScanEvent::Decoded(payload));
                }
            });

            Shared {
                session: RefCell::new(ScanSession::new(container_id, make_source, on_decoded)),
                observers: Notifier::new(),
                client,
                spawner,
            }
        });

        Self { shared }
    }

    pub fn from_config<F>(config: &ScannerConfig, make_source: F, transport: T, spawner: Spawner) -> Self
    where
        F: Fn() -> S + 'static,
    {
        Self::new(
            config.container_id.clone(),
            make_source,
            ValidationClient::from_config(transport, config),
            spawner,
        )
    }

    pub fn start(&self) {
        Self::handle(&self.shared, ScanEvent::Start);
    }

    pub fn stop(&self) {
        Self::handle(&self.shared, ScanEvent::Stop);
    }

    pub fn reset(&self) {
        Self::handle(&self.shared, ScanEvent::Reset);
    }

    /// El subscriber recibe el snapshot de cada transición aplicada
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&ScanSnapshot) + 'static,
    {
        self.shared.observers.subscribe(observer);
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.shared.session.borrow().snapshot()
    }

    pub fn container_id(&self) -> String {
        self.shared.session.borrow().container_id().to_string()
    }

    fn handle(shared: &Rc<Shared<S, T>>, event: ScanEvent) {
        // El RefMut muere al final de esta sentencia
        let dispatch = shared.session.borrow_mut().dispatch(event);

        if let Some(snapshot) = &dispatch.snapshot {
            shared.observers.notify(snapshot);
        }

        if let Some(Command::Validate(payload)) = dispatch.command {
            let spawn = shared.spawner.clone();
            let shared = shared.clone();
            spawn(Box::pin(async move {
                let outcome = shared.client.validate(&payload).await;
                Self::handle(&shared, ScanEvent::ValidationResolved(outcome));
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ticket, Verdict};
    use crate::services::transport::{TransportError, TransportResponse};
    use crate::state::scan_session::Phase;
    use crate::state::scan_session::tests::{CameraLog, FakeCamera};
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use serde_json::{Value, json};
    use std::cell::Cell;
    use std::time::Duration;

    struct CountingTransport {
        reply: Result<TransportResponse, TransportError>,
        calls: Rc<Cell<usize>>,
    }

    impl Transport for CountingTransport {
        async fn post_json(
            &self,
            _url: &str,
            _body: &Value,
            _timeout: Duration,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    struct Harness {
        pool: LocalPool,
        camera: Rc<CameraLog>,
        calls: Rc<Cell<usize>>,
        vm: ScannerViewModel<FakeCamera, CountingTransport>,
    }

    fn harness(reply: Result<TransportResponse, TransportError>) -> Harness {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let camera = Rc::new(CameraLog::default());
        let calls = Rc::new(Cell::new(0));

        let vm = ScannerViewModel::from_config(
            &ScannerConfig::default(),
            FakeCamera::factory(&camera),
            CountingTransport {
                reply,
                calls: calls.clone(),
            },
            Rc::new(move |future: LocalBoxFuture<'static, ()>| {
                if let Err(e) = spawner.spawn_local(future) {
                    panic!("spawn failed: {:?}", e);
                }
            }),
        );

        Harness {
            pool,
            camera,
            calls,
            vm,
        }
    }

    fn ok(body: Value) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn concert_body() -> Value {
        json!({
            "status": "success",
            "ticket": {
                "eventName": "Concert",
                "firstName": "Jane",
                "lastName": "Doe",
                "identityNumber": "X1",
                "email": "j@d.com",
                "orderid": "O1"
            }
        })
    }

    #[test]
    fn scan_of_a_valid_ticket_ends_in_valid_result() {
        let mut h = harness(ok(concert_body()));

        h.vm.start();
        h.camera.emit("TICKET123");
        assert_eq!(h.vm.snapshot().phase, Phase::Processing);

        h.pool.run_until_stalled();

        let snapshot = h.vm.snapshot();
        assert_eq!(snapshot.phase, Phase::Result);
        assert_eq!(snapshot.result, Some(Verdict::Valid));
        assert_eq!(
            snapshot.ticket,
            Some(Ticket {
                event_name: "Concert".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                identity_number: "X1".into(),
                email: "j@d.com".into(),
                order_id: "O1".into(),
            })
        );
        assert_eq!(snapshot.error, None);
    }

    #[test]
    fn burst_of_decodes_makes_a_single_validation_call() {
        let mut h = harness(ok(concert_body()));

        h.vm.start();
        for _ in 0..10 {
            h.camera.emit("TICKET123");
        }
        h.pool.run_until_stalled();

        assert_eq!(h.calls.get(), 1);
        assert_eq!(h.camera.clears.get(), 1);
        assert_eq!(h.vm.snapshot().phase, Phase::Result);

        // Los frames rezagados tras el resultado también se ignoran
        h.camera.emit("TICKET123");
        h.pool.run_until_stalled();
        assert_eq!(h.calls.get(), 1);
    }

    #[test]
    fn transport_timeout_ends_in_api_error() {
        let mut h = harness(Err(TransportError::Timeout(Duration::from_secs(10))));

        h.vm.start();
        h.camera.emit("TICKET123");
        h.pool.run_until_stalled();

        let snapshot = h.vm.snapshot();
        assert_eq!(snapshot.result, Some(Verdict::Invalid));
        assert_eq!(snapshot.error.as_deref(), Some("API error. Ticket not found."));
        assert_eq!(snapshot.ticket, None);
    }

    #[test]
    fn reset_then_rescan_after_not_found() {
        let mut h = harness(ok(json!({ "status": "failed" })));

        h.vm.start();
        h.camera.emit("UNKNOWN");
        h.pool.run_until_stalled();
        assert_eq!(h.vm.snapshot().error.as_deref(), Some("Ticket not found."));

        h.vm.reset();
        assert_eq!(h.vm.snapshot(), ScanSnapshot::idle());

        h.vm.start();
        assert_eq!(h.vm.snapshot().phase, Phase::Scanning);
        assert_eq!(h.camera.activations.get(), 2);
    }

    #[test]
    fn stop_before_any_decode_makes_no_call() {
        let mut h = harness(ok(concert_body()));

        h.vm.start();
        h.vm.stop();
        h.camera.emit("TICKET123");
        h.pool.run_until_stalled();

        assert_eq!(h.calls.get(), 0);
        assert_eq!(h.vm.snapshot().phase, Phase::Idle);
        assert_eq!(h.camera.clears.get(), 1);
    }

    #[test]
    fn stopped_scanner_can_start_again() {
        // Es lo que pasa cuando la página entra y sale del bfcache
        let mut h = harness(ok(concert_body()));

        h.vm.start();
        h.vm.stop();
        h.vm.start();
        h.camera.emit("TICKET123");
        h.pool.run_until_stalled();

        assert_eq!(h.camera.activations.get(), 2);
        assert_eq!(h.camera.clears.get(), 2);
        assert_eq!(h.calls.get(), 1);
        assert_eq!(h.vm.snapshot().result, Some(Verdict::Valid));
    }

    #[test]
    fn subscribers_are_told_about_the_async_result() {
        let mut h = harness(ok(concert_body()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            h.vm.subscribe(move |s| seen.borrow_mut().push((s.phase, s.result)));
        }

        h.vm.start();
        h.camera.emit("TICKET123");
        h.pool.run_until_stalled();

        assert_eq!(
            *seen.borrow(),
            vec![
                (Phase::Scanning, None),
                (Phase::Processing, None),
                (Phase::Result, Some(Verdict::Valid)),
            ]
        );
    }

    #[test]
    fn subscriber_can_read_and_reset_the_viewmodel_it_observes() {
        let mut h = harness(ok(concert_body()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let vm = h.vm.clone();
            let seen = seen.clone();
            h.vm.subscribe(move |s| {
                seen.borrow_mut().push(vm.snapshot().phase);
                if s.phase == Phase::Result {
                    vm.reset();
                }
            });
        }

        h.vm.start();
        h.camera.emit("TICKET123");
        h.pool.run_until_stalled();

        assert_eq!(
            *seen.borrow(),
            vec![Phase::Scanning, Phase::Processing, Phase::Result, Phase::Idle]
        );
        assert_eq!(h.vm.snapshot(), ScanSnapshot::idle());
    }

    #[test]
    fn dropping_the_viewmodel_while_scanning_releases_the_camera() {
        let h = harness(ok(concert_body()));

        h.vm.start();
        let Harness { vm, camera, .. } = h;
        drop(vm);

        assert_eq!(camera.clears.get(), 1);
    }
}
