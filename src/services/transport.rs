// ============================================================================
// TRANSPORT - Capa HTTP del cliente de validación
// ============================================================================
// FetchTransport es la implementación del navegador (gloo-net + AbortController).
// Los tests usan su propio Transport.
// ============================================================================

use std::future::Future;
use std::time::Duration;

use futures::future::{Either, select};
use futures::pin_mut;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use web_sys::AbortController;

/// Respuesta HTTP cruda, sin interpretar el body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("could not read response body: {0}")]
    Body(String),
}

#[allow(async_fn_in_trait)]
pub trait Transport {
    /// POST de `body` como JSON a `url`; se rinde pasado `timeout`
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Transport del navegador sobre `fetch`
#[derive(Debug, Clone, Default)]
pub struct FetchTransport;

impl FetchTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for FetchTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let controller = AbortController::new()
            .map_err(|e| TransportError::Network(format!("AbortController unavailable: {:?}", e)))?;

        let request = Request::post(url)
            .header("Content-Type", "application/json")
            .abort_signal(Some(&controller.signal()))
            .json(body)
            .map_err(|e| TransportError::Serialization(e.to_string()))?;

        let exchange = async move {
            let response = request
                .send()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;
            Ok::<_, TransportError>(TransportResponse { status, body })
        };

        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);

        race_deadline(exchange, TimeoutFuture::new(millis), timeout, || {
            controller.abort();
            log::warn!("⏱️ [API] Petición a {} abortada tras {:?}", url, timeout);
        })
        .await
    }
}

/// Corre `exchange` contra `deadline`. Si gana el deadline se llama a
/// `on_timeout` (abortar la petición) y se devuelve `Timeout(timeout)`.
pub(crate) async fn race_deadline<E, D, A>(
    exchange: E,
    deadline: D,
    timeout: Duration,
    on_timeout: A,
) -> Result<TransportResponse, TransportError>
where
    E: Future<Output = Result<TransportResponse, TransportError>>,
    D: Future<Output = ()>,
    A: FnOnce(),
{
    pin_mut!(exchange);
    pin_mut!(deadline);

    match select(exchange, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => {
            on_timeout();
            Err(TransportError::Timeout(timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{pending, ready};
    use std::cell::Cell;

    const TEN_SECONDS: Duration = Duration::from_secs(10);

    #[test]
    fn deadline_aborts_an_exchange_that_never_answers() {
        let aborted = Cell::new(false);

        let result = block_on(race_deadline(
            pending::<Result<TransportResponse, TransportError>>(),
            ready(()),
            TEN_SECONDS,
            || aborted.set(true),
        ));

        assert_eq!(result, Err(TransportError::Timeout(TEN_SECONDS)));
        assert!(aborted.get());
    }

    #[test]
    fn answered_exchange_wins_without_abort() {
        let aborted = Cell::new(false);
        let response = TransportResponse {
            status: 200,
            body: "{}".into(),
        };

        let result = block_on(race_deadline(
            ready(Ok(response.clone())),
            pending::<()>(),
            TEN_SECONDS,
            || aborted.set(true),
        ));

        assert_eq!(result, Ok(response));
        assert!(!aborted.get());
    }

    #[test]
    fn exchange_errors_pass_through_untouched() {
        let aborted = Cell::new(false);

        let result = block_on(race_deadline(
            ready(Err(TransportError::Network("connection refused".into()))),
            pending::<()>(),
            TEN_SECONDS,
            || aborted.set(true),
        ));

        assert_eq!(result, Err(TransportError::Network("connection refused".into())));
        assert!(!aborted.get());
    }
}
