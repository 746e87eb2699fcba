//! Fallback orchestration tests using in-process providers.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use relay_core::{
    Credentials, ProviderConfig, ProviderKind, RelayError, RequestedProvider, ShipmentResult,
    TrackingRequest,
};
use relay_providers::{
    select_order, AttemptOutcome, FallbackOrchestrator, ProviderError, TrackingProvider,
    TrackingService,
};

/// Provider returning a fixed outcome and counting calls.
struct ScriptedProvider {
    kind: ProviderKind,
    outcome: AttemptOutcome,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new(
        kind: ProviderKind,
        outcome: AttemptOutcome,
    ) -> (Arc<dyn TrackingProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider: Arc<dyn TrackingProvider> =
            Arc::new(Self { kind, outcome, calls: calls.clone() });
        (provider, calls)
    }
}

impl TrackingProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn track<'a>(
        &'a self,
        _request: &'a TrackingRequest,
    ) -> Pin<Box<dyn Future<Output = AttemptOutcome> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

fn config(kind: ProviderKind) -> ProviderConfig {
    ProviderConfig::new(kind, "http://unused.test", Some(Credentials::ApiKey("key".into())))
}

fn success(kind: ProviderKind) -> AttemptOutcome {
    AttemptOutcome::Success(ShipmentResult::new("ABC123", kind.as_str()))
}

fn request(requested: RequestedProvider) -> TrackingRequest {
    TrackingRequest::new("ABC123").unwrap().with_requested_provider(requested)
}

#[tokio::test]
async fn recoverable_failure_falls_through_to_next_provider() {
    let (parcels, parcels_calls) = ScriptedProvider::new(
        ProviderKind::ParcelsApp,
        AttemptOutcome::Recoverable(ProviderError::QuotaExhausted {
            code: "SUBSCRIPTION_LIMIT_REACHED".into(),
        }),
    );
    let (track17, track17_calls) =
        ScriptedProvider::new(ProviderKind::Track17, success(ProviderKind::Track17));

    let configs = vec![config(ProviderKind::Track17), config(ProviderKind::ParcelsApp)];
    let service = TrackingService::with_orchestrator(
        configs,
        FallbackOrchestrator::from_providers([parcels, track17]),
    );

    let shipment = service.track(&request(RequestedProvider::Auto)).await.unwrap();

    assert_eq!(shipment.provider, "17track");
    assert_eq!(parcels_calls.load(Ordering::SeqCst), 1);
    assert_eq!(track17_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn first_success_stops_the_chain() {
    let (parcels, _) =
        ScriptedProvider::new(ProviderKind::ParcelsApp, success(ProviderKind::ParcelsApp));
    let (ups, ups_calls) = ScriptedProvider::new(ProviderKind::Ups, success(ProviderKind::Ups));

    let configs = vec![config(ProviderKind::ParcelsApp), config(ProviderKind::Ups)];
    let selection = select_order(&configs, RequestedProvider::Auto).unwrap();
    let orchestrator = FallbackOrchestrator::from_providers([parcels, ups]);

    let shipment =
        orchestrator.resolve(&request(RequestedProvider::Auto), &selection).await.unwrap();

    assert_eq!(shipment.provider, "parcelsapp");
    assert_eq!(ups_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn every_provider_recoverable_is_unavailable() {
    let (parcels, _) = ScriptedProvider::new(
        ProviderKind::ParcelsApp,
        AttemptOutcome::Recoverable(ProviderError::MissingCorrelationId),
    );
    let (trackingmore, _) = ScriptedProvider::new(
        ProviderKind::TrackingMore,
        AttemptOutcome::Recoverable(ProviderError::NoData),
    );

    let configs = vec![config(ProviderKind::ParcelsApp), config(ProviderKind::TrackingMore)];
    let service = TrackingService::with_orchestrator(
        configs,
        FallbackOrchestrator::from_providers([parcels, trackingmore]),
    );

    let err = service.track(&request(RequestedProvider::Auto)).await.unwrap_err();

    match &err {
        RelayError::ProviderUnavailable { attempted, last_error } => {
            assert_eq!(attempted, &vec![ProviderKind::ParcelsApp, ProviderKind::TrackingMore]);
            assert_eq!(last_error, "no tracking data returned");
        },
        other => panic!("expected ProviderUnavailable, got {other:?}"),
    }
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn fatal_in_auto_mode_continues_unless_last() {
    let (parcels, _) = ScriptedProvider::new(
        ProviderKind::ParcelsApp,
        AttemptOutcome::Fatal(ProviderError::InvalidCredentials),
    );
    let (ups, ups_calls) = ScriptedProvider::new(ProviderKind::Ups, success(ProviderKind::Ups));

    let configs = vec![config(ProviderKind::ParcelsApp), config(ProviderKind::Ups)];
    let service = TrackingService::with_orchestrator(
        configs,
        FallbackOrchestrator::from_providers([parcels, ups]),
    );

    let shipment = service.track(&request(RequestedProvider::Auto)).await.unwrap();
    assert_eq!(shipment.provider, "ups");
    assert_eq!(ups_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fatal_from_last_candidate_is_reported() {
    let (track17, _) = ScriptedProvider::new(
        ProviderKind::Track17,
        AttemptOutcome::Fatal(ProviderError::InvalidTrackingId),
    );

    let service = TrackingService::with_orchestrator(
        vec![config(ProviderKind::Track17)],
        FallbackOrchestrator::from_providers([track17]),
    );

    let err = service.track(&request(RequestedProvider::Auto)).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "invalid tracking id");
    assert_eq!(err.provider(), Some(ProviderKind::Track17));
}

#[tokio::test]
async fn explicit_mode_never_falls_back() {
    let (parcels, parcels_calls) = ScriptedProvider::new(
        ProviderKind::ParcelsApp,
        AttemptOutcome::Recoverable(ProviderError::upstream_status(429, "slow down")),
    );
    let (ups, ups_calls) = ScriptedProvider::new(ProviderKind::Ups, success(ProviderKind::Ups));

    let configs = vec![config(ProviderKind::ParcelsApp), config(ProviderKind::Ups)];
    let service = TrackingService::with_orchestrator(
        configs,
        FallbackOrchestrator::from_providers([parcels, ups]),
    );

    let err = service
        .track(&request(RequestedProvider::Explicit(ProviderKind::ParcelsApp)))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 429);
    assert_eq!(parcels_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ups_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explicit_uncredentialed_provider_attempts_nothing() {
    let (parcels, parcels_calls) =
        ScriptedProvider::new(ProviderKind::ParcelsApp, success(ProviderKind::ParcelsApp));

    let configs = vec![
        config(ProviderKind::ParcelsApp),
        ProviderConfig::new(ProviderKind::TrackingMore, "http://unused.test", None),
    ];
    let orchestrator = FallbackOrchestrator::from_providers([parcels]);
    let service = TrackingService::with_orchestrator(configs, orchestrator);

    let err = service
        .track(&request(RequestedProvider::Explicit(ProviderKind::TrackingMore)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::ProviderNotConfigured { provider: ProviderKind::TrackingMore }
    ));
    assert_eq!(err.status_code(), 500);
    assert_eq!(parcels_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn last_candidate_timeout_is_upstream_timeout() {
    let (ups, _) = ScriptedProvider::new(
        ProviderKind::Ups,
        AttemptOutcome::Recoverable(ProviderError::Timeout { timeout_ms: 30_000 }),
    );

    let service = TrackingService::with_orchestrator(
        vec![config(ProviderKind::Ups)],
        FallbackOrchestrator::from_providers([ups]),
    );

    let err = service.track(&request(RequestedProvider::Auto)).await.unwrap_err();
    assert!(matches!(err, RelayError::UpstreamTimeout { provider: ProviderKind::Ups }));
    assert_eq!(err.to_string(), "upstream timeout");
}

#[tokio::test]
async fn selected_provider_without_adapter_is_not_configured() {
    let configs = vec![config(ProviderKind::Track17)];
    let service = TrackingService::with_orchestrator(
        configs,
        FallbackOrchestrator::from_providers(Vec::new()),
    );

    let err = service.track(&request(RequestedProvider::Auto)).await.unwrap_err();
    assert!(matches!(err, RelayError::ProviderNotConfigured { provider: ProviderKind::Track17 }));
}
