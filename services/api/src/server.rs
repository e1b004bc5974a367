use crate::cli::ServeArgs;
use crate::error::AppError;
use crate::infra::AppState;
use crate::routes::decision_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gastric_decision::config::AppConfig;
use gastric_decision::decisions::DecisionComposer;
use gastric_decision::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let composer = Arc::new(DecisionComposer::new(config.engine.clone()));

    let app = decision_router(composer)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        risk_cap = ?config.engine.risk_adjustment_cap,
        "gastric decision service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
