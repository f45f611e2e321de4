//! Goal Metrics service entry point
//!
//! Loads configuration, connects the metric store and the event transport,
//! and serves the query surface until interrupted.

use std::error::Error;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use goal_metrics::adapters::http::{metrics_routes, MetricsAppState};
use goal_metrics::adapters::{InMemoryCircuitBreaker, PostgresMetricRepository, RedisEventSubscriber};
use goal_metrics::application::handlers::metrics::{
    ApplyMetricEventHandler, GetMetricsHandler, InitMetricsHandler, MetricEventListener,
};
use goal_metrics::config::AppConfig;
use goal_metrics::domain::metrics::ScoreCalculator;
use goal_metrics::ports::{Clock, EventSubscriber, MetricRepository, SystemClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config)?;

    let pool: PgPool = config.database.pool_options().connect(&config.database.url).await?;
    if config.database.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let repository: Arc<dyn MetricRepository> = Arc::new(PostgresMetricRepository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store_timeout = config.metrics.store_timeout();
    let trend_builder = config.metrics.trend_builder();
    tracing::info!(
        window_months = trend_builder.window_months(),
        order = ?trend_builder.order(),
        "Trend view configured"
    );

    let aggregator = Arc::new(
        ApplyMetricEventHandler::new(
            repository.clone(),
            ScoreCalculator::new(config.scoring.policy()),
            clock.clone(),
        )
        .with_store_timeout(store_timeout),
    );

    let state = MetricsAppState {
        get_metrics: Arc::new(
            GetMetricsHandler::new(
                repository.clone(),
                trend_builder,
                clock,
                Arc::new(InMemoryCircuitBreaker::new("metric_store", config.metrics.circuit_breaker())),
            )
            .with_store_timeout(store_timeout),
        ),
        init_metrics: Arc::new(InitMetricsHandler::new(repository).with_store_timeout(store_timeout)),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let subscriber_task = if config.redis.subscribe {
        let subscriber = Arc::new(
            RedisEventSubscriber::from_url(&config.redis.url)?.with_connect_timeout(config.redis.timeout()),
        );
        for listener in MetricEventListener::for_all_streams(aggregator) {
            subscriber.subscribe(listener.stream(), listener);
        }
        Some(tokio::spawn(async move {
            if let Err(e) = subscriber.run(shutdown_rx).await {
                tracing::error!(error = %e, "Event subscriber stopped");
            }
        }))
    } else {
        tracing::warn!("Event subscription disabled, aggregates will not update");
        None
    };

    let app = metrics_routes(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Starting goal metrics server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(task) = subscriber_task {
        let _ = task.await;
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    Ok(())
}
