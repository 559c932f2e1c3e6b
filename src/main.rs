use std::{process, sync::Arc, time::Duration};

use mortydex::{
    application::{
        characters::CharacterService, error::AppError, gateway::CharacterGateway,
        repos::{FavoritesRepo, UsersRepo},
    },
    cache::CharacterCache,
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, AuthVerifier},
        telemetry,
        upstream::UpstreamClient,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    run_serve(settings).await
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;

    let upstream = UpstreamClient::new(&settings.upstream)?;
    let cache = Arc::new(CharacterCache::new(&settings.cache));
    let gateway = Arc::new(CharacterGateway::new(
        Arc::new(upstream),
        cache,
        settings.cache.ttl(),
    ));

    let favorites: Arc<dyn FavoritesRepo> = repositories.clone();
    let users: Arc<dyn UsersRepo> = repositories.clone();
    let characters = Arc::new(CharacterService::new(gateway.clone(), favorites, users));

    let state = ApiState {
        characters,
        gateway,
        auth: Arc::new(AuthVerifier::new(&settings.auth.jwt_secret)),
    };

    serve_http(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url must be configured",
        ))
    })?;

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(format!("failed to connect: {err}")))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| InfraError::database(format!("failed to run migrations: {err}")))?;

    let repositories = Arc::new(PostgresRepositories::new(pool));

    repositories
        .health_check()
        .await
        .map_err(|err| InfraError::database(format!("health check failed: {err}")))?;
    info!(target: "mortydex::db", "database ready");

    Ok(repositories)
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target: "mortydex::http",
        addr = %settings.server.addr,
        ttl_seconds = settings.cache.ttl().as_secs(),
        upstream = %settings.upstream.base_url,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        // Without a signal handler, sleep forever and let the OS kill us.
        tokio::time::sleep(Duration::from_secs(u64::MAX)).await;
    }
    info!(target: "mortydex::http", "shutdown signal received");
}
