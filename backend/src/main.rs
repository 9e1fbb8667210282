//! Backend entry-point: wires REST endpoints, persistence, and OpenAPI docs.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use color_eyre::eyre::eyre;
use mockable::DefaultClock;
use ortho_config::OrthoConfig as _;
use pagination::PageSize;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;
use zeroize::Zeroize;

use backend::Trace;
use backend::config::AppSettings;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::{
    IdentityService, LeaderboardService, ReportIdSource, ReportService, ValidationService,
};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::{HttpState, HttpStatePorts, configure_api};
use backend::outbound::persistence::{
    JsonReportRepository, JsonUserLedgerRepository, SnapshotStore,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()?;
    let key = load_session_key(&settings)?;
    let cookie_secure = settings.cookie_secure;
    let page_size = PageSize::new(settings.leaderboard_page_size())
        .map_err(|err| eyre!("invalid leaderboard page size: {err}"))?;

    let http_state = build_state(&settings, page_size)?;
    let server_state = web::Data::new(http_state);
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays accessible.
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let api = web::scope("/api/v1").wrap(session).configure(configure_api);

        let app = App::new()
            .app_data(server_state.clone())
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(feature = "metrics")]
        let app = app.wrap(make_metrics());

        #[cfg(debug_assertions)]
        let app = app
            .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(settings.bind_addr())?;

    health_state.mark_ready();
    server.run().await?;
    Ok(())
}

/// Open the snapshot store and assemble the domain services.
fn build_state(settings: &AppSettings, page_size: PageSize) -> color_eyre::Result<HttpState> {
    let store = Arc::new(SnapshotStore::open(&settings.data_dir())?);
    let reports_repo = Arc::new(JsonReportRepository::open(Arc::clone(&store))?);
    let ledger_repo = Arc::new(JsonUserLedgerRepository::open(store)?);
    let ids = Arc::new(ReportIdSource::new(Arc::new(DefaultClock)));

    let identity = Arc::new(IdentityService::new(Arc::clone(&ledger_repo)));
    let report_service = Arc::new(ReportService::new(
        Arc::clone(&reports_repo),
        Arc::clone(&ledger_repo),
        ids,
    ));
    let validation = Arc::new(ValidationService::new(reports_repo, Arc::clone(&ledger_repo)));
    let leaderboard = Arc::new(LeaderboardService::new(ledger_repo));

    let login = Arc::clone(&identity);
    let reports = Arc::clone(&report_service);
    let ports = HttpStatePorts {
        login,
        profile: identity,
        reports,
        reports_query: report_service,
        votes: validation,
        leaderboard,
    };
    Ok(HttpState::new(ports, page_size))
}

/// Read the session signing key, falling back to an ephemeral key in
/// development.
fn load_session_key(settings: &AppSettings) -> color_eyre::Result<Key> {
    let key_path = settings.session_key_file();
    match std::fs::read(&key_path) {
        Ok(mut bytes) => {
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(e) => {
            if cfg!(debug_assertions) || settings.session_allow_ephemeral {
                warn!(path = %key_path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(eyre!(
                    "failed to read session key at {}: {e}",
                    key_path.display()
                ))
            }
        }
    }
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    PrometheusMetricsBuilder::new("civiceye")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}
