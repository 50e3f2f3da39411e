use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use arkiv_api::database::manager::DatabaseManager;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = arkiv_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Arkiv API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("ARKIV_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("Arkiv API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        // Administration
        .merge(user_routes())
        .merge(group_routes())
        // Classification
        .merge(serie_routes())
        .merge(liasse_routes())
        // Storage and organization
        .merge(localisation_routes())
        .merge(structure_routes())
        .merge(beneficiaire_routes())
        // Records
        .merge(record_routes())
        // Settings, audit, staleness
        .merge(misc_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router {
    use axum::routing::post;
    use arkiv_api::handlers::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/api/auth/whoami", get(auth::whoami))
}

fn user_routes() -> Router {
    use axum::routing::patch;
    use arkiv_api::handlers::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/api/users/:id/toggle", patch(users::toggle))
        .route("/api/users/:id/groups", get(users::groups))
}

fn group_routes() -> Router {
    use axum::routing::{post, put};
    use arkiv_api::handlers::groups;

    Router::new()
        .route("/api/groups", get(groups::list).post(groups::create))
        .route(
            "/api/groups/:id",
            get(groups::get).put(groups::update).delete(groups::delete),
        )
        .route("/api/groups/:id/permissions", put(groups::set_permissions))
        .route("/api/groups/:id/members", get(groups::members))
        .route(
            "/api/groups/:id/members/:user_id",
            post(groups::add_member).delete(groups::remove_member),
        )
}

fn serie_routes() -> Router {
    use arkiv_api::handlers::series;

    Router::new()
        .route("/api/series", get(series::list).post(series::create))
        .route("/api/series/tree", get(series::tree))
        .route(
            "/api/series/:id",
            get(series::get).put(series::update).delete(series::delete),
        )
}

fn liasse_routes() -> Router {
    use arkiv_api::handlers::liasses;

    Router::new()
        .route("/api/liasses", get(liasses::list).post(liasses::create))
        .route(
            "/api/liasses/:id",
            get(liasses::get).put(liasses::update).delete(liasses::delete),
        )
}

fn localisation_routes() -> Router {
    use arkiv_api::handlers::localisations;

    Router::new()
        .route(
            "/api/localisations",
            get(localisations::list).post(localisations::create),
        )
        .route("/api/localisations/tree", get(localisations::tree))
        .route(
            "/api/localisations/:id",
            get(localisations::get)
                .put(localisations::update)
                .delete(localisations::delete),
        )
}

fn structure_routes() -> Router {
    use arkiv_api::handlers::structures;

    Router::new()
        .route(
            "/api/structures",
            get(structures::list).post(structures::create),
        )
        .route("/api/structures/tree", get(structures::tree))
        .route(
            "/api/structures/:id",
            get(structures::get)
                .put(structures::update)
                .delete(structures::delete),
        )
}

fn beneficiaire_routes() -> Router {
    use arkiv_api::handlers::beneficiaires;

    Router::new()
        .route(
            "/api/beneficiaires",
            get(beneficiaires::list).post(beneficiaires::create),
        )
        .route(
            "/api/beneficiaires/:id",
            get(beneficiaires::get)
                .put(beneficiaires::update)
                .delete(beneficiaires::delete),
        )
}

fn record_routes() -> Router {
    use arkiv_api::handlers::records;

    Router::new()
        .route(
            "/api/types-document",
            get(records::type_document_list).post(records::type_document_create),
        )
        .route(
            "/api/types-document/:id",
            axum::routing::put(records::type_document_update)
                .delete(records::type_document_delete),
        )
        .route(
            "/api/documents",
            get(records::document_list).post(records::document_create),
        )
        .route(
            "/api/documents/:id",
            axum::routing::delete(records::document_delete),
        )
        .route(
            "/api/dossiers",
            get(records::dossier_list).post(records::dossier_create),
        )
        .route(
            "/api/dossiers/:id",
            axum::routing::delete(records::dossier_delete),
        )
}

fn misc_routes() -> Router {
    use axum::routing::put;
    use arkiv_api::handlers::{journal, options, revalidation};

    Router::new()
        .route("/api/options", get(options::list))
        .route("/api/options/:cle", put(options::set))
        .route("/api/journal", get(journal::list))
        .route("/api/revalidation", get(revalidation::versions))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Arkiv API",
            "version": version,
            "description": "Records-management and archival administration backend",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login (public), /api/auth/whoami",
                "users": "/api/users[/:id]",
                "groups": "/api/groups[/:id] (+ /permissions, /members)",
                "series": "/api/series[/:id], /api/series/tree",
                "liasses": "/api/liasses[/:id]",
                "localisations": "/api/localisations[/:id], /api/localisations/tree",
                "structures": "/api/structures[/:id], /api/structures/tree",
                "beneficiaires": "/api/beneficiaires[/:id]",
                "types_document": "/api/types-document[/:id]",
                "documents": "/api/documents[/:id]",
                "dossiers": "/api/dossiers[/:id]",
                "options": "/api/options[/:cle]",
                "journal": "/api/journal",
                "revalidation": "/api/revalidation",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
