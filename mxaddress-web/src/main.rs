//! Servidor web Axum para extração de componentes de endereços

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use mxaddress_core::{corpus::demo_addresses, AddressError, AddressParser, ParserConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Endereço de escuta padrão; sobrescrito por `MXADDRESS_BIND`.
const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    parser: AddressParser,
}

#[derive(Deserialize)]
struct AddressRequest {
    address: String,
}

#[derive(Deserialize)]
struct BatchRequest {
    addresses: Vec<String>,
}

#[derive(Serialize)]
struct LabeledTokenResponse {
    token: String,
    label: String,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ParserConfig::from_env();
    let parser = AddressParser::from_config(&config);
    if parser.is_loaded() {
        info!(model = %config.model_path.display(), "modelo carregado");
    } else {
        warn!(model = %config.model_path.display(), "servidor iniciado sem modelo; /tag e /parse responderão 503");
    }

    let app = router(Arc::new(AppState { parser }));

    let bind = std::env::var("MXADDRESS_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("🚀 Servidor de endereços iniciado em http://{bind}");
    axum::serve(listener, app).await
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/tag", post(tag_handler))
        .route("/tag/batch", post(tag_batch_handler))
        .route("/parse", post(parse_handler))
        .route("/demo-addresses", get(demo_addresses_handler))
        .layer(cors)
        .with_state(state)
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Modelo ausente vira 503; demais falhas do pipeline, 500.
fn error_response(err: &AddressError) -> Response {
    let status = if err.is_missing_model() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

fn join_error_response(err: tokio::task::JoinError) -> Response {
    warn!(error = %err, "tarefa de análise abortada");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "análise interrompida" })),
    )
        .into_response()
}

/// Endereço reconciliado via HTTP POST
async fn tag_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddressRequest>,
) -> Response {
    if req.address.trim().is_empty() {
        return bad_request("Endereço vazio");
    }

    // O pipeline é síncrono: roda fora do runtime
    let state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || state.parser.tag(&req.address)).await;

    match result {
        Ok(Ok(address)) => Json(address).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(err) => join_error_response(err),
    }
}

/// Vários endereços de uma vez; cada item traz o endereço ou o erro
async fn tag_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Response {
    if req.addresses.is_empty() {
        return bad_request("Lista de endereços vazia");
    }
    info!("Analisando lote de {} endereços", req.addresses.len());

    let state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        let refs: Vec<&str> = req.addresses.iter().map(String::as_str).collect();
        state
            .parser
            .tag_many(&refs)
            .into_iter()
            .map(|r| match r {
                Ok(address) => serde_json::to_value(address)
                    .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
                Err(err) => serde_json::json!({ "error": err.to_string() }),
            })
            .collect::<Vec<serde_json::Value>>()
    })
    .await;

    match result {
        Ok(items) => Json(items).into_response(),
        Err(err) => join_error_response(err),
    }
}

/// Tokens com os rótulos brutos do modelo, sem reconciliação
async fn parse_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddressRequest>,
) -> Response {
    if req.address.trim().is_empty() {
        return bad_request("Endereço vazio");
    }

    let state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || state.parser.parse(&req.address)).await;

    match result {
        Ok(Ok(labeled)) => {
            let body: Vec<LabeledTokenResponse> = labeled
                .into_iter()
                .map(|lt| LabeledTokenResponse {
                    token: lt.token.text,
                    label: lt.label.name().to_string(),
                })
                .collect();
            Json(body).into_response()
        }
        Ok(Err(err)) => error_response(&err),
        Err(err) => join_error_response(err),
    }
}

/// Retorna endereços de demonstração
async fn demo_addresses_handler() -> impl IntoResponse {
    let addresses: Vec<serde_json::Value> = demo_addresses()
        .iter()
        .map(|(case, address)| {
            serde_json::json!({
                "case": case,
                "address": address
            })
        })
        .collect();
    Json(addresses)
}
