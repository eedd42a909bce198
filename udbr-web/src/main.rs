//! Servidor web Axum com WebSocket para visualização da anotação em tempo real

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use udbr_core::{corpus::demo_texts, Model, Pipeline, PipelineEvent};

/// Estado compartilhado da aplicação: o modelo é somente-leitura e cada
/// requisição monta seu próprio pipeline sobre ele.
struct AppState {
    model: Arc<Model>,
}

#[derive(Deserialize)]
struct ProcessRequest {
    text: String,
    #[serde(default)]
    tagger: Option<String>,
    #[serde(default)]
    parser: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

#[derive(Serialize)]
struct ProcessResponse {
    output: String,
}

impl ProcessRequest {
    fn build_pipeline(&self, model: Arc<Model>) -> Pipeline {
        Pipeline::new(
            model,
            Pipeline::DEFAULT,
            self.tagger.as_deref().unwrap_or(Pipeline::DEFAULT),
            self.parser.as_deref().unwrap_or(Pipeline::DEFAULT),
            self.output.as_deref().unwrap_or(Pipeline::DEFAULT),
        )
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let state = Arc::new(AppState {
        model: Arc::new(Model::build()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/process", post(process_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("🚀 Servidor de anotação iniciado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Anotação via HTTP POST (sem streaming)
async fn process_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let pipeline = req.build_pipeline(Arc::clone(&state.model));
    match pipeline.process(&req.text) {
        Ok(output) => Json(ProcessResponse { output }).into_response(),
        Err(error) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"error": error.to_string()})),
        )
            .into_response(),
    }
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa o pipeline e envia os eventos
/// de cada estágio em sequência para o cliente animar passo a passo
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Tenta parsear como JSON {text, tagger, parser, output};
                // senão usa como texto puro com as configurações padrão
                let req = serde_json::from_str::<ProcessRequest>(&text).unwrap_or(ProcessRequest {
                    text: text.trim().to_string(),
                    tagger: None,
                    parser: None,
                    output: None,
                });
                if req.text.trim().is_empty() {
                    continue;
                }

                info!("Anotando via WebSocket: {} chars", req.text.len());

                let pipeline = req.build_pipeline(Arc::clone(&state.model));
                let text_for_thread = req.text.clone();
                let (tx_std, rx_std) = std::sync::mpsc::channel::<PipelineEvent>();

                // Roda o pipeline (síncrono) fora do runtime
                let handle = tokio::task::spawn_blocking(move || {
                    pipeline.process_streaming(&text_for_thread, tx_std);
                });
                handle.await.ok();

                // Coleta todos os eventos e os reenvia com uma pequena pausa
                // para a animação passo a passo
                let events: Vec<PipelineEvent> = rx_std.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            return; // cliente desconectou
                        }
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
