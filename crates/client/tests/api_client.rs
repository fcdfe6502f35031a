use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use client::{ApiClient, Board, ClientError, IdeaApi, models::VoteKind};
use serde_json::{Value, json};

type Seen = Arc<Mutex<Vec<String>>>;

fn record(seen: &Seen, headers: &HeaderMap, what: String) {
    let auth = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();
    seen.lock().unwrap().push(format!("{what} [{auth}]"));
}

async fn list_ideas(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
    record(&seen, &headers, "GET /Ideias".into());
    Json(json!({
        "ideias": [
            {
                "codigo": "a",
                "titulo": "Dark mode",
                "descricao": "Please",
                "upvotes": 4,
                "downvotes": 1,
                "comentarios": [],
                "nomeUsuario": "Ana",
                "emailUsuario": "ana@example.com"
            },
            {
                "codigo": "b",
                "titulo": "Offline mode",
                "descricao": "Sync later",
                "upvotes": 0,
                "downvotes": 2,
                "comentarios": [{
                    "codigoUsuario": "7",
                    "nomeUsuario": "Bob",
                    "email": "bob@example.com",
                    "comentario": "+1"
                }],
                "nomeUsuario": "Bob",
                "emailUsuario": "bob@example.com"
            },
            {
                "codigo": "locked",
                "titulo": "Archived",
                "descricao": "Voting closed",
                "upvotes": 7,
                "downvotes": 0,
                "nomeUsuario": "Bob",
                "emailUsuario": "bob@example.com"
            }
        ]
    }))
}

async fn voted(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
    record(&seen, &headers, "GET /Usuario/ObterIdeiasVotadas".into());
    Json(json!({ "ideiasVotadas": [{ "codigoIdeia": "b", "tipoVote": 2 }] }))
}

async fn vote(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, &headers, format!("POST /Ideias/Vote {body}"));
    Json(json!({ "sucesso": body["codigoIdeia"] != "locked" }))
}

async fn delete(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record(&seen, &headers, format!("DELETE /Ideias {body}"));
    Json(json!({ "sucesso": true }))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (StatusCode::OK, Json(json!({ "token": "tok-123" })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

async fn spawn_mock() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/Ideias", get(list_ideas).delete(delete))
        .route("/Ideias/Vote", post(vote))
        .route("/Usuario/ObterIdeiasVotadas", get(voted))
        .route("/Usuario/login", post(login))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    (format!("http://{addr}/"), seen)
}

#[tokio::test]
async fn attaches_bearer_token_and_parses_envelopes() {
    let (url, seen) = spawn_mock().await;
    let api = ApiClient::new(url).with_token("tok-123");

    let ideas = api.list_ideas().await.unwrap();
    assert_eq!(ideas.len(), 3);
    assert_eq!(ideas[1].comentarios[0].nome_usuario, "Bob");

    let votes = api.voted_ideas().await.unwrap();
    assert_eq!(votes[0].tipo_vote, VoteKind::Down);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            "GET /Ideias [Bearer tok-123]",
            "GET /Usuario/ObterIdeiasVotadas [Bearer tok-123]",
        ]
    );
}

#[tokio::test]
async fn login_returns_token_or_server_message() {
    let (url, _) = spawn_mock().await;
    let api = ApiClient::new(url);

    assert_eq!(api.login("ana@example.com", "secret").await.unwrap(), "tok-123");

    match api.login("ana@example.com", "wrong").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn board_switches_vote_over_http() {
    let (url, seen) = spawn_mock().await;
    let api = ApiClient::new(url).with_token("tok-123");
    let mut board = Board::new(None);

    board.refresh(&api).await.unwrap();
    assert_eq!(board.idea("b").unwrap().user_vote, Some(VoteKind::Down));

    board.vote(&api, "b", VoteKind::Up).await.unwrap();
    let b = board.idea("b").unwrap();
    assert_eq!((b.upvotes, b.downvotes, b.user_vote), (1, 1, Some(VoteKind::Up)));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        &seen[2..],
        &[
            r#"DELETE /Ideias {"codigoIdeia":"b"} [Bearer tok-123]"#,
            r#"POST /Ideias/Vote {"codigoIdeia":"b","tipoVote":1} [Bearer tok-123]"#,
        ]
    );
}

#[tokio::test]
async fn refused_vote_rolls_back_over_http() {
    let (url, seen) = spawn_mock().await;
    let api = ApiClient::new(url).with_token("tok-123");
    let mut board = Board::new(None);
    board.refresh(&api).await.unwrap();
    let before = board.idea("locked").unwrap().clone();

    assert!(matches!(
        board.vote(&api, "locked", VoteKind::Up).await,
        Err(ClientError::Rejected("vote"))
    ));
    assert_eq!(board.idea("locked"), Some(&before));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen.last().map(String::as_str),
        Some(r#"POST /Ideias/Vote {"codigoIdeia":"locked","tipoVote":1} [Bearer tok-123]"#)
    );
}

#[tokio::test]
async fn unreachable_api_is_a_transport_error() {
    let api = ApiClient::new("http://127.0.0.1:9");
    assert!(matches!(
        api.list_ideas().await,
        Err(ClientError::Transport(_))
    ));
}
