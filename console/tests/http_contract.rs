//! End-to-end contract coverage: the real transport and gateways against an
//! in-process stub of the admin API.
//!
//! The stub speaks the uniform envelope (`{ code, message, data, meta? }`),
//! guards the admin routes with a bearer check, and keeps just enough state
//! for create/delete round trips.

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use url::Url;

use minihome_console::domain::{
    AuthGateway, ClientError, ContentGateway, LoginCredentials, SessionToken, TokenStore,
    UserListFilter, UsersGateway,
};
use minihome_console::outbound::{
    ApiTransport, HttpAuthGateway, HttpProjectsGateway, HttpUsersGateway, InMemoryTokenStore,
};

const VALID_TOKEN: &str = "bearer-token-1";

struct StubState {
    users: Vec<Value>,
    projects: Mutex<HashMap<i64, Value>>,
    next_project_id: AtomicI64,
}

fn stub_user(id: i64, username: &str, approved: bool, active: bool) -> Value {
    json!({
        "id": id,
        "email": format!("{username}@minihome.page"),
        "username": username,
        "displayName": username,
        "isActive": active,
        "isMaster": false,
        "isApproved": approved,
        "createdAt": "2024-03-01T09:30:00Z",
        "updatedAt": "2024-03-01T09:30:00Z"
    })
}

fn ok_envelope(data: Value, meta: Option<Value>) -> HttpResponse {
    let mut body = json!({ "code": 1, "message": "ok", "data": data });
    if let Some(meta) = meta {
        body["meta"] = meta;
    }
    HttpResponse::Ok().json(body)
}

fn failure(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "code": 0,
        "message": message,
        "data": null
    }))
}

fn bearer_is_valid(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(&format!("Bearer {VALID_TOKEN}"))
}

async fn login(body: web::Json<Value>) -> HttpResponse {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if username == "gil" && password == "secret-password" {
        ok_envelope(
            json!({
                "token": VALID_TOKEN,
                "user": stub_user(1, "gil", true, true)
            }),
            None,
        )
    } else {
        failure(
            actix_web::http::StatusCode::UNAUTHORIZED,
            "invalid credentials",
        )
    }
}

async fn list_users(
    req: HttpRequest,
    state: web::Data<StubState>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    if !bearer_is_valid(&req) {
        return failure(actix_web::http::StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let flag = |name: &str| query.get(name).map(|raw| raw == "true");
    let matching: Vec<Value> = state
        .users
        .iter()
        .filter(|user| {
            flag("isApproved").is_none_or(|want| user["isApproved"] == json!(want))
                && flag("isActive").is_none_or(|want| user["isActive"] == json!(want))
                && flag("isMaster").is_none_or(|want| user["isMaster"] == json!(want))
        })
        .cloned()
        .collect();
    let approved = state
        .users
        .iter()
        .filter(|user| user["isApproved"] == json!(true))
        .count();
    let meta = json!({
        "count": matching.len(),
        "stats": {
            "total": state.users.len(),
            "approved": approved,
            "pending": state.users.len() - approved
        }
    });
    ok_envelope(json!({ "users": matching }), Some(meta))
}

async fn get_user(req: HttpRequest, state: web::Data<StubState>) -> HttpResponse {
    if !bearer_is_valid(&req) {
        return failure(actix_web::http::StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let id: i64 = req
        .match_info()
        .get("id")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    match state.users.iter().find(|user| user["id"] == json!(id)) {
        Some(user) => ok_envelope(json!({ "user": user }), None),
        None => failure(actix_web::http::StatusCode::NOT_FOUND, "user not found"),
    }
}

async fn create_project(
    req: HttpRequest,
    state: web::Data<StubState>,
    body: web::Json<Value>,
) -> HttpResponse {
    if !bearer_is_valid(&req) {
        return failure(actix_web::http::StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let id = state.next_project_id.fetch_add(1, Ordering::SeqCst);
    let record = json!({
        "id": id,
        "category": body["category"],
        "title": body["title"],
        "desc": body.get("desc").cloned().unwrap_or(Value::Null),
        "imgUrl": body.get("imgUrl").cloned().unwrap_or(Value::Null),
        "projectUrl": body.get("projectUrl").cloned().unwrap_or(Value::Null),
        "badge": body.get("badge").cloned().unwrap_or(Value::Null),
        "createdAt": "2024-03-01T09:30:00Z",
        "updatedAt": "2024-03-01T09:30:00Z"
    });
    state
        .projects
        .lock()
        .expect("stub lock")
        .insert(id, record.clone());
    ok_envelope(json!({ "project": record }), None)
}

async fn get_project(req: HttpRequest, state: web::Data<StubState>) -> HttpResponse {
    if !bearer_is_valid(&req) {
        return failure(actix_web::http::StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let id: i64 = req
        .match_info()
        .get("id")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    match state.projects.lock().expect("stub lock").get(&id) {
        Some(record) => ok_envelope(json!({ "project": record }), None),
        None => failure(actix_web::http::StatusCode::NOT_FOUND, "project not found"),
    }
}

async fn delete_project(req: HttpRequest, state: web::Data<StubState>) -> HttpResponse {
    if !bearer_is_valid(&req) {
        return failure(actix_web::http::StatusCode::UNAUTHORIZED, "unauthorized");
    }
    let id: i64 = req
        .match_info()
        .get("id")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    match state.projects.lock().expect("stub lock").remove(&id) {
        Some(record) => ok_envelope(json!({ "project": record }), None),
        None => failure(actix_web::http::StatusCode::NOT_FOUND, "project not found"),
    }
}

fn spawn_stub() -> (Url, ServerHandle) {
    let state = web::Data::new(StubState {
        users: vec![
            stub_user(1, "gil", true, true),
            stub_user(2, "newcomer", false, true),
            stub_user(3, "banned", true, false),
        ],
        projects: Mutex::new(HashMap::new()),
        next_project_id: AtomicI64::new(100),
    });

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener address");

    let server = HttpServer::new(move || {
        App::new().app_data(state.clone()).service(
            web::scope("/api")
                .route("/public/auth/login", web::post().to(login))
                .route("/admin/users/list", web::get().to(list_users))
                .route("/admin/users/{id}", web::get().to(get_user))
                .route("/admin/projects", web::post().to(create_project))
                .route("/admin/projects/{id}", web::get().to(get_project))
                .route("/admin/projects/{id}", web::delete().to(delete_project)),
        )
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("listen on stub address")
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    let base = Url::parse(&format!("http://{addr}/api")).expect("stub base URL");
    (base, handle)
}

fn client_stack(base: Url) -> (Arc<InMemoryTokenStore>, Arc<ApiTransport>) {
    let tokens = Arc::new(InMemoryTokenStore::new());
    let transport = Arc::new(
        ApiTransport::new(base, Arc::clone(&tokens) as Arc<dyn TokenStore>)
            .expect("transport builds"),
    );
    (tokens, transport)
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("non-blank credentials")
}

#[actix_rt::test]
async fn login_round_trip_decodes_the_envelope() {
    let (base, server) = spawn_stub();
    let (_tokens, transport) = client_stack(base);
    let auth = HttpAuthGateway::new(transport);

    let outcome = auth
        .login(&credentials("gil", "secret-password"))
        .await
        .expect("login succeeds");
    assert_eq!(outcome.token.as_str(), VALID_TOKEN);
    assert_eq!(outcome.user.username, "gil");
    assert!(!outcome.user.is_master);

    server.stop(true).await;
}

#[actix_rt::test]
async fn rejected_credentials_surface_the_server_message() {
    let (base, server) = spawn_stub();
    let (tokens, transport) = client_stack(base);
    let auth = HttpAuthGateway::new(transport);

    // The stub answers a bad login with 401; that is a rejection, not an
    // expired session, and the server's message must survive verbatim.
    let error = auth
        .login(&credentials("gil", "wrong-password"))
        .await
        .expect_err("bad password is rejected");
    assert_eq!(error, ClientError::request_failed("invalid credentials"));
    assert!(tokens.get().is_none(), "no session after a rejected login");

    server.stop(true).await;
}

#[actix_rt::test]
async fn rejected_relogin_keeps_the_existing_session() {
    let (base, server) = spawn_stub();
    let (tokens, transport) = client_stack(base);
    tokens.set(SessionToken::new(VALID_TOKEN).expect("token"));
    let auth = HttpAuthGateway::new(transport);

    let error = auth
        .login(&credentials("gil", "wrong-password"))
        .await
        .expect_err("bad password is rejected");
    assert_eq!(error, ClientError::request_failed("invalid credentials"));
    assert_eq!(
        tokens.get(),
        Some(SessionToken::new(VALID_TOKEN).expect("token")),
        "a mistyped re-login must not drop the live session"
    );

    server.stop(true).await;
}

#[actix_rt::test]
async fn users_list_narrows_by_tri_state_flags_and_parses_stats() {
    let (base, server) = spawn_stub();
    let (tokens, transport) = client_stack(base);
    tokens.set(SessionToken::new(VALID_TOKEN).expect("token"));
    let users = HttpUsersGateway::new(transport);

    let everyone = users
        .list(&UserListFilter::default(), None)
        .await
        .expect("unfiltered list");
    assert_eq!(everyone.count, 3);
    let stats = everyone.stats.expect("stats supplied");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);

    let pending = users
        .list(&UserListFilter::default().with_approved(false), None)
        .await
        .expect("filtered list");
    assert_eq!(pending.count, 1);
    assert_eq!(pending.users[0].username, "newcomer");

    // false filters on their own dimension only
    let inactive = users
        .list(&UserListFilter::default().with_active(false), None)
        .await
        .expect("filtered list");
    assert_eq!(inactive.count, 1);
    assert_eq!(inactive.users[0].username, "banned");

    server.stop(true).await;
}

#[actix_rt::test]
async fn protected_calls_without_a_token_never_reach_the_network() {
    let (base, server) = spawn_stub();
    let (_tokens, transport) = client_stack(base);
    let users = HttpUsersGateway::new(transport);

    let error = users
        .list(&UserListFilter::default(), None)
        .await
        .expect_err("no token, no request");
    assert_eq!(error, ClientError::Unauthenticated);

    server.stop(true).await;
}

#[actix_rt::test]
async fn rejected_sessions_are_cleared_by_the_transport() {
    let (base, server) = spawn_stub();
    let (tokens, transport) = client_stack(base);
    tokens.set(SessionToken::new("stale-token").expect("token"));
    let users = HttpUsersGateway::new(transport);

    let error = users.get(1).await.expect_err("stale token is rejected");
    assert_eq!(error, ClientError::SessionExpired);
    assert!(tokens.get().is_none(), "transport drops the dead credential");

    server.stop(true).await;
}

#[actix_rt::test]
async fn project_create_get_delete_round_trip() {
    let (base, server) = spawn_stub();
    let (tokens, transport) = client_stack(base);
    tokens.set(SessionToken::new(VALID_TOKEN).expect("token"));
    let projects = HttpProjectsGateway::new(transport);

    let draft = minihome_console::domain::NewContent {
        category: "web".to_owned(),
        title: "Portfolio".to_owned(),
        desc: Some("A portfolio site".to_owned()),
        img_url: None,
        project_url: None,
        badge: Some(vec!["rust".to_owned()]),
    };
    let created = projects.create(&draft).await.expect("creation succeeds");
    assert_eq!(created.title, "Portfolio");
    assert_eq!(created.badge.as_deref(), Some(&["rust".to_owned()][..]));

    let fetched = projects.get(created.id).await.expect("fetch by id");
    assert_eq!(fetched, created);

    let deleted = projects.delete(created.id).await.expect("first delete");
    assert_eq!(deleted.id, created.id);

    let error = projects
        .delete(created.id)
        .await
        .expect_err("second delete fails");
    assert_eq!(error, ClientError::request_failed("project not found"));

    server.stop(true).await;
}
