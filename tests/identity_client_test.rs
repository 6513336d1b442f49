// EntraIdentityClient against a local token endpoint
use actix_web::{web, App, HttpResponse, HttpServer};
use base64::{engine::general_purpose, Engine as _};
use entragate::identity::{
    credential::CLIENT_ASSERTION_TYPE, ClientCredential, EntraIdentityClient, IdentityClient,
    IdentityError,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;

type SeenForms = Mutex<Vec<HashMap<String, String>>>;

const REDIRECT_URI: &str = "http://localhost:8080/getAToken";

fn id_token(claims: &serde_json::Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// Token endpoint whose answer depends on the redeemed code
async fn token_endpoint(
    form: web::Form<HashMap<String, String>>,
    seen: web::Data<SeenForms>,
) -> HttpResponse {
    let form = form.into_inner();
    let code = form.get("code").cloned().unwrap_or_default();
    seen.lock().unwrap().push(form);

    match code.as_str() {
        "good" => HttpResponse::Ok().json(json!({
            "token_type": "Bearer",
            "scope": "User.Read openid profile",
            "expires_in": 3599,
            "access_token": "eyJ0eXAiOiJKV1QifQ.access.token",
            "id_token": id_token(&json!({"name": "Ada Lovelace", "oid": "oid-1"})),
        })),
        "no-id-token" => HttpResponse::Ok().json(json!({
            "token_type": "Bearer",
            "access_token": "access",
        })),
        "bad-id-token" => HttpResponse::Ok().json(json!({
            "access_token": "access",
            "id_token": "not-a-jwt",
        })),
        "garbage" => HttpResponse::Ok().body("<html>not json</html>"),
        _ => HttpResponse::BadRequest().json(json!({
            "error": "invalid_grant",
            "error_description": "AADSTS70008: The provided authorization code has expired.",
        })),
    }
}

/// Start the mock authority; returns its address and the forms it received
async fn start_authority() -> (SocketAddr, web::Data<SeenForms>, actix_web::dev::ServerHandle) {
    let seen = web::Data::new(SeenForms::default());
    let app_seen = seen.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_seen.clone())
            .route("/tenant/oauth2/v2.0/token", web::post().to(token_endpoint))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    (addr, seen, handle)
}

fn client(addr: SocketAddr, credential: ClientCredential) -> EntraIdentityClient {
    EntraIdentityClient::new("client-123", &format!("http://{addr}/tenant"), credential).unwrap()
}

fn scopes() -> Vec<String> {
    vec!["User.Read".to_string()]
}

#[actix_web::test]
async fn test_code_exchange_returns_id_token_claims() {
    let (addr, seen, handle) = start_authority().await;
    let client = client(addr, ClientCredential::Secret("s3cret".to_string()));

    let result = client
        .acquire_token_by_authorization_code("good", &scopes(), REDIRECT_URI)
        .await
        .unwrap();

    let claims = result.id_token_claims.unwrap();
    assert_eq!(claims["name"], "Ada Lovelace");
    assert_eq!(claims["oid"], "oid-1");
    assert_eq!(result.token_type.as_deref(), Some("Bearer"));
    assert!(result.expires_at > chrono::Utc::now());

    let forms = seen.lock().unwrap().clone();
    assert_eq!(forms.len(), 1);
    let form = &forms[0];
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["client_id"], "client-123");
    assert_eq!(form["client_secret"], "s3cret");
    assert_eq!(form["redirect_uri"], REDIRECT_URI);
    assert_eq!(form["scope"], "User.Read openid profile offline_access");
    assert!(!form.contains_key("client_assertion"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_assertion_file_credential_is_sent() {
    let (addr, seen, handle) = start_authority().await;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"federated.jwt.token\n").unwrap();

    let client = client(addr, ClientCredential::AssertionFile(file.path().to_path_buf()));
    client
        .acquire_token_by_authorization_code("good", &scopes(), REDIRECT_URI)
        .await
        .unwrap();

    let form = seen.lock().unwrap()[0].clone();
    assert_eq!(form["client_assertion_type"], CLIENT_ASSERTION_TYPE);
    assert_eq!(form["client_assertion"], "federated.jwt.token");
    assert!(!form.contains_key("client_secret"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_rejected_code_maps_to_token_endpoint_error() {
    let (addr, _seen, handle) = start_authority().await;
    let client = client(addr, ClientCredential::Secret("s".to_string()));

    let err = client
        .acquire_token_by_authorization_code("expired", &scopes(), REDIRECT_URI)
        .await
        .unwrap_err();

    match err {
        IdentityError::TokenEndpoint {
            status,
            error,
            description,
        } => {
            assert_eq!(status, 400);
            assert_eq!(error, "invalid_grant");
            assert!(description.starts_with("AADSTS70008"));
        }
        other => panic!("unexpected error: {other}"),
    }

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_response_without_id_token_has_no_claims() {
    let (addr, _seen, handle) = start_authority().await;
    let client = client(addr, ClientCredential::Secret("s".to_string()));

    let result = client
        .acquire_token_by_authorization_code("no-id-token", &scopes(), REDIRECT_URI)
        .await
        .unwrap();

    assert!(result.id_token.is_none());
    assert!(result.id_token_claims.is_none());
    assert_eq!(result.access_token.as_deref(), Some("access"));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_malformed_responses_are_errors() {
    let (addr, _seen, handle) = start_authority().await;
    let client = client(addr, ClientCredential::Secret("s".to_string()));

    let err = client
        .acquire_token_by_authorization_code("garbage", &scopes(), REDIRECT_URI)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::InvalidResponse(_)));

    let err = client
        .acquire_token_by_authorization_code("bad-id-token", &scopes(), REDIRECT_URI)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::IdToken(_)));

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_missing_assertion_file_fails_before_request() {
    let (addr, seen, handle) = start_authority().await;
    let client = client(
        addr,
        ClientCredential::AssertionFile("/nonexistent/entragate/token".into()),
    );

    let err = client
        .acquire_token_by_authorization_code("good", &scopes(), REDIRECT_URI)
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::Credential(_)));
    assert!(seen.lock().unwrap().is_empty());

    handle.stop(true).await;
}

#[actix_web::test]
async fn test_unreachable_authority_is_network_error() {
    // Bind and drop a listener to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = EntraIdentityClient::new(
        "client-123",
        &format!("http://127.0.0.1:{port}/tenant"),
        ClientCredential::Secret("s".to_string()),
    )
    .unwrap();

    let err = client
        .acquire_token_by_authorization_code("good", &scopes(), REDIRECT_URI)
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::Network(_)));
}
