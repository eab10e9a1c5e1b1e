// End-to-end login flow: mobile verify, authorization page, redirect
// interception and token exchange against a mock institution.
use canvas_login::api::mobile_verify::verify_client;
use canvas_login::oauth::token::refresh_access_token;
use canvas_login::testing::builders::TokenResponseBuilder;
use canvas_login::testing::fixtures::TestFixtures;
use canvas_login::{
    build_session, AuthorizationMethod, LoginError, NavigationDecision, WebLoginDriver,
    WebLoginFlow, WebLoginState,
};
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn base_url(server: &MockServer) -> Url {
    Url::parse(&server.uri()).unwrap()
}

#[tokio::test]
async fn manual_login_from_verify_to_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/mobile_verify.json"))
        .and(query_param("domain", "cgnu.edu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "authorized": true,
            "base_url": server.uri(),
            "client_id": "cgnu",
            "client_secret": "s"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=1234"))
        .and(body_string_contains("client_id=cgnu"))
        .and(body_string_contains("client_secret=s"))
        .respond_with(ResponseTemplate::new(200).set_body_json(TokenResponseBuilder::new().json()))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let credentials = verify_client(&http, &base_url(&server), "cgnu.edu")
        .await
        .unwrap();
    assert!(credentials.supports_manual_flow());

    let flow = WebLoginFlow::manual(&credentials, AuthorizationMethod::Normal).unwrap();
    let mut driver = WebLoginDriver::new(http, flow);

    let request = driver.start().unwrap();
    assert_eq!(request.url.path(), "/login/oauth2/auth");
    let query: std::collections::HashMap<String, String> = request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(query["client_id"], "cgnu");
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["redirect_uri"], "https://canvas/login");
    assert_eq!(query["mobile"], "1");

    // The login page bounces around before redirecting with the code.
    let about = Url::parse("about:blank").unwrap();
    assert_eq!(driver.on_navigation(&about), NavigationDecision::Cancel);
    let redirect = Url::parse("https://canvas/login?code=1234").unwrap();
    assert_eq!(driver.on_navigation(&redirect), NavigationDecision::Cancel);
    assert!(matches!(driver.state(), WebLoginState::Redirected { .. }));

    let session = driver.session().await.unwrap().unwrap();
    assert_eq!(session.access_token, "access-token");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-token"));
    assert_eq!(session.user_id, "1");
    assert_eq!(session.user_name, "Eve Everyone");
    assert_eq!(session.client_id.as_deref(), Some("cgnu"));
    assert_eq!(session.client_secret.as_deref(), Some("s"));
    assert!(!session.is_masquerading());
}

#[tokio::test]
async fn pkce_login_round_trip_sends_the_verifier() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code_verifier="))
        .and(body_string_contains("client_id=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(TokenResponseBuilder::new().json()))
        .expect(1)
        .mount(&server)
        .await;

    let flow = WebLoginFlow::pkce(
        base_url(&server),
        "1",
        AuthorizationMethod::Normal,
        canvas_login::oauth::PkceChallenge::default(),
    );
    let mut driver = WebLoginDriver::new(reqwest::Client::new(), flow);

    let request = driver.start().unwrap();
    let query: std::collections::HashMap<String, String> = request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(query["code_challenge_method"], "S256");
    assert!(!query["code_challenge"].is_empty());

    driver.on_navigation(&Url::parse("https://canvas/login?code=xyz").unwrap());
    let session = driver.session().await.unwrap().unwrap();
    // PKCE sessions hold no client secret for later refresh.
    assert_eq!(session.client_id.as_deref(), Some("1"));
    assert_eq!(session.client_secret, None);
}

#[tokio::test]
async fn masquerading_admin_yields_a_masquerade_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                TokenResponseBuilder::new()
                    .with_user("1", "Eve Everyone")
                    .masquerading_as("2", "Site Admin")
                    .json(),
            ),
        )
        .mount(&server)
        .await;

    let credentials = TestFixtures::client_credentials_for(server.uri().as_str());
    let flow = WebLoginFlow::manual(&credentials, AuthorizationMethod::Normal).unwrap();
    let mut driver = WebLoginDriver::new(reqwest::Client::new(), flow);
    driver.start().unwrap();
    driver.on_navigation(&Url::parse("https://canvas/login?code=1234").unwrap());

    let session = driver.session().await.unwrap().unwrap();
    assert!(session.is_masquerading());
    assert_eq!(session.user_id, "1");
    assert_eq!(session.original_user_id.as_deref(), Some("2"));
    let masquerade_url = session.masquerade_url.unwrap();
    assert_eq!(masquerade_url.path(), "/users/1");
}

#[tokio::test]
async fn access_denied_redirect_never_reaches_the_token_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth2/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let credentials = TestFixtures::client_credentials_for(server.uri().as_str());
    let flow = WebLoginFlow::manual(&credentials, AuthorizationMethod::Normal).unwrap();
    let mut driver = WebLoginDriver::new(reqwest::Client::new(), flow);
    driver.start().unwrap();

    let denied = Url::parse("https://canvas/login?error=access_denied").unwrap();
    assert_eq!(driver.on_navigation(&denied), NavigationDecision::Cancel);
    assert!(driver.session().await.is_none());
    assert_eq!(
        LoginError::AccessDenied.to_string(),
        "Authentication failed. Most likely the user denied the request for access."
    );
}

#[tokio::test]
async fn refresh_grant_renews_the_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1234"))
        .and(body_string_contains("client_id=cgnu"))
        .and(body_string_contains("client_secret=s"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                TokenResponseBuilder::new()
                    .with_access_token("renewed")
                    .json(),
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let flow = TestFixtures::manual_flow(server.uri().as_str());
    let http = reqwest::Client::new();
    let token = refresh_access_token(&http, &flow, "1234").await.unwrap();
    let session = build_session(&token, &flow);
    assert_eq!(session.access_token, "renewed");
    assert!(!session.is_expired());
}

#[tokio::test]
async fn unauthorized_domain_cannot_start_a_manual_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/mobile_verify.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"authorized": false})),
        )
        .mount(&server)
        .await;

    let http = reqwest::Client::new();
    let credentials = verify_client(&http, &base_url(&server), "unknown.edu")
        .await
        .unwrap();
    assert!(matches!(
        WebLoginFlow::manual(&credentials, AuthorizationMethod::Normal),
        Err(LoginError::InvalidDomain)
    ));
}
