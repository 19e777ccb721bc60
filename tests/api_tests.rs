use bountiful_api::{
    AppConfig, AppState, MockIdentityProvider, create_router,
    store::{Body, Collection, DocumentStore, MemoryStore},
};
use reqwest::{Response, redirect};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        identity: Arc::new(MockIdentityProvider::new("octocat")),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are asserted on, not followed.
    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        store,
        client,
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn seed_user(&self, user_name: &str, git_name: &str, access_level: &str) {
        let doc: Body = json!({
            "firstName": "Seeded",
            "email": format!("{user_name}@example.org"),
            "userName": user_name,
            "password": "hash",
            "accessLevel": access_level,
            "accountModified": "10/19/2026",
            "gitName": git_name
        })
        .as_object()
        .cloned()
        .unwrap();
        self.store.insert_one(Collection::Users, doc).await.unwrap();
    }
}

/// Value of cookie `name` from the response's `Set-Cookie` headers.
fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

fn location(response: &Response) -> &str {
    response.headers()["location"].to_str().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_github_login_flow() {
    let app = spawn_app().await;

    // 1. Login redirect parks the state in a cookie.
    let response = app.client.get(app.url("/auth/github")).send().await.unwrap();
    assert_eq!(response.status(), 303);
    let state = set_cookie(&response, "oauth_state").expect("state cookie");

    // 2. Callback signs the caller in and sends them to the role lookup.
    let response = app
        .client
        .get(app.url(&format!("/auth/github/callback?code=abc&state={state}")))
        .header("cookie", format!("oauth_state={state}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/users/checkAdmin/octocat");
    let session = set_cookie(&response, "bountiful_session").expect("session cookie");

    let me: Value = app
        .client
        .get(app.url("/users/me"))
        .header("cookie", format!("bountiful_session={session}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["isLoggedIn"], true);
    assert_eq!(me["username"], "octocat");
    assert_eq!(me["accessLevel"], Value::Null);

    // 3. No stored user has gitName "octocat": the role defaults to `user`.
    let response = app
        .client
        .get(app.url("/users/checkAdmin/octocat"))
        .header("cookie", format!("bountiful_session={session}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/swagger-ui");
    let session = set_cookie(&response, "bountiful_session").unwrap();

    let me: Value = app
        .client
        .get(app.url("/users/me"))
        .header("cookie", format!("bountiful_session={session}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["accessLevel"], "user");

    // A plain user still cannot write.
    let response = app
        .client
        .post(app.url("/characters/createNewCharacter"))
        .header("cookie", format!("bountiful_session={session}"))
        .json(&json!({
            "characterName": "Nephi",
            "firstBookSeen": "1 Nephi",
            "firstVerseSeen": "1:1",
            "quality": "Hero"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // 4. Logout clears the cookie.
    let response = app.client.get(app.url("/logout")).send().await.unwrap();
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
    assert_eq!(set_cookie(&response, "bountiful_session").as_deref(), Some(""));
}

#[tokio::test]
async fn test_check_admin_promotes_matching_git_name() {
    let app = spawn_app().await;
    app.seed_user("octocat01", "octocat", "admin").await;

    let response = app.client.get(app.url("/auth/github")).send().await.unwrap();
    let state = set_cookie(&response, "oauth_state").unwrap();
    let response = app
        .client
        .get(app.url(&format!("/auth/github/callback?code=abc&state={state}")))
        .header("cookie", format!("oauth_state={state}"))
        .send()
        .await
        .unwrap();
    let session = set_cookie(&response, "bountiful_session").unwrap();

    // Someone else's name is refused.
    let response = app
        .client
        .get(app.url("/users/checkAdmin/moroni"))
        .header("cookie", format!("bountiful_session={session}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = app
        .client
        .get(app.url("/users/checkAdmin/octocat"))
        .header("cookie", format!("bountiful_session={session}"))
        .send()
        .await
        .unwrap();
    let session = set_cookie(&response, "bountiful_session").unwrap();

    let response = app
        .client
        .get(app.url("/users/"))
        .header("cookie", format!("bountiful_session={session}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let users: Value = response.json().await.unwrap();
    assert_eq!(users[0]["userName"], "octocat01");
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn test_failed_exchange_stays_anonymous() {
    let store = Arc::new(MemoryStore::new());
    let router = create_router(AppState {
        store,
        identity: Arc::new(MockIdentityProvider::new_failing()),
        config: AppConfig::default(),
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    let client = reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .get(format!("{address}/auth/github/callback?code=abc&state=s1"))
        .header("cookie", "oauth_state=s1")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
    assert_eq!(set_cookie(&response, "bountiful_session"), None);
}

#[tokio::test]
async fn test_character_lifecycle() {
    let app = spawn_app().await;
    app.seed_user("moroni421", "moroni", "admin").await;

    // Create
    let response = app
        .client
        .post(app.url("/characters/createNewCharacter"))
        .header("x-user-name", "moroni421")
        .json(&json!({
            "characterName": "Nephi",
            "firstBookSeen": "1 Nephi",
            "firstVerseSeen": "1:1",
            "quality": "Hero",
            "notes": ""
        }))
        .send()
        .await
        .expect("post fail");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["acknowledged"], true);
    let id = created["insertedId"].as_str().unwrap().to_string();

    // Read back
    let found: Value = app
        .client
        .get(app.url(&format!("/characters/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        found,
        json!([{
            "_id": id,
            "characterName": "Nephi",
            "firstBookSeen": "1 Nephi",
            "firstVerseSeen": "1:1",
            "quality": "Hero",
            "notes": ""
        }])
    );

    // Filter miss
    let response = app
        .client
        .get(app.url("/characters/listByBook/Nonexistent%20Book"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "message": "No characters with the specified book were found." })
    );

    // Delete
    let response = app
        .client
        .delete(app.url(&format!("/characters/deleteCharacter/{id}")))
        .header("x-user-name", "moroni421")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
