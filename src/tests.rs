//! Integration tests for the Absensi backend.

use std::sync::Arc;

use reqwest::{redirect::Policy, Client};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::{IdentityResolver, TokenResolver};
use crate::config::UserToken;
use crate::dashboard::PageSessions;
use crate::db::{init_database, Repository, Store};
use crate::{create_router, AppState};

const TOKEN: &str = "test-api-key";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    /// Sends no token and does not follow redirects.
    anonymous: Client,
    /// Sends the token but does not follow redirects.
    pages: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_tokens(vec![UserToken {
            user: "admin".to_string(),
            token: TOKEN.to_string(),
        }])
        .await
    }

    async fn with_tokens(tokens: Vec<UserToken>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let store: Arc<dyn Store> = Arc::new(Repository::new(pool));
        let identity: Arc<dyn IdentityResolver> = Arc::new(TokenResolver::new(tokens));

        let state = AppState {
            store,
            sessions: Arc::new(PageSessions::new()),
            identity,
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-api-key", TOKEN.parse().unwrap());

        TestFixture {
            client: Client::builder()
                .default_headers(headers.clone())
                .build()
                .unwrap(),
            pages: Client::builder()
                .default_headers(headers)
                .redirect(Policy::none())
                .build()
                .unwrap(),
            anonymous: Client::builder().redirect(Policy::none()).build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn create_member(&self, name: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/members",
                json!({
                    "name": name,
                    "birthplace": "Jakarta",
                    "birth_date": "1990-01-01",
                    "gender": "male",
                    "role_category": "administrator"
                }),
            )
            .await;
        assert_eq!(status, 200, "create member failed: {}", body);
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .anonymous
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_api_requires_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/members"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/members"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture
        .anonymous
        .get(fixture.url("/api/members"))
        .header("Authorization", format!("Bearer {}", TOKEN))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_dashboard_redirects_to_login() {
    let fixture = TestFixture::new().await;

    for path in ["/dashboard", "/dashboard/absensi"] {
        let resp = fixture
            .anonymous
            .get(fixture.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 303, "{} should redirect", path);
        assert_eq!(resp.headers()["location"], "/login");
    }

    let resp = fixture
        .anonymous
        .get(fixture.url("/login"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_dev_mode_allows_anonymous() {
    let fixture = TestFixture::with_tokens(Vec::new()).await;

    let resp = fixture
        .anonymous
        .get(fixture.url("/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_member_crud() {
    let fixture = TestFixture::new().await;

    let zaid = fixture.create_member("Zaid").await;
    let ahmad = fixture.create_member("Ahmad").await;
    assert_ne!(zaid["id"], ahmad["id"]);
    assert_eq!(ahmad["gender"], "male");
    assert!(ahmad["created_at"].is_string());

    // Listed by name
    let (_, body) = fixture.get("/api/members").await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ahmad", "Zaid"]);

    // Update keeps identity; source terms are accepted
    let id = ahmad["id"].as_str().unwrap();
    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/members/{}", id)))
        .json(&json!({
            "name": "Ahmad Fauzi",
            "birthplace": "Bogor",
            "birth_date": "1990-01-01",
            "gender": "Laki-laki",
            "role_category": "rokyah"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["name"], "Ahmad Fauzi");
    assert_eq!(body["data"]["role_category"], "chaplain");

    // Delete needs confirmation
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/members/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/members/{}?confirm=true", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, body) = fixture.get(&format!("/api/members/{}", id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/members",
            json!({ "name": "", "birthplace": "Jakarta", "birth_date": "1990-01-01" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Name is required");

    let member = fixture.create_member("Ahmad").await;
    let (status, body) = fixture
        .post(
            "/api/attendance",
            json!({
                "member_id": member["id"],
                "date": "2024-01-01",
                "status": "absent",
                "reason": ""
            }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = fixture.get("/api/attendance?date=2024-01-01").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_ahmad_attendance_scenario() {
    let fixture = TestFixture::new().await;
    let member = fixture.create_member("Ahmad").await;

    let (status, body) = fixture
        .post(
            "/api/attendance",
            json!({ "member_id": member["id"], "date": "2024-01-01", "status": "hadir" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "present");
    assert_eq!(body["data"]["member"]["name"], "Ahmad");

    let (status, body) = fixture
        .post(
            "/api/attendance",
            json!({ "member_id": member["id"], "date": "2024-01-01", "status": "late" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "DUPLICATE_ATTENDANCE");

    let (_, body) = fixture.get("/api/attendance?date=2024-01-01").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = fixture.get("/api/attendance/stats?date=2024-01-01").await;
    assert_eq!(body["data"]["present"], 1);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_attendance_unknown_member() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/attendance",
            json!({ "member_id": "no-such-member", "date": "2024-01-01" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_attendance_edit_and_cascade() {
    let fixture = TestFixture::new().await;
    let member = fixture.create_member("Ahmad").await;
    let member_id = member["id"].as_str().unwrap();

    let (_, body) = fixture
        .post(
            "/api/attendance",
            json!({ "member_id": member_id, "date": "2024-01-01" }),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/attendance/{}", id)))
        .json(&json!({ "status": "ijin", "reason": "Sakit" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["status"], "excused");
    assert_eq!(body["data"]["reason"], "Sakit");

    let resp = fixture
        .client
        .put(fixture.url(&format!("/api/attendance/{}", id)))
        .json(&json!({ "status": "late", "date": "2024-02-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/members/{}?confirm=true", member_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = fixture.get(&format!("/api/attendance/{}", id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_member_page_flow() {
    let fixture = TestFixture::new().await;

    let (status, page) = fixture.get("/dashboard").await;
    assert_eq!(status, 200);
    assert_eq!(page["data"]["total"], 0);
    assert!(page["data"]["empty_message"].is_string());

    let (_, page) = fixture.post("/dashboard/members/new", json!({})).await;
    assert_eq!(page["data"]["dialog"]["mode"], "create");
    assert_eq!(page["data"]["dialog"]["form"]["gender"], "male");

    let (_, page) = fixture
        .post(
            "/dashboard/members/dialog/submit",
            json!({
                "name": "Siti",
                "birthplace": "Bandung",
                "birth_date": "1995-06-15",
                "gender": "Perempuan",
                "role_category": "pengurus"
            }),
        )
        .await;
    assert_eq!(page["data"]["total"], 1);
    assert!(page["data"]["dialog"].is_null());
    assert_eq!(page["data"]["rows"][0]["birth"], "Bandung, 15 Juni 1995");
    assert_eq!(page["data"]["rows"][0]["gender"], "Perempuan");

    let id = page["data"]["rows"][0]["id"].as_str().unwrap().to_string();

    // Confirm without a request does nothing
    let (status, _) = fixture.post("/dashboard/members/delete/confirm", json!({})).await;
    assert_eq!(status, 400);

    let (_, page) = fixture
        .post(&format!("/dashboard/members/{}/delete", id), json!({}))
        .await;
    assert_eq!(page["data"]["pending_delete"], id.as_str());

    let (_, page) = fixture.post("/dashboard/members/delete/confirm", json!({})).await;
    assert_eq!(page["data"]["total"], 0);

    let (_, body) = fixture.get("/api/members").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_attendance_page_flow() {
    let fixture = TestFixture::new().await;
    let ahmad = fixture.create_member("Ahmad").await;
    let budi = fixture.create_member("Budi").await;

    let (status, page) = fixture.get("/dashboard/absensi?date=2024-01-01").await;
    assert_eq!(status, 200);
    assert_eq!(page["data"]["date"], "2024-01-01");
    assert_eq!(page["data"]["member_options"].as_array().unwrap().len(), 2);

    fixture.post("/dashboard/absensi/new", json!({})).await;
    let (_, page) = fixture
        .post(
            "/dashboard/absensi/dialog/submit",
            json!({ "member_id": ahmad["id"], "status": "present" }),
        )
        .await;
    assert_eq!(page["data"]["stats"]["total"], 1);

    fixture.post("/dashboard/absensi/new", json!({})).await;
    let (_, page) = fixture
        .post(
            "/dashboard/absensi/dialog/submit",
            json!({ "member_id": budi["id"], "status": "absent", "reason": "" }),
        )
        .await;
    assert_eq!(page["data"]["stats"]["total"], 1);
    assert!(page["data"]["dialog"]["error"].is_string());

    let (_, page) = fixture
        .post(
            "/dashboard/absensi/dialog/submit",
            json!({ "member_id": budi["id"], "status": "absent", "reason": "Sakit" }),
        )
        .await;
    let stats = &page["data"]["stats"];
    assert_eq!(stats["present"], 1);
    assert_eq!(stats["absent"], 1);
    assert_eq!(stats["total"], 2);
    assert_eq!(page["data"]["rows"][0]["member_name"], "Budi");
    assert_eq!(page["data"]["rows"][0]["status"], "Tidak Hadir");

    let (_, page) = fixture
        .post("/dashboard/absensi/date", json!({ "date": "2024-01-02" }))
        .await;
    assert_eq!(page["data"]["date"], "2024-01-02");
    assert_eq!(page["data"]["stats"]["total"], 0);
    assert_eq!(page["data"]["loading"], false);

    // Logout drops the page session
    let (_, page) = fixture.post("/dashboard/absensi/new", json!({})).await;
    assert_eq!(page["data"]["dialog"]["mode"], "create");
    fixture.get("/dashboard").await;
    let (_, page) = fixture.post("/dashboard/members/new", json!({})).await;
    assert_eq!(page["data"]["dialog"]["mode"], "create");

    let resp = fixture
        .pages
        .post(fixture.url("/dashboard/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 303);
    assert_eq!(resp.headers()["location"], "/login");

    let (status, page) = fixture.get("/dashboard").await;
    assert_eq!(status, 200);
    assert!(page["data"]["dialog"].is_null());
    let (_, page) = fixture.get("/dashboard/absensi?date=2024-01-01").await;
    assert!(page["data"]["dialog"].is_null());
    assert_eq!(page["data"]["stats"]["total"], 2);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let fixture = TestFixture::new().await;
    let bad_member = json!({
        "name": "Ahmad",
        "birthplace": "Jakarta",
        "birth_date": "1990-01-01",
        "gender": "other",
        "role_category": "administrator"
    });

    let (status, body) = fixture.post("/api/members", bad_member.clone()).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    fixture.get("/dashboard").await;
    fixture.post("/dashboard/members/new", json!({})).await;
    let (status, body) = fixture
        .post("/dashboard/members/dialog/submit", bad_member)
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture
        .post("/dashboard/absensi/dialog/submit", json!({ "status": "sleeping" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture.post("/dashboard/absensi/date", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (_, body) = fixture.get("/api/members").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
