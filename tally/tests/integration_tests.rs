use clap::Parser;
use serde_json::json;
use tally::{App, Cli};
use tally_auth::{LoginEmailStore, Settings};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(server: &MockServer, dir: &tempfile::TempDir, args: &[&str]) -> App {
    let cli = Cli::try_parse_from(std::iter::once("tally").chain(args.iter().copied())).unwrap();
    let settings = Settings {
        api_url: server.uri(),
        email: Some("owner@example.com".to_string()),
        password: Some("pw".into()),
        ..Settings::default()
    };
    App::with_parts(cli, settings, LoginEmailStore::in_dir(dir.path())).unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "tok1"})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_logout(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sales_list_for_explicit_store() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_logout(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/stores/3/sales-records"))
        .and(header("Authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"id": 7, "date": "2025-03-02", "hall": 4000, "totalSales": 4000}],
            "totalElements": 1,
            "totalPages": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &dir, &["--store", "3", "--remember", "sales", "list"]);
    let value = app.execute().await.unwrap();

    assert_eq!(value["content"][0]["id"], 7);
    assert_eq!(value["content"][0]["hall"], 4000);
    assert_eq!(
        LoginEmailStore::in_dir(dir.path()).load().unwrap().as_deref(),
        Some("owner@example.com")
    );
    assert!(!app.client().session().has_token());
}

#[tokio::test]
async fn test_delivery_defaults_to_first_store() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_logout(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "name": "김사장",
            "email": "owner@example.com",
            "authProvider": "LOCAL",
            "storeList": [{"id": 9, "storeName": "Tally Chicken", "businessType": "RESTAURANT"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stores/9/delivery-platforms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "beaminEnabled": true,
            "beaminCommissionRate": 6.8
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let value = app(&server, &dir, &["delivery", "show"])
        .execute()
        .await
        .unwrap();

    assert_eq!(value["storeId"], 9);
    assert_eq!(
        value["enabled"],
        json!([{"platform": "beamin", "commissionRate": 6.8}])
    );
}

#[tokio::test]
async fn test_failed_reissue_sends_user_back_to_login() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_logout(&server, 0).await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/reissue"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"details": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &dir, &["me"]);
    let err = app.execute().await.unwrap_err();

    let notice = app.session_expired_notice(&err).unwrap();
    assert!(notice.contains("log in again"));
    assert!(notice.contains("/login"));
    assert!(!app.client().session().has_token());
}

#[tokio::test]
async fn test_other_errors_are_not_session_loss() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_logout(&server, 1).await;
    Mock::given(method("DELETE"))
        .and(path("/expense-records/5"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"details": "not your store"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = app(&server, &dir, &["--store", "1", "expenses", "delete", "5"]);
    let err = app.execute().await.unwrap_err();

    assert!(app.session_expired_notice(&err).is_none());
    assert!(format!("{:#}", err).contains("not your store"));
}

#[tokio::test]
async fn test_stats_keep_server_period_order() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_logout(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/stores/3/stats/sales-expense/monthly"))
        .and(wiremock::matchers::query_param("year", "2025"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{
                "salesSummary": {"1월": 100000, "2월": 200000, "10월": 300000, "총계": 600000},
                "expenseSummary": {"1월": 50000, "10월": 100000, "총계": 150000}
            }"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = app(
        &server,
        &dir,
        &["--store", "3", "stats", "sales-expense", "--year", "2025"],
    );
    let value = app.execute().await.unwrap();

    let sales_labels: Vec<&str> = value["salesSummary"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(sales_labels, ["1월", "2월", "10월", "총계"]);

    let profit: Vec<(&str, i64)> = value["profit"]
        .as_object()
        .unwrap()
        .iter()
        .map(|(label, amount)| (label.as_str(), amount.as_i64().unwrap()))
        .collect();
    assert_eq!(
        profit,
        [("1월", 50000), ("2월", 200000), ("10월", 200000)]
    );

    let printed = serde_json::to_string(&value["salesSummary"]).unwrap();
    assert!(printed.find("2월").unwrap() < printed.find("10월").unwrap());
}
