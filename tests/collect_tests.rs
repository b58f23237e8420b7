//! Integration tests for the collection engine
//!
//! These tests use wiremock to simulate the remote API and tempfile-backed
//! stores to exercise the full fetch-persist-checkpoint cycle end-to-end:
//! resume semantics, failure isolation, durability ordering, and the
//! end-of-run summary.

use hublens::client::MetricsRecord;
use hublens::collector::{collect, Engine};
use hublens::config::{ApiConfig, CollectorConfig, Config, InputConfig, OutputConfig};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, dir: &TempDir) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            token: Some("test-token".to_string()),
        },
        input: InputConfig {
            usernames_path: dir
                .path()
                .join("usernames.txt")
                .to_string_lossy()
                .into_owned(),
        },
        output: OutputConfig {
            results_path: dir
                .path()
                .join("user_results.jsonl")
                .to_string_lossy()
                .into_owned(),
            checkpoint_path: dir
                .path()
                .join("completed_usernames.txt")
                .to_string_lossy()
                .into_owned(),
        },
        collector: CollectorConfig {
            max_retries: 0,
            per_page: 100,
            checkpoint_not_found: false,
        },
    }
}

/// Everything the mock API needs to serve one healthy user
struct UserFixture {
    username: &'static str,
    name: &'static str,
    public_repos: u64,
    followers: u64,
    following: u64,
    organizations: Vec<&'static str>,
    starred_repos: u64,
    total_public_prs: u64,
    total_public_issues: u64,
    total_public_commits: u64,
}

impl UserFixture {
    fn simple(username: &'static str) -> Self {
        Self {
            username,
            name: "Test User",
            public_repos: 1,
            followers: 2,
            following: 3,
            organizations: vec![],
            starred_repos: 0,
            total_public_prs: 4,
            total_public_issues: 5,
            total_public_commits: 6,
        }
    }
}

/// Mounts success responses for every endpoint one user's fetch touches
async fn mount_user(server: &MockServer, fixture: &UserFixture) {
    let username = fixture.username;

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", username)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": username,
            "name": fixture.name,
            "public_repos": fixture.public_repos,
            "followers": fixture.followers,
            "following": fixture.following,
        })))
        .mount(server)
        .await;

    let orgs: Vec<serde_json::Value> = fixture
        .organizations
        .iter()
        .map(|login| json!({"login": login}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/users/{}/orgs", username)))
        .respond_with(ResponseTemplate::new(200).set_body_json(orgs))
        .mount(server)
        .await;

    // Multi-page starred counts are reported through the Link header;
    // single-page counts fall back to the body length
    let starred_path = format!("/users/{}/starred", username);
    if fixture.starred_repos > 1 {
        let link = format!(
            r#"<{0}{1}?per_page=1&page={2}>; rel="last""#,
            server.uri(),
            starred_path,
            fixture.starred_repos
        );
        Mock::given(method("GET"))
            .and(path(starred_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 1}]))
                    .insert_header("link", link.as_str()),
            )
            .mount(server)
            .await;
    } else {
        let body: Vec<serde_json::Value> =
            (0..fixture.starred_repos).map(|id| json!({"id": id})).collect();
        Mock::given(method("GET"))
            .and(path(starred_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", format!("type:pr author:{}", username)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_count": fixture.total_public_prs})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", format!("type:issue author:{}", username)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_count": fixture.total_public_issues})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/commits"))
        .and(query_param("q", format!("author:{}", username)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"total_count": fixture.total_public_commits})),
        )
        .mount(server)
        .await;
}

fn read_result_lines(config: &Config) -> Vec<MetricsRecord> {
    std::fs::read_to_string(&config.output.results_path)
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
        .collect()
}

fn read_checkpoint(config: &Config) -> Vec<String> {
    std::fs::read_to_string(&config.output.checkpoint_path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_end_to_end_single_user() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    mount_user(
        &server,
        &UserFixture {
            username: "zkoppert",
            name: "Zack Koppert",
            public_repos: 65,
            followers: 340,
            following: 81,
            organizations: vec!["github", "InnerSourceCommons"],
            starred_repos: 178,
            total_public_prs: 888,
            total_public_issues: 287,
            total_public_commits: 4666,
        },
    )
    .await;

    std::fs::write(&config.input.usernames_path, "zkoppert\n").unwrap();

    let summary = collect(&config, false).await.expect("Run failed");
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    // Exactly one JSON line with exactly the expected fields
    let content = std::fs::read_to_string(&config.output.results_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(
        record,
        json!({
            "username": "zkoppert",
            "name": "Zack Koppert",
            "public_repos": 65,
            "followers": 340,
            "following": 81,
            "organizations": ["github", "InnerSourceCommons"],
            "starred_repos": 178,
            "total_public_prs": 888,
            "total_public_issues": 287,
            "total_public_commits": 4666,
        })
    );

    assert_eq!(
        std::fs::read_to_string(&config.output.checkpoint_path).unwrap(),
        "zkoppert\n"
    );
}

#[tokio::test]
async fn test_resume_skips_checkpointed_usernames() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    // usera and userb are already done; only userc may be fetched
    std::fs::write(&config.output.checkpoint_path, "usera\nuserb\n").unwrap();

    Mock::given(method("GET"))
        .and(path("/users/usera"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/userb"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_user(&server, &UserFixture::simple("userc")).await;

    let usernames: Vec<String> = ["usera", "userb", "userc"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let summary = engine.run(&usernames).await.expect("Run failed");

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);

    let records = read_result_lines(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username, "userc");
}

#[tokio::test]
async fn test_idempotent_across_runs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    mount_user(&server, &UserFixture::simple("userc")).await;
    let usernames = vec!["userc".to_string()];

    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let first = engine.run(&usernames).await.expect("First run failed");
    assert_eq!(first.processed, 1);
    drop(engine);

    // A second run over the same list fetches nothing new
    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let second = engine.run(&usernames).await.expect("Second run failed");
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 1);

    assert_eq!(read_result_lines(&config).len(), 1);
}

#[tokio::test]
async fn test_not_found_is_isolated_and_not_checkpointed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    mount_user(&server, &UserFixture::simple("usera")).await;
    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    mount_user(&server, &UserFixture::simple("userc")).await;

    let usernames: Vec<String> = ["usera", "ghost", "userc"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let summary = engine.run(&usernames).await.expect("Run failed");

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);

    let usernames_out: Vec<String> = read_result_lines(&config)
        .into_iter()
        .map(|record| record.username)
        .collect();
    assert_eq!(usernames_out, vec!["usera", "userc"]);

    // ghost stays un-checkpointed so the next run retries it
    assert_eq!(read_checkpoint(&config), vec!["usera", "userc"]);
}

#[tokio::test]
async fn test_not_found_checkpointed_when_configured() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri(), &dir);
    config.collector.checkpoint_not_found = true;

    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .expect(1)
        .mount(&server)
        .await;

    let usernames = vec!["ghost".to_string()];

    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let summary = engine.run(&usernames).await.expect("Run failed");
    assert_eq!(summary.failed, 1);
    assert_eq!(read_checkpoint(&config), vec!["ghost"]);
    drop(engine);

    // The next run skips the known-missing user instead of re-querying
    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let second = engine.run(&usernames).await.expect("Second run failed");
    assert_eq!(second.skipped, 1);
    assert_eq!(second.failed, 0);
}

#[tokio::test]
async fn test_transient_failure_is_isolated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    mount_user(&server, &UserFixture::simple("usera")).await;
    Mock::given(method("GET"))
        .and(path("/users/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_user(&server, &UserFixture::simple("userc")).await;

    let usernames: Vec<String> = ["usera", "flaky", "userc"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let summary = engine.run(&usernames).await.expect("Run failed");

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(read_checkpoint(&config), vec!["usera", "userc"]);
}

#[tokio::test]
async fn test_auth_failure_aborts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    mount_user(&server, &UserFixture::simple("usera")).await;
    Mock::given(method("GET"))
        .and(path("/users/userb"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;
    // A bad credential affects every user: the run must stop before userc
    Mock::given(method("GET"))
        .and(path("/users/userc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let usernames: Vec<String> = ["usera", "userb", "userc"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let result = engine.run(&usernames).await;
    assert!(result.is_err());

    // Work done before the abort is still durable
    assert_eq!(read_checkpoint(&config), vec!["usera"]);
    assert_eq!(read_result_lines(&config).len(), 1);
}

#[tokio::test]
async fn test_unchecked_record_is_refetched_not_lost() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    mount_user(&server, &UserFixture::simple("userx")).await;

    // Simulate a crash after the sink write but before the checkpoint
    // write: the record exists, the checkpoint entry does not.
    let stale = MetricsRecord {
        username: "userx".to_string(),
        name: "Test User".to_string(),
        public_repos: 1,
        followers: 2,
        following: 3,
        organizations: vec![],
        starred_repos: 0,
        total_public_prs: 4,
        total_public_issues: 5,
        total_public_commits: 6,
    };
    std::fs::write(
        &config.output.results_path,
        format!("{}\n", serde_json::to_string(&stale).unwrap()),
    )
    .unwrap();

    let usernames = vec!["userx".to_string()];
    let mut engine = Engine::new(&config, false).expect("Failed to create engine");
    let summary = engine.run(&usernames).await.expect("Run failed");

    // The user is re-fetched; the duplicate line is bounded to this one user
    assert_eq!(summary.processed, 1);
    let records = read_result_lines(&config);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.username == "userx"));
    assert_eq!(read_checkpoint(&config), vec!["userx"]);
}

#[tokio::test]
async fn test_fresh_run_discards_previous_output() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), &dir);

    std::fs::write(&config.output.checkpoint_path, "stale\n").unwrap();
    std::fs::write(&config.output.results_path, "{\"username\":\"stale\"}\n").unwrap();

    mount_user(&server, &UserFixture::simple("userc")).await;

    let usernames = vec!["userc".to_string()];
    let mut engine = Engine::new(&config, true).expect("Failed to create engine");
    let summary = engine.run(&usernames).await.expect("Run failed");

    assert_eq!(summary.processed, 1);
    assert_eq!(read_checkpoint(&config), vec!["userc"]);

    let records = read_result_lines(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username, "userc");
}
