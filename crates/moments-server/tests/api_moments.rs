use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use moments_db::{create_pool, DbRuntimeSettings};
use moments_server::config::MomentsConfig;
use moments_server::{app, AppState, API_PREFIX};
use moments_types::{
    counter_name, Counter, Metadata, Moment, MomentContent, MomentSpec, MomentVisibility, User,
};
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt; // for oneshot

fn moment(name: &str, owner: &str, release: &str, visible: MomentVisibility, tags: &[&str]) -> Moment {
    Moment {
        metadata: Metadata {
            name: name.to_string(),
            creation_timestamp: Some(release.to_string()),
            ..Metadata::default()
        },
        spec: MomentSpec {
            content: MomentContent {
                raw: Some(format!("<p>{name}</p>")),
                html: Some(format!("<p>{name}</p>")),
                medium: Vec::new(),
            },
            release_time: release.to_string(),
            visible,
            owner: owner.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            approved: true,
            approved_time: Some(release.to_string()),
        },
    }
}

/// Builds the router over a fresh database seeded with:
/// - `m1` alice public `[rust]`, 2024-01-01
/// - `m2` alice private `[rust, life]`, 2024-02-01
/// - `m3` bob public `[life]`, 2024-03-01
/// - `m4` bob public, unapproved
/// - `m5` bob public, deleted
fn setup(moments: MomentsConfig) -> (Router, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap();
    let pool = create_pool(db_path, DbRuntimeSettings::default()).unwrap();
    let conn = pool.get().unwrap();
    moments_db::run_migrations(&conn).unwrap();

    let mut unapproved = moment("m4", "bob", "2024-04-01T00:00:00.000Z", MomentVisibility::Public, &[]);
    unapproved.spec.approved = false;
    let mut deleted = moment("m5", "bob", "2024-05-01T00:00:00.000Z", MomentVisibility::Public, &[]);
    deleted.metadata.deletion_timestamp = Some("2024-05-02T00:00:00.000Z".to_string());

    for m in [
        moment("m1", "alice", "2024-01-01T00:00:00.000Z", MomentVisibility::Public, &["rust"]),
        moment("m2", "alice", "2024-02-01T00:00:00.000Z", MomentVisibility::Private, &["rust", "life"]),
        moment("m3", "bob", "2024-03-01T00:00:00.000Z", MomentVisibility::Public, &["life"]),
        unapproved,
        deleted,
    ] {
        moments_store::upsert_moment(&conn, &m).unwrap();
    }

    moments_store::upsert_user(
        &conn,
        &User {
            name: "alice".to_string(),
            display_name: "Alice".to_string(),
            avatar: Some("/avatars/alice.png".to_string()),
            ..User::default()
        },
    )
    .unwrap();
    moments_store::upsert_counter(
        &conn,
        &Counter {
            name: counter_name("m1"),
            upvote: 7,
            total_comment: 3,
            approved_comment: 2,
            ..Counter::default()
        },
    )
    .unwrap();
    drop(conn);

    (app(AppState::new(pool, &moments)), temp_file)
}

async fn get_json(app: Router, uri: &str, user: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(user) = user {
        request = request.header("X-Moments-User", user);
    }
    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn names(page: &Value) -> Vec<&str> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["metadata"]["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (app, _db) = setup(MomentsConfig::default());
    let (status, json) = get_json(app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn anonymous_listing_shows_public_moments_newest_first() {
    let (app, _db) = setup(MomentsConfig::default());
    let (status, page) = get_json(app, &format!("{API_PREFIX}/moments"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), vec!["m3", "m1"]);
    assert_eq!(page["total"], 2);
    assert_eq!(page["page"], 1);
    assert_eq!(page["size"], 10);
    assert_eq!(page["first"], true);
    assert_eq!(page["last"], true);
    assert_eq!(page["hasNext"], false);
}

#[tokio::test]
async fn owner_sees_own_private_moment() {
    let (app, _db) = setup(MomentsConfig::default());
    let (_, page) = get_json(app, &format!("{API_PREFIX}/moments"), Some("alice")).await;
    assert_eq!(names(&page), vec!["m3", "m2", "m1"]);

    let (app, _db) = setup(MomentsConfig::default());
    let (_, page) = get_json(app, &format!("{API_PREFIX}/moments"), Some("bob")).await;
    assert_eq!(names(&page), vec!["m3", "m1"], "bob is not a registered user");
}

#[tokio::test]
async fn bearer_token_identifies_the_viewer() {
    let (app, _db) = setup(MomentsConfig::default());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("{API_PREFIX}/moments?tag=life"))
                .header("Authorization", "Bearer alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let page: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(names(&page), vec!["m3", "m2"]);
}

#[tokio::test]
async fn unknown_user_is_served_as_anonymous() {
    let (app, _db) = setup(MomentsConfig::default());
    let (status, page) = get_json(app, &format!("{API_PREFIX}/moments"), Some("mallory")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&page), vec!["m3", "m1"]);
}

#[tokio::test]
async fn filters_combine_conjunctively() {
    let (app, _db) = setup(MomentsConfig::default());
    let uri = format!(
        "{API_PREFIX}/moments?ownerName=alice&tag=rust&startDate=2024-01-01T00:00:00Z&endDate=2024-02-01T00:00:00Z"
    );
    let (_, page) = get_json(app, &uri, Some("alice")).await;
    assert_eq!(names(&page), vec!["m2", "m1"], "date bounds are inclusive");

    let (app, _db) = setup(MomentsConfig::default());
    let uri = format!("{API_PREFIX}/moments?ownerName=bob&tag=rust");
    let (_, page) = get_json(app, &uri, None).await;
    assert!(names(&page).is_empty());
}

#[tokio::test]
async fn explicit_sort_and_pagination() {
    let (app, _db) = setup(MomentsConfig::default());
    let uri = format!("{API_PREFIX}/moments?sort=spec.releaseTime,asc&page=1&size=1");
    let (_, page) = get_json(app, &uri, None).await;
    assert_eq!(names(&page), vec!["m1"]);
    assert_eq!(page["total"], 2);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["hasNext"], true);

    let (app, _db) = setup(MomentsConfig::default());
    let uri = format!("{API_PREFIX}/moments?page=5&size=1");
    let (status, page) = get_json(app, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(names(&page).is_empty());
}

#[tokio::test]
async fn configured_default_page_size_applies() {
    let moments = MomentsConfig {
        default_page_size: 1,
        ..MomentsConfig::default()
    };
    let (app, _db) = setup(moments.clone());
    let (_, page) = get_json(app, &format!("{API_PREFIX}/moments"), None).await;
    assert_eq!(page["size"], 1);
    assert_eq!(names(&page), vec!["m3"]);

    let (app, _db) = setup(moments);
    let (_, page) = get_json(app, &format!("{API_PREFIX}/moments?size=0"), None).await;
    assert_eq!(page["size"], 1, "zero size falls back to the configured default");
    assert_eq!(names(&page), vec!["m3"]);
}

#[tokio::test]
async fn malformed_date_is_a_bad_request() {
    let (app, _db) = setup(MomentsConfig::default());
    let uri = format!("{API_PREFIX}/moments?startDate=yesterday");
    let (status, json) = get_json(app, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("startDate"));
}

#[tokio::test]
async fn get_moment_is_enriched() {
    let (app, _db) = setup(MomentsConfig::default());
    let (status, view) = get_json(app, &format!("{API_PREFIX}/moments/m1"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["metadata"]["name"], "m1");
    assert_eq!(view["stats"]["upvote"], 7);
    assert_eq!(view["stats"]["totalComment"], 3);
    assert_eq!(view["stats"]["approvedComment"], 2);
    assert_eq!(view["owner"]["displayName"], "Alice");
}

#[tokio::test]
async fn hidden_moments_are_not_found() {
    for (name, user) in [("m2", None), ("m4", Some("alice")), ("m5", None), ("nope", None)] {
        let (app, _db) = setup(MomentsConfig::default());
        let (status, json) = get_json(app, &format!("{API_PREFIX}/moments/{name}"), user).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{name}");
        assert_eq!(json["error"], "Moment not found");
    }

    let (app, _db) = setup(MomentsConfig::default());
    let (status, view) = get_json(app, &format!("{API_PREFIX}/moments/m2"), Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["owner"].is_object());
    assert_eq!(view["stats"]["upvote"], 0, "missing counter reads as zero");
}

#[tokio::test]
async fn tag_summaries_count_visible_moments() {
    let (app, _db) = setup(MomentsConfig::default());
    let (status, tags) = get_json(app, &format!("{API_PREFIX}/moments/-/tags"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        tags,
        serde_json::json!([
            {"name": "life", "momentCount": 1, "permalink": "/moments?tag=life"},
            {"name": "rust", "momentCount": 1, "permalink": "/moments?tag=rust"},
        ])
    );

    let (app, _db) = setup(MomentsConfig::default());
    let (_, tags) = get_json(app, &format!("{API_PREFIX}/moments/-/tags"), Some("alice")).await;
    assert_eq!(tags[0]["momentCount"], 2);
    assert_eq!(tags[1]["momentCount"], 2);
}
