mod common;

use alumni_connect::domain::models::{profile::{Academic, UserProfile}, user::Role};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{DateTime, Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;

fn event_body(title: &str, date: DateTime<Utc>) -> Value {
    json!({
        "title": title,
        "description": "Annual gathering",
        "date": date.to_rfc3339(),
        "venue": "Main Hall"
    })
}

async fn create_event(app: &TestApp, token: &str, title: &str, date: DateTime<Utc>) -> Value {
    app.request_json("POST", "/api/events", Some(token), Some(event_body(title, date)), StatusCode::CREATED).await
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let body = app.request_json("GET", "/health", None, None, StatusCode::OK).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_faculty_creates_event_owned_by_caller() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Rao").await;
    let token = app.token_for(&faculty).await;

    let mut body = event_body("Reunion", Utc::now() + Duration::days(3));
    body["createdBy"] = json!("someone-else");

    let created = app.request_json("POST", "/api/events", Some(&token), Some(body), StatusCode::CREATED).await;

    assert_eq!(created["title"], "Reunion");
    assert_eq!(created["venue"], "Main Hall");
    assert_eq!(created["createdBy"], faculty.id.as_str());
    assert_eq!(created["interestedUsers"], json!([]));
    assert!(created["id"].as_str().is_some());
    assert!(created["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn test_admin_can_create_event() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let token = app.token_for(&admin).await;

    let created = create_event(&app, &token, "Convocation", Utc::now() + Duration::days(10)).await;
    assert_eq!(created["createdBy"], admin.id.as_str());
}

#[tokio::test]
async fn test_alumni_cannot_create_event() {
    let app = TestApp::new().await;
    let alumni = app.seed_alumni("Asha").await;
    let token = app.token_for(&alumni).await;

    let res = app.request("POST", "/api/events", Some(&token), Some(event_body("Nope", Utc::now() + Duration::days(1)))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/events", None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.request("GET", "/api/events", Some("not-a-jwt"), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = common::parse_body(res).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_create_event_validation() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Iyer").await;
    let token = app.token_for(&faculty).await;

    let missing_title = json!({ "description": "d", "date": (Utc::now() + Duration::days(1)).to_rfc3339(), "venue": "v" });
    let res = app.request("POST", "/api/events", Some(&token), Some(missing_title)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::parse_body(res).await;
    assert_eq!(body["error"], "title is required");

    let blank_venue = json!({ "title": "t", "description": "d", "date": (Utc::now() + Duration::days(1)).to_rfc3339(), "venue": "   " });
    let res = app.request("POST", "/api/events", Some(&token), Some(blank_venue)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let bad_date = json!({ "title": "t", "description": "d", "date": "next tuesday", "venue": "v" });
    let res = app.request("POST", "/api/events", Some(&token), Some(bad_date)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let no_date = json!({ "title": "t", "description": "d", "venue": "v" });
    let res = app.request("POST", "/api/events", Some(&token), Some(no_date)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_datetime_local_input_is_accepted_as_utc() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Menon").await;
    let token = app.token_for(&faculty).await;

    let year = Utc::now().format("%Y").to_string().parse::<i32>().unwrap() + 1;
    let body = json!({ "title": "Meetup", "description": "d", "date": format!("{}-06-15T18:30", year), "venue": "Cafe" });

    let created = app.request_json("POST", "/api/events", Some(&token), Some(body), StatusCode::CREATED).await;
    let date: DateTime<Utc> = created["date"].as_str().unwrap().parse().unwrap();
    assert_eq!(date.format("%Y-%m-%dT%H:%M").to_string(), format!("{}-06-15T18:30", year));
}

#[tokio::test]
async fn test_listing_expands_creator_and_sorts_by_date() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Kapoor").await;
    let alumni = app.seed_alumni("Ravi").await;
    let f_token = app.token_for(&faculty).await;
    let a_token = app.token_for(&alumni).await;

    create_event(&app, &f_token, "Later", Utc::now() + Duration::days(20)).await;
    create_event(&app, &f_token, "Sooner", Utc::now() + Duration::days(2)).await;
    create_event(&app, &f_token, "Middle", Utc::now() + Duration::days(7)).await;

    let listing = app.request_json("GET", "/api/events", Some(&a_token), None, StatusCode::OK).await;
    let titles: Vec<&str> = listing.as_array().unwrap().iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Sooner", "Middle", "Later"]);

    let creator = &listing[0]["createdBy"];
    assert_eq!(creator["id"], faculty.id.as_str());
    assert_eq!(creator["name"], "Dr Kapoor");
    assert_eq!(creator["email"], faculty.email.as_str());
    assert_eq!(creator["role"], "faculty");
    assert_eq!(creator["department"], "Computer Science");
    assert!(creator.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_listing_prunes_past_events() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Bose").await;
    let token = app.token_for(&faculty).await;

    // Past dates are accepted at creation.
    let past = create_event(&app, &token, "Yesterday", Utc::now() - Duration::days(1)).await;
    create_event(&app, &token, "Tomorrow", Utc::now() + Duration::days(1)).await;

    let past_id = past["id"].as_str().unwrap();
    app.request_json("GET", &format!("/api/events/{}", past_id), Some(&token), None, StatusCode::OK).await;

    let listing = app.request_json("GET", "/api/events", Some(&token), None, StatusCode::OK).await;
    let titles: Vec<&str> = listing.as_array().unwrap().iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Tomorrow"]);

    let res = app.request("GET", &format!("/api/events/{}", past_id), Some(&token), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_without_pruning_keeps_past_events_stored() {
    let app = TestApp::with_prune_on_list(false).await;
    let faculty = app.seed_faculty("Dr Sen").await;
    let token = app.token_for(&faculty).await;

    let past = create_event(&app, &token, "Last week", Utc::now() - Duration::days(7)).await;

    let listing = app.request_json("GET", "/api/events", Some(&token), None, StatusCode::OK).await;
    assert_eq!(listing, json!([]));

    let fetched = app.request_json("GET", &format!("/api/events/{}", past["id"].as_str().unwrap()), Some(&token), None, StatusCode::OK).await;
    assert_eq!(fetched["title"], "Last week");
}

#[tokio::test]
async fn test_events_of_deleted_creator_are_hidden_but_kept() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let faculty = app.seed_faculty("Dr Gone").await;
    let admin_token = app.token_for(&admin).await;
    let f_token = app.token_for(&faculty).await;

    let orphan = create_event(&app, &f_token, "Orphan", Utc::now() + Duration::days(4)).await;
    create_event(&app, &admin_token, "Kept", Utc::now() + Duration::days(5)).await;

    app.request_json("DELETE", &format!("/api/admin/remove-faculty/{}", faculty.id), Some(&admin_token), None, StatusCode::OK).await;

    let listing = app.request_json("GET", "/api/events", Some(&admin_token), None, StatusCode::OK).await;
    let titles: Vec<&str> = listing.as_array().unwrap().iter().map(|e| e["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Kept"]);

    let fetched = app.request_json("GET", &format!("/api/events/{}", orphan["id"].as_str().unwrap()), Some(&admin_token), None, StatusCode::OK).await;
    assert_eq!(fetched["createdBy"], faculty.id.as_str());
}

#[tokio::test]
async fn test_malformed_event_body_is_a_validation_error() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Typo").await;
    let token = app.token_for(&faculty).await;

    let mut body = event_body("Epoch", Utc::now() + Duration::days(1));
    body["date"] = json!(1893456000000i64);
    let res = app.request("POST", "/api/events", Some(&token), Some(body)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::parse_body(res).await;
    assert!(body["error"].as_str().unwrap().contains("date"), "{}", body);

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/events")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap(),
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(common::parse_body(res).await["error"].as_str().is_some());
}

#[tokio::test]
async fn test_get_unknown_event_is_not_found() {
    let app = TestApp::new().await;
    let alumni = app.seed_alumni("Nina").await;
    let token = app.token_for(&alumni).await;

    let res = app.request("GET", "/api/events/does-not-exist", Some(&token), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = common::parse_body(res).await;
    assert_eq!(body["error"], "Event not found");
}

#[tokio::test]
async fn test_update_authorization_and_merge() {
    let app = TestApp::new().await;
    let owner = app.seed_faculty("Dr Owner").await;
    let other = app.seed_faculty("Dr Other").await;
    let admin = app.seed_admin().await;
    let alumni = app.seed_alumni("Arun").await;

    let owner_token = app.token_for(&owner).await;
    let created = create_event(&app, &owner_token, "Original", Utc::now() + Duration::days(3)).await;
    let uri = format!("/api/events/{}", created["id"].as_str().unwrap());

    let other_token = app.token_for(&other).await;
    let res = app.request("PUT", &uri, Some(&other_token), Some(json!({ "title": "Hijack" }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let alumni_token = app.token_for(&alumni).await;
    let res = app.request("PUT", &uri, Some(&alumni_token), Some(json!({ "title": "Hijack", "venue": "Basement" }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Rejected updates leave the stored event untouched.
    let stored = app.request_json("GET", &uri, Some(&owner_token), None, StatusCode::OK).await;
    assert_eq!(stored["title"], created["title"]);
    assert_eq!(stored["venue"], created["venue"]);
    assert_eq!(stored["date"], created["date"]);
    assert_eq!(stored["updatedAt"], created["updatedAt"]);

    let updated = app.request_json("PUT", &uri, Some(&owner_token), Some(json!({ "title": "Renamed" })), StatusCode::OK).await;
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["venue"], "Main Hall");
    assert_eq!(updated["createdBy"], owner.id.as_str());

    let admin_token = app.token_for(&admin).await;
    let new_date = Utc::now() + Duration::days(30);
    let updated = app.request_json(
        "PUT", &uri, Some(&admin_token),
        Some(json!({ "venue": "Auditorium", "date": new_date.to_rfc3339() })),
        StatusCode::OK,
    ).await;
    assert_eq!(updated["venue"], "Auditorium");
    assert_eq!(updated["title"], "Renamed");
    let stored: DateTime<Utc> = updated["date"].as_str().unwrap().parse().unwrap();
    assert_eq!(stored.timestamp(), new_date.timestamp());

    let res = app.request("PUT", &uri, Some(&owner_token), Some(json!({ "title": "" }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.request("PUT", "/api/events/missing", Some(&admin_token), Some(json!({ "title": "x" }))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_event() {
    let app = TestApp::new().await;
    let owner = app.seed_faculty("Dr Delete").await;
    let other = app.seed_faculty("Dr Bystander").await;
    let alumni = app.seed_alumni("Kiran").await;

    let owner_token = app.token_for(&owner).await;
    let created = create_event(&app, &owner_token, "Temporary", Utc::now() + Duration::days(3)).await;
    let event_id = created["id"].as_str().unwrap();
    let uri = format!("/api/events/{}", event_id);

    let alumni_token = app.token_for(&alumni).await;
    app.request_json("PUT", &format!("{}/interest", uri), Some(&alumni_token), None, StatusCode::OK).await;

    let other_token = app.token_for(&other).await;
    let res = app.request("DELETE", &uri, Some(&other_token), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body = app.request_json("DELETE", &uri, Some(&owner_token), None, StatusCode::OK).await;
    assert_eq!(body["message"], "Event deleted successfully");

    let res = app.request("GET", &uri, Some(&owner_token), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.request("DELETE", &uri, Some(&owner_token), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let leftover: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_interests WHERE event_id = ?")
        .bind(event_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_toggle_interest_adds_then_removes() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Host").await;
    let alumni = app.seed_alumni("Meera").await;

    let f_token = app.token_for(&faculty).await;
    let created = create_event(&app, &f_token, "Alumni Meet", Utc::now() + Duration::days(3)).await;
    let uri = format!("/api/events/{}/interest", created["id"].as_str().unwrap());

    let a_token = app.token_for(&alumni).await;
    let first = app.request_json("PUT", &uri, Some(&a_token), None, StatusCode::OK).await;
    assert_eq!(first["interestedUsers"], json!([alumni.id]));

    let second = app.request_json("PUT", &uri, Some(&a_token), None, StatusCode::OK).await;
    assert_eq!(second["interestedUsers"], json!([]));

    let third = app.request_json("PUT", &uri, Some(&a_token), None, StatusCode::OK).await;
    assert_eq!(third["interestedUsers"], json!([alumni.id]));
}

#[tokio::test]
async fn test_only_alumni_toggle_interest() {
    let app = TestApp::new().await;
    let faculty = app.seed_faculty("Dr Strict").await;
    let admin = app.seed_admin().await;
    let alumni = app.seed_alumni("Dev").await;

    let f_token = app.token_for(&faculty).await;
    let created = create_event(&app, &f_token, "Talk", Utc::now() + Duration::days(3)).await;
    let uri = format!("/api/events/{}/interest", created["id"].as_str().unwrap());

    let res = app.request("PUT", &uri, Some(&f_token), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin_token = app.token_for(&admin).await;
    let res = app.request("PUT", &uri, Some(&admin_token), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let a_token = app.token_for(&alumni).await;
    let res = app.request("PUT", "/api/events/missing/interest", Some(&a_token), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_expands_interested_alumni_and_skips_deleted_accounts() {
    let app = TestApp::new().await;
    let admin = app.seed_admin().await;
    let faculty = app.seed_faculty("Dr Join").await;

    let mut profile = alumni_profile("2019", "B.Tech");
    profile.basic_info.as_mut().unwrap().avatar = Some("https://img.test/a.png".into());
    let stays = app.seed_user("Priya", Role::Alumni, profile).await;
    let leaves = app.seed_alumni("Temp").await;

    let f_token = app.token_for(&faculty).await;
    let created = create_event(&app, &f_token, "Homecoming", Utc::now() + Duration::days(3)).await;
    let uri = format!("/api/events/{}/interest", created["id"].as_str().unwrap());

    let stays_token = app.token_for(&stays).await;
    let leaves_token = app.token_for(&leaves).await;
    app.request_json("PUT", &uri, Some(&stays_token), None, StatusCode::OK).await;
    app.request_json("PUT", &uri, Some(&leaves_token), None, StatusCode::OK).await;

    let admin_token = app.token_for(&admin).await;
    app.request_json("DELETE", &format!("/api/admin/remove-alumni/{}", leaves.id), Some(&admin_token), None, StatusCode::OK).await;

    let listing = app.request_json("GET", "/api/events", Some(&f_token), None, StatusCode::OK).await;
    let interested = listing[0]["interestedUsers"].as_array().unwrap();
    assert_eq!(interested.len(), 1);
    assert_eq!(interested[0]["id"], stays.id.as_str());
    assert_eq!(interested[0]["name"], "Priya");
    assert_eq!(interested[0]["graduationYear"], "2019");
    assert_eq!(interested[0]["degree"], "B.Tech");
    assert_eq!(interested[0]["department"], "Civil");
    assert_eq!(interested[0]["avatar"], "https://img.test/a.png");

    // The raw record still holds both ids.
    let raw = app.request_json("GET", &format!("/api/events/{}", created["id"].as_str().unwrap()), Some(&f_token), None, StatusCode::OK).await;
    assert_eq!(raw["interestedUsers"], json!([stays.id, leaves.id]));
}

fn alumni_profile(graduation_year: &str, degree: &str) -> UserProfile {
    let mut profile = UserProfile::with_department(Some("Civil".into()));
    profile.academic = Some(Academic {
        graduation_year: Some(graduation_year.to_string()),
        degree: Some(degree.to_string()),
        ..Default::default()
    });
    profile
}
