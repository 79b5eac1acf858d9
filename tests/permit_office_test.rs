mod common;

use axum::http::StatusCode;
use common::{OfficeSeed, TestApp};
use serde_json::json;
use serial_test::serial;

const ATLANTA: (f64, f64) = (33.749, -84.388);

fn names(json: &serde_json::Value) -> Vec<String> {
    json["offices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap().to_string())
        .collect()
}

async fn seed_geo_offices(app: &TestApp) {
    app.insert_office(OfficeSeed::named("Far Office").at(41.8781, -87.6298))
        .await;
    app.insert_office(OfficeSeed::named("Unplaced Office")).await;
    app.insert_office(OfficeSeed::named("Mid Office").at(33.9526, -84.5499))
        .await;
    app.insert_office(OfficeSeed::named("Near Office").at(33.7500, -84.3900))
        .await;
}

// ─── List ────────────────────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn list_paginates_by_name() {
    let app = TestApp::new().await;
    for name in ["Charlie Permits", "Alpha Permits", "Bravo Permits"] {
        app.insert_office(OfficeSeed::named(name)).await;
    }

    let resp = app.get("/api/permit-offices?limit=2", None).await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    assert_eq!(names(&json), vec!["Alpha Permits", "Bravo Permits"]);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["hasMore"], true);

    let resp = app.get("/api/permit-offices?limit=2&offset=2", None).await;
    let json: serde_json::Value = resp.json();
    assert_eq!(names(&json), vec!["Charlie Permits"]);
    assert_eq!(json["pagination"]["hasMore"], false);
}

#[serial]
#[tokio::test]
async fn list_reports_rating_and_type_without_distance() {
    let app = TestApp::new().await;
    app.insert_office(OfficeSeed::named("Fulton County Building & Development"))
        .await;

    let resp = app.get("/api/permit-offices", None).await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    let office = &json["offices"][0];
    assert_eq!(office["officeType"], "county");
    assert_eq!(office["reviewCount"], 0);
    assert!(office["averageRating"].is_null());
    assert!(office.get("distance").is_none());
    assert_eq!(office["permitTypes"], json!(["building"]));
    assert_eq!(office["zipCode"], "30303");
}

#[serial]
#[tokio::test]
async fn list_filters_by_attributes() {
    let app = TestApp::new().await;
    app.insert_office(
        OfficeSeed::named("Alpha Permits").with_types(&["building", "solar"]),
    )
    .await;
    app.insert_office(
        OfficeSeed::named("Bravo Permits")
            .in_city("Houston", "TX", "77002")
            .with_types(&["electrical"]),
    )
    .await;

    let json: serde_json::Value = app
        .get("/api/permit-offices?city=houston", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Bravo Permits"]);

    let json: serde_json::Value = app
        .get("/api/permit-offices?zipCode=30303", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Alpha Permits"]);

    let json: serde_json::Value = app
        .get("/api/permit-offices?permitType=solar", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Alpha Permits"]);

    let json: serde_json::Value = app
        .get("/api/permit-offices?permitType=all", None)
        .await
        .json();
    assert_eq!(json["pagination"]["total"], 2);

    let json: serde_json::Value = app
        .get("/api/permit-offices?search=Bravo", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Bravo Permits"]);
}

#[serial]
#[tokio::test]
async fn list_treats_wildcards_and_permit_types_literally() {
    let app = TestApp::new().await;
    app.insert_office(OfficeSeed::named("Fulton County").with_types(&["Building"]))
        .await;
    app.insert_office(OfficeSeed::named("Cobb County").with_types(&["Building Permit"]))
        .await;
    app.insert_office(OfficeSeed::named("100% Solar_Desk").with_types(&["solar"]))
        .await;

    for wildcard in ["%25", "_", "%5C"] {
        let json: serde_json::Value = app
            .get(&format!("/api/permit-offices?search={wildcard}"), None)
            .await
            .json();
        match wildcard {
            "%5C" => assert_eq!(json["pagination"]["total"], 0),
            _ => assert_eq!(names(&json), vec!["100% Solar_Desk"]),
        }
    }

    let json: serde_json::Value = app
        .get("/api/permit-offices?permitType=Build", None)
        .await
        .json();
    assert_eq!(json["pagination"]["total"], 0);

    let json: serde_json::Value = app
        .get("/api/permit-offices?permitType=Building", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Fulton County"]);
}

#[serial]
#[tokio::test]
async fn list_survives_out_of_range_offset() {
    let app = TestApp::new().await;
    app.insert_office(OfficeSeed::named("Alpha Permits")).await;

    let resp = app
        .get("/api/permit-offices?offset=18446744073709551615", None)
        .await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    assert!(json["offices"].as_array().unwrap().is_empty());
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["pagination"]["hasMore"], false);

    let resp = app
        .get(
            &format!(
                "/api/permit-offices?offset=18446744073709551615&userLat={}&userLng={}",
                ATLANTA.0, ATLANTA.1
            ),
            None,
        )
        .await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    assert!(json["offices"].as_array().unwrap().is_empty());

    let resp = app.get("/api/reviews?offset=18446744073709551615", None).await;
    resp.assert_status(StatusCode::OK);
}

#[serial]
#[tokio::test]
async fn list_filters_by_office_type() {
    let app = TestApp::new().await;
    app.insert_office(OfficeSeed::named("Fulton County Building & Development"))
        .await;
    app.insert_office(OfficeSeed::named("Houston Municipal Permitting"))
        .await;
    app.insert_office(OfficeSeed::named("Alpha Permits")).await;

    let json: serde_json::Value = app
        .get("/api/permit-offices?officeType=city", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Houston Municipal Permitting"]);
    assert_eq!(json["offices"][0]["officeType"], "city");

    let json: serde_json::Value = app
        .get("/api/permit-offices?officeType=county&search=Fulton", None)
        .await
        .json();
    assert_eq!(names(&json), vec!["Fulton County Building & Development"]);

    let json: serde_json::Value = app
        .get("/api/permit-offices?officeType=all", None)
        .await
        .json();
    assert_eq!(json["pagination"]["total"], 3);
}

#[serial]
#[tokio::test]
async fn list_ranks_by_distance_and_keeps_unplaced_offices() {
    let app = TestApp::new().await;
    seed_geo_offices(&app).await;

    let uri = format!(
        "/api/permit-offices?userLat={}&userLng={}&radius=50",
        ATLANTA.0, ATLANTA.1
    );
    let resp = app.get(&uri, None).await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();

    assert_eq!(
        names(&json),
        vec!["Near Office", "Mid Office", "Unplaced Office"]
    );
    assert_eq!(json["pagination"]["total"], 3);

    let offices = json["offices"].as_array().unwrap();
    let near = offices[0]["distance"].as_f64().unwrap();
    let mid = offices[1]["distance"].as_f64().unwrap();
    assert!(near < 1.0);
    assert!(mid > near && mid < 50.0);
    assert!(offices[2].get("distance").is_none());
}

#[serial]
#[tokio::test]
async fn list_without_radius_orders_all_by_distance() {
    let app = TestApp::new().await;
    seed_geo_offices(&app).await;

    let uri = format!(
        "/api/permit-offices?userLat={}&userLng={}&limit=2&offset=1",
        ATLANTA.0, ATLANTA.1
    );
    let json: serde_json::Value = app.get(&uri, None).await.json();
    assert_eq!(names(&json), vec!["Mid Office", "Far Office"]);
    assert_eq!(json["pagination"]["total"], 4);
    assert_eq!(json["pagination"]["hasMore"], true);

    let far = json["offices"][1]["distance"].as_f64().unwrap();
    assert!((far - 588.0).abs() < 10.0);
}

#[serial]
#[tokio::test]
async fn list_rejects_invalid_geo_parameters() {
    let app = TestApp::new().await;

    let resp = app
        .get("/api/permit-offices?userLat=95&userLng=-84.3", None)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = app
        .get("/api/permit-offices?userLat=33.7&userLng=-84.3&radius=-1", None)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["error"], "bad_request");
}

// ─── Detail ──────────────────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn detail_includes_reviews_and_applications() {
    let app = TestApp::new().await;
    let office_id = app
        .insert_office(OfficeSeed::named("Houston Municipal Permitting"))
        .await;
    let (token, _) = app.sign_in("user_1", "one@test.com").await;

    app.send(
        "POST",
        "/api/reviews",
        Some(&token),
        Some(json!({ "rating": 4, "comment": "Quick", "permitOfficeId": office_id })),
    )
    .await
    .assert_status(StatusCode::CREATED);
    app.create_application(&token, &office_id).await;

    let resp = app
        .get(&format!("/api/permit-offices/{office_id}"), None)
        .await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();

    assert_eq!(json["name"], "Houston Municipal Permitting");
    assert_eq!(json["officeType"], "city");
    assert_eq!(json["reviewCount"], 1);
    assert_eq!(json["averageRating"], 4.0);
    assert_eq!(json["reviews"][0]["user"]["name"], "Test User");
    assert_eq!(json["reviews"][0]["comment"], "Quick");
    assert_eq!(json["applications"][0]["type"], "building");
    assert_eq!(json["applications"][0]["status"], "DRAFT");
}

#[serial]
#[tokio::test]
async fn detail_unknown_office_is_404() {
    let app = TestApp::new().await;
    let resp = app.get("/api/permit-offices/nope", None).await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["error"], "permit_office_not_found");
}

// ─── Admin writes ────────────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn create_requires_admin() {
    let app = TestApp::new().await;
    let body = json!({
        "name": "New Office",
        "address": "2 Main Street",
        "city": "Atlanta",
        "state": "GA",
        "zipCode": "30303",
    });

    let resp = app
        .send("POST", "/api/permit-offices", None, Some(body.clone()))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let (token, _) = app.sign_in("user_1", "one@test.com").await;
    let resp = app
        .send("POST", "/api/permit-offices", Some(&token), Some(body))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[serial]
#[tokio::test]
async fn admin_creates_updates_and_validates_offices() {
    let app = TestApp::new().await;
    let admin = app.sign_in_admin().await;

    let resp = app
        .send(
            "POST",
            "/api/permit-offices",
            Some(&admin),
            Some(json!({ "name": "No Address", "city": "Atlanta", "state": "GA", "zipCode": "30303" })),
        )
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = app
        .send(
            "POST",
            "/api/permit-offices",
            Some(&admin),
            Some(json!({
                "name": "New Office",
                "address": "2 Main Street",
                "city": "Atlanta",
                "state": "GA",
                "zipCode": "30303",
                "latitude": 33.75,
                "longitude": -84.39,
                "hours": { "monday": "8-5" },
                "permitTypes": ["building", "solar"],
            })),
        )
        .await;
    resp.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = resp.json();
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["hours"]["monday"], "8-5");
    assert_eq!(created["permitTypes"], json!(["building", "solar"]));
    assert_eq!(created["servicesOffered"], json!([]));

    let resp = app
        .send(
            "PUT",
            &format!("/api/permit-offices/{id}"),
            Some(&admin),
            Some(json!({ "phone": "(555) 010-0000", "city": "Decatur" })),
        )
        .await;
    resp.assert_status(StatusCode::OK);
    let updated: serde_json::Value = resp.json();
    assert_eq!(updated["phone"], "(555) 010-0000");
    assert_eq!(updated["city"], "Decatur");
    assert_eq!(updated["name"], "New Office");

    let resp = app
        .send(
            "PUT",
            &format!("/api/permit-offices/{id}"),
            Some(&admin),
            Some(json!({ "name": "  " })),
        )
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[serial]
#[tokio::test]
async fn admin_delete_removes_related_rows() {
    let app = TestApp::new().await;
    let office_id = app.insert_office(OfficeSeed::named("Alpha Permits")).await;
    let (token, _) = app.sign_in("user_1", "one@test.com").await;

    app.send(
        "POST",
        "/api/reviews",
        Some(&token),
        Some(json!({ "rating": 5, "permitOfficeId": office_id })),
    )
    .await
    .assert_status(StatusCode::CREATED);
    let application_id = app.create_application(&token, &office_id).await;
    app.send(
        "POST",
        &format!("/api/applications/{application_id}/documents"),
        Some(&token),
        Some(json!({ "filename": "a.pdf", "originalName": "plan.pdf", "mimetype": "application/pdf", "size": 10 })),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let admin = app.sign_in_admin().await;
    let resp = app
        .send(
            "DELETE",
            &format!("/api/permit-offices/{office_id}"),
            Some(&admin),
            None,
        )
        .await;
    resp.assert_status(StatusCode::OK);

    app.get(&format!("/api/permit-offices/{office_id}"), None)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let reviews: serde_json::Value = app.get("/api/users/me/reviews", Some(&token)).await.json();
    assert_eq!(reviews["pagination"]["total"], 0);
    app.get(&format!("/api/applications/{application_id}"), Some(&token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
