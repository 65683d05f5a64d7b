//! Profile directory and the supplier/customer admin lists.

mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use serde_json::json;
use tanepro_api::entities::{profile::ProfileRole, supplier};
use uuid::Uuid;

#[tokio::test]
async fn profiles_list_with_optional_role_filter() {
    let app = TestApp::new().await;
    app.seed_supplier("Ege Gıda").await;
    app.seed_customer("Acme Market").await;

    let response = app.request(Method::GET, "/api/v1/profiles", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, "/api/v1/profiles?role=supplier", None)
        .await;
    let body = read_json(response).await;
    let profiles = body["data"].as_array().unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0]["role"], "supplier");
    assert_eq!(profiles[0]["company"], "Ege Gıda");
}

#[tokio::test]
async fn get_profile_returns_the_record_or_not_found() {
    let app = TestApp::new().await;
    let profile_id = app.seed_profile(ProfileRole::Manager, "Portal Yöneticisi").await;

    let response = app
        .request(Method::GET, &format!("/api/v1/profiles/{profile_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], profile_id.to_string());
    assert_eq!(body["data"]["role"], "manager");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/profiles/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_profile_touches_contact_fields_only() {
    let app = TestApp::new().await;
    let profile_id = app.seed_customer("Acme Market").await;

    // A role smuggled into the payload is ignored, not an error.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/profiles/{profile_id}"),
            Some(json!({
                "phone": "+90 532 222 22 22",
                "city": "İzmir",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["phone"], "+90 532 222 22 22");
    assert_eq!(body["data"]["city"], "İzmir");
    assert_eq!(body["data"]["role"], "customer");
    // Fields absent from the payload keep their values.
    assert_eq!(body["data"]["company"], "Acme Market");
}

#[tokio::test]
async fn update_profile_rejects_an_empty_name() {
    let app = TestApp::new().await;
    let profile_id = app.seed_customer("Acme Market").await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/profiles/{profile_id}"),
            Some(json!({"name": ""})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn supplier_and_customer_lists_sort_by_company() {
    let app = TestApp::new().await;
    app.seed_supplier("Bravo Gıda").await;
    app.seed_supplier("Anadolu Un").await;
    app.seed_customer("Zirve Market").await;
    app.seed_customer("Merkez Bakkal").await;

    let response = app.request(Method::GET, "/api/v1/suppliers", None).await;
    let body = read_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["company_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Anadolu Un", "Bravo Gıda"]);

    let response = app.request(Method::GET, "/api/v1/customers", None).await;
    let body = read_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["company_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Merkez Bakkal", "Zirve Market"]);
}

#[tokio::test]
async fn deactivated_suppliers_leave_the_list() {
    let app = TestApp::new().await;
    let supplier_id = app.seed_supplier("Ege Gıda").await;
    app.seed_supplier("Marmara Un").await;

    let record = supplier::Entity::find_by_id(supplier_id)
        .one(&*app.state.db)
        .await
        .expect("query supplier")
        .expect("supplier exists");
    let mut active = record.into_active_model();
    active.is_active = Set(false);
    active.update(&*app.state.db).await.expect("deactivate");

    let response = app.request(Method::GET, "/api/v1/suppliers", None).await;
    let body = read_json(response).await;
    let suppliers = body["data"].as_array().unwrap();
    assert_eq!(suppliers.len(), 1);
    assert_eq!(suppliers[0]["company_name"], "Marmara Un");
}
