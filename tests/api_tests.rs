mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

use common::{TestApp, ADMIN_EMAIL, PASSWORD};

fn decimal(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "garage_service");
}

#[tokio::test]
async fn test_first_user_becomes_admin_and_logs_in() {
    let app = TestApp::new();
    let token = app.admin_token().await;

    let (status, me) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], ADMIN_EMAIL);
    assert_eq!(me["role"], "admin");
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_concurrent_first_registrations_yield_one_admin() {
    let app = TestApp::new();
    let register = |email: &'static str| {
        app.request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "fullName": "Founder", "email": email, "password": PASSWORD })),
        )
    };

    let (first, second) = tokio::join!(register("one@garage.test"), register("two@garage.test"));
    assert_eq!(first.0, StatusCode::OK, "{}", first.1);
    assert_eq!(second.0, StatusCode::OK, "{}", second.1);

    let roles = [&first.1["data"]["role"], &second.1["data"]["role"]];
    assert_eq!(roles.iter().filter(|r| **r == "admin").count(), 1);
    assert_eq!(roles.iter().filter(|r| **r == "user").count(), 1);
}

#[tokio::test]
async fn test_login_rejects_wrong_password_case() {
    let app = TestApp::new();
    app.admin_token().await;

    let (status, body) = app.login(ADMIN_EMAIL, "secret123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, unknown) = app.login("nobody@garage.test", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["message"], body["message"]);
}

#[tokio::test]
async fn test_anonymous_register_cannot_request_admin() {
    let app = TestApp::new();
    app.admin_token().await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "fullName": "Eve", "email": "eve@garage.test", "password": PASSWORD, "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "fullName": "Ravi", "email": "ravi@garage.test", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.admin_token().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "fullName": "Copy", "email": ADMIN_EMAIL, "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/customers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/customers", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mechanic_cannot_delete_users_but_admin_can() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let mechanic = app.user_token(&admin, "mech@garage.test", "mechanic").await;
    app.user_token(&admin, "office@garage.test", "user").await;

    let (_, users) = app.get("/api/users", &admin).await;
    let office_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "office@garage.test")
        .map(|u| u["id"].as_str().unwrap().to_string())
        .unwrap();

    let (status, body) = app.delete(&format!("/api/users/{}", office_id), &mechanic).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = app.delete(&format!("/api/users/{}", office_id), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.get(&format!("/api/users/{}", office_id), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, me) = app.get("/api/auth/me", &admin).await;

    let (status, _) = app
        .delete(&format!("/api/users/{}", me["id"].as_str().unwrap()), &admin)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_access_lists_role_features() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let mechanic = app.user_token(&admin, "mech@garage.test", "mechanic").await;

    let (status, body) = app.get("/api/access", &mechanic).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "mechanic");

    let features: Vec<&str> = body["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["feature"].as_str().unwrap())
        .collect();
    assert!(features.contains(&"JobCards"));
    assert!(!features.contains(&"Users"));
    assert!(!features.contains(&"Billing"));
}

#[tokio::test]
async fn test_customer_crud_and_validation() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .post("/api/customers", &admin, json!({ "name": "  ", "mobile": "12" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (customer_id, _) = app.customer_with_vehicle(&admin).await;

    let (status, customer) = app.get(&format!("/api/customers/{}", customer_id), &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer["name"], "A. Sharma");
    assert_eq!(customer["vehicles"].as_array().unwrap().len(), 1);

    let (status, updated) = app
        .put(
            &format!("/api/customers/{}", customer_id),
            &admin,
            json!({ "address": "12 MG Road, Pune" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["address"], "12 MG Road, Pune");
    assert_eq!(updated["data"]["mobile"], "9876543210");

    let (_, found) = app.get("/api/customers?search=sharma", &admin).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/customers/{}", customer_id), &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/customers/{}", customer_id), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_job_card_lifecycle_expands_references() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, _) = app.customer_with_vehicle(&admin).await;

    let (status, mechanic) = app
        .post("/api/mechanics", &admin, json!({ "name": "Suresh", "specialty": "Engine" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let mechanic_id = mechanic["data"]["id"].as_str().unwrap().to_string();

    let (status, card) = app
        .post(
            "/api/jobcards",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleNumber": "MH12AB1234",
                "serviceType": "General Service",
                "assignedMechanicId": mechanic_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", card);
    let card = &card["data"];
    assert_eq!(card["status"], "Pending");
    assert_eq!(card["reminderSent"], false);
    assert_eq!(card["customer"]["name"], "A. Sharma");
    assert_eq!(card["assignedMechanic"]["name"], "Suresh");

    let card_id = card["id"].as_str().unwrap();
    let (status, updated) = app
        .put(&format!("/api/jobcards/{}", card_id), &admin, json!({ "status": "In Progress" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "In Progress");

    // mecánico asignado: no se puede borrar
    let (status, _) = app.delete(&format!("/api/mechanics/{}", mechanic_id), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_job_card_vehicle_and_mechanic_unassign() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, _) = app.customer_with_vehicle(&admin).await;

    let (status, body) = app
        .post(
            "/api/jobcards",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleNumber": "KA01ZZ9999",
                "serviceType": "Repair",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, mechanic) = app
        .post("/api/mechanics", &admin, json!({ "name": "Suresh", "specialty": "Engine" }))
        .await;
    let mechanic_id = mechanic["data"]["id"].as_str().unwrap().to_string();

    let (status, card) = app
        .post(
            "/api/jobcards",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleNumber": "mh12ab1234",
                "serviceType": "Repair",
                "assignedMechanicId": mechanic_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", card);
    let card_id = card["data"]["id"].as_str().unwrap().to_string();

    let (status, updated) = app
        .put(&format!("/api/jobcards/{}", card_id), &admin, json!({ "kmIn": 42000 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["assignedMechanicId"], mechanic_id.as_str());

    let (status, updated) = app
        .put(
            &format!("/api/jobcards/{}", card_id),
            &admin,
            json!({ "assignedMechanicId": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["data"]["assignedMechanicId"].is_null());

    // sin asignación: el mecánico ya se puede borrar
    let (status, _) = app.delete(&format!("/api/mechanics/{}", mechanic_id), &admin).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_job_card_rejects_unknown_customer() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/jobcards",
            &admin,
            json!({
                "customerId": uuid::Uuid::new_v4(),
                "vehicleNumber": "MH12AB1234",
                "serviceType": "Repair",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_gst_bill_totals_and_duplicate_invoice() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, vehicle_id) = app.customer_with_vehicle(&admin).await;

    let request = json!({
        "customerId": customer_id,
        "vehicleId": vehicle_id,
        "invoiceNo": "GST-2024-001",
        "lines": [{ "description": "Brake pads", "quantity": 2, "rate": "1000", "gstPercent": 18 }],
        "mechanicCharge": "500",
    });

    let (status, bill) = app.post("/api/gst-bills", &admin, request.clone()).await;
    assert_eq!(status, StatusCode::OK, "{}", bill);
    let bill = &bill["data"];
    assert_eq!(bill["invoiceNo"], "GST-2024-001");
    assert_eq!(decimal(&bill["gst"]), Decimal::new(360, 0));
    assert_eq!(decimal(&bill["totalAmount"]), Decimal::new(2860, 0));

    let (status, body) = app.post("/api/gst-bills", &admin, request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    // cliente facturado: no se puede borrar
    let (status, _) = app.delete(&format!("/api/customers/{}", customer_id), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_gst_bill_rejects_foreign_vehicle_and_bad_rate() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, _) = app.customer_with_vehicle(&admin).await;

    let (status, _) = app
        .post(
            "/api/gst-bills",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleId": uuid::Uuid::new_v4(),
                "lines": [{ "description": "Oil", "quantity": 1, "rate": "300" }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/items",
            &admin,
            json!({ "description": "Coolant", "quantity": 1, "rate": "250", "gstPercent": 7 }),
        )
        .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_non_gst_bill_uses_item_amounts() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, vehicle_id) = app.customer_with_vehicle(&admin).await;

    let (status, item) = app
        .post(
            "/api/items",
            &admin,
            json!({ "description": "Air filter", "quantity": 2, "rate": "150", "gstPercent": 18 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", item);
    let item_id = item["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(decimal(&item["data"]["amount"]), Decimal::new(300, 0));

    let (status, bill) = app
        .post(
            "/api/non-gst-bills",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleId": vehicle_id,
                "itemIds": [item_id],
                "mechanicCharge": "200",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", bill);
    assert_eq!(bill["data"]["invoiceNo"], "INV-000001");
    assert_eq!(decimal(&bill["data"]["totalAmount"]), Decimal::new(500, 0));

    // item facturado: no se puede borrar
    let (status, _) = app.delete(&format!("/api/items/{}", item_id), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_non_gst_duplicate_invoice_conflicts() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, vehicle_id) = app.customer_with_vehicle(&admin).await;
    let (_, item) = app
        .post(
            "/api/items",
            &admin,
            json!({ "description": "Wheel alignment", "quantity": 1, "rate": "600" }),
        )
        .await;

    let request = json!({
        "customerId": customer_id,
        "vehicleId": vehicle_id,
        "invoiceNo": "INV-2024-007",
        "itemIds": [item["data"]["id"]],
        "mechanicCharge": "350",
    });

    let (status, bill) = app.post("/api/non-gst-bills", &admin, request.clone()).await;
    assert_eq!(status, StatusCode::OK, "{}", bill);
    assert_eq!(bill["data"]["invoiceNo"], "INV-2024-007");

    let (status, body) = app.post("/api/non-gst-bills", &admin, request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (_, bills) = app.get("/api/non-gst-bills", &admin).await;
    assert_eq!(bills.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (customer_id, vehicle_id) = app.customer_with_vehicle(&admin).await;
    let huge = Decimal::MAX.to_string();

    let (status, body) = app
        .post(
            "/api/items",
            &admin,
            json!({ "description": "Engine", "quantity": 2, "rate": huge, "gstPercent": 18 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, item) = app
        .post(
            "/api/items",
            &admin,
            json!({ "description": "Engine", "quantity": 1, "rate": huge }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", item);
    let item_id = item["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(&format!("/api/items/{}", item_id), &admin, json!({ "quantity": 3 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            "/api/gst-bills",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleId": vehicle_id,
                "lines": [{ "itemId": item_id, "gstPercent": 28 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            "/api/non-gst-bills",
            &admin,
            json!({
                "customerId": customer_id,
                "vehicleId": vehicle_id,
                "itemIds": [item_id],
                "mechanicCharge": "1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_office_user_cannot_delete_bills() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let office = app.user_token(&admin, "office@garage.test", "user").await;
    let (customer_id, vehicle_id) = app.customer_with_vehicle(&admin).await;

    let (status, bill) = app
        .post(
            "/api/gst-bills",
            &office,
            json!({
                "customerId": customer_id,
                "vehicleId": vehicle_id,
                "lines": [{ "description": "Wash", "quantity": 1, "rate": "100", "gstPercent": 0 }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", bill);
    assert_eq!(bill["data"]["invoiceNo"], "GST-000001");

    let bill_id = bill["data"]["id"].as_str().unwrap();
    let (status, _) = app.delete(&format!("/api/gst-bills/{}", bill_id), &office).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/api/gst-bills/{}", bill_id), &admin).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expenses_record_creator_and_feed_dashboard() {
    let app = TestApp::new();
    let admin = app.admin_token().await;
    let (_, me) = app.get("/api/auth/me", &admin).await;

    let (status, expense) = app
        .post(
            "/api/expenses",
            &admin,
            json!({
                "date": "2024-04-01",
                "type": "Rent",
                "amount": "15000",
                "paidTo": "Landlord",
                "paymentMode": "Bank Transfer",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", expense);
    assert_eq!(expense["data"]["createdBy"], me["id"]);

    let (status, summary) = app.get("/api/dashboard/summary", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&summary["totalExpenses"]), Decimal::new(15000, 0));
    assert_eq!(summary["jobCardsByStatus"]["Pending"], 0);
}

#[tokio::test]
async fn test_permissions_link_and_restrict_delete() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, permission) = app
        .post("/api/permissions", &admin, json!({ "name": "reports.view" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", permission);
    let permission_id = permission["data"]["id"].as_str().unwrap().to_string();

    let link = json!({ "permissionId": permission_id });
    let (status, _) = app.post("/api/permissions/roles/user", &admin, link.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/api/permissions/roles/user", &admin, link).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, role) = app.get("/api/permissions/roles/user", &admin).await;
    assert_eq!(role["permissions"][0]["name"], "reports.view");

    let (status, _) = app.delete(&format!("/api/permissions/{}", permission_id), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .delete(&format!("/api/permissions/roles/user/{}", permission_id), &admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&format!("/api/permissions/{}", permission_id), &admin).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_garage_profile_is_per_user() {
    let app = TestApp::new();
    let admin = app.admin_token().await;

    let (status, _) = app.get("/api/garage", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = app
        .post(
            "/api/garage",
            &admin,
            json!({
                "garageName": "Sharma Motors",
                "email": "hello@sharmamotors.in",
                "city": "Pune",
                "phone": "9876500000"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", created);

    let (status, profile) = app.get("/api/garage", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["garageName"], "Sharma Motors");
    assert_eq!(profile["gstRate"], 18);
}
