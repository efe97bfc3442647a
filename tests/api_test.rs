//! API integration tests
//!
//! End-to-end tests against the full router: auth, role guards, recipes,
//! inventory, plans, grocery lists and reports.

use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use kitchenos::database::migrations::Migrator;
use kitchenos::database::seed_data::{create_seed_data, SEED_PASSWORD};
use kitchenos::server::app::create_app;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Create a test server backed by a migrated and seeded temp database.
/// The temp file must stay alive as long as the server.
async fn setup_test_server() -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    Migrator::up(&db, None).await?;
    create_seed_data(&db).await?;

    let app = create_app(db, None).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

fn auth_name() -> HeaderName {
    HeaderName::from_static("authorization")
}

fn auth_value(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header value")
}

/// Log in one of the seeded accounts and return its bearer token.
async fn login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({"username": username, "password": SEED_PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body["token"].as_str().expect("token in response").to_string()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "kitchenos-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_login_issues_token() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({"username": "admin", "password": SEED_PASSWORD}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");

    // The token resolves back to the same actor
    let token = body["token"].as_str().unwrap();
    let response = server
        .get("/api/v1/auth/me")
        .add_header(auth_name(), auth_value(token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let me: Value = response.json();
    assert_eq!(me["username"], "admin");

    // Wrong password and unknown user both fail closed
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({"username": "admin", "password": "nope"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({"username": "ghost", "password": SEED_PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;

    let response = server.get("/api/v1/recipes").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing auth token");

    let response = server
        .get("/api/v1/recipes")
        .add_header(auth_name(), auth_value("not-a-real-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid token");

    // A non-bearer scheme is treated as no token at all
    let response = server
        .get("/api/v1/recipes")
        .add_header(
            auth_name(),
            HeaderValue::from_static("Basic YWRtaW46YWRtaW4="),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing auth token");

    Ok(())
}

#[tokio::test]
async fn test_role_guards() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let prep_token = login(&server, "prep1").await;
    let manager_token = login(&server, "chef1").await;

    // Prep staff cannot touch the recipe book or the item catalog
    let response = server
        .post("/api/v1/recipes")
        .add_header(auth_name(), auth_value(&prep_token))
        .json(&json!({
            "name": "Forbidden", "category": "Sauce",
            "yield_amount": 1.0, "yield_unit": "L"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post("/api/v1/inventory")
        .add_header(auth_name(), auth_value(&prep_token))
        .json(&json!({"name": "Forbidden", "category": "Misc", "base_unit": "kg"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // Counts are reserved to admin and manager
    let response = server
        .post("/api/v1/inventory/count")
        .add_header(auth_name(), auth_value(&prep_token))
        .json(&json!({"items": []}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // User administration is admin-only
    let response = server
        .get("/api/v1/users")
        .add_header(auth_name(), auth_value(&manager_token))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // But prep staff may record day-to-day adjustments
    let response = server
        .get("/api/v1/inventory")
        .add_query_param("q", "Tomato")
        .add_header(auth_name(), auth_value(&prep_token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let items: Vec<Value> = response.json();
    let tomato_id = items[0]["id"].as_i64().unwrap();

    let response = server
        .post(&format!("/api/v1/inventory/{}/adjust", tomato_id))
        .add_header(auth_name(), auth_value(&prep_token))
        .json(&json!({"change_quantity": 1.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["new_quantity"], 13.0);

    Ok(())
}

#[tokio::test]
async fn test_recipe_costing_and_scaling() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let response = server
        .post("/api/v1/inventory")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Flour", "category": "Dry Goods", "base_unit": "kg",
            "current_quantity": 20.0, "cost_per_unit": 1.5
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let flour_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/recipes")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Test Batter", "category": "Prep",
            "yield_amount": 4.0, "yield_unit": "L",
            "ingredients": [
                {"inventory_item_id": flour_id, "quantity": 6.0, "unit": "kg"}
            ]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let recipe_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Cost is quantity times unit cost, rounded to cents
    let response = server
        .get(&format!("/api/v1/recipes/{}", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let detail: Value = response.json();
    assert_eq!(detail["cost_total"], 9.0);
    assert_eq!(detail["ingredients"][0]["ingredient_name"], "Flour");
    assert_eq!(detail["ingredients"][0]["cost_per_unit"], 1.5);

    let response = server
        .get(&format!("/api/v1/recipes/{}/cost", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let cost: Value = response.json();
    assert_eq!(cost["recipe_id"], recipe_id);
    assert_eq!(cost["cost_total"], 9.0);

    // Scaling multiplies every line by target / yield
    let response = server
        .get(&format!("/api/v1/recipes/{}/scale", recipe_id))
        .add_query_param("target_yield", 10)
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let scaled: Value = response.json();
    assert_eq!(scaled["ratio"], 2.5);
    assert_eq!(scaled["scaled_ingredients"][0]["quantity"], 15.0);
    assert_eq!(scaled["scaled_ingredients"][0]["ingredient"], "Flour");

    let response = server
        .get(&format!("/api/v1/recipes/{}/scale", recipe_id))
        .add_query_param("target_yield", 0)
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_recipe_crud_roundtrip() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let response = server
        .post("/api/v1/recipes")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Staff Meal Stew", "category": "Staff",
            "yield_amount": 8.0, "yield_unit": "portion",
            "instructions": "Simmer everything."
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let recipe_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Name search finds it
    let response = server
        .get("/api/v1/recipes")
        .add_query_param("q", "Staff Meal")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let found: Vec<Value> = response.json();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"].as_i64().unwrap(), recipe_id);

    // Update renames in place
    let response = server
        .put(&format!("/api/v1/recipes/{}", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Family Meal Stew", "category": "Staff",
            "yield_amount": 10.0, "yield_unit": "portion"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&format!("/api/v1/recipes/{}", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    let detail: Value = response.json();
    assert_eq!(detail["name"], "Family Meal Stew");
    assert_eq!(detail["yield_amount"], 10.0);

    // Duplicate copies under a new name
    let response = server
        .post(&format!("/api/v1/recipes/{}/duplicate", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let copy_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/api/v1/recipes/{}", copy_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    let copy: Value = response.json();
    assert_eq!(copy["name"], "Family Meal Stew (Copy)");

    // Delete removes the recipe
    let response = server
        .delete(&format!("/api/v1/recipes/{}", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&format!("/api/v1/recipes/{}", recipe_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_plan_requirements_and_shortage_push() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    // Two items, two recipes sharing the first item
    let response = server
        .post("/api/v1/inventory")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Plan Carrot", "category": "Produce", "base_unit": "kg",
            "current_quantity": 10.0, "cost_per_unit": 2.0, "supplier": "Farm Co"
        }))
        .await;
    let carrot_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/inventory")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Plan Onion", "category": "Produce", "base_unit": "kg",
            "current_quantity": 5.0, "cost_per_unit": 1.0
        }))
        .await;
    let onion_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/recipes")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Carrot Soup", "category": "Soup",
            "yield_amount": 2.0, "yield_unit": "L",
            "ingredients": [
                {"inventory_item_id": carrot_id, "quantity": 3.0, "unit": "kg"},
                {"inventory_item_id": onion_id, "quantity": 1.0, "unit": "kg"}
            ]
        }))
        .await;
    let soup_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/recipes")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Carrot Puree", "category": "Prep",
            "yield_amount": 4.0, "yield_unit": "kg",
            "ingredients": [
                {"inventory_item_id": carrot_id, "quantity": 2.0, "unit": "kg"}
            ]
        }))
        .await;
    let puree_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Plan: soup at 2x, puree at 2.5x
    let response = server
        .post("/api/v1/production-plans")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"name": "Big Prep Day"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let plan_id = response.json::<Value>()["id"].as_i64().unwrap();

    for (recipe_id, target) in [(soup_id, 4.0), (puree_id, 10.0)] {
        let response = server
            .post(&format!("/api/v1/production-plans/{}/items", plan_id))
            .add_header(auth_name(), auth_value(&token))
            .json(&json!({"recipe_id": recipe_id, "target_yield_amount": target}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    // Carrot: 3*2 + 2*2.5 = 11 needed against 10 on hand
    let response = server
        .get(&format!("/api/v1/production-plans/{}", plan_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let detail: Value = response.json();

    let requirements = detail["requirements"].as_array().unwrap();
    let carrot = requirements
        .iter()
        .find(|r| r["name"] == "Plan Carrot")
        .unwrap();
    assert_eq!(carrot["required_quantity"], 11.0);
    assert_eq!(carrot["available_quantity"], 10.0);
    assert_eq!(carrot["shortage_quantity"], 1.0);

    let onion = requirements
        .iter()
        .find(|r| r["name"] == "Plan Onion")
        .unwrap();
    assert_eq!(onion["required_quantity"], 2.0);
    assert_eq!(onion["shortage_quantity"], 0.0);

    let shortages = detail["shortages"].as_array().unwrap();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0]["name"], "Plan Carrot");

    // The bare report endpoint returns the same lines as the plan detail
    let response = server
        .get(&format!("/api/v1/production-plans/{}/requirements", plan_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let report: Value = response.json();
    assert_eq!(report["requirements"], detail["requirements"]);
    assert_eq!(report["unit_warnings"].as_array().unwrap().len(), 0);

    // Push the shortage onto a grocery list
    let response = server
        .post(&format!(
            "/api/v1/production-plans/{}/send-shortages",
            plan_id
        ))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let push: Value = response.json();
    assert_eq!(push["added"], 1);
    let list_id = push["grocery_list_id"].as_i64().unwrap();

    let response = server
        .get(&format!("/api/v1/grocery-lists/{}", list_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    let list: Value = response.json();
    assert_eq!(list["items"].as_array().unwrap().len(), 1);
    assert_eq!(list["items"][0]["name"], "Plan Carrot");
    assert_eq!(list["items"][0]["quantity"], 1.0);
    assert_eq!(list["items"][0]["vendor"], "Farm Co");
    assert_eq!(list["items"][0]["from_shortage"], true);

    // A second push appends to the same open list instead of creating one
    let response = server
        .post(&format!(
            "/api/v1/production-plans/{}/send-shortages",
            plan_id
        ))
        .add_header(auth_name(), auth_value(&token))
        .await;
    let push: Value = response.json();
    assert_eq!(push["grocery_list_id"].as_i64().unwrap(), list_id);

    let response = server
        .get(&format!("/api/v1/grocery-lists/{}", list_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    let list: Value = response.json();
    assert_eq!(list["items"].as_array().unwrap().len(), 2);

    // Deleting the plan removes it and its batches but not the grocery list
    let response = server
        .delete(&format!("/api/v1/production-plans/{}", plan_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&format!("/api/v1/production-plans/{}", plan_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .get(&format!("/api/v1/grocery-lists/{}", list_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_grocery_receiving_credits_stock_once() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let response = server
        .post("/api/v1/inventory")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Butter", "category": "Dairy", "base_unit": "kg",
            "current_quantity": 2.0, "cost_per_unit": 9.0
        }))
        .await;
    let butter_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/grocery-lists")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({}))
        .await;
    let list_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Linked line: name and unit come from the item
    let response = server
        .post(&format!("/api/v1/grocery-lists/{}/items", list_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"inventory_item_id": butter_id, "quantity": 5.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let line_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Ordering does not touch stock
    let response = server
        .put(&format!("/api/v1/grocery-items/{}", line_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"status": "ordered"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<Value>()["new_quantity"].is_null());

    // Receiving credits the linked item
    let response = server
        .put(&format!("/api/v1/grocery-items/{}", line_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"status": "received"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["new_quantity"], 7.0);

    // A repeated receive is a no-op, never a double credit
    let response = server
        .put(&format!("/api/v1/grocery-items/{}", line_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"status": "received"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.json::<Value>()["new_quantity"].is_null());

    let response = server
        .get("/api/v1/inventory")
        .add_query_param("q", "Butter")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let items: Vec<Value> = response.json();
    assert_eq!(items[0]["current_quantity"], 7.0);

    // Unlinked lines cannot be received into inventory
    let response = server
        .post(&format!("/api/v1/grocery-lists/{}/items", list_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"name": "Paper Towels", "quantity": 2.0}))
        .await;
    let unlinked_id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = server
        .put(&format!("/api/v1/grocery-items/{}", unlinked_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"status": "received"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_STATE");

    // The failed receive left the line untouched
    let response = server
        .get(&format!("/api/v1/grocery-lists/{}", list_id))
        .add_header(auth_name(), auth_value(&token))
        .await;
    let list: Value = response.json();
    let unlinked = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"].as_i64() == Some(unlinked_id))
        .unwrap();
    assert_eq!(unlinked["status"], "needed");

    // Unknown statuses are rejected outright
    let response = server
        .put(&format!("/api/v1/grocery-items/{}", line_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"status": "teleported"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_inventory_adjust_guards_against_overdraw() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let response = server
        .post("/api/v1/inventory")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({
            "name": "Saffron", "category": "Spice", "base_unit": "g",
            "current_quantity": 1.0, "cost_per_unit": 11.0
        }))
        .await;
    let saffron_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Overdraw is refused and nothing is written
    let response = server
        .post(&format!("/api/v1/inventory/{}/adjust", saffron_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"change_quantity": -5.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = server
        .get("/api/v1/inventory")
        .add_query_param("q", "Saffron")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let items: Vec<Value> = response.json();
    assert_eq!(items[0]["current_quantity"], 1.0);

    let response = server
        .get("/api/v1/inventory/transactions")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let transactions: Vec<Value> = response.json();
    assert!(transactions.iter().all(|t| t["item_name"] != "Saffron"));

    // A valid draw-down records a reconciling ledger row
    let response = server
        .post(&format!("/api/v1/inventory/{}/adjust", saffron_id))
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"change_quantity": -0.5, "reason": "waste", "notes": "spilled"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["new_quantity"], 0.5);

    let response = server
        .get("/api/v1/inventory/transactions")
        .add_query_param("limit", 1)
        .add_header(auth_name(), auth_value(&token))
        .await;
    let transactions: Vec<Value> = response.json();
    assert_eq!(transactions.len(), 1);
    let row = &transactions[0];
    assert_eq!(row["item_name"], "Saffron");
    assert_eq!(row["previous_quantity"], 1.0);
    assert_eq!(row["change_quantity"], -0.5);
    assert_eq!(row["new_quantity"], 0.5);
    assert_eq!(row["reason"], "waste");
    assert_eq!(row["source"], "manual");
    assert_eq!(row["user_name"], "Kitchen Admin");

    Ok(())
}

#[tokio::test]
async fn test_inventory_count_applies_absolute_quantities() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let mut ids = Vec::new();
    for (name, qty) in [("Count Rice", 5.0), ("Count Beans", 8.0)] {
        let response = server
            .post("/api/v1/inventory")
            .add_header(auth_name(), auth_value(&token))
            .json(&json!({
                "name": name, "category": "Dry Goods", "base_unit": "kg",
                "current_quantity": qty
            }))
            .await;
        ids.push(response.json::<Value>()["id"].as_i64().unwrap());
    }

    // Unknown ids are skipped, known ones are set to the counted value
    let response = server
        .post("/api/v1/inventory/count")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"items": [
            {"id": ids[0], "current_quantity": 4.5, "notes": "weekly count"},
            {"id": ids[1], "current_quantity": 8.0},
            {"id": 99999, "current_quantity": 3.0}
        ]}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["updated"], 2);

    let response = server
        .get("/api/v1/inventory")
        .add_query_param("q", "Count Rice")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let items: Vec<Value> = response.json();
    assert_eq!(items[0]["current_quantity"], 4.5);

    // The ledger shows the derived delta, not the absolute count
    let response = server
        .get("/api/v1/inventory/transactions")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let transactions: Vec<Value> = response.json();
    let rice_row = transactions
        .iter()
        .find(|t| t["item_name"] == "Count Rice")
        .unwrap();
    assert_eq!(rice_row["change_quantity"], -0.5);
    assert_eq!(rice_row["reason"], "counted");
    assert_eq!(rice_row["source"], "count_page");

    // A count that matches the books still leaves its audit row
    let beans_row = transactions
        .iter()
        .find(|t| t["item_name"] == "Count Beans")
        .unwrap();
    assert_eq!(beans_row["change_quantity"], 0.0);
    assert_eq!(beans_row["new_quantity"], 8.0);

    // Negative counts are rejected before anything is applied
    let response = server
        .post("/api/v1/inventory/count")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"items": [
            {"id": ids[0], "current_quantity": 2.0},
            {"id": ids[1], "current_quantity": -1.0}
        ]}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/v1/inventory")
        .add_query_param("q", "Count Rice")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let items: Vec<Value> = response.json();
    assert_eq!(items[0]["current_quantity"], 4.5);

    Ok(())
}

#[tokio::test]
async fn test_inventory_csv_import_and_export() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let csv = "name,category,base_unit,current_quantity,par_level,reorder_threshold,cost_per_unit,supplier\n\
               Csv Flour,Dry Goods,kg,7.5,10,4,1.25,Mill Co\n";
    let response = server
        .post("/api/v1/inventory/import-csv")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"csv": csv}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["imported_items"], 1);

    let response = server
        .get("/api/v1/inventory")
        .add_query_param("q", "Csv Flour")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let items: Vec<Value> = response.json();
    assert_eq!(items[0]["current_quantity"], 7.5);
    assert_eq!(items[0]["supplier"], "Mill Co");

    // The import went through the ledger
    let response = server
        .get("/api/v1/inventory/transactions")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let transactions: Vec<Value> = response.json();
    let import_row = transactions
        .iter()
        .find(|t| t["item_name"] == "Csv Flour")
        .unwrap();
    assert_eq!(import_row["source"], "inventory_import");
    assert_eq!(import_row["previous_quantity"], 0.0);
    assert_eq!(import_row["new_quantity"], 7.5);

    // Bad headers are rejected up front
    let response = server
        .post("/api/v1/inventory/import-csv")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"csv": "item,amount\nFlour,3\n"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid inventory CSV headers");

    // Export round-trips the catalog as a CSV attachment
    let response = server
        .get("/api/v1/inventory/export-csv")
        .add_header(auth_name(), auth_value(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let text = response.text();
    assert!(text.starts_with("name,category,base_unit"));
    assert!(text.contains("Csv Flour"));

    Ok(())
}

#[tokio::test]
async fn test_recipe_csv_import_rejects_unknown_ingredient() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let token = login(&server, "admin").await;

    let header = "recipe_name,category,yield_amount,yield_unit,portion_size,instructions,\
                  ingredient_name,ingredient_quantity,ingredient_unit,ingredient_prep_note\n";

    let bad = format!(
        "{}Mystery Dish,Prep,2,L,,Stir well,Ghost Pepper,1,kg,\n",
        header
    );
    let response = server
        .post("/api/v1/recipes/import-csv")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"csv": bad}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unknown inventory item in CSV: Ghost Pepper");

    // Referencing a real item works and the recipe costs out
    let good = format!(
        "{}Roast Tomatoes,Prep,2,kg,,Roast at 180C,Tomato,4,kg,halved\n",
        header
    );
    let response = server
        .post("/api/v1/recipes/import-csv")
        .add_header(auth_name(), auth_value(&token))
        .json(&json!({"csv": good}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["imported_recipes"], 1);

    let response = server
        .get("/api/v1/recipes")
        .add_query_param("q", "Roast Tomatoes")
        .add_header(auth_name(), auth_value(&token))
        .await;
    let recipes: Vec<Value> = response.json();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0]["cost_total"], 12.8);

    Ok(())
}

#[tokio::test]
async fn test_user_management() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let admin_token = login(&server, "admin").await;

    let response = server
        .post("/api/v1/users")
        .add_header(auth_name(), auth_value(&admin_token))
        .json(&json!({
            "username": "runner1", "full_name": "Runner One",
            "password": "pw12345", "role": "prep"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let runner_id = response.json::<Value>()["id"].as_i64().unwrap();

    // Duplicate usernames are rejected
    let response = server
        .post("/api/v1/users")
        .add_header(auth_name(), auth_value(&admin_token))
        .json(&json!({
            "username": "runner1", "full_name": "Runner Two",
            "password": "pw12345", "role": "prep"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Username already exists");

    // The new account can log in
    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({"username": "runner1", "password": "pw12345"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let login_body: Value = response.json();
    assert_eq!(login_body["user"]["role"], "prep");
    let runner_token = login_body["token"].as_str().unwrap().to_string();

    // Deactivation locks out existing tokens
    let response = server
        .put(&format!("/api/v1/users/{}", runner_id))
        .add_header(auth_name(), auth_value(&admin_token))
        .json(&json!({"active": false}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get("/api/v1/auth/me")
        .add_header(auth_name(), auth_value(&runner_token))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // Staff picker only lists active accounts
    let response = server
        .get("/api/v1/staff")
        .add_header(auth_name(), auth_value(&admin_token))
        .await;
    let staff: Vec<Value> = response.json();
    assert!(staff.iter().all(|u| u["username"] != "runner1"));

    Ok(())
}

#[tokio::test]
async fn test_dashboard_and_analytics() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;
    let admin_token = login(&server, "admin").await;
    let prep_token = login(&server, "prep1").await;

    // Any authenticated role can read the dashboard
    let response = server
        .get("/api/v1/dashboard")
        .add_header(auth_name(), auth_value(&prep_token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let dashboard: Value = response.json();

    assert!(dashboard["today"].is_string());
    let daily = dashboard["prep_daily"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["title"], "Prep tomato sauce batch");
    assert_eq!(daily[0]["recipe_name"], "Tomato Basil Sauce");

    // Seeded pantry has exactly three low items, lowest stock first
    let low = dashboard["low_items"].as_array().unwrap();
    assert_eq!(low.len(), 3);
    assert_eq!(low[0]["name"], "Basil");
    assert_eq!(low[1]["name"], "Heavy Cream");
    assert_eq!(low[2]["name"], "Garlic");

    // No plan yet, so no production list or shortages
    assert_eq!(dashboard["production_list"].as_array().unwrap().len(), 0);
    assert_eq!(dashboard["shortages"].as_array().unwrap().len(), 0);

    // Record some waste, then check it shows up in analytics
    let response = server
        .get("/api/v1/inventory?q=Tomato")
        .add_header(auth_name(), auth_value(&admin_token))
        .await;
    let items: Vec<Value> = response.json();
    let tomato_id = items[0]["id"].as_i64().unwrap();

    let response = server
        .post(&format!("/api/v1/inventory/{}/adjust", tomato_id))
        .add_header(auth_name(), auth_value(&admin_token))
        .json(&json!({"change_quantity": -2.0, "reason": "waste"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get("/api/v1/analytics")
        .add_header(auth_name(), auth_value(&prep_token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let analytics: Value = response.json();

    let waste = analytics["waste_summary"].as_array().unwrap();
    assert_eq!(waste.len(), 1);
    assert_eq!(waste[0]["name"], "Tomato");
    assert_eq!(waste[0]["waste_qty"], 2.0);

    assert!(!analytics["top_low_items"].as_array().unwrap().is_empty());
    let breakdown = analytics["recipe_cost_breakdown"].as_array().unwrap();
    let sauce = breakdown
        .iter()
        .find(|r| r["recipe"] == "Tomato Basil Sauce")
        .unwrap();
    assert_eq!(sauce["cost"], 28.6);
    assert_eq!(sauce["yield"], "4 L");

    Ok(())
}

#[tokio::test]
async fn test_cors_headers() -> Result<()> {
    let (server, _db_file) = setup_test_server().await?;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://localhost:3001"),
        )
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers.get("access-control-allow-origin").is_some());

    Ok(())
}
