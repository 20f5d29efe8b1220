//! End-to-end tests of the HTTP surface over in-memory SQLite.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

fn withdrawal(material_id: i64, product_id: i64, level: &str, quantity: f64, at: &str) -> Value {
    json!({
        "material_id": material_id,
        "product_id": product_id,
        "level": level,
        "responsible_name": "Rosa Quispe",
        "quantity": quantity,
        "withdrawn_at": at,
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.get("/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
}

#[tokio::test]
async fn test_material_crud() {
    let app = TestApp::new().await;

    let response = app.post("/api/materials", json!({ "nombre": "Cobre" })).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let material = response.json();
    assert_eq!(material["name"], "Cobre");
    assert_eq!(material["active"], true);
    let id = material["id"].as_i64().unwrap();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/materials/{id}"),
            Some(json!({ "name": "Cobre fino" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["name"], "Cobre fino");

    let response = app
        .request(Method::DELETE, &format!("/api/materials/{id}"), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());

    let listed = app.get("/api/materials").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let listed = app.get("/api/materials?all=true").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_material_is_bad_request() {
    let app = TestApp::new().await;
    app.post("/api/materials", json!({ "name": "Madera" })).await;

    let response = app.post("/api/materials", json!({ "name": "Madera" })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].as_str().unwrap().contains("Madera"));
}

#[tokio::test]
async fn test_blank_material_name_is_bad_request() {
    let app = TestApp::new().await;
    let response = app.post("/api/materials", json!({ "name": "   " })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/exit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"material_id\": "))
        .unwrap();

    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].is_string());
}

#[tokio::test]
async fn test_withdrawal_codes_are_sequential_per_material() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;

    let mut codes = Vec::new();
    for i in 0..3 {
        let response = app
            .post(
                "/api/exit",
                withdrawal(material_id, product_id, "1200", 1.0 + i as f64, "2024-02-05T10:00:00"),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        codes.push(response.json()["code"].as_str().unwrap().to_string());
    }

    assert_eq!(codes, vec!["COB-0001", "COB-0002", "COB-0003"]);
}

#[tokio::test]
async fn test_withdrawal_accepts_spanish_field_names() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Explosivos", "Dinamita", "kg").await;

    let response = app
        .post(
            "/api/exit",
            json!({
                "material_id": material_id,
                "producto_id": product_id,
                "nivel": "900",
                "responsable_nombre": "Juan Mamani",
                "cantidad": 12.5,
                "trabajador": "Luis",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["code"], "EXP-0001");
    assert_eq!(body["level"], "900");
    assert_eq!(body["worker"], "Luis");
    assert_eq!(body["unit"], "kg");
}

#[tokio::test]
async fn test_withdrawal_get_update_delete() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;

    let created = app
        .post(
            "/api/exit",
            withdrawal(material_id, product_id, "1200", 4.0, "2024-02-05T10:00:00"),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let response = app.get(&format!("/api/exit/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["material"], "Cobre");

    let response = app
        .request(
            Method::PUT,
            &format!("/api/exit/{id}"),
            Some(withdrawal(material_id, product_id, "1300", 6.0, "2024-02-05T10:00:00")),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let updated = response.json();
    assert_eq!(updated["level"], "1300");
    assert_eq!(updated["code"], created["code"]);

    let response = app
        .request(Method::DELETE, &format!("/api/exit/{id}"), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.get(&format!("/api/exit/{id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let listed = app.get("/api/exit?all=true").await.json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_withdrawal_with_foreign_product_is_bad_request() {
    let app = TestApp::new().await;
    let (copper, _) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;
    let (_, wood_plank) = app.seed_catalog("Madera", "Tabla", "unidad").await;

    let response = app
        .post(
            "/api/exit",
            withdrawal(copper, wood_plank, "1200", 1.0, "2024-02-05T10:00:00"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let listed = app.get("/api/exit?all=true").await.json();
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_withdrawal_with_unknown_material_is_bad_request() {
    let app = TestApp::new().await;
    let (_, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;

    let response = app
        .post(
            "/api/exit",
            withdrawal(999, product_id, "1200", 1.0, "2024-02-05T10:00:00"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_quantity_is_bad_request() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;

    let response = app
        .post(
            "/api/exit",
            withdrawal(material_id, product_id, "1200", -2.0, "2024-02-05T10:00:00"),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"]
        .as_str()
        .unwrap()
        .contains("negative"));
}

#[tokio::test]
async fn test_assign_code_endpoint() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Acero", "Barra", "unidad").await;

    let created = app
        .post(
            "/api/exit",
            withdrawal(material_id, product_id, "1200", 2.0, "2024-02-05T10:00:00"),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();

    let response = app
        .request(Method::POST, &format!("/api/exit/{id}/code"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["code"], "ACE-0002");

    let response = app.request(Method::POST, "/api/exit/999/code", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_monthly_total_report_is_pdf_attachment() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;
    for quantity in [2.0, 3.0] {
        app.post(
            "/api/exit",
            withdrawal(material_id, product_id, "1200", quantity, "2024-02-05T10:00:00"),
        )
        .await;
    }

    let response = app.get("/api/reportes/mensual-total/2024-02").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=reporte_mensual_total_2024-02.pdf"
    );
    assert!(response.body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_monthly_level_report() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;
    app.post(
        "/api/exit",
        withdrawal(material_id, product_id, "1200", 2.0, "2024-02-05T10:00:00"),
    )
    .await;

    let response = app.get("/api/reportes/mensual/2024-02/1200").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=reporte_mensual_2024-02_nivel_1200.pdf"
    );

    let response = app.get("/api/reportes/mensual-total/2024-02/900").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_year_month_is_bad_request() {
    let app = TestApp::new().await;

    let response = app.get("/api/reportes/mensual/2024-13").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/api/reportes/mensual-total/febrero").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_month_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/api/reportes/mensual/2024-02").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["message"]
        .as_str()
        .unwrap()
        .contains("2024-02"));
}

#[tokio::test]
async fn test_daily_report_and_listing_cover_today() {
    let app = TestApp::new().await;

    let response = app.get("/api/reporte-dia").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;
    let response = app
        .post(
            "/api/exit",
            json!({
                "material_id": material_id,
                "product_id": product_id,
                "level": "1200",
                "responsible_name": "Rosa Quispe",
                "quantity": 1.5,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let today = app.get("/api/exit").await.json();
    assert_eq!(today.as_array().unwrap().len(), 1);

    let response = app.get("/api/reporte-dia").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .header(header::CONTENT_DISPOSITION)
        .starts_with("attachment; filename=reporte_"));
    assert!(response.body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_malformed_path_and_query_are_json_errors() {
    let app = TestApp::new().await;

    for uri in ["/api/exit/abc", "/api/exit?all=yes", "/api/materials?all=maybe"] {
        let response = app.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(response
            .header(header::CONTENT_TYPE)
            .starts_with("application/json"));
        assert!(response.json()["message"].is_string(), "{uri}");
    }

    let response = app
        .request(Method::DELETE, "/api/products/not-a-number", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.json()["message"].is_string());
}

#[tokio::test]
async fn test_update_of_deleted_withdrawal_is_not_found() {
    let app = TestApp::new().await;
    let (material_id, product_id) = app.seed_catalog("Cobre", "Cable 10mm", "m").await;

    let created = app
        .post(
            "/api/exit",
            withdrawal(material_id, product_id, "1200", 4.0, "2024-02-05T10:00:00"),
        )
        .await
        .json();
    let id = created["id"].as_i64().unwrap();
    app.request(Method::DELETE, &format!("/api/exit/{id}"), None)
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/exit/{id}"),
            Some(withdrawal(material_id, product_id, "1300", 6.0, "2024-02-05T10:00:00")),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&format!("/api/exit/{id}")).await.status, StatusCode::NOT_FOUND);

    let mut body = withdrawal(material_id, product_id, "1300", 6.0, "2024-02-05T10:00:00");
    body["active"] = json!(true);
    let response = app
        .request(Method::PUT, &format!("/api/exit/{id}"), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["code"], created["code"]);
}

#[tokio::test]
async fn test_monthly_total_merges_products_sharing_a_name() {
    let app = TestApp::new().await;
    let (material_id, first) = app.seed_catalog("Cobre", "Cable", "kg").await;
    let second = app
        .post(
            "/api/products",
            json!({ "material_id": material_id, "name": "Cable", "unit": "kg" }),
        )
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    for (product_id, quantity) in [(first, 2.0), (second, 3.0)] {
        let response = app
            .post(
                "/api/exit",
                withdrawal(material_id, product_id, "1", quantity, "2024-02-05T10:00:00"),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = app.get("/api/reportes/mensual-total/2024-02").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.starts_with(b"%PDF"));
}
