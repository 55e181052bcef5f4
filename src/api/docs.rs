//! OpenAPI document and Swagger UI page served under `/api-docs`.

use axum::response::Html;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::config::{APP_NAME, APP_VERSION};

fn id_query(description: &str) -> Value {
    json!([{
        "name": "id",
        "in": "query",
        "required": true,
        "description": description,
        "schema": { "type": "string", "format": "uuid" }
    }])
}

fn json_body(properties: Value) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": { "type": "object", "properties": properties } } }
    })
}

fn multipart_body(properties: Value) -> Value {
    json!({
        "required": true,
        "content": { "multipart/form-data": { "schema": { "type": "object", "properties": properties } } }
    })
}

fn login_body() -> Value {
    json_body(json!({
        "googleAccessToken": { "type": "string" },
        "role": { "type": "string", "enum": ["patient", "doctor"] }
    }))
}

fn files_property() -> Value {
    json!({ "type": "array", "items": { "type": "string", "format": "binary" } })
}

/// OpenAPI 3.0 description of the HTTP surface.
pub fn openapi_document() -> Value {
    let paths: Vec<(&str, Value)> = vec![
        ("/doctors/login", json!({ "post": {
            "tags": ["Doctors"], "summary": "Doctor login with Google OAuth token",
            "requestBody": login_body(),
            "responses": {
                "200": { "description": "Doctor found" },
                "212": { "description": "Doctor created" },
                "400": { "description": "Invalid access token" }
            }
        }})),
        ("/doctors/patients", json!({ "get": {
            "tags": ["Doctors"], "summary": "Doctor with patients and requests expanded",
            "parameters": id_query("Doctor id"),
            "responses": { "200": { "description": "Doctor" }, "400": { "description": "Missing or unknown id" } }
        }})),
        ("/doctors/accept", json!({ "post": {
            "tags": ["Doctors"], "summary": "Accept a patient's connection request",
            "requestBody": json_body(json!({ "id": { "type": "string" } })),
            "responses": {
                "200": { "description": "Request Accepted" },
                "400": { "description": "No Request Found, Already Accepted or missing id" }
            }
        }})),
        ("/patients/login", json!({ "post": {
            "tags": ["Patients"], "summary": "Patient login with Google OAuth token",
            "requestBody": login_body(),
            "responses": {
                "200": { "description": "Patient found" },
                "212": { "description": "Patient must register" },
                "400": { "description": "Invalid access token" }
            }
        }})),
        ("/patients/register", json!({ "post": {
            "tags": ["Patients"], "summary": "Register a patient health profile",
            "requestBody": json_body(json!({ "data": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" }, "email": { "type": "string" },
                    "photo": { "type": "string" }, "token": { "type": "string" },
                    "age": { "type": "number" }, "gender": { "type": "string" },
                    "height": { "type": "number" }, "weight": { "type": "number" },
                    "allergies": { "type": "string" }, "otherConditions": { "type": "string" },
                    "medications": { "type": "string" }, "overview": { "type": "string" }
                }
            }})),
            "responses": { "200": { "description": "Registered Successfully" }, "400": { "description": "Empty registration" } }
        }})),
        ("/patients/healthHistory", json!({ "get": {
            "tags": ["Patients"], "summary": "Patient with visits and doctors expanded",
            "parameters": id_query("Patient id"),
            "responses": { "200": { "description": "Patient" }, "400": { "description": "Missing or unknown id" } }
        }})),
        ("/patients/healthHistoryForm", json!({ "post": {
            "tags": ["Patients"], "summary": "Record a visit",
            "requestBody": multipart_body(json!({
                "id": { "type": "string" }, "date": { "type": "string", "format": "date" },
                "doctorComments": { "type": "string" }, "patientComments": { "type": "string" },
                "doctorName": { "type": "string" }, "files": files_property()
            })),
            "responses": { "200": { "description": "Created visit" }, "400": { "description": "Missing id or upload failure" } }
        }})),
        ("/patients/prescription", json!({ "get": {
            "tags": ["Patients"], "summary": "Patient with prescriptions expanded",
            "parameters": id_query("Patient id"),
            "responses": { "200": { "description": "Patient" }, "400": { "description": "Missing or unknown id" } }
        }})),
        ("/patients/prescription-form", json!({ "post": {
            "tags": ["Patients"], "summary": "Upload a prescription; images are OCR'd and summarized",
            "requestBody": multipart_body(json!({
                "id": { "type": "string" }, "date": { "type": "string", "format": "date" },
                "medications": { "type": "string" }, "prescriptionComments": { "type": "string" },
                "files": files_property()
            })),
            "responses": { "200": { "description": "Created prescription" }, "400": { "description": "Missing id, no files or enrichment failure" } }
        }})),
        ("/patients/test", json!({ "get": {
            "tags": ["Patients"], "summary": "Patient with tests expanded",
            "parameters": id_query("Patient id"),
            "responses": { "200": { "description": "Patient" }, "400": { "description": "Missing or unknown id" } }
        }})),
        ("/patients/test-form", json!({ "post": {
            "tags": ["Patients"], "summary": "Upload a test result; images are OCR'd and summarized",
            "requestBody": multipart_body(json!({
                "id": { "type": "string" }, "date": { "type": "string", "format": "date" },
                "testName": { "type": "string" }, "testComments": { "type": "string" },
                "files": files_property()
            })),
            "responses": { "200": { "description": "Created test" }, "400": { "description": "Missing id or enrichment failure" } }
        }})),
        ("/patients/visits", json!({ "get": {
            "tags": ["Patients"], "summary": "A visit by id",
            "parameters": id_query("Visit id"),
            "responses": { "200": { "description": "Visit" }, "400": { "description": "Missing or unknown id" } }
        }})),
        ("/patients/request-doctor", json!({ "post": {
            "tags": ["Patients"], "summary": "Ask a doctor to connect",
            "requestBody": json_body(json!({ "id": { "type": "string" }, "doctorEmail": { "type": "string" } })),
            "responses": {
                "200": { "description": "Request created" },
                "212": { "description": "Not applied: unknown party, already requested or already a patient" }
            }
        }})),
        ("/payments/create_payment_intent", json!({ "post": {
            "tags": ["Payments"], "summary": "Create the consultation payment intent",
            "responses": { "200": { "description": "clientSecret" }, "500": { "description": "Provider error" } }
        }})),
        ("/meet/get_token", json!({ "get": {
            "tags": ["Meet"], "summary": "Signed meeting token, valid 120 minutes",
            "responses": { "200": { "description": "token" }, "500": { "description": "Signing error" } }
        }})),
        ("/gpt", json!({ "post": {
            "tags": ["GPT"], "summary": "Chat-completion passthrough",
            "requestBody": json_body(json!({ "messages": {
                "type": "array",
                "items": { "type": "object", "properties": {
                    "role": { "type": "string" }, "content": { "type": "string" }
                }}
            }})),
            "responses": { "200": { "description": "Provider response" }, "500": { "description": "Provider error" } }
        }})),
    ];
    let paths: Map<String, Value> = paths
        .into_iter()
        .map(|(path, item)| (path.to_string(), item))
        .collect();

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": format!("{APP_NAME} API Documentation"),
            "version": APP_VERSION,
            "description": "Patients, doctors, visits, prescriptions and test results."
        },
        "tags": [
            { "name": "Doctors" }, { "name": "Patients" }, { "name": "Payments" },
            { "name": "Meet" }, { "name": "GPT" }
        ],
        "paths": paths
    })
}

pub async fn openapi_json() -> Json<Value> {
    Json(openapi_document())
}

const SWAGGER_UI_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>API Documentation</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/api-docs/openapi.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI_PAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = openapi_document();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/doctors/login",
            "/doctors/patients",
            "/doctors/accept",
            "/patients/login",
            "/patients/register",
            "/patients/healthHistory",
            "/patients/healthHistoryForm",
            "/patients/prescription",
            "/patients/prescription-form",
            "/patients/test",
            "/patients/test-form",
            "/patients/visits",
            "/patients/request-doctor",
            "/payments/create_payment_intent",
            "/meet/get_token",
            "/gpt",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert_eq!(doc["openapi"], "3.0.0");
    }

    #[test]
    fn ui_points_at_document() {
        assert!(SWAGGER_UI_PAGE.contains("/api-docs/openapi.json"));
        assert!(SWAGGER_UI_PAGE.contains(r##"dom_id: "#swagger-ui""##));
        assert!(SWAGGER_UI_PAGE.trim_end().ends_with("</html>"));
    }
}
