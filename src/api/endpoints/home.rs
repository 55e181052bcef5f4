//! `GET /`: liveness text.

pub async fn index() -> &'static str {
    "home"
}
