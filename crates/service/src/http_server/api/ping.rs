pub async fn handler() -> &'static str {
    "pong"
}
