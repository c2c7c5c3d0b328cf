//! Static HTML pages.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const HISTORY_HTML: &str = include_str!("../../assets/history.html");

pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(super) async fn history() -> Html<&'static str> {
    Html(HISTORY_HTML)
}
