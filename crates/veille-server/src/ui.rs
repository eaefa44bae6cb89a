//! Single-page browser UI for the article search.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("ui/index.html");

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
