use crate::types::{AppError, Result};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

pub const PAGE_TITLE: &str = "Crypto Teacher Response Generator";

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{title}}</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #1f2328; }
    textarea { width: 100%; min-height: 8rem; font: inherit; padding: .5rem; box-sizing: border-box; }
    button { margin-top: .75rem; padding: .5rem 1.25rem; font: inherit; cursor: pointer; }
    .info, .error { margin-top: 1.5rem; padding: 1rem; border-radius: .375rem; white-space: pre-wrap; }
    .info { background: #ddf4ff; border: 1px solid #54aeff; }
    .error { background: #ffebe9; border: 1px solid #ff8182; }
  </style>
</head>
<body>
  <h1>{{title}}</h1>
  <form method="post" action="/">
    <label for="query">Please enter your question</label>
    <textarea id="query" name="query">{{query}}</textarea>
    <button type="submit">Generate</button>
  </form>
  {{#if answer}}<div class="info">{{answer}}</div>{{/if}}
  {{#if error}}<div class="error">{{error}}</div>{{/if}}
</body>
</html>
"#;

/// Form body posted by the page.
#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Default, Serialize)]
pub struct PageData {
    pub title: &'static str,
    pub query: String,
    pub answer: Option<String>,
    pub error: Option<String>,
}

/// The single HTML page, compiled once at startup.
///
/// Handlebars escapes every `{{value}}`, so answers and questions are shown as
/// text, never interpreted as markup.
pub struct Pages {
    handlebars: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars
            .register_template_string("index", INDEX_TEMPLATE)
            .map_err(|e| AppError::Internal(format!("invalid page template: {}", e)))?;
        Ok(Self { handlebars })
    }

    pub fn render(&self, data: &PageData) -> Result<String> {
        self.handlebars
            .render("index", data)
            .map_err(|e| AppError::Internal(format!("Render error: {}", e)))
    }
}

/// GET / - the empty form
pub async fn show(State(state): State<AppState>) -> Result<Html<String>> {
    let page = state.pages.render(&PageData {
        title: PAGE_TITLE,
        ..Default::default()
    })?;
    Ok(Html(page))
}

/// POST / - run the pipeline and show the answer or the error
pub async fn submit(State(state): State<AppState>, Form(form): Form<QueryForm>) -> Response {
    let (status, data) = match state.pipeline.run(&form.query).await {
        Ok(answer) => (
            StatusCode::OK,
            PageData {
                title: PAGE_TITLE,
                query: form.query,
                answer: Some(answer),
                error: None,
            },
        ),
        Err(e) => {
            tracing::warn!(error = %e, "query failed");
            (
                e.status_code(),
                PageData {
                    title: PAGE_TITLE,
                    query: form.query,
                    answer: None,
                    error: Some(e.to_string()),
                },
            )
        }
    };

    match state.pages.render(&data) {
        Ok(page) => (status, Html(page)).into_response(),
        Err(e) => e.into_response(),
    }
}
