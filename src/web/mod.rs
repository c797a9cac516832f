#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The grading form, served over HTTP.

/// Reading submitted form fields.
pub mod form;
/// HTML rendering.
pub mod page;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    response::Html,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use self::{
    form::{FormAction, FormState, ParsedForm, read_fields},
    page::PageView,
};
use crate::{grader::Grader, request::MAX_IMAGE_BYTES};

/// Largest accepted request body. It holds a fresh upload and the base64
/// copy of the attached image, each bounded by [`MAX_IMAGE_BYTES`].
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const _: () = assert!(MAX_IMAGE_BYTES / 3 * 4 + 4 + MAX_IMAGE_BYTES + 64 * 1024 < MAX_UPLOAD_BYTES);

/// State shared by the route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Grades submissions.
    grader: Grader,
}

impl AppState {
    /// Creates the handler state.
    pub fn new(grader: Grader) -> Self {
        Self { grader }
    }
}

/// Builds the router for the grading page.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Serves the grading page until the process is stopped.
#[instrument(skip(state))]
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Could not bind to {addr}"))?;
    info!("Essay grading form available at http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server stopped unexpectedly")
}

/// `GET /`: the empty form.
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&PageView {
        form: FormState::initial(),
        model: state.grader.model_name().to_string(),
        ..PageView::default()
    }))
}

/// `POST /`: add or remove a criterion, or grade the essay.
async fn submit(State(state): State<AppState>, multipart: Multipart) -> Html<String> {
    let read = read_fields(multipart).await;
    if let Some(err) = &read.error {
        warn!(error = %err, fields = read.fields.len(), "form submission was cut short");
    }
    let view = handle(&state.grader, ParsedForm::from_read(read)).await;
    Html(page::render(&view))
}

/// Applies a parsed submission and returns what the page should show.
///
/// The submitted values are always carried into the returned view, so a
/// failed grading call leaves the form as the user filled it in.
pub async fn handle(grader: &Grader, parsed: ParsedForm) -> PageView {
    let ParsedForm {
        mut state,
        action,
        problem,
    } = parsed;
    let mut view = PageView {
        model: grader.model_name().to_string(),
        ..PageView::default()
    };

    view.error = problem.as_ref().map(ToString::to_string);
    match action {
        FormAction::AddCriterion => state.rubric.push_placeholder(),
        FormAction::RemoveCriterion => {
            state.rubric.remove_last();
        }
        FormAction::Grade if problem.is_none() => match grader.grade(state.to_request()).await {
            Ok(outcome) => view.outcome = Some(outcome),
            Err(err) => view.error = Some(err.to_string()),
        },
        FormAction::Grade => {}
    }

    view.form = state;
    view
}
