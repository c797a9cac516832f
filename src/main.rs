#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # essay-grader
//!
//! Serves a single page where an instructor uploads a photo of a handwritten
//! essay, sets up a rubric, and gets a grade with feedback back from a
//! vision-language model.
//!
//! Set `OPENAI_API_KEY` in the environment or in a `.env` file, then run
//! `essay-grader` and open the printed address.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use essay_grader::{
    Grader, OpenAiVision, config,
    web::{self, AppState},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Command line options.
#[derive(Debug, Clone)]
struct Options {
    /// Address to serve the form on, overriding `ESSAY_GRADER_BIND`.
    bind: Option<SocketAddr>,
}

/// Parse the command line arguments.
fn options() -> Options {
    let bind = long("bind")
        .short('b')
        .help("Address to serve the grading form on, e.g. 127.0.0.1:8501")
        .argument::<SocketAddr>("ADDR")
        .optional();

    construct!(Options { bind })
        .to_options()
        .descr("Grade handwritten essays against a rubric with a vision-language model")
        .run()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let opts = options();

    let cfg = config::ensure_initialized()?;
    let openai = config::openai_config().context("Cannot start without OpenAI credentials")?;
    let addr = match opts.bind {
        Some(addr) => addr,
        None => cfg.bind_addr()?,
    };

    let model = OpenAiVision::new(openai, cfg.http_client());
    let grader = Grader::new(Arc::new(model), cfg.pricing());
    tracing::info!(model = grader.model_name(), "grader ready");

    web::serve(addr, AppState::new(grader)).await
}
