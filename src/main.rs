use std::{
    io::{self, Write},
    process,
    sync::Arc,
};

use serde::Serialize;
use sitequery::{
    application::{error::AppError, queries::PreparedQueries},
    cache::QueryCache,
    config::{self, Command, MatchArgs},
    domain::filters::SnippetFilter,
    infra::{
        assets::CoverDirectory, content::SnippetDataset, redirects::load_redirect_graph,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    let command = cli_args.command.unwrap_or(Command::Warm);

    telemetry::init(&settings.logging)?;

    let queries = build_queries(&settings.content)?;

    match command {
        Command::Covers => print_json(&*queries.cover_image_usage()?),
        Command::Types => print_json(&*queries.snippet_count_by_type()?),
        Command::Match(args) => print_json(&*queries.match_snippets(&filter_from_args(args))?),
        Command::Alternatives(args) => print_json(&*queries.page_alternative_urls(&args.slug)?),
        Command::Warm => {
            queries.warm()?;
            print_json(&queries.cache().stats())
        }
    }
}

fn build_queries(content: &config::ContentSettings) -> Result<PreparedQueries, AppError> {
    let snippets = SnippetDataset::load_json(&content.records_path)?;
    let covers = CoverDirectory::scan(&content.cover_dir, &content.cover_extensions)?;
    let redirects = load_redirect_graph(&content.redirects_path)?;

    info!(
        records = %content.records_path.display(),
        redirects = %content.redirects_path.display(),
        covers = %content.cover_dir.display(),
        "content loaded"
    );

    Ok(PreparedQueries::new(
        Arc::new(QueryCache::new()),
        Arc::new(snippets),
        Arc::new(covers),
        Arc::new(redirects),
    ))
}

fn filter_from_args(args: MatchArgs) -> SnippetFilter {
    SnippetFilter {
        language: args.language,
        tag: args.tag,
        kind: args.kind,
        primary: args.primary,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    write_json(io::stdout().lock(), value)
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|err| AppError::unexpected(format!("failed to write output: {err}")))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|err| AppError::unexpected(format!("failed to write output: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn write_json_appends_trailing_newline() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &["a", "b"]).expect("write json");

        let text = String::from_utf8(buffer).expect("utf8 output");
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn write_json_reports_closed_pipe() {
        let err = write_json(ClosedPipe, &["a"]).expect_err("closed pipe should fail");
        assert!(matches!(err, AppError::Unexpected(_)));
    }
}
