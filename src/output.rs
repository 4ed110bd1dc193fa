use std::io::{self, Write};

use serde::Serialize;

use crate::app::{LocateResult, ProgressEvent, ProgressSink, ResolveResult, RunsResult, UrlResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_resolve(result: &ResolveResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_runs(result: &RunsResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_urls(result: &UrlResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_locate(result: &LocateResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// One value per line on stdout; progress goes to the log.
pub struct TextOutput;

impl TextOutput {
    pub fn print_resolve(result: &ResolveResult) -> io::Result<()> {
        Self::print_lines([result.sra_id.as_str()])
    }

    pub fn print_runs(result: &RunsResult) -> io::Result<()> {
        let lines = result.runs.iter().map(|run| match run.layout {
            Some(layout) => format!("{}\t{layout}", run.accession),
            None => run.accession.clone(),
        });
        Self::print_lines(lines)
    }

    pub fn print_urls(result: &UrlResult) -> io::Result<()> {
        Self::print_lines(&result.urls)
    }

    pub fn print_locate(result: &LocateResult) -> io::Result<()> {
        Self::print_lines(result.runs.iter().flat_map(|run| run.urls.iter()))
    }

    fn print_lines<I>(lines: I) -> io::Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut stdout = io::stdout().lock();
        for line in lines {
            stdout.write_all(line.as_ref().as_bytes())?;
            stdout.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::info!(
                latency_ms = elapsed.as_millis() as u64,
                "{}",
                event.message
            ),
            None => tracing::info!("{}", event.message),
        }
    }
}
