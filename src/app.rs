use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::{LibraryLayout, SraId};
use crate::error::SraError;
use crate::eutils::SraClient;
use crate::fastq::FastqUrlBuilder;

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResult {
    pub term: String,
    pub sra_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunsResult {
    pub sra_id: String,
    pub runs: Vec<RunEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunEntry {
    pub accession: String,
    pub layout: Option<LibraryLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlResult {
    pub accession: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocateResult {
    pub term: String,
    pub sra_id: String,
    pub runs: Vec<RunUrls>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunUrls {
    pub accession: String,
    pub layout: Option<LibraryLayout>,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Caller-side composition of search, run listing and URL derivation.
#[derive(Clone)]
pub struct Locator<C: SraClient> {
    client: C,
    builder: FastqUrlBuilder,
}

impl<C: SraClient> Locator<C> {
    pub fn new(client: C, builder: FastqUrlBuilder) -> Self {
        Self { client, builder }
    }

    pub fn resolve(&self, term: &str, sink: &dyn ProgressSink) -> Result<ResolveResult, SraError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; searching {term}"),
            elapsed: None,
        });
        let start = Instant::now();
        let id = self.client.resolve(term)?;
        sink.event(ProgressEvent {
            message: format!("esearch.response id={id}"),
            elapsed: Some(start.elapsed()),
        });
        Ok(ResolveResult {
            term: term.to_string(),
            sra_id: id.as_str().to_string(),
        })
    }

    pub fn runs(&self, id: &SraId, sink: &dyn ProgressSink) -> Result<RunsResult, SraError> {
        sink.event(ProgressEvent {
            message: format!("phase=Runs; listing runs of {id}"),
            elapsed: None,
        });
        let start = Instant::now();
        let records = self.client.list_run_records(id)?;
        sink.event(ProgressEvent {
            message: format!("esummary.response runs={}", records.len()),
            elapsed: Some(start.elapsed()),
        });
        Ok(RunsResult {
            sra_id: id.as_str().to_string(),
            runs: records
                .into_iter()
                .map(|record| RunEntry {
                    accession: record.accession,
                    layout: record.layout,
                })
                .collect(),
        })
    }

    pub fn urls(
        &self,
        accession: &str,
        layout: Option<LibraryLayout>,
    ) -> Result<UrlResult, SraError> {
        Ok(UrlResult {
            accession: accession.trim().to_string(),
            urls: self.builder.build(accession, layout)?,
        })
    }

    pub fn locate(&self, term: &str, sink: &dyn ProgressSink) -> Result<LocateResult, SraError> {
        let resolved = self.resolve(term, sink)?;
        let id: SraId = resolved.sra_id.parse()?;
        let listed = self.runs(&id, sink)?;

        sink.event(ProgressEvent {
            message: format!("phase=Urls; naming={}", self.builder.naming()),
            elapsed: None,
        });
        let runs = listed
            .runs
            .into_iter()
            .map(|run| {
                let urls = self.builder.build(&run.accession, run.layout)?;
                Ok(RunUrls {
                    accession: run.accession,
                    layout: run.layout,
                    urls,
                })
            })
            .collect::<Result<Vec<_>, SraError>>()?;

        Ok(LocateResult {
            term: resolved.term,
            sra_id: resolved.sra_id,
            runs,
        })
    }
}
