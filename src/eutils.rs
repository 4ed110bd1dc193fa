use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{LibraryLayout, RunRecord, SraId};
use crate::error::SraError;

const SEARCH_ENDPOINT: &str = "esearch.fcgi";
const SUMMARY_ENDPOINT: &str = "esummary.fcgi";
const SRA_DB: &str = "sra";
const LAYOUT_TAG: &[u8] = b"LIBRARY_LAYOUT";

/// Lookups against the SRA metadata service. One request per call, no retries.
pub trait SraClient: Send + Sync {
    /// Search term to the single numeric id it matches.
    fn resolve(&self, term: &str) -> Result<SraId, SraError>;

    /// Run accessions of an entry, in archive order.
    fn list_runs(&self, id: &SraId) -> Result<Vec<String>, SraError>;

    /// Like [`SraClient::list_runs`], with the library layout attached when
    /// layout lookup is enabled.
    fn list_run_records(&self, id: &SraId) -> Result<Vec<RunRecord>, SraError>;
}

#[derive(Clone)]
pub struct EutilsHttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    include_layout: bool,
}

impl EutilsHttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, SraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sra-locator/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| SraError::Transport(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|err| SraError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.eutils_url.trim_end_matches('/').to_string(),
            api_key: config.api_key().map(str::to_string),
            include_layout: config.include_layout,
        })
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, SraError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.client.get(&url).query(params);
        if let Some(api_key) = &self.api_key {
            request = request.query(&[("api_key", api_key.as_str())]);
        }
        let response = request
            .send()
            .map_err(|err| SraError::Transport(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| SraError::Transport(err.to_string()))
    }

    fn handle_status(response: Response) -> Result<Response, SraError> {
        if response.status() == StatusCode::OK {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "SRA request failed".to_string());
        Err(SraError::HttpStatus { status, message })
    }

    fn summary(&self, id: &SraId) -> Result<String, SraError> {
        debug!(id = %id, "fetching SRA summary");
        self.get(
            SUMMARY_ENDPOINT,
            &[("db", SRA_DB), ("id", id.as_str()), ("retmode", "json")],
        )
    }
}

impl SraClient for EutilsHttpClient {
    fn resolve(&self, term: &str) -> Result<SraId, SraError> {
        debug!(term, "searching SRA");
        let body = self.get(
            SEARCH_ENDPOINT,
            &[("db", SRA_DB), ("retmode", "json"), ("term", term)],
        )?;
        let ids = parse_search_ids(&body)?;
        debug!(term, count = ids.len(), "search returned ids");
        single_id(term, &ids)
    }

    fn list_runs(&self, id: &SraId) -> Result<Vec<String>, SraError> {
        let body = self.summary(id)?;
        let runs = parse_run_accessions(&body, id)?;
        debug!(id = %id, count = runs.len(), "parsed run accessions");
        Ok(runs)
    }

    fn list_run_records(&self, id: &SraId) -> Result<Vec<RunRecord>, SraError> {
        let body = self.summary(id)?;
        let records = parse_run_records(&body, id, self.include_layout)?;
        debug!(id = %id, count = records.len(), "parsed run records");
        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    esearchresult: SearchResult,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    idlist: Vec<String>,
}

pub fn parse_search_ids(body: &str) -> Result<Vec<String>, SraError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|err| SraError::BadResponse(format!("search result: {err}")))?;
    Ok(response.esearchresult.idlist)
}

pub fn single_id(term: &str, ids: &[String]) -> Result<SraId, SraError> {
    match ids {
        [] => Err(SraError::NotFound(term.to_string())),
        [id] => id
            .parse()
            .map_err(|_| SraError::BadResponse(format!("search returned non-numeric id {id}"))),
        _ => Err(SraError::AmbiguousResult {
            term: term.to_string(),
            count: ids.len(),
        }),
    }
}

pub fn parse_run_accessions(body: &str, id: &SraId) -> Result<Vec<String>, SraError> {
    let entry = summary_entry(body, id)?;
    run_accessions(summary_field(&entry, "runs")?)
}

pub fn parse_run_records(
    body: &str,
    id: &SraId,
    include_layout: bool,
) -> Result<Vec<RunRecord>, SraError> {
    let entry = summary_entry(body, id)?;
    let accessions = run_accessions(summary_field(&entry, "runs")?)?;
    let layout = if include_layout {
        Some(parse_library_layout(summary_field(&entry, "expxml")?)?)
    } else {
        None
    };
    Ok(accessions
        .into_iter()
        .map(|accession| RunRecord { accession, layout })
        .collect())
}

/// Reads the layout from an escaped experiment XML fragment: the tag of the
/// first child of the first `LIBRARY_LAYOUT` element.
pub fn parse_library_layout(fragment: &str) -> Result<LibraryLayout, SraError> {
    let xml = wrap_fragment("expxml", fragment)?;
    let mut reader = Reader::from_str(&xml);
    let mut depth = 0usize;
    let mut layout_depth: Option<usize> = None;
    let mut layout_tag: Option<String> = None;
    let mut seen_layout = false;

    loop {
        let (element, is_empty) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if layout_depth == Some(depth) {
                    layout_depth = None;
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(err) => return Err(SraError::BadResponse(format!("expxml: {err}"))),
        };

        if let Some(parent) = layout_depth {
            if depth == parent + 1 && layout_tag.is_none() {
                layout_tag = Some(String::from_utf8_lossy(element.name().as_ref()).to_string());
            }
        } else if !seen_layout && element.name().as_ref() == LAYOUT_TAG {
            seen_layout = true;
            if !is_empty {
                layout_depth = Some(depth);
            }
        }
        if !is_empty {
            depth += 1;
        }
    }

    if depth != 0 {
        return Err(SraError::BadResponse("expxml: unclosed element".to_string()));
    }
    if !seen_layout {
        return Err(SraError::BadResponse(
            "expxml has no LIBRARY_LAYOUT element".to_string(),
        ));
    }
    let tag = layout_tag
        .ok_or_else(|| SraError::BadResponse("LIBRARY_LAYOUT has no child element".to_string()))?;
    LibraryLayout::from_tag(&tag)
        .ok_or_else(|| SraError::BadResponse(format!("unknown library layout {tag}")))
}

fn summary_entry(body: &str, id: &SraId) -> Result<Value, SraError> {
    let mut value: Value = serde_json::from_str(body)
        .map_err(|err| SraError::BadResponse(format!("summary result: {err}")))?;
    value
        .get_mut("result")
        .and_then(|result| result.get_mut(id.as_str()))
        .map(Value::take)
        .ok_or_else(|| SraError::BadResponse(format!("summary has no entry for id {id}")))
}

fn summary_field<'a>(entry: &'a Value, field: &str) -> Result<&'a str, SraError> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| SraError::BadResponse(format!("summary entry is missing `{field}`")))
}

/// The fragment is not a document on its own, so it gets a synthetic root.
/// Entities resolve with HTML5 rules (`escape-html`).
fn wrap_fragment(root: &str, fragment: &str) -> Result<String, SraError> {
    let unescaped =
        unescape(fragment).map_err(|err| SraError::BadResponse(format!("{root}: {err}")))?;
    Ok(format!("<{root}>{unescaped}</{root}>"))
}

fn run_accessions(fragment: &str) -> Result<Vec<String>, SraError> {
    let xml = wrap_fragment("runs", fragment)?;
    let mut reader = Reader::from_str(&xml);
    let mut depth = 0usize;
    let mut accessions = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 1 {
                    accessions.push(run_accession(&e)?);
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 1 {
                    accessions.push(run_accession(&e)?);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(SraError::BadResponse(format!("runs: {err}"))),
        }
    }

    if depth != 0 {
        return Err(SraError::BadResponse("runs: unclosed element".to_string()));
    }
    Ok(accessions)
}

fn run_accession(element: &BytesStart<'_>) -> Result<String, SraError> {
    let attr = element
        .try_get_attribute("acc")
        .map_err(|err| SraError::BadResponse(format!("runs: {err}")))?
        .ok_or_else(|| {
            SraError::BadResponse(format!(
                "run element <{}> has no acc attribute",
                String::from_utf8_lossy(element.name().as_ref())
            ))
        })?;
    let value = attr
        .unescape_value()
        .map_err(|err| SraError::BadResponse(format!("runs: {err}")))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(SraError::BadResponse(
            "run element has an empty acc attribute".to_string(),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn runs_fragment_keeps_document_order() {
        let fragment = "&lt;Run acc=&quot;SRR2&quot;/&gt;&lt;Run acc=&quot;SRR1&quot;&gt;&lt;/Run&gt;";
        let runs = run_accessions(fragment).unwrap();
        assert_eq!(runs, vec!["SRR2", "SRR1"]);
    }

    #[test]
    fn runs_fragment_ignores_nested_elements() {
        let fragment = r#"<Run acc="SRR1"><Stat acc="nested"/></Run>"#;
        assert_eq!(run_accessions(fragment).unwrap(), vec!["SRR1"]);
    }

    #[test]
    fn runs_fragment_without_acc_is_rejected() {
        let err = run_accessions(r#"<Run total_spots="10"/>"#).unwrap_err();
        assert_matches!(err, SraError::BadResponse(_));
    }

    #[test]
    fn unclosed_runs_fragment_is_rejected() {
        let err = run_accessions(r#"<Run acc="SRR1">"#).unwrap_err();
        assert_matches!(err, SraError::BadResponse(_));
    }

    #[test]
    fn single_id_cardinality() {
        assert_matches!(single_id("x", &[]), Err(SraError::NotFound(_)));
        assert_matches!(
            single_id("x", &["1".to_string(), "2".to_string()]),
            Err(SraError::AmbiguousResult { count: 2, .. })
        );
        assert_eq!(single_id("x", &["42".to_string()]).unwrap().as_str(), "42");
    }

    #[test]
    fn layout_requires_child() {
        let err = parse_library_layout("<LIBRARY_LAYOUT/>").unwrap_err();
        assert_matches!(err, SraError::BadResponse(_));
    }
}
