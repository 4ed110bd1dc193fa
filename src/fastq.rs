use crate::config::{ClientConfig, DEFAULT_MIRROR_ROOT};
use crate::domain::{FileNaming, LibraryLayout, RunAccession};
use crate::error::SraError;

const PREFIX_DIR_LEN: usize = 6;
const BUCKET_START: usize = 9;

/// Derives ENA mirror URLs for the FASTQ files of a run. No I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqUrlBuilder {
    mirror_root: String,
    naming: FileNaming,
}

impl Default for FastqUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIRROR_ROOT, FileNaming::Wildcard)
    }
}

impl FastqUrlBuilder {
    pub fn new(mirror_root: &str, naming: FileNaming) -> Self {
        Self {
            mirror_root: mirror_root.trim_end_matches('/').to_string(),
            naming,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.mirror_root, config.naming)
    }

    pub fn naming(&self) -> FileNaming {
        self.naming
    }

    /// `{root}/{first six chars}[/{bucket}]/{accession}`.
    ///
    /// Accessions longer than nine characters live in a sub-bucket named
    /// after the digits past position nine, zero-padded to three places.
    pub fn run_directory(&self, accession: &RunAccession) -> Result<String, SraError> {
        let acc = accession.as_str();
        if acc.len() < PREFIX_DIR_LEN {
            return Err(SraError::InvalidAccession(acc.to_string()));
        }
        let mut dir = format!("{}/{}", self.mirror_root, &acc[..PREFIX_DIR_LEN]);
        if let Some(bucket) = sub_bucket(acc)? {
            dir.push('/');
            dir.push_str(&bucket);
        }
        dir.push('/');
        dir.push_str(acc);
        Ok(dir)
    }

    /// Wildcard URL for a run, regardless of the configured naming. Use
    /// [`FastqUrlBuilder::build`] for URLs under the configured naming.
    pub fn build_url(&self, accession: &str) -> Result<String, SraError> {
        let accession: RunAccession = accession.parse()?;
        Ok(format!("{}/*.fastq.gz", self.run_directory(&accession)?))
    }

    /// URLs for a run under the configured naming. Wildcard naming ignores
    /// `layout`; explicit naming requires it.
    pub fn build(
        &self,
        accession: &str,
        layout: Option<LibraryLayout>,
    ) -> Result<Vec<String>, SraError> {
        let accession: RunAccession = accession.parse()?;
        let dir = self.run_directory(&accession)?;
        let acc = accession.as_str();
        match self.naming {
            FileNaming::Wildcard => Ok(vec![format!("{dir}/*.fastq.gz")]),
            FileNaming::Explicit => match layout {
                Some(LibraryLayout::Single) => Ok(vec![format!("{dir}/{acc}.fastq.gz")]),
                Some(LibraryLayout::Paired) => Ok(vec![
                    format!("{dir}/{acc}_1.fastq.gz"),
                    format!("{dir}/{acc}_2.fastq.gz"),
                ]),
                None => Err(SraError::MissingLayout(acc.to_string())),
            },
        }
    }
}

fn sub_bucket(acc: &str) -> Result<Option<String>, SraError> {
    if acc.len() <= BUCKET_START {
        return Ok(None);
    }
    let suffix = &acc[BUCKET_START..];
    if !suffix.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(SraError::InvalidAccession(acc.to_string()));
    }
    let value: u64 = suffix
        .parse()
        .map_err(|_| SraError::InvalidAccession(acc.to_string()))?;
    Ok(Some(format!("{value:03}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_bucket_pads_suffix() {
        assert_eq!(sub_bucket("SRR000001").unwrap(), None);
        assert_eq!(sub_bucket("SRR1234567").unwrap().as_deref(), Some("007"));
        assert_eq!(sub_bucket("SRR10971381").unwrap().as_deref(), Some("081"));
        assert_eq!(sub_bucket("SRR123456789").unwrap().as_deref(), Some("789"));
    }

    #[test]
    fn sub_bucket_rejects_letters() {
        assert!(sub_bucket("SRR123456X").is_err());
    }
}
