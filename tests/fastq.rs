use assert_matches::assert_matches;

use sra_locator::domain::{FileNaming, LibraryLayout, RunAccession};
use sra_locator::error::SraError;
use sra_locator::fastq::FastqUrlBuilder;

#[test]
fn short_accession_has_no_sub_bucket() {
    let url = FastqUrlBuilder::default().build_url("SRR000001").unwrap();
    assert_eq!(url, "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/SRR000001/*.fastq.gz");
}

#[test]
fn ten_character_accession_gets_padded_bucket() {
    let url = FastqUrlBuilder::default().build_url("SRR0000123").unwrap();
    assert_eq!(
        url,
        "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR000/003/SRR0000123/*.fastq.gz"
    );
}

#[test]
fn eleven_character_accession_uses_two_digit_suffix() {
    let url = FastqUrlBuilder::default().build_url("SRR10971381").unwrap();
    assert_eq!(
        url,
        "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR109/081/SRR10971381/*.fastq.gz"
    );
}

#[test]
fn non_run_accession_is_rejected() {
    let err = FastqUrlBuilder::default().build_url("XYZ123").unwrap_err();
    assert_matches!(err, SraError::InvalidAccession(_));

    let err = FastqUrlBuilder::default()
        .build("ERR123456", Some(LibraryLayout::Single))
        .unwrap_err();
    assert_matches!(err, SraError::InvalidAccession(_));
}

#[test]
fn wildcard_naming_ignores_layout() {
    let builder = FastqUrlBuilder::new("ftp://mirror.example/fastq/", FileNaming::Wildcard);
    let urls = builder
        .build("SRR390728", Some(LibraryLayout::Paired))
        .unwrap();
    assert_eq!(
        urls,
        vec!["ftp://mirror.example/fastq/SRR390/SRR390728/*.fastq.gz"]
    );
    assert_eq!(builder.build("SRR390728", None).unwrap(), urls);
}

#[test]
fn build_url_stays_wildcard_under_explicit_naming() {
    let builder = FastqUrlBuilder::new("ftp://ftp.sra.ebi.ac.uk/vol1/fastq", FileNaming::Explicit);
    assert_eq!(
        builder.build_url("SRR390728").unwrap(),
        "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR390/SRR390728/*.fastq.gz"
    );
    assert_matches!(
        builder.build("SRR390728", None),
        Err(SraError::MissingLayout(_))
    );
}

#[test]
fn explicit_naming_single_end() {
    let builder = FastqUrlBuilder::new("ftp://ftp.sra.ebi.ac.uk/vol1/fastq", FileNaming::Explicit);
    let urls = builder
        .build("SRR390728", Some(LibraryLayout::Single))
        .unwrap();
    assert_eq!(
        urls,
        vec!["ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR390/SRR390728/SRR390728.fastq.gz"]
    );
}

#[test]
fn explicit_naming_paired_end() {
    let builder = FastqUrlBuilder::new("ftp://ftp.sra.ebi.ac.uk/vol1/fastq", FileNaming::Explicit);
    let urls = builder
        .build("SRR5163597", Some(LibraryLayout::Paired))
        .unwrap();
    assert_eq!(
        urls,
        vec![
            "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR516/007/SRR5163597/SRR5163597_1.fastq.gz",
            "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR516/007/SRR5163597/SRR5163597_2.fastq.gz",
        ]
    );
}

#[test]
fn explicit_naming_needs_layout() {
    let builder = FastqUrlBuilder::new("ftp://ftp.sra.ebi.ac.uk/vol1/fastq", FileNaming::Explicit);
    let err = builder.build("SRR390728", None).unwrap_err();
    assert_matches!(err, SraError::MissingLayout(acc) if acc == "SRR390728");
}

#[test]
fn repeated_builds_are_identical() {
    let builder = FastqUrlBuilder::new("ftp://ftp.sra.ebi.ac.uk/vol1/fastq", FileNaming::Explicit);
    let first = builder
        .build("SRR10971381", Some(LibraryLayout::Paired))
        .unwrap();
    let second = builder
        .build("SRR10971381", Some(LibraryLayout::Paired))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn run_directory_layout() {
    let acc: RunAccession = "SRR390728".parse().unwrap();
    let dir = FastqUrlBuilder::default().run_directory(&acc).unwrap();
    assert_eq!(dir, "ftp://ftp.sra.ebi.ac.uk/vol1/fastq/SRR390/SRR390728");
}
