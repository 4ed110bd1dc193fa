//! Lookup layer over the SRA metadata service and the ENA FASTQ mirror.
//!
//! A search term resolves to one numeric SRA id ([`eutils::SraClient::resolve`]),
//! the id expands to run accessions ([`eutils::SraClient::list_runs`]), and each
//! run maps to FASTQ URLs ([`fastq::FastqUrlBuilder`]). [`app::Locator`] chains
//! the three.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod eutils;
pub mod fastq;
pub mod output;
