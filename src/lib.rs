//! # datafile
//!
//! Builds target files out of independently declared fragments. Fragments
//! that share a tag with a target are collected, ordered, and either
//! concatenated or deep-merged as YAML or JSON, and the result becomes the
//! target file's content.
//!
//! ## Quick Example
//!
//! ```
//! use datafile::config;
//! use datafile::filesystem::MemoryFS;
//! use datafile::orchestrator;
//! use datafile::source::MemorySource;
//!
//! let manifest = r#"
//! targets:
//!   - path: /etc/motd
//!     tag: motd
//! fragments:
//!   - { name: body, target: /etc/motd, tag: motd, order: 2, content: "b" }
//!   - { name: head, target: /etc/motd, tag: motd, order: 1, content: "a" }
//! "#;
//!
//! let mut catalog = config::parse(manifest).unwrap().into_catalog().unwrap();
//! let mut fs = MemoryFS::new();
//! let report = orchestrator::execute(&mut catalog, &MemorySource::new(), &mut fs);
//!
//! assert!(report.is_success());
//! assert_eq!(fs.get_file("/etc/motd").unwrap().as_str(), Some("ab"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Declarations (`config`)**: The YAML manifest listing targets and
//!   fragments, validated into [`fragment::Fragment`] and
//!   [`target::DataFile`] values.
//! - **Catalog (`catalog`)**: The read-only set of declarations for one
//!   evaluation, and the tag-based collector.
//! - **Resolution (`resolve`, `source`)**: Turning a fragment into bytes, from
//!   inline content or the first existing source candidate.
//! - **Ordering (`ordering`)**: Numeric-aware or alphabetical sort keys.
//! - **Merging (`merge`)**: Plain concatenation or a recursive deep merge of
//!   YAML/JSON documents with collision detection.
//! - **Output (`filesystem`, `orchestrator`)**: Handing computed content to a
//!   file writer, either in memory or on disk.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod fragment;
pub mod merge;
pub mod orchestrator;
pub mod ordering;
pub mod output;
pub mod path;
pub mod resolve;
pub mod source;
pub mod target;

#[cfg(test)]
mod merge_proptest;
