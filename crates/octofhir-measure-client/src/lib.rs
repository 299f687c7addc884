//! Client for FHIR services exposing the `$evaluate-measure` operation
//!
//! This crate drives a remote measure evaluation service (such as Blaze)
//! and translates its MeasureReports into a generic statistics model:
//! - Server version discovery from the CapabilityStatement
//! - Single-shot measure evaluation into a [`QueryResultStatistic`]
//! - Subject list creation through the create/resolve MeasureReport protocol

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;
pub mod resource;
pub mod statistic;
pub mod subject_list;
pub mod translator;

pub use client::{CapabilityInfo, EvaluationClient, UNKNOWN_VERSION, add_trailing_slash};
pub use config::MeasureClientConfig;
pub use error::{MeasureClientError, MeasureClientResult, Operation, TransportCause};
pub use statistic::{DomainError, EvaluationOutcome, QueryResultStatistic, Stratification, Stratum};
pub use subject_list::{MeasureReportRef, SubjectListRequest};
