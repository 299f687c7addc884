//! Generic statistics model returned to callers.

use serde::{Deserialize, Serialize};

/// Aggregate result of one measure evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultStatistic {
    pub total_size: u64,
    pub number_of_pages: u32,
    pub request_id: String,
    pub stratification: Vec<Stratification>,
}

/// One grouping dimension with its buckets, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stratification {
    pub title: String,
    pub strata: Vec<Stratum>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stratum {
    pub label: String,
    pub count: u64,
}

/// A client-range (4xx) answer from the evaluation endpoint.
///
/// This is an expected branch (e.g. "no data for this query"), not an
/// infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainError {
    pub code: u16,
}

/// Result of [`crate::EvaluationClient::evaluate`]: a statistic or a domain error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EvaluationOutcome {
    Statistic(QueryResultStatistic),
    Error(DomainError),
}

impl EvaluationOutcome {
    pub fn statistic(&self) -> Option<&QueryResultStatistic> {
        match self {
            Self::Statistic(stat) => Some(stat),
            Self::Error(_) => None,
        }
    }

    pub fn domain_error(&self) -> Option<DomainError> {
        match self {
            Self::Statistic(_) => None,
            Self::Error(err) => Some(*err),
        }
    }

    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<QueryResultStatistic> for EvaluationOutcome {
    fn from(stat: QueryResultStatistic) -> Self {
        Self::Statistic(stat)
    }
}

impl From<DomainError> for EvaluationOutcome {
    fn from(err: DomainError) -> Self {
        Self::Error(err)
    }
}
