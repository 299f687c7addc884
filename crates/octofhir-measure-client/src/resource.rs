//! Typed views of the FHIR resources the client consumes.
//!
//! Only the elements the client reads are modelled; everything else in the
//! payload is ignored. Two resources are supported:
//!
//! - [`CapabilityStatement`] - server self-description, used for the version
//! - [`MeasureReport`] - population counts and stratifiers
//!
//! Accessors for required elements (`first_group`, `first_population`,
//! `count`, ...) fail with [`DecodeError::MissingElement`] instead of
//! inventing defaults.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors produced while decoding a resource payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected resource type '{expected}', found '{found}'")]
    WrongResourceType { expected: &'static str, found: String },

    #[error("{resource_type} is missing required element '{element}'")]
    MissingElement {
        resource_type: &'static str,
        element: &'static str,
    },
}

impl DecodeError {
    /// Create a new MissingElement error
    pub fn missing(resource_type: &'static str, element: &'static str) -> Self {
        Self::MissingElement {
            resource_type,
            element,
        }
    }
}

/// A FHIR resource the decoder knows how to read.
pub trait FhirResource: DeserializeOwned {
    const RESOURCE_TYPE: &'static str;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceHeader {
    resource_type: Option<String>,
}

/// Decodes a JSON payload into a typed resource, checking `resourceType`.
pub fn decode<R: FhirResource>(payload: &[u8]) -> Result<R, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    let header = ResourceHeader::deserialize(&value)?;
    match header.resource_type.as_deref() {
        Some(found) if found == R::RESOURCE_TYPE => Ok(R::deserialize(value)?),
        found => Err(DecodeError::WrongResourceType {
            expected: R::RESOURCE_TYPE,
            found: found.unwrap_or_default().to_string(),
        }),
    }
}

// ============================================================================
// CapabilityStatement
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityStatement {
    #[serde(default)]
    pub software: Option<Software>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl FhirResource for CapabilityStatement {
    const RESOURCE_TYPE: &'static str = "CapabilityStatement";
}

impl CapabilityStatement {
    /// The `software.version` element.
    pub fn software_version(&self) -> Result<&str, DecodeError> {
        self.software
            .as_ref()
            .and_then(|s| s.version.as_deref())
            .ok_or_else(|| DecodeError::missing(Self::RESOURCE_TYPE, "software.version"))
    }
}

// ============================================================================
// MeasureReport
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureReport {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub group: Vec<ReportGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGroup {
    #[serde(default)]
    pub population: Vec<Population>,
    #[serde(default)]
    pub stratifier: Vec<Stratifier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub subject_results: Option<Reference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stratifier {
    #[serde(default)]
    pub code: Vec<CodeableConcept>,
    #[serde(default)]
    pub stratum: Vec<StratumEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StratumEntry {
    #[serde(default)]
    pub value: Option<CodeableConcept>,
    #[serde(default)]
    pub population: Vec<Population>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(default)]
    pub reference: Option<String>,
}

impl FhirResource for MeasureReport {
    const RESOURCE_TYPE: &'static str = "MeasureReport";
}

impl MeasureReport {
    /// The first `group`; reports are assumed to carry a single group.
    pub fn first_group(&self) -> Result<&ReportGroup, DecodeError> {
        self.group
            .first()
            .ok_or_else(|| DecodeError::missing(Self::RESOURCE_TYPE, "group"))
    }
}

impl ReportGroup {
    pub fn first_population(&self) -> Result<&Population, DecodeError> {
        self.population
            .first()
            .ok_or_else(|| DecodeError::missing(MeasureReport::RESOURCE_TYPE, "group.population"))
    }
}

impl Population {
    pub fn count(&self) -> Result<u64, DecodeError> {
        self.count
            .ok_or_else(|| DecodeError::missing(MeasureReport::RESOURCE_TYPE, "population.count"))
    }

    /// The relative reference in `subjectResults.reference`, e.g. `List/ABC`.
    pub fn subject_results_reference(&self) -> Result<&str, DecodeError> {
        self.subject_results
            .as_ref()
            .and_then(|r| r.reference.as_deref())
            .ok_or_else(|| {
                DecodeError::missing(
                    MeasureReport::RESOURCE_TYPE,
                    "population.subjectResults.reference",
                )
            })
    }
}

impl Stratifier {
    /// Text of the first `code`, empty when absent.
    pub fn title(&self) -> &str {
        self.code
            .first()
            .and_then(|c| c.text.as_deref())
            .unwrap_or_default()
    }
}

impl StratumEntry {
    /// Text of `value`, empty when absent.
    pub fn label(&self) -> &str {
        self.value
            .as_ref()
            .and_then(|v| v.text.as_deref())
            .unwrap_or_default()
    }

    pub fn first_population(&self) -> Result<&Population, DecodeError> {
        self.population
            .first()
            .ok_or_else(|| DecodeError::missing(MeasureReport::RESOURCE_TYPE, "stratum.population"))
    }
}
