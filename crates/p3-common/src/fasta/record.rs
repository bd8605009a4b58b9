//! Sequence records as returned by the query backend
//!
//! Documents arrive as loosely typed JSON. Every field is optional and scalar
//! values are accepted in any JSON form (identifiers such as `genome_id` are
//! sometimes indexed as numbers).

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{P3Error, Result};

/// A genomic feature (gene, CDS, RNA, ...) whose nucleotide sequence lives in
/// the sequence store, referenced by `na_sequence_md5`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeatureRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub patric_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub feature_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub product: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub na_sequence_md5: Option<String>,
    /// Resolved nucleotide sequence
    #[serde(deserialize_with = "lenient_string")]
    pub sequence: Option<String>,
}

impl FeatureRecord {
    /// Decode a feature document
    pub fn from_document(document: Value) -> Result<Self> {
        ensure_object(&document)?;
        Ok(serde_json::from_value(document)?)
    }

    /// Content hash to resolve, if the document carries a non-empty one
    pub fn sequence_hash(&self) -> Option<&str> {
        self.na_sequence_md5.as_deref().filter(|hash| !hash.is_empty())
    }
}

/// A genome sequence entry (contig, chromosome, plasmid) with its sequence
/// already attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenomeRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub accession: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub genome_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub genome_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub sequence: Option<String>,
}

impl GenomeRecord {
    /// Decode a genome sequence document
    pub fn from_document(document: Value) -> Result<Self> {
        ensure_object(&document)?;
        Ok(serde_json::from_value(document)?)
    }

    /// Genome name, falling back to the genome id when the name is missing
    pub fn display_name(&self) -> &str {
        self.genome_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.genome_id.as_deref())
            .unwrap_or_default()
    }
}

/// Either kind of record the FASTA serializer emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceRecord {
    Feature(FeatureRecord),
    Genome(GenomeRecord),
}

impl SequenceRecord {
    /// Format the record as one FASTA block
    pub fn to_fasta(&self) -> String {
        match self {
            SequenceRecord::Feature(record) => super::format_feature_record(record),
            SequenceRecord::Genome(record) => super::format_genome_record(record),
        }
    }
}

impl From<FeatureRecord> for SequenceRecord {
    fn from(record: FeatureRecord) -> Self {
        SequenceRecord::Feature(record)
    }
}

impl From<GenomeRecord> for SequenceRecord {
    fn from(record: GenomeRecord) -> Self {
        SequenceRecord::Genome(record)
    }
}

fn ensure_object(document: &Value) -> Result<()> {
    if document.is_object() {
        Ok(())
    } else {
        Err(P3Error::invalid_record(format!(
            "expected a JSON object, found {}",
            json_kind(document)
        )))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a scalar value, found {}",
            json_kind(&other)
        ))),
    }
}
