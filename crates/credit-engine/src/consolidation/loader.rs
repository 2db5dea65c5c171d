use super::domain::{CreditEntry, Document, DocumentSet};
use crate::assessment::ParameterValue;
use serde_json::{Map, Value};
use std::io::Read;
use tracing::warn;

/// Shape problem in one document. Reported, never fatal to the other documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("document '{document}' must be an object keyed by credit id")]
    DocumentNotObject { document: String },
    #[error("document '{document}' entry for credit '{credit}' must be an object")]
    EntryNotObject { document: String, credit: String },
    #[error("document '{document}' credit '{credit}' is missing a declared parameter list")]
    MissingDeclaredParameters { document: String, credit: String },
    #[error("document '{document}' credit '{credit}' declares a non-string parameter at position {index}")]
    InvalidDeclaredParameter {
        document: String,
        credit: String,
        index: usize,
    },
    #[error("document '{document}' credit '{credit}' is missing a values object")]
    MissingValues { document: String, credit: String },
    #[error("document '{document}' credit '{credit}' value for '{parameter}' is not a string or number")]
    NonScalarValue {
        document: String,
        credit: String,
        parameter: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    #[error("document set must be a JSON object keyed by document label")]
    NotAnObject,
    #[error("failed to read documents: {0}")]
    Io(#[from] std::io::Error),
    #[error("documents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid parameter sheet: {0}")]
    Csv(#[from] csv::Error),
}

/// Structural check of a raw document mapping without building anything.
pub fn validate_documents(raw: &Value) -> Result<Vec<StructuralError>, DocumentLoadError> {
    parse_documents(raw).map(|(_, errors)| errors)
}

/// Build an ordered document set from a JSON mapping of label to credit entries.
///
/// Documents keep the mapping's insertion order. Malformed entries are skipped and
/// reported alongside the set.
pub fn parse_documents(
    raw: &Value,
) -> Result<(DocumentSet, Vec<StructuralError>), DocumentLoadError> {
    let mapping = raw.as_object().ok_or(DocumentLoadError::NotAnObject)?;
    let mut documents = DocumentSet::new();
    let mut errors = Vec::new();

    for (label, body) in mapping {
        let Some(credits) = body.as_object() else {
            errors.push(StructuralError::DocumentNotObject {
                document: label.clone(),
            });
            continue;
        };

        let mut document = Document::new(label.clone());
        for (credit, entry) in credits {
            if let Some(entry) = parse_entry(label, credit, entry, &mut errors) {
                document.credits.insert(credit.clone(), entry);
            }
        }
        documents.push(document);
    }

    for error in &errors {
        warn!(%error, "structural document error");
    }

    Ok((documents, errors))
}

pub fn read_documents_json<R: Read>(
    reader: R,
) -> Result<(DocumentSet, Vec<StructuralError>), DocumentLoadError> {
    let raw: Value = serde_json::from_reader(reader)?;
    parse_documents(&raw)
}

fn parse_entry(
    document: &str,
    credit: &str,
    raw: &Value,
    errors: &mut Vec<StructuralError>,
) -> Option<CreditEntry> {
    let Some(fields) = raw.as_object() else {
        errors.push(StructuralError::EntryNotObject {
            document: document.to_string(),
            credit: credit.to_string(),
        });
        return None;
    };

    let declared =
        field(fields, "declaredParameters", "declared_parameters").and_then(Value::as_array);
    let values = fields.get("values").and_then(Value::as_object);

    let Some(declared) = declared else {
        errors.push(StructuralError::MissingDeclaredParameters {
            document: document.to_string(),
            credit: credit.to_string(),
        });
        return None;
    };
    let Some(values) = values else {
        errors.push(StructuralError::MissingValues {
            document: document.to_string(),
            credit: credit.to_string(),
        });
        return None;
    };

    let mut entry = CreditEntry::default();
    for (index, name) in declared.iter().enumerate() {
        match name.as_str() {
            Some(name) if entry.declared_parameters.iter().any(|seen| seen == name) => {}
            Some(name) => entry.declared_parameters.push(name.to_string()),
            None => errors.push(StructuralError::InvalidDeclaredParameter {
                document: document.to_string(),
                credit: credit.to_string(),
                index,
            }),
        }
    }

    for (parameter, value) in values {
        let scalar = match value {
            Value::Null => ParameterValue::Null,
            Value::String(text) => ParameterValue::Text(text.clone()),
            Value::Number(number) => match number.as_f64() {
                Some(number) => ParameterValue::Number(number),
                None => ParameterValue::Text(number.to_string()),
            },
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                errors.push(StructuralError::NonScalarValue {
                    document: document.to_string(),
                    credit: credit.to_string(),
                    parameter: parameter.clone(),
                });
                continue;
            }
        };
        entry.values.insert(parameter.clone(), scalar);
    }

    Some(entry)
}

fn field<'a>(fields: &'a Map<String, Value>, primary: &str, alias: &str) -> Option<&'a Value> {
    fields.get(primary).or_else(|| fields.get(alias))
}
