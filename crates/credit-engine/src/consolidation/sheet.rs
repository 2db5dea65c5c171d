use super::domain::{Document, DocumentSet};
use super::loader::DocumentLoadError;
use crate::assessment::{ParameterMap, ParameterValue};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Document")]
    document: String,
    #[serde(rename = "Credit")]
    credit: String,
    #[serde(rename = "Parameter")]
    parameter: String,
    #[serde(rename = "Value", default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParameterRow {
    #[serde(rename = "Parameter")]
    parameter: String,
    #[serde(rename = "Value", default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Load an extraction sheet with `Document, Credit, Parameter, Value` columns.
///
/// Documents are ordered by first appearance. Every row declares its parameter;
/// a blank value declares it without supplying a value.
pub fn read_parameter_sheet<R: Read>(reader: R) -> Result<DocumentSet, DocumentLoadError> {
    let mut documents = DocumentSet::new();

    for row in reader_for(reader).deserialize::<SheetRow>() {
        let row = row?;
        if documents.get(&row.document).is_none() {
            documents.push(Document::new(row.document.clone()));
        }
        if let Some(document) = documents.get_mut(&row.document) {
            let value = row
                .value
                .as_deref()
                .map(ParameterValue::from_cell)
                .unwrap_or(ParameterValue::Null);
            document.entry_mut(&row.credit).declare(&row.parameter, value);
        }
    }

    Ok(documents)
}

/// Load a flat `Parameter, Value` sheet straight into an evaluator parameter map.
pub fn read_parameter_map<R: Read>(reader: R) -> Result<ParameterMap, DocumentLoadError> {
    let mut parameters = ParameterMap::new();
    for row in reader_for(reader).deserialize::<ParameterRow>() {
        let row = row?;
        let value = row
            .value
            .as_deref()
            .map(ParameterValue::from_cell)
            .unwrap_or(ParameterValue::Null);
        parameters.insert(row.parameter, value);
    }
    Ok(parameters)
}
