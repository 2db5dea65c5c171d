use credit_engine::assessment::CreditCatalog;
use credit_engine::consolidation::{
    read_documents_json, read_parameter_map, read_parameter_sheet, DocumentSet, StructuralError,
};
use credit_engine::error::AppError;
use credit_engine::ParameterMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    pub(crate) fn detect(path: &Path) -> Result<Self, AppError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(AppError::Usage(format!(
                "'{}' must be a .json or .csv file",
                path.display()
            ))),
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>, AppError> {
    Ok(BufReader::new(File::open(path)?))
}

pub(crate) fn load_catalog(path: Option<&Path>) -> Result<CreditCatalog, AppError> {
    match path {
        Some(path) => Ok(CreditCatalog::from_reader(open(path)?)?),
        None => Ok(CreditCatalog::standard()),
    }
}

pub(crate) fn load_parameters(path: &Path) -> Result<ParameterMap, AppError> {
    read_parameters(InputFormat::detect(path)?, open(path)?)
}

pub(crate) fn read_parameters<R: Read>(
    format: InputFormat,
    reader: R,
) -> Result<ParameterMap, AppError> {
    match format {
        InputFormat::Json => Ok(serde_json::from_reader(reader)?),
        InputFormat::Csv => Ok(read_parameter_map(reader)?),
    }
}

pub(crate) fn load_documents(
    path: &Path,
) -> Result<(DocumentSet, Vec<StructuralError>), AppError> {
    read_documents(InputFormat::detect(path)?, open(path)?)
}

/// Sheets carry no nesting, so only JSON input can report structural errors.
pub(crate) fn read_documents<R: Read>(
    format: InputFormat,
    reader: R,
) -> Result<(DocumentSet, Vec<StructuralError>), AppError> {
    match format {
        InputFormat::Json => Ok(read_documents_json(reader)?),
        InputFormat::Csv => Ok((read_parameter_sheet(reader)?, Vec::new())),
    }
}

pub(crate) fn parse_priority(raw: &str) -> Result<(String, i32), String> {
    let (label, score) = split_pair(raw)?;
    let score = score
        .parse::<i32>()
        .map_err(|err| format!("priority for '{label}' must be an integer ({err})"))?;
    Ok((label, score))
}

pub(crate) fn parse_choice(raw: &str) -> Result<(String, String), String> {
    let (parameter, document) = split_pair(raw)?;
    Ok((parameter, document.to_string()))
}

fn split_pair(raw: &str) -> Result<(String, &str), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, found '{raw}'"))?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return Err(format!("expected KEY=VALUE, found '{raw}'"));
    }
    Ok((key.to_string(), value))
}
