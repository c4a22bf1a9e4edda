use slide_align::{AlignError, CapturedImages, Position, SolverConfig};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    AlignError(#[from] AlignError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One offline solve: where the captured canvases live and how to analyse them
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunConfig {
    /// Background canvas without the gap
    pub reference: String,
    /// Background canvas with the gap cut out
    pub challenge: String,
    /// Transparent canvas holding the piece
    pub piece: String,
    /// Slider handle centre the drag starts from
    #[serde(default)]
    pub pointer: Position,
    /// Where to save the painted diff image, if anywhere
    #[serde(default)]
    pub diff_output: Option<String>,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl RunConfig {
    /// Load RunConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load RunConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        let run: RunConfig = toml::from_str(content)?;
        run.solver.validate()?;
        Ok(run)
    }

    /// Load RunConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load RunConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, CliError> {
        let run: RunConfig = serde_json::from_str(content)?;
        run.solver.validate()?;
        Ok(run)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    /// Convert RunConfig to TOML string
    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert RunConfig to JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Read the three canvases from disk
    pub fn load_images(&self) -> Result<CapturedImages, CliError> {
        Ok(CapturedImages {
            reference: fs::read(&self.reference)?,
            challenge: fs::read(&self.challenge)?,
            piece: fs::read(&self.piece)?,
        })
    }
}

/// Load solver settings alone, TOML or JSON by extension
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<SolverConfig, CliError> {
    let path_ref = path.as_ref();
    let settings: SolverConfig = match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&fs::read_to_string(path_ref)?)?,
        Some("json") => serde_json::from_str(&fs::read_to_string(path_ref)?)?,
        _ => return Err(CliError::UnsupportedFileFormat),
    };
    settings.validate()?;
    Ok(settings)
}
