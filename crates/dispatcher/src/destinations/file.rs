//! FileDestination - appends messages to a file on disk

use contracts::{ContractError, Destination};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for FileDestination
#[derive(Debug, Clone)]
pub struct FileDestinationConfig {
    /// Target file, created if missing
    pub path: PathBuf,
}

impl FileDestinationConfig {
    /// Create config from properties map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let path = params
            .get("filename")
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| "missing 'filename' property".to_string())?;

        Ok(Self {
            path: PathBuf::from(path),
        })
    }
}

/// Destination that appends one line per message
pub struct FileDestination {
    name: String,
    config: FileDestinationConfig,
    writer: Option<BufWriter<File>>,
}

impl FileDestination {
    /// Open (or create) the target file in append mode
    #[instrument(
        name = "file_destination_new",
        skip(name, config),
        fields(path = %config.path.display())
    )]
    pub fn new(name: impl Into<String>, config: FileDestinationConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        let name = name.into();
        debug!(destination = %name, "FileDestination opened");

        Ok(Self {
            name,
            config,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Create from properties (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = FileDestinationConfig::from_params(params)
            .map_err(|e| ContractError::destination_open(&name, e))?;

        Self::new(name.clone(), config)
            .map_err(|e| ContractError::destination_open(&name, e.to_string()))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.config.path
    }
}

impl Destination for FileDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, message: &str) {
        let Some(writer) = self.writer.as_mut() else {
            debug!(destination = %self.name, "Write after close ignored");
            return;
        };
        if let Err(e) = writeln!(writer, "{message}") {
            error!(destination = %self.name, error = %e, "File write failed");
        }
    }

    #[instrument(name = "file_destination_close", skip(self), fields(destination = %self.name))]
    fn close(&mut self) -> Result<(), ContractError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer
            .flush()
            .map_err(|e| ContractError::destination_close(&self.name, e.to_string()))?;
        debug!(destination = %self.name, "FileDestination closed");
        Ok(())
    }
}
