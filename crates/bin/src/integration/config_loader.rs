//! Configuration discovery.

use std::io::Read;
use std::path::{Path, PathBuf};

use itr::{ConfigError, ItrConfig, ItrError, TemperatureScoreRequest};

/// Load the configuration from `path`, or from the default location.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
pub(crate) fn load_config(path: Option<&Path>) -> Result<ItrConfig, ConfigError> {
    match path {
        Some(path) => ItrConfig::from_path(path),
        None => ItrConfig::load_default(),
    }
}

/// Path the configuration is read from.
pub(crate) fn config_source(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf)
        .or_else(ItrConfig::default_path)
        .filter(|p| p.exists())
}

/// Read a request from a file, or from stdin when `path` is absent or `-`.
pub(crate) fn read_request(path: Option<&Path>) -> Result<TemperatureScoreRequest, ItrError> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path).map_err(|e| {
            ItrError::malformed(format!("cannot read request {}: {e}", path.display()))
        })?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| ItrError::malformed(format!("cannot read request: {e}")))?;
            buffer
        }
    };
    TemperatureScoreRequest::from_json_str(&contents)
}
