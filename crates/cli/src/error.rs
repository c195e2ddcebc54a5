//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: forge error (empty input, bad dimensions, packing infeasible)
//! - 11: I/O error (reading sprites, writing image or metadata)
//! - 12: input error (bad --options JSON, bad option values)
//! - 13: serialization error

use spriteforge_core::ForgeError;
use std::fmt;
use std::path::Path;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    /// A packing, layout, or processing error.
    Forge(ForgeError),
    /// An I/O error (file read/write, PNG codec).
    Io(String),
    /// A user input error (bad JSON options, out-of-range values).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Forge(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Prefixes an I/O message with the path it concerns.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            CliError::Io(msg) => CliError::Io(format!("{}: {msg}", path.display())),
            other => other,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Forge(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<ForgeError> for CliError {
    fn from(e: ForgeError) -> Self {
        match e {
            ForgeError::Io(msg) => CliError::Io(msg),
            ForgeError::Serialization(msg) => CliError::Serialization(msg),
            ForgeError::InvalidInput(msg) => CliError::Input(msg),
            other => CliError::Forge(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forge_error_exit_code_is_10() {
        let err = CliError::Forge(ForgeError::EmptyInput);
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn io_error_exit_code_is_11() {
        assert_eq!(CliError::Io("write failed".into()).exit_code(), 11);
    }

    #[test]
    fn input_error_exit_code_is_12() {
        assert_eq!(CliError::Input("bad options".into()).exit_code(), 12);
    }

    #[test]
    fn serialization_error_exit_code_is_13() {
        assert_eq!(CliError::Serialization("json fail".into()).exit_code(), 13);
    }

    #[test]
    fn from_forge_error_io_routes_to_cli_io() {
        let cli_err = CliError::from(ForgeError::Io("disk full".into()));
        assert_eq!(cli_err.exit_code(), 11);
        assert!(cli_err.to_string().contains("disk full"));
    }

    #[test]
    fn from_forge_error_invalid_input_routes_to_cli_input() {
        let cli_err = CliError::from(ForgeError::InvalidInput("fps is zero".into()));
        assert_eq!(cli_err.exit_code(), 12);
    }

    #[test]
    fn from_forge_error_infeasible_routes_to_cli_forge() {
        let cli_err = CliError::from(ForgeError::PackingInfeasible {
            sprites: 2,
            max_size: 64,
        });
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("64x64"));
    }

    #[test]
    fn from_serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }

    #[test]
    fn from_io_error_routes_to_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        assert_eq!(CliError::from(io).exit_code(), 11);
    }

    #[test]
    fn with_path_prefixes_io_errors_only() {
        let io = CliError::Io("denied".into()).with_path(Path::new("out/a.png"));
        assert_eq!(io.to_string(), "out/a.png: denied");
        let input = CliError::Input("bad".into()).with_path(Path::new("out/a.png"));
        assert_eq!(input.to_string(), "bad");
    }
}
