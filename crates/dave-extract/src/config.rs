//! Extractor configuration.
//!
//! Settings come from, in order of precedence:
//! - CLI arguments (`--exe`, `--output`, `--vga-offset`, ...)
//! - Environment variables (`DAVE_EXTRACT_EXE`, ...)
//! - An optional JSON config file (`--config`)
//! - Default values
//!
//! The JSON file only carries the executable location:
//!
//! ```json
//! { "originalExeLocation": { "path": "../original-game/DAVE.EXE", "relative": true } }
//! ```
//!
//! A relative location is resolved against the current directory.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dave_formats::layout::{VGA_DATA_OFFSET, VGA_PALETTE_OFFSET};
use serde::Deserialize;

use crate::error::ConfigError;

/// What to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Decode the VGA tile blob into one bitmap per tile
    Tiles,
    /// Copy the level records
    Levels,
    /// Copy the title screen strings
    Text,
    /// Run every extractor
    All,
}

/// Configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dave-extract",
    about = "Extract tiles, levels and text from the Dangerous Dave executable",
    version
)]
pub struct ExtractConfig {
    /// What to extract
    #[command(subcommand)]
    pub command: Command,

    /// Path to the unpacked game executable
    #[arg(long, env = "DAVE_EXTRACT_EXE", global = true)]
    pub exe: Option<PathBuf>,

    /// JSON config file with an `originalExeLocation` section
    #[arg(long, env = "DAVE_EXTRACT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Root directory for extracted assets
    #[arg(
        long,
        env = "DAVE_EXTRACT_OUTPUT",
        default_value = "assets",
        global = true
    )]
    pub output: PathBuf,

    /// File offset of the RLE-packed tile blob
    #[arg(
        long,
        env = "DAVE_EXTRACT_VGA_OFFSET",
        default_value_t = VGA_DATA_OFFSET,
        value_parser = parse_offset,
        global = true
    )]
    pub vga_offset: u64,

    /// File offset of the 6-bit VGA palette
    #[arg(
        long,
        env = "DAVE_EXTRACT_PALETTE_OFFSET",
        default_value_t = VGA_PALETTE_OFFSET,
        value_parser = parse_offset,
        global = true
    )]
    pub palette_offset: u64,

    /// Leave existing, valid output files alone
    #[arg(long, global = true)]
    pub skip_existing: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl ExtractConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Output directory for tile bitmaps
    pub fn tiles_dir(&self) -> PathBuf {
        self.output.join("tiles")
    }

    /// Output directory for level records
    pub fn levels_dir(&self) -> PathBuf {
        self.output.join("levels")
    }

    /// Output directory for text files
    pub fn text_dir(&self) -> PathBuf {
        self.output.join("text")
    }

    /// Locate the executable from the CLI or the config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if neither source names an executable or the
    /// config file cannot be read.
    pub fn resolve_exe(&self) -> Result<PathBuf, ConfigError> {
        if let Some(exe) = &self.exe {
            return Ok(exe.clone());
        }

        let Some(config_path) = &self.config else {
            return Err(ConfigError::MissingRequired(
                "executable path (--exe, DAVE_EXTRACT_EXE or --config)".to_string(),
            ));
        };

        let file = ConfigFile::load(config_path)?;
        let location = file.original_exe_location.ok_or_else(|| {
            ConfigError::MissingRequired(format!(
                "originalExeLocation in {}",
                config_path.display()
            ))
        })?;

        let cwd = std::env::current_dir().map_err(|source| ConfigError::ReadFailed {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(location.resolve(&cwd))
    }

    /// Validate configuration and return the executable path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - No executable is configured
    /// - The executable doesn't exist
    /// - Both offsets point at the same place
    pub fn validate(&self) -> Result<PathBuf, ConfigError> {
        let exe = self.resolve_exe()?;
        if !exe.is_file() {
            return Err(ConfigError::ExecutableNotFound(exe));
        }

        if self.vga_offset == self.palette_offset {
            return Err(ConfigError::OverlappingOffsets(self.vga_offset));
        }

        Ok(exe)
    }
}

/// Contents of the JSON config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Where the original executable lives
    #[serde(alias = "OriginalExeLocation")]
    pub original_exe_location: Option<ExeLocation>,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config file contents.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Location of the original executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExeLocation {
    /// Path to the executable
    #[serde(alias = "Path")]
    pub path: PathBuf,

    /// Whether `path` is relative to the working directory
    #[serde(default, alias = "Relative")]
    pub relative: bool,
}

impl ExeLocation {
    /// Absolute path of the executable, given the working directory
    #[must_use]
    pub fn resolve(&self, cwd: &Path) -> PathBuf {
        if self.relative {
            cwd.join(&self.path)
        } else {
            self.path.clone()
        }
    }
}

/// Parse a file offset given as decimal or `0x`-prefixed hex.
pub fn parse_offset(value: &str) -> Result<u64, ConfigError> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| ConfigError::InvalidOffset(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(command: Command) -> ExtractConfig {
        ExtractConfig {
            command,
            exe: None,
            config: None,
            output: PathBuf::from("assets"),
            vga_offset: VGA_DATA_OFFSET,
            palette_offset: VGA_PALETTE_OFFSET,
            skip_existing: false,
            verbose: false,
        }
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("0x120f0").unwrap(), 0x120f0);
        assert_eq!(parse_offset("0X26B0A").unwrap(), 0x26b0a);
        assert_eq!(parse_offset("1024").unwrap(), 1024);
        assert!(matches!(
            parse_offset("0xZZ"),
            Err(ConfigError::InvalidOffset(_))
        ));
        assert!(parse_offset("-5").is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let config = ExtractConfig::try_parse_from([
            "dave-extract",
            "tiles",
            "--exe",
            "DAVE.EXE",
            "--vga-offset",
            "0x100",
            "--output",
            "out",
        ])
        .unwrap();

        assert_eq!(config.command, Command::Tiles);
        assert_eq!(config.exe, Some(PathBuf::from("DAVE.EXE")));
        assert_eq!(config.vga_offset, 0x100);
        assert_eq!(config.palette_offset, VGA_PALETTE_OFFSET);
        assert_eq!(config.tiles_dir(), PathBuf::from("out/tiles"));
    }

    #[test]
    fn test_config_file_camel_case() {
        let file = ConfigFile::from_json(
            r#"{ "originalExeLocation": { "path": "game/DAVE.EXE", "relative": true } }"#,
        )
        .unwrap();
        let location = file.original_exe_location.unwrap();
        assert!(location.relative);
        assert_eq!(
            location.resolve(Path::new("/work")),
            PathBuf::from("/work/game/DAVE.EXE")
        );
    }

    #[test]
    fn test_config_file_pascal_case() {
        let file = ConfigFile::from_json(
            r#"{ "OriginalExeLocation": { "Path": "/games/DAVE.EXE" } }"#,
        )
        .unwrap();
        let location = file.original_exe_location.unwrap();
        assert!(!location.relative);
        assert_eq!(
            location.resolve(Path::new("/work")),
            PathBuf::from("/games/DAVE.EXE")
        );
    }

    #[test]
    fn test_resolve_exe_prefers_cli() {
        let mut cfg = config(Command::All);
        cfg.exe = Some(PathBuf::from("cli.exe"));
        cfg.config = Some(PathBuf::from("does-not-exist.json"));
        assert_eq!(cfg.resolve_exe().unwrap(), PathBuf::from("cli.exe"));
    }

    #[test]
    fn test_resolve_exe_missing() {
        let cfg = config(Command::Tiles);
        assert!(matches!(
            cfg.resolve_exe(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validate_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(Command::Tiles);
        cfg.exe = Some(dir.path().join("DAVE.EXE"));
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn test_validate_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("DAVE.EXE");
        std::fs::write(&exe, b"MZ").unwrap();
        let json = dir.path().join("config.json");
        std::fs::write(
            &json,
            format!(
                r#"{{ "originalExeLocation": {{ "path": {} }} }}"#,
                serde_json::to_string(&exe).unwrap()
            ),
        )
        .unwrap();

        let mut cfg = config(Command::Tiles);
        cfg.config = Some(json);
        assert_eq!(cfg.validate().unwrap(), exe);

        cfg.palette_offset = cfg.vga_offset;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OverlappingOffsets(_))
        ));
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("config.json");
        std::fs::write(&json, "not json").unwrap();

        let mut cfg = config(Command::Tiles);
        cfg.config = Some(json);
        assert!(matches!(
            cfg.resolve_exe(),
            Err(ConfigError::InvalidJson { .. })
        ));
    }
}
