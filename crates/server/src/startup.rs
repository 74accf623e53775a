//! Startup checks
//!
//! Verifies before serving that the configured ffmpeg and ffprobe binaries
//! run, and reports their versions.

use crate::config::ToolsConfig;
use std::process::Command;
use thiserror::Error;

/// Error types for startup checks
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{tool} not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },
}

/// Versions reported by the external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersions {
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Extract the version token from `-version` output
///
/// Handles the release format (`ffmpeg version 7.1.1 ...`), `n`-prefixed git
/// builds (`ffmpeg version n8.0-5-g1234567 ...`) and ffprobe's banner
/// (`ffprobe version ...`).
pub fn parse_tool_version(version_output: &str) -> Option<String> {
    version_output.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        let _tool = words.next()?;
        if !words.next()?.eq_ignore_ascii_case("version") {
            return None;
        }
        words.next().map(str::to_string)
    })
}

/// Major version number from a version token like `7.1.1` or `n8.0-5-g123`
pub fn parse_major_version(version: &str) -> Option<u32> {
    version
        .trim_start_matches('n')
        .split(|c| c == '.' || c == '-')
        .next()?
        .parse()
        .ok()
}

/// Run `<program> -version` and return its version token
pub fn check_tool_version(program: &str) -> Result<String, StartupError> {
    let unavailable = |reason: String| StartupError::ToolUnavailable {
        tool: program.to_string(),
        reason,
    };

    let output = Command::new(program)
        .arg("-version")
        .output()
        .map_err(|e| {
            unavailable(format!(
                "{} -version failed; is it installed and in PATH? Error: {}",
                program, e
            ))
        })?;

    if !output.status.success() {
        return Err(unavailable(format!("{} -version exited with {}", program, output.status)));
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    parse_tool_version(&version_output).ok_or_else(|| {
        unavailable(format!(
            "could not parse version from output: {}",
            version_output.lines().next().unwrap_or("(empty)")
        ))
    })
}

/// Run all startup checks in order: ffmpeg, then ffprobe
pub fn run_startup_checks(tools: &ToolsConfig) -> Result<ToolVersions, StartupError> {
    let ffmpeg = check_tool_version(&tools.ffmpeg)?;
    let ffprobe = check_tool_version(&tools.ffprobe)?;
    Ok(ToolVersions { ffmpeg, ffprobe })
}
