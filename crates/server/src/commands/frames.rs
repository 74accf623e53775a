//! `extract_frames`: dump frames as numbered image files

use super::ffmpeg;
use crate::args::{not_option_like, ArgumentBag};
use crate::config::{DefaultsConfig, ToolsConfig};
use crate::error::OperationError;
use crate::invocation::Invocation;
use std::path::Path;

/// Map 1-100 quality (higher is better) onto the JPEG qscale, 1-31 where
/// 1 is best.
pub fn jpeg_qscale(quality: f64) -> u32 {
    (31.0 - (quality / 100.0) * 30.0).round().clamp(1.0, 31.0) as u32
}

/// Map 1-100 quality onto the PNG compression level, 0-9 where 0 is no
/// compression.
pub fn png_compression_level(quality: f64) -> u32 {
    (9.0 - (quality / 100.0) * 9.0).round().clamp(0.0, 9.0) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractFramesParams {
    /// Video to read frames from
    pub input_path: String,
    /// Directory receiving the numbered images; created if missing
    pub output_dir: String,
    /// `fps` filter value, e.g. `1`, `0.5` or `1/30`
    pub frame_rate: String,
    /// Image extension; also selects the encoder
    pub format: String,
    /// 1-100, higher is better; mapped onto the encoder's own scale
    pub quality: f64,
    /// Seek offset before extraction starts (`-ss`)
    pub start_time: Option<String>,
    /// Length of the extracted window (`-t`)
    pub duration: Option<String>,
}

impl ExtractFramesParams {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        let quality = args.number_or("quality", defaults.frame_quality)?;
        if !(1.0..=100.0).contains(&quality) {
            return Err(OperationError::invalid("quality", "must be between 1 and 100"));
        }

        Ok(Self {
            input_path: args.required_string("inputPath")?,
            output_dir: not_option_like(
                "outputDir",
                args.string_or("outputDir", &defaults.frames_output_dir)?,
            )?,
            frame_rate: args.string_or("frameRate", &defaults.frame_rate)?,
            format: args.string_or("format", &defaults.frame_format)?,
            quality,
            start_time: args.string("startTime")?,
            duration: args.string("duration")?,
        })
    }

    /// `<output_dir>/%05d.<format>`
    pub fn output_pattern(&self) -> String {
        Path::new(&self.output_dir)
            .join(format!("%05d.{}", self.format))
            .to_string_lossy()
            .into_owned()
    }

    /// Encoder quality flag for the chosen format, if it has one.
    pub fn quality_flag(&self) -> Option<(&'static str, u32)> {
        match self.format.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(("-q:v", jpeg_qscale(self.quality))),
            "png" => Some(("-compression_level", png_compression_level(self.quality))),
            _ => None,
        }
    }
}

/// `ffmpeg -y -i <in> [-ss <start>] [-t <dur>] -vf fps=<rate> [quality] <dir>/%05d.<fmt>`
pub fn build_extract_frames_command(
    params: &ExtractFramesParams,
    tools: &ToolsConfig,
) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-i", &params.input_path);
    if let Some(start) = &params.start_time {
        inv.flag("-ss", start);
    }
    if let Some(duration) = &params.duration {
        inv.flag("-t", duration);
    }
    inv.flag("-vf", format!("fps={}", params.frame_rate));
    if let Some((flag, value)) = params.quality_flag() {
        inv.flag(flag, value.to_string());
    }
    inv.arg(params.output_pattern());
    inv
}
