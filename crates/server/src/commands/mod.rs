//! Command builders, one per operation
//!
//! Each operation has a params struct coerced from the argument bag and a
//! pure `build_*_command` function producing its [`Invocation`].
//! [`OperationRequest`] is the tagged union the dispatcher works with.

pub mod convert;
pub mod frames;
pub mod sequence;
pub mod trim;
pub mod video_info;
pub mod watermark;

pub use convert::{
    build_convert_command, build_extract_audio_command, ConvertParams, ExtractAudioParams,
};
pub use frames::{
    build_extract_frames_command, jpeg_qscale, png_compression_level, ExtractFramesParams,
};
pub use sequence::{build_image_sequence_command, ImageSequenceParams};
pub use trim::{
    build_trim_audio_command, build_trim_video_command, TrimAudioParams, TrimEnd, TrimRange,
    TrimVideoParams,
};
pub use video_info::{build_video_info_command, VideoInfoParams};
pub use watermark::{build_watermark_command, WatermarkParams, WatermarkPosition};

use crate::args::ArgumentBag;
use crate::config::{DefaultsConfig, ToolsConfig};
use crate::error::OperationError;
use crate::invocation::Invocation;
use std::path::{Path, PathBuf};

/// Every operation name the dispatcher accepts.
pub const OPERATION_NAMES: [&str; 8] = [
    "get_video_info",
    "convert_video",
    "extract_audio",
    "create_video_from_images",
    "trim_video",
    "add_watermark",
    "trim_audio",
    "extract_frames",
];

/// A fully coerced call, one variant per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    GetVideoInfo(VideoInfoParams),
    ConvertVideo(ConvertParams),
    ExtractAudio(ExtractAudioParams),
    CreateVideoFromImages(ImageSequenceParams),
    TrimVideo(TrimVideoParams),
    AddWatermark(WatermarkParams),
    TrimAudio(TrimAudioParams),
    ExtractFrames(ExtractFramesParams),
}

impl OperationRequest {
    /// Coerce the argument bag for operation `name`.
    ///
    /// Only argument shape is checked here; input existence is checked by
    /// the dispatcher afterwards.
    pub fn parse(
        name: &str,
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        let request = match name {
            "get_video_info" => Self::GetVideoInfo(VideoInfoParams::from_args(args)?),
            "convert_video" => Self::ConvertVideo(ConvertParams::from_args(args)?),
            "extract_audio" => Self::ExtractAudio(ExtractAudioParams::from_args(args, defaults)?),
            "create_video_from_images" => {
                Self::CreateVideoFromImages(ImageSequenceParams::from_args(args, defaults)?)
            }
            "trim_video" => Self::TrimVideo(TrimVideoParams::from_args(args, defaults)?),
            "add_watermark" => Self::AddWatermark(WatermarkParams::from_args(args, defaults)?),
            "trim_audio" => Self::TrimAudio(TrimAudioParams::from_args(args, defaults)?),
            "extract_frames" => {
                Self::ExtractFrames(ExtractFramesParams::from_args(args, defaults)?)
            }
            other => return Err(OperationError::UnknownOperation(other.to_string())),
        };
        Ok(request)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetVideoInfo(_) => "get_video_info",
            Self::ConvertVideo(_) => "convert_video",
            Self::ExtractAudio(_) => "extract_audio",
            Self::CreateVideoFromImages(_) => "create_video_from_images",
            Self::TrimVideo(_) => "trim_video",
            Self::AddWatermark(_) => "add_watermark",
            Self::TrimAudio(_) => "trim_audio",
            Self::ExtractFrames(_) => "extract_frames",
        }
    }

    /// Paths that must exist before the tool runs.
    pub fn input_paths(&self) -> Vec<&str> {
        match self {
            Self::GetVideoInfo(p) => vec![p.file_path.as_str()],
            Self::ConvertVideo(p) => vec![p.input_path.as_str()],
            Self::ExtractAudio(p) => vec![p.input_path.as_str()],
            // a printf pattern or glob, not a file
            Self::CreateVideoFromImages(_) => vec![],
            Self::TrimVideo(p) => vec![p.input_path.as_str()],
            Self::AddWatermark(p) => vec![p.input_path.as_str(), p.watermark_path.as_str()],
            Self::TrimAudio(p) => vec![p.input_path.as_str()],
            Self::ExtractFrames(p) => vec![p.input_path.as_str()],
        }
    }

    /// Directories that must exist before the tool writes its output.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let parent_of = |path: &str| {
            Path::new(path)
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        };
        match self {
            Self::GetVideoInfo(_) => vec![],
            Self::ConvertVideo(p) => vec![parent_of(&p.output_path)],
            Self::ExtractAudio(p) => vec![parent_of(&p.output_path)],
            Self::CreateVideoFromImages(p) => vec![parent_of(&p.output_path)],
            Self::TrimVideo(p) => vec![parent_of(&p.output_path)],
            Self::AddWatermark(p) => vec![parent_of(&p.output_path)],
            Self::TrimAudio(p) => vec![parent_of(&p.output_path)],
            Self::ExtractFrames(p) => vec![PathBuf::from(&p.output_dir)],
        }
    }

    pub fn build(&self, tools: &ToolsConfig) -> Invocation {
        match self {
            Self::GetVideoInfo(p) => build_video_info_command(p, tools),
            Self::ConvertVideo(p) => build_convert_command(p, tools),
            Self::ExtractAudio(p) => build_extract_audio_command(p, tools),
            Self::CreateVideoFromImages(p) => build_image_sequence_command(p, tools),
            Self::TrimVideo(p) => build_trim_video_command(p, tools),
            Self::AddWatermark(p) => build_watermark_command(p, tools),
            Self::TrimAudio(p) => build_trim_audio_command(p, tools),
            Self::ExtractFrames(p) => build_extract_frames_command(p, tools),
        }
    }

    /// Result text for a finished call.
    pub fn summarize(&self, tool_output: &str) -> String {
        let (summary, input, output) = match self {
            Self::GetVideoInfo(_) => return tool_output.to_string(),
            Self::ConvertVideo(p) => {
                ("Video conversion completed", &p.input_path, p.output_path.clone())
            }
            Self::ExtractAudio(p) => {
                ("Audio extraction completed", &p.input_path, p.output_path.clone())
            }
            Self::CreateVideoFromImages(p) => {
                ("Video creation completed", &p.input_pattern, p.output_path.clone())
            }
            Self::TrimVideo(p) => {
                ("Video trimming completed", &p.input_path, p.output_path.clone())
            }
            Self::AddWatermark(p) => ("Watermark added", &p.input_path, p.output_path.clone()),
            Self::TrimAudio(p) => {
                ("Audio trimming completed", &p.input_path, p.output_path.clone())
            }
            Self::ExtractFrames(p) => (
                "Frames extracted from video",
                &p.input_path,
                format!("{}/*.{}", p.output_dir, p.format),
            ),
        };
        format!("{}: {} → {}\n\n{}", summary, input, output, tool_output)
    }
}

/// Start an ffmpeg invocation that may overwrite its output.
pub(crate) fn ffmpeg(tools: &ToolsConfig) -> Invocation {
    let mut inv = Invocation::new(&tools.ffmpeg);
    inv.arg("-y");
    inv
}

/// Split a raw option string, keeping an empty one cheap.
pub(crate) fn option_tokens(key: &str, raw: Option<String>) -> Result<Vec<String>, OperationError> {
    match raw {
        Some(raw) => crate::args::split_options(key, &raw),
        None => Ok(Vec::new()),
    }
}
