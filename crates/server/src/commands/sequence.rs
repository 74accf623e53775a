//! `create_video_from_images`: encode an image sequence into a video

use super::{ffmpeg, option_tokens};
use crate::args::{format_number, ArgumentBag};
use crate::config::{DefaultsConfig, ToolsConfig};
use crate::error::OperationError;
use crate::invocation::Invocation;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSequenceParams {
    /// printf-style sequence (`img%03d.jpg`) or glob (`frames/*.png`)
    pub input_pattern: String,
    /// Destination video
    pub output_path: String,
    /// Input frames per second; always positive
    pub framerate: f64,
    /// Video encoder passed to `-c:v`
    pub codec: String,
    /// Output pixel format passed to `-pix_fmt`
    pub pixel_format: String,
    /// Caller-supplied options placed just before the output path
    pub extra_options: Vec<String>,
}

impl ImageSequenceParams {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        let input_pattern = args.required_string("inputPattern")?;
        let output_path = args.output_path("outputPath")?;
        let framerate = args.number_or("framerate", defaults.framerate)?;
        if framerate <= 0.0 {
            return Err(OperationError::invalid("framerate", "must be greater than zero"));
        }

        Ok(Self {
            input_pattern,
            output_path,
            framerate,
            codec: args.string_or("codec", &defaults.video_codec)?,
            pixel_format: args.string_or("pixelFormat", &defaults.pixel_format)?,
            extra_options: option_tokens("extraOptions", args.string("extraOptions")?)?,
        })
    }
}

/// `ffmpeg -y -framerate <fps> -i <pattern> -c:v <codec> -pix_fmt <fmt> <extra...> <out>`
///
/// `-framerate` is an input option and has to precede `-i`.
pub fn build_image_sequence_command(
    params: &ImageSequenceParams,
    tools: &ToolsConfig,
) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-framerate", format_number(params.framerate));
    if is_glob(&params.input_pattern) {
        inv.flag("-pattern_type", "glob");
    }
    inv.flag("-i", &params.input_pattern)
        .flag("-c:v", &params.codec)
        .flag("-pix_fmt", &params.pixel_format)
        .args(&params.extra_options)
        .arg(&params.output_path);
    inv
}

/// The image2 demuxer only expands `*`, `?` and `[` when told the pattern is a glob.
fn is_glob(pattern: &str) -> bool {
    !pattern.contains('%') && pattern.contains(['*', '?', '['])
}
