//! `get_video_info`: container and stream details from ffprobe

use crate::args::ArgumentBag;
use crate::config::ToolsConfig;
use crate::error::OperationError;
use crate::invocation::Invocation;

#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfoParams {
    /// Media file to inspect
    pub file_path: String,
}

impl VideoInfoParams {
    pub fn from_args(args: ArgumentBag<'_>) -> Result<Self, OperationError> {
        Ok(Self {
            file_path: args.required_string("filePath")?,
        })
    }
}

/// `ffprobe -v error -show_format -show_streams -print_format json <file>`
///
/// The JSON is returned to the caller unparsed.
pub fn build_video_info_command(params: &VideoInfoParams, tools: &ToolsConfig) -> Invocation {
    let mut inv = Invocation::new(&tools.ffprobe);
    inv.flag("-v", "error")
        .arg("-show_format")
        .arg("-show_streams")
        .flag("-print_format", "json")
        .arg(&params.file_path);
    inv
}
