//! `add_watermark`: overlay a semi-transparent image on a video

use super::ffmpeg;
use crate::args::{format_number, ArgumentBag};
use crate::config::{DefaultsConfig, ToolsConfig};
use crate::error::OperationError;
use crate::invocation::Invocation;

/// Corner or center placement of the overlay, 10px from the frame edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl WatermarkPosition {
    /// Case-insensitive; anything unrecognised lands bottom right.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "topleft" => Self::TopLeft,
            "topright" => Self::TopRight,
            "bottomleft" => Self::BottomLeft,
            "center" => Self::Center,
            _ => Self::BottomRight,
        }
    }

    /// `x:y` for the overlay filter. `W`/`H` are the main video's size,
    /// `w`/`h` the watermark's.
    pub fn overlay_expr(self) -> &'static str {
        match self {
            Self::TopLeft => "10:10",
            Self::TopRight => "W-w-10:10",
            Self::BottomLeft => "10:H-h-10",
            Self::Center => "(W-w)/2:(H-h)/2",
            Self::BottomRight => "W-w-10:H-h-10",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkParams {
    /// Source video
    pub input_path: String,
    /// Overlay image, usually a PNG with alpha
    pub watermark_path: String,
    /// Destination video
    pub output_path: String,
    /// Where the overlay sits in the frame
    pub position: WatermarkPosition,
    /// Alpha multiplier in [0, 1]
    pub opacity: f64,
}

impl WatermarkParams {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        let input_path = args.required_string("inputPath")?;
        let watermark_path = args.required_string("watermarkPath")?;
        let output_path = args.output_path("outputPath")?;
        let position = args.string_or("position", &defaults.watermark_position)?;
        let opacity = args.number_or("opacity", defaults.watermark_opacity)?;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(OperationError::invalid("opacity", "must be between 0.0 and 1.0"));
        }

        Ok(Self {
            input_path,
            watermark_path,
            output_path,
            position: WatermarkPosition::parse(&position),
            opacity,
        })
    }

    /// The overlay graph: the watermark is converted to RGBA and its alpha
    /// scaled, then composited and forced back to yuv420p for playback
    /// compatibility.
    pub fn filter_graph(&self) -> String {
        format!(
            "[1:v]format=rgba,colorchannelmixer=aa={}[watermark];[0:v][watermark]overlay={}:format=auto,format=yuv420p",
            format_number(self.opacity),
            self.position.overlay_expr()
        )
    }
}

/// `ffmpeg -y -i <in> -i <wm> -filter_complex <graph> -codec:a copy <out>`
pub fn build_watermark_command(params: &WatermarkParams, tools: &ToolsConfig) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-i", &params.input_path)
        .flag("-i", &params.watermark_path)
        .flag("-filter_complex", params.filter_graph())
        .flag("-codec:a", "copy")
        .arg(&params.output_path);
    inv
}
