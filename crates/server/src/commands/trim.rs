//! `trim_video` and `trim_audio`
//!
//! Both cut from a start offset to either a relative duration or an absolute
//! stop time. A duration wins when both are given.

use super::ffmpeg;
use crate::args::ArgumentBag;
use crate::config::{DefaultsConfig, ToolsConfig};
use crate::error::OperationError;
use crate::invocation::Invocation;

/// Where a trim stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimEnd {
    /// `-t`: length measured from the start offset
    Duration(String),
    /// `-to`: absolute timestamp in the input
    EndTime(String),
    /// Run to the end of the input
    Open,
}

/// Time window shared by both trim operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimRange {
    /// Seek offset (`-ss`), seconds or `HH:MM:SS.mmm`
    pub start: String,
    /// Where the cut stops
    pub end: TrimEnd,
}

impl TrimRange {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        let start = args.string_or("startTime", &defaults.start_time)?;
        let duration = args.string("duration")?;
        let end_time = args.string("endTime")?;

        let end = match (duration, end_time) {
            (Some(duration), _) => TrimEnd::Duration(duration),
            (None, Some(end_time)) => TrimEnd::EndTime(end_time),
            (None, None) => TrimEnd::Open,
        };
        Ok(Self { start, end })
    }

    fn append_to(&self, inv: &mut Invocation) {
        inv.flag("-ss", &self.start);
        match &self.end {
            TrimEnd::Duration(duration) => {
                inv.flag("-t", duration);
            }
            TrimEnd::EndTime(end_time) => {
                inv.flag("-to", end_time);
            }
            TrimEnd::Open => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimVideoParams {
    /// Source video
    pub input_path: String,
    /// Destination video
    pub output_path: String,
    /// Window to keep
    pub range: TrimRange,
}

impl TrimVideoParams {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        Ok(Self {
            input_path: args.required_string("inputPath")?,
            output_path: args.output_path("outputPath")?,
            range: TrimRange::from_args(args, defaults)?,
        })
    }
}

/// `ffmpeg -y -i <in> -ss <start> [-t <dur> | -to <end>] -c copy <out>`
///
/// Streams are copied, so cuts land on the nearest keyframes.
pub fn build_trim_video_command(params: &TrimVideoParams, tools: &ToolsConfig) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-i", &params.input_path);
    params.range.append_to(&mut inv);
    inv.flag("-c", "copy").arg(&params.output_path);
    inv
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrimAudioParams {
    /// Source audio
    pub input_path: String,
    /// Destination audio
    pub output_path: String,
    /// Window to keep
    pub range: TrimRange,
    /// Re-encode with this codec; `None` copies the audio stream
    pub format: Option<String>,
}

impl TrimAudioParams {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        Ok(Self {
            input_path: args.required_string("inputPath")?,
            output_path: args.output_path("outputPath")?,
            range: TrimRange::from_args(args, defaults)?,
            format: args.string("format")?,
        })
    }
}

/// `ffmpeg -y -i <in> -ss <start> [-t <dur> | -to <end>] -acodec <format|copy> <out>`
pub fn build_trim_audio_command(params: &TrimAudioParams, tools: &ToolsConfig) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-i", &params.input_path);
    params.range.append_to(&mut inv);
    inv.flag("-acodec", params.format.as_deref().unwrap_or("copy"))
        .arg(&params.output_path);
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn video(v: serde_json::Value) -> Invocation {
        let args = ArgumentBag::from_value(Some(&v));
        let params = TrimVideoParams::from_args(args, &DefaultsConfig::default()).unwrap();
        build_trim_video_command(&params, &ToolsConfig::default())
    }

    fn audio(v: serde_json::Value) -> Invocation {
        let args = ArgumentBag::from_value(Some(&v));
        let params = TrimAudioParams::from_args(args, &DefaultsConfig::default()).unwrap();
        build_trim_audio_command(&params, &ToolsConfig::default())
    }

    #[test]
    fn test_trim_video_start_only() {
        let inv = video(json!({"inputPath": "in.mp4", "outputPath": "out.mp4"}));
        assert_eq!(
            inv.args,
            vec!["-y", "-i", "in.mp4", "-ss", "0", "-c", "copy", "out.mp4"]
        );
    }

    #[test]
    fn test_trim_video_duration_wins_over_end_time() {
        let inv = video(json!({
            "inputPath": "in.mp4",
            "outputPath": "out.mp4",
            "startTime": "00:00:05",
            "duration": "10",
            "endTime": "00:01:00",
        }));
        assert_eq!(
            inv.args,
            vec!["-y", "-i", "in.mp4", "-ss", "00:00:05", "-t", "10", "-c", "copy", "out.mp4"]
        );
        assert!(!inv.has_arg("-to"));
    }

    #[test]
    fn test_trim_video_end_time() {
        let inv = video(json!({
            "inputPath": "in.mp4",
            "outputPath": "out.mp4",
            "startTime": 5,
            "endTime": "00:00:30.500",
        }));
        assert_eq!(inv.value_of("-ss"), Some("5"));
        assert_eq!(inv.value_of("-to"), Some("00:00:30.500"));
        assert!(!inv.has_arg("-t"));
    }

    #[test]
    fn test_trim_audio_copies_by_default() {
        let inv = audio(json!({"inputPath": "in.wav", "outputPath": "out.wav", "duration": "3"}));
        assert_eq!(
            inv.args,
            vec!["-y", "-i", "in.wav", "-ss", "0", "-t", "3", "-acodec", "copy", "out.wav"]
        );
    }

    #[test]
    fn test_trim_audio_reencodes_with_format() {
        let inv = audio(json!({
            "inputPath": "in.wav",
            "outputPath": "out.mp3",
            "endTime": "12.5",
            "format": "libmp3lame",
        }));
        assert_eq!(
            inv.args,
            vec![
                "-y", "-i", "in.wav", "-ss", "0", "-to", "12.5", "-acodec", "libmp3lame", "out.mp3",
            ]
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_at_most_one_end_flag(
            duration in proptest::option::of("[0-9]{1,3}"),
            end_time in proptest::option::of("[0-9]{1,3}"),
        ) {
            let mut v = json!({"inputPath": "in.mp4", "outputPath": "out.mp4"});
            if let Some(d) = &duration {
                v["duration"] = json!(d);
            }
            if let Some(e) = &end_time {
                v["endTime"] = json!(e);
            }
            let inv = video(v);

            let has_t = inv.has_arg("-t");
            let has_to = inv.has_arg("-to");
            prop_assert!(!(has_t && has_to));
            prop_assert_eq!(has_t, duration.is_some());
            prop_assert_eq!(has_to, duration.is_none() && end_time.is_some());
            prop_assert_eq!(inv.value_of("-ss"), Some("0"));
        }
    }
}
