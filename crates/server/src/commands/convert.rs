//! `convert_video` and `extract_audio`

use super::{ffmpeg, option_tokens};
use crate::args::ArgumentBag;
use crate::config::{DefaultsConfig, ToolsConfig};
use crate::error::OperationError;
use crate::invocation::Invocation;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    /// Source video
    pub input_path: String,
    /// Destination file; the container follows its extension
    pub output_path: String,
    /// Caller-supplied options, already split into tokens
    pub options: Vec<String>,
}

impl ConvertParams {
    pub fn from_args(args: ArgumentBag<'_>) -> Result<Self, OperationError> {
        Ok(Self {
            input_path: args.required_string("inputPath")?,
            output_path: args.output_path("outputPath")?,
            options: option_tokens("options", args.string("options")?)?,
        })
    }
}

/// `ffmpeg -y -i <in> <options...> <out>`
pub fn build_convert_command(params: &ConvertParams, tools: &ToolsConfig) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-i", &params.input_path)
        .args(&params.options)
        .arg(&params.output_path);
    inv
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractAudioParams {
    /// Source video
    pub input_path: String,
    /// Destination audio file
    pub output_path: String,
    /// Audio codec passed to `-acodec`
    pub format: String,
}

impl ExtractAudioParams {
    pub fn from_args(
        args: ArgumentBag<'_>,
        defaults: &DefaultsConfig,
    ) -> Result<Self, OperationError> {
        Ok(Self {
            input_path: args.required_string("inputPath")?,
            output_path: args.output_path("outputPath")?,
            format: args.string_or("format", &defaults.audio_format)?,
        })
    }
}

/// `ffmpeg -y -i <in> -vn -acodec <format> <out>`
pub fn build_extract_audio_command(params: &ExtractAudioParams, tools: &ToolsConfig) -> Invocation {
    let mut inv = ffmpeg(tools);
    inv.flag("-i", &params.input_path)
        .arg("-vn")
        .flag("-acodec", &params.format)
        .arg(&params.output_path);
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_convert_passes_options_before_output() {
        let v = json!({
            "inputPath": "in.avi",
            "outputPath": "out.mp4",
            "options": "-c:v libx264 -crf 23",
        });
        let params = ConvertParams::from_args(ArgumentBag::from_value(Some(&v))).unwrap();
        let inv = build_convert_command(&params, &ToolsConfig::default());

        assert_eq!(
            inv.args,
            vec!["-y", "-i", "in.avi", "-c:v", "libx264", "-crf", "23", "out.mp4"]
        );
    }

    #[test]
    fn test_convert_without_options() {
        let v = json!({"inputPath": "in.avi", "outputPath": "out.mp4"});
        let params = ConvertParams::from_args(ArgumentBag::from_value(Some(&v))).unwrap();
        assert!(params.options.is_empty());

        let inv = build_convert_command(&params, &ToolsConfig::default());
        assert_eq!(inv.args, vec!["-y", "-i", "in.avi", "out.mp4"]);
    }

    #[test]
    fn test_convert_requires_output() {
        let v = json!({"inputPath": "in.avi"});
        let err = ConvertParams::from_args(ArgumentBag::from_value(Some(&v))).unwrap_err();
        assert_eq!(err.to_string(), "outputPath is required");
    }

    #[test]
    fn test_convert_rejects_option_like_output() {
        let v = json!({"inputPath": "in.avi", "outputPath": "-version"});
        let err = ConvertParams::from_args(ArgumentBag::from_value(Some(&v))).unwrap_err();
        assert!(matches!(
            err,
            OperationError::InvalidArgument { ref name, .. } if name == "outputPath"
        ));
    }

    #[test]
    fn test_extract_audio_defaults_to_mp3() {
        let v = json!({"inputPath": "in.mp4", "outputPath": "out.mp3"});
        let args = ArgumentBag::from_value(Some(&v));
        let params = ExtractAudioParams::from_args(args, &DefaultsConfig::default()).unwrap();
        assert_eq!(params.format, "mp3");

        let inv = build_extract_audio_command(&params, &ToolsConfig::default());
        assert_eq!(
            inv.args,
            vec!["-y", "-i", "in.mp4", "-vn", "-acodec", "mp3", "out.mp3"]
        );
    }

    #[test]
    fn test_extract_audio_explicit_format() {
        let v = json!({"inputPath": "in.mp4", "outputPath": "out.m4a", "format": "aac"});
        let args = ArgumentBag::from_value(Some(&v));
        let params = ExtractAudioParams::from_args(args, &DefaultsConfig::default()).unwrap();
        let inv = build_extract_audio_command(&params, &ToolsConfig::default());
        assert_eq!(inv.value_of("-acodec"), Some("aac"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        // Paths are single tokens whatever characters they contain, and the
        // output path is always the final token.
        #[test]
        fn prop_paths_stay_single_tokens(
            input in "[a-zA-Z0-9 ;&|$'\"_./-]{1,40}",
            output in "[a-zA-Z0-9 ;&|$'\"_./-]{1,40}",
        ) {
            let params = ConvertParams {
                input_path: input.clone(),
                output_path: output.clone(),
                options: vec![],
            };
            let inv = build_convert_command(&params, &ToolsConfig::default());
            prop_assert_eq!(inv.args.len(), 4);
            prop_assert_eq!(inv.value_of("-i"), Some(input.as_str()));
            prop_assert_eq!(inv.args.last(), Some(&output));
        }
    }
}
