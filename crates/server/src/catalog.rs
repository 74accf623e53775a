//! Tool catalog advertised to clients
//!
//! Purely descriptive: names, descriptions and JSON input schemas. It must
//! stay in step with the argument keys the command builders read.

use rmcp::model::Tool;
use serde_json::{json, Map, Value};
use std::sync::Arc;

struct Property {
    key: &'static str,
    kind: &'static str,
    description: &'static str,
}

const fn string(key: &'static str, description: &'static str) -> Property {
    Property {
        key,
        kind: "string",
        description,
    }
}

const fn number(key: &'static str, description: &'static str) -> Property {
    Property {
        key,
        kind: "number",
        description,
    }
}

fn definition(name: &str, description: &str, properties: &[Property], required: &[&str]) -> Tool {
    let props: Map<String, Value> = properties
        .iter()
        .map(|p| {
            (
                p.key.to_string(),
                json!({"type": p.kind, "description": p.description}),
            )
        })
        .collect();

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(props));
    schema.insert("required".to_string(), json!(required));

    Tool::new(name.to_string(), description.to_string(), Arc::new(schema))
}

/// All operations, in the order they are listed to clients.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        definition(
            "get_video_info",
            "Get detailed information about a video file",
            &[string("filePath", "Path to the video file")],
            &["filePath"],
        ),
        definition(
            "convert_video",
            "Convert a video file to a different format",
            &[
                string("inputPath", "Path to the input video file"),
                string("outputPath", "Path for the output video file"),
                string("options", "Additional FFmpeg options (optional)"),
            ],
            &["inputPath", "outputPath"],
        ),
        definition(
            "extract_audio",
            "Extract audio from a video file",
            &[
                string("inputPath", "Path to the input video file"),
                string("outputPath", "Path for the output audio file"),
                string("format", "Audio format (mp3, aac, etc.)"),
            ],
            &["inputPath", "outputPath", "format"],
        ),
        definition(
            "create_video_from_images",
            "Create a video from a sequence of images",
            &[
                string(
                    "inputPattern",
                    "Pattern for input images (e.g., 'img%03d.jpg' or 'folder/*.png')",
                ),
                string("outputPath", "Path for the output video file"),
                number("framerate", "Frames per second (default: 25)"),
                string("codec", "Video codec to use (default: libx264)"),
                string("pixelFormat", "Pixel format (default: yuv420p)"),
                string("extraOptions", "Additional FFmpeg options"),
            ],
            &["inputPattern", "outputPath"],
        ),
        definition(
            "trim_video",
            "Trim a video to a specific duration",
            &[
                string("inputPath", "Path to the input video file"),
                string("outputPath", "Path for the output video file"),
                string("startTime", "Start time (format: HH:MM:SS.mmm or seconds)"),
                string("duration", "Duration (format: HH:MM:SS.mmm or seconds)"),
                string("endTime", "End time (format: HH:MM:SS.mmm or seconds)"),
            ],
            &["inputPath", "outputPath"],
        ),
        definition(
            "add_watermark",
            "Add a watermark to a video",
            &[
                string("inputPath", "Path to the input video file"),
                string("watermarkPath", "Path to the watermark image"),
                string("outputPath", "Path for the output video file"),
                string(
                    "position",
                    "Position of watermark (topleft, topright, bottomleft, bottomright, center)",
                ),
                number("opacity", "Opacity of watermark (0.0-1.0)"),
            ],
            &["inputPath", "watermarkPath", "outputPath"],
        ),
        definition(
            "trim_audio",
            "Trim an audio file to a specific duration",
            &[
                string("inputPath", "Path to the input audio file"),
                string("outputPath", "Path for the output audio file"),
                string("startTime", "Start time (format: HH:MM:SS.mmm or seconds)"),
                string("duration", "Duration (format: HH:MM:SS.mmm or seconds)"),
                string("endTime", "End time (format: HH:MM:SS.mmm or seconds)"),
                string("format", "Audio format for output (mp3, aac, etc.)"),
            ],
            &["inputPath", "outputPath"],
        ),
        definition(
            "extract_frames",
            "Extract frames from a video as sequential image files",
            &[
                string("inputPath", "Path to the input video file"),
                string(
                    "outputDir",
                    "Directory to save the extracted frames (default: 'output')",
                ),
                string(
                    "frameRate",
                    "Frame extraction rate (e.g., '1' for one frame per second, '0.5' for one frame every 2 seconds, '1/30' for 1 frame per 30 seconds)",
                ),
                string("format", "Output image format (jpg, png, etc., default: jpg)"),
                number("quality", "Image quality for jpg/png output (1-100, default: 95)"),
                string(
                    "startTime",
                    "Start time to begin extraction (format: HH:MM:SS.mmm or seconds)",
                ),
                string(
                    "duration",
                    "Duration to extract frames (format: HH:MM:SS.mmm or seconds)",
                ),
            ],
            &["inputPath"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OPERATION_NAMES;

    #[test]
    fn test_catalog_lists_every_operation_in_order() {
        let names: Vec<String> = tool_definitions()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, OPERATION_NAMES.to_vec());
    }

    #[test]
    fn test_required_keys_are_declared_properties() {
        for tool in tool_definitions() {
            let schema = &tool.input_schema;
            assert_eq!(schema["type"], "object");
            let props = schema["properties"].as_object().unwrap();
            for key in schema["required"].as_array().unwrap() {
                let key = key.as_str().unwrap();
                assert!(props.contains_key(key), "{} requires undeclared {}", tool.name, key);
            }
        }
    }

    #[test]
    fn test_numeric_properties() {
        let tools = tool_definitions();
        let watermark = tools.iter().find(|t| t.name == "add_watermark").unwrap();
        assert_eq!(watermark.input_schema["properties"]["opacity"]["type"], "number");

        let frames = tools.iter().find(|t| t.name == "extract_frames").unwrap();
        assert_eq!(frames.input_schema["properties"]["quality"]["type"], "number");
        assert_eq!(frames.input_schema["properties"]["frameRate"]["type"], "string");
    }

    #[test]
    fn test_serializes_with_camel_case_schema_key() {
        let json = serde_json::to_value(&tool_definitions()[0]).unwrap();
        assert_eq!(json["name"], "get_video_info");
        assert_eq!(json["description"], "Get detailed information about a video file");
        assert_eq!(json["inputSchema"]["required"][0], "filePath");
    }
}
