//! External tool invocations
//!
//! An [`Invocation`] is the executable name plus its discrete argument tokens.
//! Builders append tokens one at a time; nothing is ever joined into a shell
//! command line, so paths and option values need no quoting.

use std::fmt;
use tokio::process::Command;

/// A single external tool call: program plus ordered argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument token.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append several argument tokens in order.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a flag followed by its value.
    pub fn flag(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
        self.arg(flag).arg(value)
    }

    /// Build the process command for this invocation.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Value following the first occurrence of `flag`, if any.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .windows(2)
            .find(|pair| pair[0] == flag)
            .map(|pair| pair[1].as_str())
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Human-readable echo of the command line, for logs only.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"') {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_tokens_are_appended_in_order() {
        let mut inv = Invocation::new("ffmpeg");
        inv.arg("-y").flag("-i", "in put.mp4").args(["-c", "copy"]).arg("out.mp4");

        assert_eq!(inv.args, vec!["-y", "-i", "in put.mp4", "-c", "copy", "out.mp4"]);
        assert_eq!(inv.value_of("-i"), Some("in put.mp4"));
        assert_eq!(inv.value_of("-t"), None);
        assert!(inv.has_arg("copy"));
    }

    #[test]
    fn test_to_command_keeps_tokens_intact() {
        let mut inv = Invocation::new("ffmpeg");
        inv.flag("-i", "clip; rm -rf ~.mp4");

        let cmd = inv.to_command();
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), OsStr::new("ffmpeg"));
        let args: Vec<&OsStr> = std_cmd.get_args().collect();
        assert_eq!(args, vec![OsStr::new("-i"), OsStr::new("clip; rm -rf ~.mp4")]);
    }

    #[test]
    fn test_display_quotes_tokens_with_spaces() {
        let mut inv = Invocation::new("ffmpeg");
        inv.flag("-i", "my clip.mp4").arg("out.mp4");
        assert_eq!(inv.to_string(), "ffmpeg -i \"my clip.mp4\" out.mp4");
    }
}
