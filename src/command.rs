// External tool execution
// Both keytool and zabbix_sender go through here: blocking, no shell, no timeout.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::error::{DiscoveryError, Result};

/// A program plus its argument list, executed without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
    secret: Option<usize>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds an argument that is masked when the command is rendered for logs.
    pub fn secret_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.secret = Some(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Command line suitable for logs and error messages.
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for (i, arg) in self.args.iter().enumerate() {
            let arg = arg.to_string_lossy();
            rendered.push(' ');
            if self.secret == Some(i) {
                rendered.push_str("****");
            } else if arg.is_empty() || arg.contains(char::is_whitespace) {
                rendered.push_str(&format!("'{}'", arg));
            } else {
                rendered.push_str(&arg);
            }
        }
        rendered
    }

    /// Runs the command to completion and returns stdout followed by stderr.
    ///
    /// stdin is closed, so a tool that prompts for input fails instead of
    /// blocking the run.
    pub fn run(&self) -> Result<String> {
        let command = self.display();
        debug!("Exec cmd: {}", command);

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                error!("Failed to exec cmd {}", command);
                DiscoveryError::CommandSpawn {
                    command: command.clone(),
                    source,
                }
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            error!("Failed to exec cmd {}", command);
            return Err(DiscoveryError::CommandFailed {
                command,
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            });
        }

        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_masks_secret_and_quotes_blanks() {
        let cmd = ToolCommand::new("keytool")
            .arg("-list")
            .arg("-storepass")
            .secret_arg("hunter2")
            .arg("-alias")
            .arg("my cert")
            .arg("");

        assert_eq!(cmd.display(), "keytool -list -storepass **** -alias 'my cert' ''");
        assert_eq!(cmd.args()[2], "hunter2");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout_and_stderr() {
        let output = ToolCommand::new("sh")
            .arg("-c")
            .arg("echo out; echo err 1>&2")
            .run()
            .unwrap();

        assert_eq!(output, "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_non_zero_exit() {
        let result = ToolCommand::new("sh").arg("-c").arg("echo boom; exit 3").run();

        match result {
            Err(DiscoveryError::CommandFailed { output, .. }) => assert_eq!(output, "boom"),
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_argument_is_passed_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/tmp/st\xffore.jks");
        let cmd = ToolCommand::new("printf").arg("%s").arg(raw);

        assert_eq!(cmd.args()[1].as_os_str(), raw);
        assert_eq!(cmd.display(), "printf %s /tmp/st\u{FFFD}ore.jks");

        let output = Command::new(cmd.program()).args(cmd.args()).output().unwrap();
        assert_eq!(output.stdout, b"/tmp/st\xffore.jks");
    }

    #[test]
    fn test_run_reports_missing_program() {
        let result = ToolCommand::new("nonexistent_tool_xyz123").run();
        assert!(matches!(result, Err(DiscoveryError::CommandSpawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_arguments_are_not_shell_interpreted() {
        let output = ToolCommand::new("echo").arg("'a'; rm -rf $HOME").run().unwrap();
        assert_eq!(output, "'a'; rm -rf $HOME\n");
    }
}
