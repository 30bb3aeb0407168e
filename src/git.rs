//! Runs `git add`, `git commit` and `git push` on a worker thread.
//!
//! Progress goes back to the caller over a channel so the terminal keeps
//! printing while git works. The first failing command ends the run.

use std::{
    fmt, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use log::debug;
use thiserror::Error;

/// Program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(crate) enum CommandError {
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command {command} failed with {status}")]
    Exit {
        command: String,
        status: ExitStatus,
        /// stdout followed by stderr
        output: String,
    },
}

impl CommandError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Spawn { .. } => None,
            CommandError::Exit { status, .. } => status.code(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum GitEvent {
    Running(String),
    Output(String),
    Failed(CommandError),
    Finished,
}

pub(crate) fn publish_commands(message: &str) -> Vec<CommandLine> {
    vec![
        CommandLine::new("git", ["add", "."]),
        CommandLine::new("git", ["commit", "-m", message]),
        CommandLine::new("git", ["push", "-u", "origin", "main"]),
    ]
}

pub(crate) fn is_repository(dir: &Path) -> bool {
    dir.join(".git").is_dir()
}

/// Runs `commands` in `dir` one after another.
///
/// Each command's stdout and stderr are sent as [`GitEvent::Output`] once it
/// exits. A spawn failure or unsuccessful exit stops the sequence.
pub(crate) fn run_sequential_commands(
    dir: &Path,
    commands: &[CommandLine],
    events: &Sender<GitEvent>,
) -> Result<(), CommandError> {
    for command in commands {
        let display = command.to_string();
        debug!("Running {display:?} in {dir:?}");
        // a dropped receiver only means nobody is listening
        let _ = events.send(GitEvent::Running(display.clone()));

        let output = Command::new(&command.program)
            .args(&command.args)
            .current_dir(dir)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: display.clone(),
                source,
            })?;

        let mut combined = String::new();
        for stream in [&output.stdout, &output.stderr] {
            let text = String::from_utf8_lossy(stream);
            if !text.is_empty() {
                combined.push_str(&text);
                let _ = events.send(GitEvent::Output(text.into_owned()));
            }
        }

        if !output.status.success() {
            return Err(CommandError::Exit {
                command: display,
                status: output.status,
                output: combined,
            });
        }
    }
    Ok(())
}

/// Starts a worker running `commands`. The last event is always
/// [`GitEvent::Finished`] or [`GitEvent::Failed`].
pub(crate) fn spawn_sequence(dir: PathBuf, commands: Vec<CommandLine>) -> Receiver<GitEvent> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let last = match run_sequential_commands(&dir, &commands, &sender) {
            Ok(()) => GitEvent::Finished,
            Err(e) => GitEvent::Failed(e),
        };
        let _ = sender.send(last);
    });
    receiver
}

/// `git init` in `dir`, returning whatever git printed.
pub(crate) fn init_repository(dir: &Path) -> Result<String, CommandError> {
    let (sender, receiver) = mpsc::channel();
    run_sequential_commands(dir, &[CommandLine::new("git", ["init"])], &sender)?;
    drop(sender);
    Ok(receiver
        .iter()
        .filter_map(|event| match event {
            GitEvent::Output(text) => Some(text),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_publish_commands() {
        let commands: Vec<String> = publish_commands("fix typo")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            commands,
            ["git add .", "git commit -m fix typo", "git push -u origin main"]
        );
        assert_eq!(
            publish_commands("fix typo")[1].args,
            ["commit", "-m", "fix typo"]
        );
    }

    #[test]
    fn test_is_repository() {
        let temp = TempDir::new().unwrap();
        assert!(!is_repository(temp.path()));
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        assert!(is_repository(temp.path()));
    }

    #[cfg(unix)]
    fn sh(script: &str) -> CommandLine {
        CommandLine::new("sh", ["-c", script])
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_order() {
        let temp = TempDir::new().unwrap();
        let (sender, receiver) = mpsc::channel();

        run_sequential_commands(
            temp.path(),
            &[sh("echo one > log"), sh("echo two >> log; cat log")],
            &sender,
        )
        .unwrap();
        drop(sender);

        let outputs: Vec<String> = receiver
            .iter()
            .filter_map(|event| match event {
                GitEvent::Output(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(outputs, ["one\ntwo\n"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        let (sender, receiver) = mpsc::channel();

        let err = run_sequential_commands(
            temp.path(),
            &[
                sh("echo ok"),
                sh("echo broken >&2; exit 3"),
                sh("touch should-not-exist"),
            ],
            &sender,
        )
        .unwrap_err();
        drop(sender);

        assert_eq!(err.exit_code(), Some(3));
        match &err {
            CommandError::Exit { command, output, .. } => {
                assert_eq!(command, "sh -c echo broken >&2; exit 3");
                assert_eq!(output, "broken\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!temp.path().join("should-not-exist").exists());

        let running: Vec<String> = receiver
            .iter()
            .filter_map(|event| match event {
                GitEvent::Running(command) => Some(command),
                _ => None,
            })
            .collect();
        assert_eq!(running.len(), 2);
    }

    #[test]
    fn test_spawn_failure() {
        let temp = TempDir::new().unwrap();
        let receiver = spawn_sequence(
            temp.path().to_path_buf(),
            vec![CommandLine::new("blogcard-no-such-program", ["x"])],
        );
        let events: Vec<GitEvent> = receiver.iter().collect();
        assert!(matches!(events.first(), Some(GitEvent::Running(_))));
        assert!(matches!(
            events.last(),
            Some(GitEvent::Failed(CommandError::Spawn { .. }))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_worker_finishes() {
        let temp = TempDir::new().unwrap();
        let receiver = spawn_sequence(temp.path().to_path_buf(), vec![sh("true")]);
        let events: Vec<GitEvent> = receiver.iter().collect();
        assert!(matches!(events.last(), Some(GitEvent::Finished)));
    }
}
