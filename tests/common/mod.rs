//! Shared fixtures: recording command runner, settings and context builders
#![cfg(unix)]
#![allow(dead_code)]

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

use stackctl::application::ClusterContext;
use stackctl::config::Settings;
use stackctl::infrastructure::di::ServiceContainer;
use stackctl::infrastructure::traits::{CommandOptions, CommandRunner, RealFileSystem};
use stackctl::util::testing;

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub cmd: String,
    pub args: Vec<String>,
    pub opts: CommandOptions,
}

impl Call {
    /// `cmd arg1 arg2 ...`
    pub fn line(&self) -> String {
        std::iter::once(self.cmd.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn env(&self, key: &str) -> Option<&str> {
        self.opts
            .envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What the mock answers for a call.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    /// `None` simulates termination by a signal
    pub code: Option<i32>,
    pub stdout: String,
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.to_string(),
        }
    }

    pub fn fail(code: i32) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
        }
    }

    pub fn killed() -> Self {
        Self {
            code: None,
            stdout: String::new(),
        }
    }

    fn status(&self) -> ExitStatus {
        match self.code {
            Some(code) => ExitStatus::from_raw(code << 8),
            None => ExitStatus::from_raw(9),
        }
    }
}

type Responder = dyn Fn(&str, &[&str]) -> Reply + Send + Sync;

/// Command runner that records every call and answers through a responder.
pub struct MockCommandRunner {
    calls: Mutex<Vec<Call>>,
    responder: Box<Responder>,
}

impl MockCommandRunner {
    /// Every command succeeds with empty output.
    pub fn new() -> Self {
        Self::with_responder(|_, _| Reply::ok(""))
    }

    pub fn with_responder(
        responder: impl Fn(&str, &[&str]) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(Call::line).collect()
    }

    fn record(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> Reply {
        self.calls.lock().unwrap().push(Call {
            cmd: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            opts: opts.clone(),
        });
        (self.responder)(cmd, args)
    }
}

impl CommandRunner for MockCommandRunner {
    fn run_with(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> io::Result<Output> {
        let reply = self.record(cmd, args, opts);
        Ok(Output {
            status: reply.status(),
            stdout: reply.stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }

    fn status(&self, cmd: &str, args: &[&str], opts: &CommandOptions) -> io::Result<ExitStatus> {
        Ok(self.record(cmd, args, opts).status())
    }
}

/// Settings rooted in a temporary directory.
pub fn test_settings(root: &Path) -> Settings {
    testing::init_test_setup();
    Settings {
        data_dir: root.join("cluster"),
        backup_dir: root.join("backup"),
        cluster_name: Some("alpha".into()),
        ..Settings::default()
    }
}

pub fn test_context(settings: &Settings, swarm: bool) -> ClusterContext {
    ClusterContext::from_parts(settings, "x86_64", swarm, "node1")
}

/// Container over the real filesystem and the given mock runner.
pub fn test_container(
    settings: Settings,
    swarm: bool,
    cmd: Arc<MockCommandRunner>,
) -> ServiceContainer {
    testing::init_test_setup();
    let context = test_context(&settings, swarm);
    ServiceContainer::with_context(settings, context, Arc::new(RealFileSystem), cmd)
}

/// Create `<data_dir>/<name>` with a compose descriptor.
pub fn create_stack(settings: &Settings, name: &str) -> std::path::PathBuf {
    let dir = settings.data_dir.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("docker-compose.yml"), "services: {}\n").unwrap();
    dir
}
