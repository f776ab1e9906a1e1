//! Shared test fixtures: temporary hosts and a recording command runner.

use std::cell::RefCell;
use std::collections::HashMap;
use tempfile::TempDir;

use crate::config::DeploymentContext;
use crate::error::CommandError;
use crate::runner::{CommandOutput, CommandRunner, CommandSpec};
use crate::service::Service;

/// A temporary host: a home directory, a unit directory, and variables.
pub struct Fixture {
    pub home: TempDir,
    pub units: TempDir,
    vars: HashMap<String, String>,
}

impl Fixture {
    /// Creates a host for `environment` with a virtual environment already active.
    pub fn new(environment: &str) -> Self {
        let home = tempfile::tempdir().unwrap();
        let units = tempfile::tempdir().unwrap();
        let mut vars = HashMap::new();
        vars.insert(String::from("DINO_ENVIRONMENT"), environment.to_string());
        vars.insert(
            String::from("DINO_HOME"),
            home.path().to_str().unwrap().to_string(),
        );
        vars.insert(String::from("VIRTUAL_ENV"), String::from("/opt/dino-venv"));
        Self { home, units, vars }
    }

    pub fn with_units(self, services: &[Service]) -> Self {
        let environment = self.vars["DINO_ENVIRONMENT"].clone();
        for service in services {
            std::fs::write(
                self.units.path().join(service.unit_file_name(&environment)),
                "[Unit]\n",
            )
            .unwrap();
        }
        self
    }

    /// Creates `<home>/env/bin/activate`.
    pub fn with_runtime(self) -> Self {
        let bin = self.home.path().join("env").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("activate"), "# activate\n").unwrap();
        self
    }

    pub fn without_active_runtime(mut self) -> Self {
        self.vars.remove("VIRTUAL_ENV");
        self
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn without_var(mut self, name: &str) -> Self {
        self.vars.remove(name);
        self
    }

    pub fn home_str(&self) -> String {
        self.home.path().to_str().unwrap().to_string()
    }

    pub fn lookup(&self) -> impl Fn(&str) -> Option<String> + '_ {
        move |name| self.vars.get(name).cloned()
    }

    pub fn context(&self) -> DeploymentContext {
        DeploymentContext::from_lookup(self.lookup())
            .unwrap()
            .with_unit_directory(self.units.path())
    }
}

/// Records every command and optionally fails the one with a given label.
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<CommandSpec>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(label: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(label.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Step-style labels of the recorded calls (`pull`, `stop-web`, ...).
    pub fn labels(&self) -> Vec<String> {
        self.calls.borrow().iter().map(label).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        self.calls.borrow_mut().push(command.clone());
        if self.fail_on.as_deref() == Some(label(command).as_str()) {
            return Err(CommandError::failed(command.program(), Some(1), "simulated failure"));
        }
        Ok(CommandOutput::default())
    }
}

fn label(command: &CommandSpec) -> String {
    let args = command.arguments();
    match command.program() {
        "git" => String::from("pull"),
        "systemctl" => {
            let service = args[1]
                .strip_prefix("dino-")
                .and_then(|rest| rest.split_once('-'))
                .map_or("?", |(service, _)| service);
            format!("{}-{service}", args[0])
        }
        _ if args.first().is_some_and(|a| a.ends_with("clear_redis.py")) => {
            String::from("clear-cache")
        }
        _ if args.first().is_some_and(|a| a.ends_with("clear_db_online_table.py")) => {
            String::from("clear-db")
        }
        other => other.to_string(),
    }
}
