//! Behaviour tests for configuration layering.

use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use cfscript_config::{
    Config, default_log_filter, default_log_format, default_target_pending_commands,
};

const TARGET_ENV: &str = "CFSCRIPT_TARGET_PENDING_COMMANDS";
const QUIET_ENV: &str = "CFSCRIPT_QUIET_ERRORS";

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct Harness {
    temp_dir: TempDir,
    cli_args: std::cell::RefCell<Vec<OsString>>,
    env_overrides: std::cell::RefCell<Vec<(String, Option<OsString>)>>,
    loaded: std::cell::RefCell<Option<Config>>,
    error: std::cell::RefCell<Option<String>>,
    _env_guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let env_guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        let harness = Self {
            temp_dir,
            cli_args: std::cell::RefCell::new(vec![OsString::from("cf-print-inv")]),
            env_overrides: std::cell::RefCell::new(Vec::new()),
            loaded: std::cell::RefCell::new(None),
            error: std::cell::RefCell::new(None),
            _env_guard: env_guard,
        };
        // Start every scenario from a clean environment.
        harness.clear_env(TARGET_ENV);
        harness.clear_env(QUIET_ENV);
        harness
    }

    fn write_config(&self, target: &str) {
        let path = self.temp_dir.path().join("cfscript.toml");
        if let Err(error) = fs::write(&path, format!("target_pending_commands = {target}\n")) {
            panic!("failed to write configuration: {error}");
        }

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on edition 2024. The harness holds
        // the env mutex and restores overrides in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn clear_env(&self, key: &str) {
        let previous = std::env::var_os(key);
        unsafe { std::env::remove_var(key) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => {
                *self.loaded.borrow_mut() = Some(config);
            }
            Err(error) => {
                *self.error.borrow_mut() = Some(error.to_string());
            }
        }
    }

    fn loaded_config(&self) -> Config {
        self.load();

        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }

        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!("configuration was not loaded"),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            if let Some(os_value) = value {
                unsafe { std::env::set_var(&key, os_value) };
            } else {
                unsafe { std::env::remove_var(&key) };
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the pending target to \"{target}\"")]
fn given_configuration_file(harness: &Harness, target: String) {
    harness.write_config(&target);
}

#[given("the environment overrides the pending target to \"{target}\"")]
fn given_environment_override(harness: &Harness, target: String) {
    harness.set_env(TARGET_ENV, &target);
}

#[when("the CLI sets the pending target to \"{target}\"")]
fn when_cli_override(harness: &Harness, target: String) {
    harness.push_cli_arg("--target-pending-commands");
    harness.push_cli_arg(OsString::from(&target));
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("loading the configuration resolves the pending target to \"{target}\"")]
fn then_resolved_target(harness: &Harness, target: String) {
    let config = harness.loaded_config();
    let expected: usize = match target.parse() {
        Ok(value) => value,
        Err(error) => panic!("invalid expected target '{target}': {error}"),
    };
    assert_eq!(config.target_pending_commands(), expected);
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.loaded_config();
    assert_eq!(
        config.target_pending_commands(),
        default_target_pending_commands()
    );
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert!(config.echo_errors_in_game());
}

#[when("the CLI asks for quiet errors")]
fn when_cli_quiet_errors(harness: &Harness) {
    harness.push_cli_arg("--quiet-errors");
}

#[then("protocol errors are not drawn in game")]
fn then_errors_not_drawn(harness: &Harness) {
    let config = harness.loaded_config();
    assert!(!config.echo_errors_in_game());
    assert_eq!(
        config.target_pending_commands(),
        default_target_pending_commands()
    );
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Built-in defaults apply when nothing overrides them"
)]
fn configuration_defaults(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "A configuration file overrides the default target"
)]
fn configuration_file_layer(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The environment overrides the configuration file"
)]
fn environment_layer(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The command line overrides every other layer"
)]
fn cli_layer(#[from(harness)] harness: Harness) {
    let _ = harness;
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "The command line can silence in-game error reports"
)]
fn quiet_errors_flag(#[from(harness)] harness: Harness) {
    let _ = harness;
}
