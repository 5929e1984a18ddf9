use std::ffi::{OsStr, OsString};
use std::fs;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use yai_config::{Config, DEFAULT_PORT, ListenEndpoint, LogFormat};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
    guard: Option<MutexGuard<'static, ()>>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let guard = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` in edition 2024; the override is
        // restored in `Drop` while the mutex is still held.
        unsafe { std::env::set_var(key, value) };
        Self {
            key,
            previous,
            guard: Some(guard),
        }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
        drop(self.guard.take());
    }
}

#[fixture]
fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(error) => panic!("failed to create temporary directory: {error}"),
    }
}

fn load(args: &[&str]) -> Config {
    let args = args.iter().map(OsString::from);
    match Config::load_from_iter(args) {
        Ok(config) => config,
        Err(error) => panic!("configuration should load: {error}"),
    }
}

#[rstest]
fn defaults_apply_without_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let config = load(&["yai-booking"]);
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.log_format(), LogFormat::Json);
}

#[rstest]
fn cli_flags_override_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let config = load(&[
        "yai-booking",
        "--host",
        "127.0.0.1",
        "--port",
        "4100",
        "--log-format",
        "compact",
    ]);
    assert_eq!(config.listen_endpoint(), ListenEndpoint::tcp("127.0.0.1", 4100));
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[rstest]
fn cli_flags_take_precedence_over_config_file(temp_dir: TempDir) {
    let path = temp_dir.path().join("yai.toml");
    if let Err(error) = fs::write(&path, "port = 4200\nlog_filter = \"debug\"\n") {
        panic!("failed to write configuration: {error}");
    }
    let path_text = path.to_string_lossy().into_owned();

    let _lock = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let config = load(&[
        "yai-booking",
        "--config-path",
        path_text.as_str(),
        "--port",
        "4300",
    ]);
    assert_eq!(config.port, 4300);
    assert_eq!(config.log_filter(), "debug");
}

#[rstest]
fn environment_overrides_config_file(temp_dir: TempDir) {
    let path = temp_dir.path().join("yai.toml");
    if let Err(error) = fs::write(&path, "port = 4400\n") {
        panic!("failed to write configuration: {error}");
    }

    let _port = EnvOverride::set_var("YAI_PORT", OsStr::new("4500"));
    let path_text = path.to_string_lossy().into_owned();
    let config = load(&["yai-booking", "--config-path", path_text.as_str()]);
    assert_eq!(config.port, 4500);
}
