use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tempfile::TempDir;

#[derive(Debug)]
pub struct ConvertRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub log_dir: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let log_dir = root.join("logs");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            log_dir,
        }
    }

    pub fn write_input(&self, name: &str, json: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, json).expect("write input");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative))
            .unwrap_or_else(|e| panic!("read {relative}: {e}"))
    }

    pub fn read_bytes(&self, relative: &str) -> Vec<u8> {
        fs::read(self.root.join(relative)).unwrap_or_else(|e| panic!("read {relative}: {e}"))
    }
}

pub fn run_convert<I, S>(workspace: &Workspace, args: I, label: &str) -> ConvertRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_convert_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_convert_with_env<I, S, E, K, V>(
    workspace: &Workspace,
    args: I,
    env_vars: E,
    label: &str,
) -> ConvertRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nozbe2org"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_PROXY", "127.0.0.1,localhost");
    cmd.env("no_proxy", "127.0.0.1,localhost");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.root);
    cmd.envs(env_vars);

    let start = Instant::now();
    let output = cmd.output().expect("run nozbe2org");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nstarted: {:?}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        SystemTime::now(),
        duration,
        output.status,
        cmd.get_args().collect::<Vec<_>>(),
        workspace.root.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    ConvertRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}
