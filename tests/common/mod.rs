use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub const CONTRACT: &str = "registry.testnet";
pub const DEV_ACCOUNT: &str = "alice.testnet";
#[allow(dead_code)]
pub const APP_URL: &str = "http://localhost:1234/";

pub struct DevnetGuard {
    pub base_url: String,
    _data_dir: tempfile::TempDir,
    child: Child,
}

impl Drop for DevnetGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl DevnetGuard {
    pub fn rpc_url(&self) -> String {
        format!("{}/rpc", self.base_url)
    }

    #[allow(dead_code)]
    pub fn wallet_url(&self) -> String {
        format!("{}/", self.base_url)
    }
}

pub fn spawn_devnet() -> Result<DevnetGuard> {
    spawn_devnet_with(&[])
}

pub fn spawn_devnet_with(extra: &[&str]) -> Result<DevnetGuard> {
    let data_dir = tempfile::tempdir().context("create devnet tempdir")?;
    let addr_file = data_dir.path().join("addr.txt");

    let child = Command::new(env!("CARGO_BIN_EXE_gateway-devnet"))
        .args([
            "--addr",
            "127.0.0.1:0",
            "--addr-file",
            addr_file.to_str().unwrap(),
            "--contract",
            CONTRACT,
            "--dev-account",
            DEV_ACCOUNT,
        ])
        .args(extra)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn gateway-devnet")?;

    let base_url = read_addr_file(&addr_file)?;
    wait_for_healthz(&base_url)?;

    Ok(DevnetGuard {
        base_url,
        _data_dir: data_dir,
        child,
    })
}

fn read_addr_file(addr_file: &Path) -> Result<String> {
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("addr file not written at {}", addr_file.display());
        }

        if let Ok(s) = std::fs::read_to_string(addr_file) {
            let s = s.trim();
            if !s.is_empty() {
                return Ok(format!("http://{}", s));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn wait_for_healthz(base_url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("devnet did not become healthy at {}/healthz", base_url);
        }
        match client.get(format!("{}/healthz", base_url)).send() {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => {
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

/// Runs the gateway CLI against `devnet`, keeping wallet state in `state_dir`.
#[allow(dead_code)]
pub fn run_gateway(devnet: &DevnetGuard, state_dir: &Path, args: &[&str]) -> Result<Output> {
    let out = Command::new(env!("CARGO_BIN_EXE_registry-gateway"))
        .env_remove("GATEWAY_ENV")
        .env_remove("CONTRACT_NAME")
        .env_remove("GATEWAY_LOG")
        .args([
            "--network",
            "devnet",
            "--contract",
            CONTRACT,
            "--node-url",
            &devnet.rpc_url(),
            "--wallet-url",
            &devnet.wallet_url(),
            "--app-url",
            APP_URL,
            "--state-dir",
            state_dir.to_str().unwrap(),
        ])
        .args(args)
        .output()
        .context("run registry-gateway")?;
    Ok(out)
}

#[allow(dead_code)]
pub fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[allow(dead_code)]
pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

/// The url the CLI asked the user to open.
#[allow(dead_code)]
pub fn navigation(out: &Output) -> Option<String> {
    stdout(out)
        .lines()
        .find_map(|l| l.strip_prefix("navigate: ").map(str::to_string))
}

/// Opens a wallet page the way a browser would and returns where the
/// wallet sends the user back to.
#[allow(dead_code)]
pub fn follow_wallet(url: &str) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("build reqwest client")?;
    let resp = client.get(url).send().context("open wallet page")?;
    if !resp.status().is_redirection() {
        anyhow::bail!("wallet answered {} instead of a redirect", resp.status());
    }
    let location = resp
        .headers()
        .get(reqwest::header::LOCATION)
        .context("redirect without location")?
        .to_str()
        .context("location header is not utf-8")?;
    Ok(location.to_string())
}
