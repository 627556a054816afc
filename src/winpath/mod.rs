//! Path translation between the WSL and Windows filesystem namespaces
//!
//! Translation shells out to `wslpath`, and the Windows temp directory is
//! resolved through `cmd.exe`. Both only exist inside a WSL distribution,
//! so every call here can fail on plain Linux.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Returns true for paths in the WSL namespace (leading `/`), as opposed
/// to Windows drive-letter paths like `C:\...`.
pub fn is_wsl_path(path: &str) -> bool {
    path.starts_with('/')
}

/// Translate a WSL path into its Windows spelling via `wslpath -w`
pub async fn to_windows(path: &Path) -> Result<String> {
    let path = path.display().to_string();
    run_interop("wslpath", &["-w", path.as_str()]).await
}

/// Translate a Windows path into its WSL spelling via `wslpath -u`
pub async fn to_unix(path: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(run_interop("wslpath", &["-u", path]).await?))
}

/// The Windows user's temp directory, in Windows spelling
pub async fn windows_temp_dir() -> Result<String> {
    run_interop("cmd.exe", &["/c", "echo %TEMP%"]).await
}

async fn run_interop(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        anyhow::bail!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
