//! Local hostname detection.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use mwdeploy_core::ServerName;

const KERNEL_HOSTNAME: &str = "/proc/sys/kernel/hostname";

/// Short name of this machine, e.g. `mw1` for `mw1.example.org`.
///
/// An explicit `override_name` wins over detection.
pub fn local_server(override_name: Option<&str>) -> Result<ServerName> {
    local_server_at(override_name, Path::new(KERNEL_HOSTNAME))
}

/// `local_server` reading the kernel hostname from `kernel_file`.
pub fn local_server_at(override_name: Option<&str>, kernel_file: &Path) -> Result<ServerName> {
    let full = match override_name.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => name.to_string(),
        None => match read_hostname_file(kernel_file) {
            Some(name) => name,
            None => hostname_command()?,
        },
    };
    let short = ServerName::short(&full);
    if short.as_str().is_empty() {
        bail!("hostname '{full}' has no usable short name");
    }
    Ok(short)
}

fn read_hostname_file(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let name = contents.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn hostname_command() -> Result<String> {
    let output = Command::new("hostname")
        .output()
        .context("failed to run `hostname`")?;
    if !output.status.success() {
        bail!(
            "`hostname` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if name.is_empty() {
        bail!("`hostname` printed nothing");
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn kernel_file(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("hostname");
        fs::write(&path, contents).expect("write hostname");
        (dir, path)
    }

    #[test]
    fn override_is_shortened() {
        let host = local_server(Some("mw2.example.org")).expect("host");
        assert_eq!(host.as_str(), "mw2");
    }

    #[test]
    fn blank_override_falls_back_to_kernel_hostname() {
        let (_dir, path) = kernel_file("mwtask1.example.org\n");
        let host = local_server_at(Some("  "), &path).expect("detected host");
        assert_eq!(host.as_str(), "mwtask1");
    }

    #[test]
    fn override_wins_over_kernel_hostname() {
        let (_dir, path) = kernel_file("mw1\n");
        let host = local_server_at(Some("mw2"), &path).expect("host");
        assert_eq!(host.as_str(), "mw2");
    }

    #[test]
    fn blank_kernel_file_is_ignored() {
        let (_dir, path) = kernel_file("   \n");
        assert_eq!(read_hostname_file(&path), None);
        assert_eq!(read_hostname_file(&path.with_file_name("absent")), None);
    }

    #[test]
    fn leading_dot_is_rejected() {
        assert!(local_server(Some(".example.org")).is_err());
    }
}
