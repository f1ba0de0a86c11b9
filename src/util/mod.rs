use anyhow::Context;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;

pub fn home_dir_for(user: &str) -> String {
    if user == "root" {
        "/root".to_string()
    } else {
        format!("/home/{}", user)
    }
}

/// The operator who started the run through `sudo`, when the process is root on their behalf.
pub fn sudo_operator() -> Option<String> {
    operator_behind_sudo(
        whoami::username().ok().as_deref(),
        std::env::var("SUDO_USER").ok().as_deref(),
    )
}

fn operator_behind_sudo(user: Option<&str>, sudo_user: Option<&str>) -> Option<String> {
    match (user, sudo_user.map(str::trim)) {
        (Some("root"), Some(operator)) if !operator.is_empty() && operator != "root" => {
            Some(operator.to_string())
        }
        _ => None,
    }
}

// Under sudo the operator's home, not root's
pub fn default_home_dir() -> String {
    if let Some(operator) = sudo_operator() {
        return home_dir_for(&operator);
    }
    match whoami::username() {
        Ok(user) => home_dir_for(&user),
        Err(_) => std::env::var("HOME").unwrap_or_else(|_| "/root".to_string()),
    }
}

pub fn default_credentials_path() -> String {
    format!("{}/moodle_credentials.txt", default_home_dir())
}

pub fn host_name() -> String {
    whoami::hostname().unwrap_or_else(|_| "unknown-host".to_string())
}

/// Overwrites `path`; when `mode` is given the permission bits are forced to it,
/// including on a file that already existed.
pub fn write_file(path: &str, contents: &str, mode: Option<u32>) -> Result<(), anyhow::Error> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create directory {}", parent.display()))?;
    }
    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    if let Some(m) = mode {
        options.mode(m);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("unable to open {}", path))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("unable to write {}", path))?;
    if let Some(m) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(m))
            .with_context(|| format!("unable to chmod {}", path))?;
    }
    Ok(())
}

/// Appends to `path`, creating it with `mode` when missing.
pub fn append_file(path: &str, contents: &str, mode: u32) -> Result<(), anyhow::Error> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create directory {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(mode)
        .open(path)
        .with_context(|| format!("unable to open {}", path))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("unable to append to {}", path))?;
    Ok(())
}

/// Points `link` at `target`, replacing whatever `link` was before.
pub fn replace_symlink(target: &str, link: &str) -> Result<(), anyhow::Error> {
    let link_path = Path::new(link);
    if link_path.symlink_metadata().is_ok() {
        fs::remove_file(link_path).with_context(|| format!("unable to remove {}", link))?;
    }
    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("unable to create directory {}", parent.display()))?;
    }
    std::os::unix::fs::symlink(target, link_path)
        .with_context(|| format!("unable to link {} -> {}", link, target))?;
    Ok(())
}
