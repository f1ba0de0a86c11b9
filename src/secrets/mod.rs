use crate::util::append_file;
use chrono::Local;
use log::info;
use rand::distr::Alphanumeric;
use rand::Rng;

pub const PASSWORD_LENGTH: usize = 24;
const CREDENTIALS_MODE: u32 = 0o600;

pub fn generate_password(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

// Generated once per run, never rotated
#[derive(Clone)]
pub struct Credentials {
    pub db_password: String,
    pub admin_password: String,
    pub backup_password: String,
}

impl Credentials {
    pub fn generate() -> Credentials {
        Credentials {
            db_password: generate_password(PASSWORD_LENGTH),
            admin_password: generate_password(PASSWORD_LENGTH),
            backup_password: generate_password(PASSWORD_LENGTH),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials { .. }")
    }
}

pub fn credentials_block(title: &str, entries: &[(&str, &str)]) -> String {
    let mut block = format!(
        "## {} ({})\n",
        title,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for (key, value) in entries {
        block.push_str(&format!("{}: {}\n", key, value));
    }
    block.push('\n');
    block
}

/// Plaintext; the file is created owner-only and only ever appended to.
pub fn persist_credentials(
    path: &str,
    title: &str,
    entries: &[(&str, &str)],
) -> Result<(), anyhow::Error> {
    append_file(path, &credentials_block(title, entries), CREDENTIALS_MODE)?;
    info!("Saved {} to {}", title.to_lowercase(), path);
    Ok(())
}
