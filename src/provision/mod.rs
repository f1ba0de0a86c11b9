mod cron;
mod database;
mod firewall;
mod moodle;
mod php;
mod system;
mod web;

use crate::domain::Domain;
use crate::logging::{log_step_end, log_step_skipped, log_step_start};
use crate::runner::{CommandRunner, Invocation};
use crate::secrets::{persist_credentials, Credentials};
use crate::settings::Settings;
use crate::util::{replace_symlink, write_file};
use anyhow::Context;
use clap::ValueEnum;
use log::info;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Packages,
    Services,
    Source,
    Permissions,
    Php,
    Cron,
    Database,
    Nginx,
    Tls,
    Install,
    Backup,
    Harden,
}

impl Step {
    pub const ALL: [Step; 12] = [
        Step::Packages,
        Step::Services,
        Step::Source,
        Step::Permissions,
        Step::Php,
        Step::Cron,
        Step::Database,
        Step::Nginx,
        Step::Tls,
        Step::Install,
        Step::Backup,
        Step::Harden,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::Packages => "packages",
            Step::Services => "services",
            Step::Source => "source",
            Step::Permissions => "permissions",
            Step::Php => "php",
            Step::Cron => "cron",
            Step::Database => "database",
            Step::Nginx => "nginx",
            Step::Tls => "tls",
            Step::Install => "install",
            Step::Backup => "backup",
            Step::Harden => "harden",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::Packages => "install system packages",
            Step::Services => "enable nginx, mariadb and php-fpm",
            Step::Source => "clone the Moodle source",
            Step::Permissions => "create the data root and set ownership",
            Step::Php => "tune php.ini and restart php-fpm",
            Step::Cron => "register the per-minute Moodle cron job",
            Step::Database => "create the database and its user",
            Step::Nginx => "write and enable the nginx site",
            Step::Tls => "obtain a certificate with certbot",
            Step::Install => "run the Moodle CLI installer",
            Step::Backup => "create the backup user and backup cron jobs",
            Step::Harden => "secure mariadb and enable the firewall",
        }
    }
}

pub struct Provisioner<R: CommandRunner> {
    pub domain: Domain,
    pub settings: Settings,
    pub credentials: Credentials,
    pub runner: R,
    pub dry_run: bool,
}

impl<R: CommandRunner> Provisioner<R> {
    pub fn new(
        domain: Domain,
        settings: Settings,
        credentials: Credentials,
        runner: R,
        dry_run: bool,
    ) -> Provisioner<R> {
        Provisioner {
            domain,
            settings,
            credentials,
            runner,
            dry_run,
        }
    }

    /// Runs every step in order and stops at the first failure; nothing is rolled back.
    pub async fn run(&self, skip: &[Step]) -> Result<(), anyhow::Error> {
        info!(
            "Provisioning Moodle for {} ({} steps{})",
            self.domain,
            Step::ALL.len(),
            if self.dry_run { ", dry run" } else { "" }
        );
        for (index, step) in Step::ALL.iter().enumerate() {
            if skip.contains(step) {
                log_step_skipped(index + 1, step.name());
                continue;
            }
            log_step_start(index + 1, Step::ALL.len(), step.name(), step.description());
            let result = self
                .run_step(*step)
                .await
                .with_context(|| format!("step '{}' failed", step.name()));
            log_step_end(index + 1, step.name(), result.is_ok());
            result?;
        }
        info!("Moodle is provisioned at https://{}", self.domain);
        Ok(())
    }

    pub async fn run_step(&self, step: Step) -> Result<(), anyhow::Error> {
        match step {
            Step::Packages => self.install_packages().await,
            Step::Services => self.enable_services().await,
            Step::Source => self.fetch_source().await,
            Step::Permissions => self.set_permissions().await,
            Step::Php => self.tune_php().await,
            Step::Cron => self.register_moodle_cron().await,
            Step::Database => self.create_database().await,
            Step::Nginx => self.configure_nginx().await,
            Step::Tls => self.obtain_certificate().await,
            Step::Install => self.install_moodle().await,
            Step::Backup => self.configure_backups().await,
            Step::Harden => self.harden().await,
        }
    }

    pub(crate) fn write_file(&self, path: &str, contents: &str, mode: Option<u32>) -> Result<(), anyhow::Error> {
        if self.dry_run {
            info!("[DRY RUN ] write {} ({} bytes)", path, contents.len());
            return Ok(());
        }
        write_file(path, contents, mode)?;
        info!("Wrote {}", path);
        Ok(())
    }

    pub(crate) fn create_dir_all(&self, path: &str) -> Result<(), anyhow::Error> {
        if self.dry_run {
            info!("[DRY RUN ] mkdir -p {}", path);
            return Ok(());
        }
        fs::create_dir_all(path).with_context(|| format!("unable to create directory {}", path))
    }

    pub(crate) fn link(&self, target: &str, link: &str) -> Result<(), anyhow::Error> {
        if self.dry_run {
            info!("[DRY RUN ] ln -sf {} {}", target, link);
            return Ok(());
        }
        replace_symlink(target, link)
    }

    pub(crate) fn remove_if_present(&self, path: &str) -> Result<(), anyhow::Error> {
        if Path::new(path).symlink_metadata().is_err() {
            return Ok(());
        }
        if self.dry_run {
            info!("[DRY RUN ] rm {}", path);
            return Ok(());
        }
        fs::remove_file(path).with_context(|| format!("unable to remove {}", path))?;
        info!("Removed {}", path);
        Ok(())
    }

    /// Appends a block to the credentials file and hands the file to the sudo operator, if any.
    pub(crate) async fn save_credentials(
        &self,
        title: &str,
        entries: &[(&str, &str)],
    ) -> Result<(), anyhow::Error> {
        let path = self.settings.credentials_path();
        if self.dry_run {
            info!("[DRY RUN ] append {} to {}", title.to_lowercase(), path);
            return Ok(());
        }
        persist_credentials(&path, title, entries)?;
        if let Some(owner) = &self.settings.credentials_owner {
            self.runner
                .run_checked(&Invocation::new("chown").arg(format!("{}:", owner)).arg(&path))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Provisioner;
    use crate::domain::Domain;
    use crate::runner::recording::RecordingRunner;
    use crate::secrets::Credentials;
    use crate::settings::Settings;
    use std::path::{Path, PathBuf};

    pub fn sandboxed_settings(root: &Path) -> Settings {
        let at = |p: &str| root.join(p).to_str().unwrap().to_string();
        Settings {
            web_root: at("var/www/moodle"),
            data_root: at("var/moodledata"),
            backup_dir: at("var/backups/moodle"),
            credentials_file: Some(at("home/moodle_credentials.txt")),
            credentials_owner: None,
            mysql_client_cnf: at("root/.my.cnf"),
            nginx_sites_available: at("etc/nginx/sites-available"),
            nginx_sites_enabled: at("etc/nginx/sites-enabled"),
            php_conf_dir: at("etc/php"),
            ..Settings::default()
        }
    }

    pub fn fixed_credentials() -> Credentials {
        Credentials {
            db_password: "DbPass0000".to_string(),
            admin_password: "AdminPass0000".to_string(),
            backup_password: "BackupPass0000".to_string(),
        }
    }

    pub fn provisioner(root: &PathBuf, runner: RecordingRunner) -> Provisioner<RecordingRunner> {
        Provisioner::new(
            Domain::parse("lms.example.org").unwrap(),
            sandboxed_settings(root),
            fixed_credentials(),
            runner,
            false,
        )
    }
}
