use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};
use log::info;
use std::path::Path;

impl<R: CommandRunner> Provisioner<R> {
    pub(crate) async fn install_packages(&self) -> Result<(), anyhow::Error> {
        self.runner
            .run_checked(
                &Invocation::new("apt-get")
                    .env("DEBIAN_FRONTEND", "noninteractive")
                    .arg("update"),
            )
            .await?;
        self.runner
            .run_checked(
                &Invocation::new("apt-get")
                    .env("DEBIAN_FRONTEND", "noninteractive")
                    .args(["install", "-y"])
                    .args(self.settings.packages()),
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn enable_services(&self) -> Result<(), anyhow::Error> {
        self.runner
            .run_checked(
                &Invocation::new("systemctl")
                    .args(["enable", "--now", "nginx", "mariadb"])
                    .arg(self.settings.fpm_service()),
            )
            .await?;
        Ok(())
    }

    /// The only idempotent step: an existing web root is left untouched.
    pub(crate) async fn fetch_source(&self) -> Result<(), anyhow::Error> {
        let web_root = &self.settings.web_root;
        if Path::new(web_root).exists() {
            info!("{} already exists, skipping clone", web_root);
            return Ok(());
        }
        self.runner
            .run_checked(
                &Invocation::new("git")
                    .args(["clone", "--depth", "1", "--branch"])
                    .arg(&self.settings.moodle_branch)
                    .arg(&self.settings.moodle_repo)
                    .arg(web_root),
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn set_permissions(&self) -> Result<(), anyhow::Error> {
        let owner = format!("{}:{}", self.settings.web_user, self.settings.web_group);
        self.create_dir_all(&self.settings.data_root)?;

        for dir in [&self.settings.web_root, &self.settings.data_root] {
            self.runner
                .run_checked(&Invocation::new("chown").args(["-R", owner.as_str(), dir.as_str()]))
                .await?;
        }
        self.runner
            .run_checked(&Invocation::new("chmod").args(["-R", "0755", self.settings.web_root.as_str()]))
            .await?;
        self.runner
            .run_checked(&Invocation::new("chmod").args(["0770", self.settings.data_root.as_str()]))
            .await?;
        Ok(())
    }
}
