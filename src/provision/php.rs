use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};
use crate::templates::apply_ini_settings;
use anyhow::Context;
use log::{info, warn};
use std::fs;
use std::path::Path;

impl<R: CommandRunner> Provisioner<R> {
    pub(crate) async fn tune_php(&self) -> Result<(), anyhow::Error> {
        for ini in self.settings.php_ini_paths() {
            if !Path::new(&ini).exists() {
                if self.dry_run {
                    warn!("[DRY RUN ] {} not present yet, would be tuned after install", ini);
                    continue;
                }
                anyhow::bail!("php.ini not found at {}", ini);
            }
            let current = fs::read_to_string(&ini).with_context(|| format!("unable to read {}", ini))?;
            let tuned = apply_ini_settings(&current, &self.settings.php_settings);
            for (key, value) in &self.settings.php_settings {
                info!("{}: {} = {}", ini, key, value);
            }
            self.write_file(&ini, &tuned, None)?;
        }

        self.runner
            .run_checked(
                &Invocation::new("systemctl")
                    .arg("restart")
                    .arg(self.settings.fpm_service()),
            )
            .await?;
        Ok(())
    }
}
