use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};
use crate::templates::{append_entry, moodle_cron_line};
use log::info;

impl<R: CommandRunner> Provisioner<R> {
    /// Appends `entries` to `user`'s crontab. Nothing checks for duplicates, so a
    /// rerun registers the jobs twice.
    pub(crate) async fn append_crontab(&self, user: &str, entries: &[String]) -> Result<(), anyhow::Error> {
        let listed = self
            .runner
            .run(&Invocation::new("crontab").args(["-u", user, "-l"]))
            .await?;
        // crontab -l exits non-zero when the user has no crontab yet
        let mut table = if listed.success() {
            listed.stdout
        } else {
            String::new()
        };
        for entry in entries {
            table = append_entry(&table, entry);
            info!("crontab {}: {}", user, entry);
        }
        self.runner
            .run_checked(
                &Invocation::new("crontab")
                    .args(["-u", user, "-"])
                    .stdin(table),
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn register_moodle_cron(&self) -> Result<(), anyhow::Error> {
        self.append_crontab(&self.settings.web_user, &[moodle_cron_line(&self.settings)])
            .await
    }
}
