use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};
use crate::templates::{
    backup_cron_line, create_backup_user_sql, create_database_sql, mysql_client_cnf,
    retention_cron_line, secure_installation_script,
};

const CLIENT_CNF_MODE: u32 = 0o600;

impl<R: CommandRunner> Provisioner<R> {
    // root connects over the unix socket; SQL goes through stdin so passwords stay off argv
    async fn execute_sql(&self, sql: String, secret: &str) -> Result<(), anyhow::Error> {
        self.runner
            .run_checked(&Invocation::new("mysql").stdin(sql).secret(secret))
            .await?;
        Ok(())
    }

    pub(crate) async fn create_database(&self) -> Result<(), anyhow::Error> {
        let password = &self.credentials.db_password;
        self.execute_sql(create_database_sql(&self.settings, password), password)
            .await?;
        self.save_credentials(
            "Database",
            &[
                ("Moodle database", self.settings.db_name.as_str()),
                ("Moodle database user", self.settings.db_user.as_str()),
                ("Moodle database password", password.as_str()),
            ],
        )
        .await
    }

    pub(crate) async fn configure_backups(&self) -> Result<(), anyhow::Error> {
        let password = &self.credentials.backup_password;
        self.execute_sql(create_backup_user_sql(&self.settings, password), password)
            .await?;

        self.write_file(
            &self.settings.mysql_client_cnf,
            &mysql_client_cnf(&self.settings.backup_db_user, password),
            Some(CLIENT_CNF_MODE),
        )?;

        self.create_dir_all(&self.settings.backup_dir)?;
        self.runner
            .run_checked(&Invocation::new("chmod").args(["0700", self.settings.backup_dir.as_str()]))
            .await?;

        self.append_crontab(
            &self.settings.backup_cron_user,
            &[
                backup_cron_line(&self.settings),
                retention_cron_line(&self.settings),
            ],
        )
        .await?;

        self.save_credentials(
            "Backup",
            &[
                ("Backup database user", self.settings.backup_db_user.as_str()),
                ("Backup database password", password.as_str()),
                ("Backup directory", self.settings.backup_dir.as_str()),
            ],
        )
        .await
    }

    pub(crate) async fn secure_mariadb(&self) -> Result<(), anyhow::Error> {
        self.runner
            .run_checked(
                &Invocation::new("expect")
                    .args(["-f", "-"])
                    .stdin(secure_installation_script()),
            )
            .await?;
        Ok(())
    }
}
