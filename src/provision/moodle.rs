use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};

impl<R: CommandRunner> Provisioner<R> {
    pub(crate) fn installer_invocation(&self) -> Invocation {
        let s = &self.settings;
        let creds = &self.credentials;
        Invocation::new("sudo")
            .args(["-u", s.web_user.as_str(), s.php_binary()])
            .arg(format!("{}/admin/cli/install.php", s.web_root))
            .arg(format!("--wwwroot=https://{}", self.domain))
            .arg(format!("--dataroot={}", s.data_root))
            .arg("--dbtype=mariadb")
            .arg(format!("--dbname={}", s.db_name))
            .arg(format!("--dbuser={}", s.db_user))
            .arg(format!("--dbpass={}", creds.db_password))
            .arg(format!("--fullname={}", s.site_fullname))
            .arg(format!("--shortname={}", s.site_shortname))
            .arg(format!("--adminuser={}", s.admin_user))
            .arg(format!("--adminpass={}", creds.admin_password))
            .arg(format!("--adminemail={}", s.admin_email_for(self.domain.as_str())))
            .args(["--non-interactive", "--agree-license"])
            .secret(&creds.db_password)
            .secret(&creds.admin_password)
    }

    pub(crate) async fn install_moodle(&self) -> Result<(), anyhow::Error> {
        self.runner.run_checked(&self.installer_invocation()).await?;
        let url = format!("https://{}", self.domain);
        self.save_credentials(
            "Moodle admin",
            &[
                ("Site URL", url.as_str()),
                ("Admin user", self.settings.admin_user.as_str()),
                ("Admin password", self.credentials.admin_password.as_str()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::provision::fixtures::provisioner;
    use crate::runner::recording::RecordingRunner;
    use crate::util::testing::scratch_dir;
    use std::fs;

    #[tokio::test]
    async fn installer_runs_as_web_user_without_leaking_passwords() {
        let root = scratch_dir("moodle_install");
        let p = provisioner(&root, RecordingRunner::default());
        p.install_moodle().await.unwrap();

        let calls = p.runner.calls();
        let inv = &calls[0];
        assert_eq!(&inv.args[..3], &["-u", "www-data", "/usr/bin/php"]);
        assert!(inv.args.contains(&"--wwwroot=https://lms.example.org".to_string()));
        assert!(inv.args.contains(&"--dbpass=DbPass0000".to_string()));
        assert!(inv.args.contains(&"--adminemail=admin@lms.example.org".to_string()));
        assert!(inv.args.ends_with(&["--non-interactive".to_string(), "--agree-license".to_string()]));

        let shown = inv.to_string();
        assert!(shown.contains("--dbpass=******** "));
        assert!(shown.contains("--adminpass=******** "));

        let saved = fs::read_to_string(p.settings.credentials_path()).unwrap();
        assert!(saved.contains("Admin password: AdminPass0000\n"));
        let _ = fs::remove_dir_all(&root);
    }
}
