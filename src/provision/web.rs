use crate::provision::Provisioner;
use crate::runner::{CommandRunner, Invocation};
use crate::templates::{nginx_site, site_file_name};

impl<R: CommandRunner> Provisioner<R> {
    pub(crate) fn site_available_path(&self) -> String {
        format!(
            "{}/{}",
            self.settings.nginx_sites_available.trim_end_matches('/'),
            site_file_name(&self.domain)
        )
    }

    pub(crate) async fn configure_nginx(&self) -> Result<(), anyhow::Error> {
        let available = self.site_available_path();
        let enabled_dir = self.settings.nginx_sites_enabled.trim_end_matches('/');
        let enabled = format!("{}/{}", enabled_dir, site_file_name(&self.domain));

        self.write_file(&available, &nginx_site(&self.domain, &self.settings), None)?;
        self.link(&available, &enabled)?;
        self.remove_if_present(&format!("{}/default", enabled_dir))?;

        self.runner.run_checked(&Invocation::new("nginx").arg("-t")).await?;
        self.runner
            .run_checked(&Invocation::new("systemctl").args(["reload", "nginx"]))
            .await?;
        Ok(())
    }

    pub(crate) async fn obtain_certificate(&self) -> Result<(), anyhow::Error> {
        self.runner
            .run_checked(
                &Invocation::new("certbot")
                    .args(["--nginx", "-d", self.domain.as_str()])
                    .args(["--non-interactive", "--agree-tos", "--redirect", "-m"])
                    .arg(self.settings.admin_email_for(self.domain.as_str())),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::Domain;
    use crate::provision::fixtures::provisioner;
    use crate::runner::recording::RecordingRunner;
    use crate::runner::CommandOutput;
    use crate::util::testing::scratch_dir;
    use std::fs;
    use std::path::Path;

    #[tokio::test]
    async fn vhost_is_named_after_and_bound_to_domain() {
        let root = scratch_dir("web_vhost");
        let p = provisioner(&root, RecordingRunner::default());
        let default_site = format!("{}/default", p.settings.nginx_sites_enabled);
        crate::util::write_file(&default_site, "server {}\n", None).unwrap();

        p.configure_nginx().await.unwrap();

        let available = format!("{}/lms.example.org", p.settings.nginx_sites_available);
        let conf = fs::read_to_string(&available).unwrap();
        assert!(conf.contains("server_name lms.example.org;"));
        let enabled = format!("{}/lms.example.org", p.settings.nginx_sites_enabled);
        assert_eq!(fs::read_link(&enabled).unwrap().to_str(), Some(available.as_str()));
        assert!(!Path::new(&default_site).exists());
        assert_eq!(p.runner.lines(), vec!["nginx -t", "systemctl reload nginx"]);
        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn broken_config_is_not_reloaded() {
        let root = scratch_dir("web_broken");
        let runner = RecordingRunner::default()
            .respond("nginx -t", CommandOutput::failed(1, "nginx: configuration file test failed"));
        let p = provisioner(&root, runner);
        assert!(p.configure_nginx().await.is_err());
        assert_eq!(p.runner.lines(), vec!["nginx -t"]);
        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn certbot_requests_domain_with_redirect() {
        let root = scratch_dir("web_tls");
        let p = provisioner(&root, RecordingRunner::default());
        p.obtain_certificate().await.unwrap();
        assert_eq!(
            p.runner.lines(),
            vec!["certbot --nginx -d lms.example.org --non-interactive --agree-tos --redirect -m admin@lms.example.org"]
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn operator_domain_reaches_vhost_and_certbot_unchanged() {
        let root = scratch_dir("web_case");
        let mut p = provisioner(&root, RecordingRunner::default());
        p.domain = Domain::parse("LMS.Example.org").unwrap();

        p.configure_nginx().await.unwrap();
        p.obtain_certificate().await.unwrap();

        let available = format!("{}/LMS.Example.org", p.settings.nginx_sites_available);
        let conf = fs::read_to_string(&available).unwrap();
        assert!(conf.contains("server_name LMS.Example.org;"));
        assert_eq!(
            p.runner.lines()[2],
            "certbot --nginx -d LMS.Example.org --non-interactive --agree-tos --redirect -m admin@LMS.Example.org"
        );
        let _ = fs::remove_dir_all(&root);
    }
}
