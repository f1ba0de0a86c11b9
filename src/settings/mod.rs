use crate::util::{default_credentials_path, sudo_operator};
use anyhow::Context;
use config::{Config, Environment, File};
use std::collections::BTreeMap;
use std::path::Path;

// Every fixed value of the deployment topology; overridable from TOML or MOODLE_* env vars
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Settings {
    pub php_version: String,
    pub moodle_repo: String,
    pub moodle_branch: String,
    pub web_root: String,
    pub data_root: String,
    pub web_user: String,
    pub web_group: String,
    pub db_name: String,
    pub db_user: String,
    pub backup_db_user: String,
    pub backup_dir: String,
    pub backup_retention_days: u32,
    pub backup_cron_user: String,
    pub admin_user: String,
    pub admin_email: Option<String>,
    pub site_fullname: String,
    pub site_shortname: String,
    pub credentials_file: Option<String>,
    pub credentials_owner: Option<String>,
    pub mysql_client_cnf: String,
    pub nginx_sites_available: String,
    pub nginx_sites_enabled: String,
    pub php_conf_dir: String,
    pub client_max_body_size: String,
    pub php_settings: BTreeMap<String, String>,
    pub extra_packages: Vec<String>,
    pub firewall_rules: Vec<String>,
}

impl Default for Settings {
    fn default() -> Settings {
        let php_settings = [
            ("max_input_vars", "5000"),
            ("memory_limit", "256M"),
            ("upload_max_filesize", "100M"),
            ("post_max_size", "100M"),
            ("max_execution_time", "300"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Settings {
            php_version: "8.3".to_string(),
            moodle_repo: "https://github.com/moodle/moodle.git".to_string(),
            moodle_branch: "MOODLE_405_STABLE".to_string(),
            web_root: "/var/www/moodle".to_string(),
            data_root: "/var/moodledata".to_string(),
            web_user: "www-data".to_string(),
            web_group: "www-data".to_string(),
            db_name: "moodle".to_string(),
            db_user: "moodleuser".to_string(),
            backup_db_user: "backupuser".to_string(),
            backup_dir: "/var/backups/moodle".to_string(),
            backup_retention_days: 7,
            backup_cron_user: "root".to_string(),
            admin_user: "admin".to_string(),
            admin_email: None,
            site_fullname: "Moodle".to_string(),
            site_shortname: "moodle".to_string(),
            credentials_file: None,
            credentials_owner: sudo_operator(),
            mysql_client_cnf: "/root/.my.cnf".to_string(),
            nginx_sites_available: "/etc/nginx/sites-available".to_string(),
            nginx_sites_enabled: "/etc/nginx/sites-enabled".to_string(),
            php_conf_dir: "/etc/php".to_string(),
            client_max_body_size: "100M".to_string(),
            php_settings,
            extra_packages: vec![],
            firewall_rules: vec![
                "22/tcp".to_string(),
                "http".to_string(),
                "Nginx Full".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Defaults, then the optional TOML file, then `MOODLE_*` environment variables.
    pub fn load(config_path: Option<&str>) -> Result<Settings, anyhow::Error> {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                anyhow::bail!("config file not found: {}", path);
            }
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix("MOODLE"))
            .build()
            .context("unable to build settings")?
            .try_deserialize::<Settings>()
            .context("invalid settings")?;
        Ok(settings)
    }

    pub fn packages(&self) -> Vec<String> {
        let php = format!("php{}", self.php_version);
        let mut packages: Vec<String> = [
            "nginx",
            "mariadb-server",
            "git",
            "unzip",
            "certbot",
            "python3-certbot-nginx",
            "expect",
            "ufw",
        ]
        .iter()
        .map(|p| p.to_string())
        .collect();
        for ext in [
            "fpm", "cli", "mysql", "xml", "mbstring", "curl", "zip", "gd", "intl", "soap",
            "opcache",
        ] {
            packages.push(format!("{}-{}", php, ext));
        }
        packages.extend(self.extra_packages.iter().cloned());
        packages
    }

    pub fn fpm_service(&self) -> String {
        format!("php{}-fpm", self.php_version)
    }

    pub fn fpm_socket(&self) -> String {
        format!("/run/php/php{}-fpm.sock", self.php_version)
    }

    pub fn php_ini_paths(&self) -> Vec<String> {
        ["fpm", "cli"]
            .iter()
            .map(|sapi| format!("{}/{}/{}/php.ini", self.php_conf_dir, self.php_version, sapi))
            .collect()
    }

    pub fn php_binary(&self) -> &'static str {
        "/usr/bin/php"
    }

    pub fn admin_email_for(&self, domain: &str) -> String {
        self.admin_email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| format!("admin@{}", domain))
    }

    pub fn credentials_path(&self) -> String {
        self.credentials_file
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(default_credentials_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::sync::Mutex;

    // Settings::load reads the process environment; loads must not overlap with env edits
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_describe_fixed_topology() {
        let s = Settings::default();
        assert_eq!(s.fpm_service(), "php8.3-fpm");
        assert_eq!(s.fpm_socket(), "/run/php/php8.3-fpm.sock");
        assert_eq!(
            s.php_ini_paths(),
            vec!["/etc/php/8.3/fpm/php.ini", "/etc/php/8.3/cli/php.ini"]
        );
        assert!(s.packages().contains(&"php8.3-fpm".to_string()));
        assert!(s.packages().contains(&"expect".to_string()));
    }

    #[test]
    fn admin_email_defaults_to_domain() {
        let mut s = Settings::default();
        assert_eq!(s.admin_email_for("lms.example.org"), "admin@lms.example.org");
        s.admin_email = Some("ops@example.org".into());
        assert_eq!(s.admin_email_for("lms.example.org"), "ops@example.org");
    }

    #[test]
    fn defaults_load_without_file_or_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let s = Settings::load(None).unwrap();
        assert_eq!(s.db_name, "moodle");
        assert_eq!(s.web_root, "/var/www/moodle");
        assert!(s.extra_packages.is_empty());
        assert_eq!(s.admin_email, None);
        assert_eq!(s.firewall_rules, vec!["22/tcp", "http", "Nginx Full"]);
        assert_eq!(s.php_settings.len(), 5);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = std::env::temp_dir().join(format!("moodle_settings_{}", rand::random::<u64>()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("provision.toml");
        fs::write(
            &path,
            "php_version = \"8.2\"\nweb_root = \"/srv/moodle\"\n\n[php_settings]\nmemory_limit = \"512M\"\n",
        )
        .unwrap();

        let s = Settings::load(path.to_str()).unwrap();
        assert_eq!(s.php_version, "8.2");
        assert_eq!(s.web_root, "/srv/moodle");
        assert_eq!(s.php_settings.get("memory_limit").map(String::as_str), Some("512M"));
        assert_eq!(s.php_settings.get("max_input_vars").map(String::as_str), Some("5000"));
        assert_eq!(s.db_name, "moodle");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn moodle_env_vars_override_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("MOODLE_SITE_SHORTNAME", "campus");
        env::set_var("MOODLE_BACKUP_RETENTION_DAYS", "14");
        let loaded = Settings::load(None);
        env::remove_var("MOODLE_SITE_SHORTNAME");
        env::remove_var("MOODLE_BACKUP_RETENTION_DAYS");

        let s = loaded.unwrap();
        assert_eq!(s.site_shortname, "campus");
        assert_eq!(s.backup_retention_days, 14);
        assert_eq!(s.site_fullname, "Moodle");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(Settings::load(Some("/nonexistent/moodle/provision.toml")).is_err());
    }
}
