pub mod cron;
pub mod mysql;
pub mod nginx;
pub mod php;

pub use crate::templates::cron::{append_entry, backup_cron_line, moodle_cron_line, retention_cron_line};
pub use crate::templates::mysql::{
    create_backup_user_sql, create_database_sql, mysql_client_cnf, secure_installation_script,
};
pub use crate::templates::nginx::{nginx_site, site_file_name};
pub use crate::templates::php::apply_ini_settings;
