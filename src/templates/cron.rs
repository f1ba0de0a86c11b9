use crate::settings::Settings;

pub fn moodle_cron_line(settings: &Settings) -> String {
    format!(
        "* * * * * {} {}/admin/cli/cron.php >/dev/null",
        settings.php_binary(),
        settings.web_root
    )
}

// `%` is a newline to cron, hence the escapes in the date format
pub fn backup_cron_line(settings: &Settings) -> String {
    format!(
        "0 2 * * * /usr/bin/mysqldump --defaults-file={cnf} --single-transaction --routines --triggers {db} | /usr/bin/gzip > {dir}/{db}-$(date +\\%F).sql.gz",
        cnf = settings.mysql_client_cnf,
        db = settings.db_name,
        dir = settings.backup_dir,
    )
}

pub fn retention_cron_line(settings: &Settings) -> String {
    format!(
        "0 3 * * 0 /usr/bin/find {} -type f -name '*.sql.gz' -mtime +{} -delete",
        settings.backup_dir, settings.backup_retention_days
    )
}

/// Existing crontab text with `entry` added as the final line; no dedup.
pub fn append_entry(current: &str, entry: &str) -> String {
    let mut table = current.to_string();
    if !table.is_empty() && !table.ends_with('\n') {
        table.push('\n');
    }
    table.push_str(entry);
    table.push('\n');
    table
}
