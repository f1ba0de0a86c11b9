use crate::settings::Settings;

// Single quotes and backslashes are the only characters that can break out of a SQL string
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn ident(value: &str) -> String {
    format!("`{}`", value.replace('`', "``"))
}

/// Unconditional CREATE statements; a second run fails on the existing database.
pub fn create_database_sql(settings: &Settings, db_password: &str) -> String {
    let user = format!("{}@'localhost'", quote(&settings.db_user));
    format!(
        "CREATE DATABASE {db} DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\n\
         CREATE USER {user} IDENTIFIED BY {pass};\n\
         GRANT SELECT, INSERT, UPDATE, DELETE, CREATE, CREATE TEMPORARY TABLES, DROP, INDEX, ALTER ON {db}.* TO {user};\n\
         FLUSH PRIVILEGES;\n",
        db = ident(&settings.db_name),
        user = user,
        pass = quote(db_password),
    )
}

pub fn create_backup_user_sql(settings: &Settings, backup_password: &str) -> String {
    let user = format!("{}@'localhost'", quote(&settings.backup_db_user));
    format!(
        "CREATE USER {user} IDENTIFIED BY {pass};\n\
         GRANT SELECT, LOCK TABLES, SHOW VIEW, EVENT, TRIGGER ON {db}.* TO {user};\n\
         GRANT PROCESS ON *.* TO {user};\n\
         FLUSH PRIVILEGES;\n",
        user = user,
        pass = quote(backup_password),
        db = ident(&settings.db_name),
    )
}

pub fn mysql_client_cnf(user: &str, password: &str) -> String {
    format!("[client]\nuser={}\npassword=\"{}\"\n", user, password)
}

/// Answers for every `mysql_secure_installation` prompt MariaDB may ask; root keeps
/// unix socket auth so no root password is set.
pub fn secure_installation_script() -> &'static str {
    r#"set timeout 30
spawn mysql_secure_installation
expect {
    -re "(?i)enter current password for root" { send "\r"; exp_continue }
    -re "(?i)switch to unix_socket authentication" { send "n\r"; exp_continue }
    -re "(?i)(change|set) the root password" { send "n\r"; exp_continue }
    -re "(?i)remove anonymous users" { send "y\r"; exp_continue }
    -re "(?i)disallow root login remotely" { send "y\r"; exp_continue }
    -re "(?i)remove test database" { send "y\r"; exp_continue }
    -re "(?i)reload privilege tables now" { send "y\r"; exp_continue }
    timeout { puts "mysql_secure_installation timed out"; exit 1 }
    eof
}
catch wait result
exit [lindex $result 3]
"#
}
