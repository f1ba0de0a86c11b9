use crate::domain::Domain;
use crate::provision::Step;
use clap::{CommandFactory, Parser};

pub const USAGE_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "moodle_provisioner",
    version,
    about = "Provision a Moodle site with nginx, PHP-FPM, MariaDB and certbot on this host"
)]
pub struct Arguments {
    /// Domain the site is served under, e.g. lms.example.org
    pub domain: Option<String>,

    /// Print every command and file write instead of performing it
    #[arg(long)]
    pub dry_run: bool,

    /// TOML file overriding the built-in settings
    #[arg(long)]
    pub config: Option<String>,

    /// Skip a step (repeatable)
    #[arg(long, value_enum)]
    pub skip: Vec<Step>,

    /// Print the ordered step list and exit
    #[arg(long)]
    pub list_steps: bool,
}

pub fn usage() -> String {
    Arguments::command().render_usage().to_string()
}

/// The one required positional argument; clap leaves it optional so a missing
/// domain exits with the usage message and status 1 rather than clap's 2.
pub fn require_domain(arguments: &Arguments) -> Result<Domain, String> {
    match arguments.domain.as_deref() {
        None => Err(usage()),
        Some(raw) => Domain::parse(raw).map_err(|e| format!("error: {}\n\n{}", e, usage())),
    }
}

pub fn step_listing() -> String {
    Step::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{:>2}. {:<12} {}", i + 1, s.name(), s.description()))
        .collect::<Vec<String>>()
        .join("\n")
}
