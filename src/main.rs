pub mod domain;
pub mod logging;
pub mod options;
pub mod provision;
pub mod runner;
pub mod secrets;
pub mod settings;
pub mod templates;
pub mod util;
pub mod webhook;

use crate::options::{require_domain, step_listing, Arguments, USAGE_EXIT_CODE};
use crate::provision::Provisioner;
use crate::runner::{CommandFailed, DryRunner, SystemRunner};
use crate::secrets::Credentials;
use crate::settings::Settings;
use crate::util::host_name;
use crate::webhook::{notify, Outcome};
use clap::Parser;
use log::{error, info};
use std::process::exit;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    logging::init();
    let arguments = Arguments::parse();

    if arguments.list_steps {
        println!("{}", step_listing());
        return;
    }

    let domain = match require_domain(&arguments) {
        Ok(domain) => domain,
        Err(usage) => {
            eprintln!("{}", usage);
            exit(USAGE_EXIT_CODE);
        }
    };

    let settings = match Settings::load(arguments.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!("{:#}", e);
            exit(1);
        }
    };

    let credentials = Credentials::generate();
    let result = if arguments.dry_run {
        Provisioner::new(domain.clone(), settings, credentials, DryRunner {}, true)
            .run(&arguments.skip)
            .await
    } else {
        Provisioner::new(domain.clone(), settings, credentials, SystemRunner {}, false)
            .run(&arguments.skip)
            .await
    };

    let host = host_name();
    match result {
        Ok(()) => {
            if !arguments.dry_run {
                notify(&domain, &host, &Outcome::Provisioned).await;
            }
        }
        Err(e) => {
            error!("{:#}", e);
            if !arguments.dry_run {
                notify(&domain, &host, &Outcome::Failed(format!("{:#}", e))).await;
            }
            let code = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<CommandFailed>())
                .map(|failed| failed.exit_code())
                .unwrap_or(1);
            info!("Aborting with exit code {}; nothing was rolled back", code);
            exit(code);
        }
    }
}
