// logging.rs
use env_logger::Env;
use log::{error, info};

pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

pub fn log_step_start(index: usize, total: usize, name: &str, description: &str) {
    info!("==> Step {}/{} [{}]: {}", index, total, name, description);
}

pub fn log_step_end(index: usize, name: &str, success: bool) {
    if success {
        info!("Step {} [{}] done", index, name);
    } else {
        error!("Step {} [{}] failed", index, name);
    }
}

pub fn log_step_skipped(index: usize, name: &str) {
    info!("Step {} [{}] skipped", index, name);
}
