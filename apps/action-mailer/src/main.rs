//! CI Email Step Entry Point

use core_config::set_failed;
use core_config::tracing::install_color_eyre;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Install color-eyre first for colored error output
    install_color_eyre();

    match action_mailer::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            set_failed(&format!("❌ {e:#}"));
            ExitCode::FAILURE
        }
    }
}
