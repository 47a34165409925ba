use std::process::exit;

use k8s_exposer_core::resources::exposure::ExposureProfile;
use kube::Client;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::controller::Controller;

mod controller;

#[tokio::main]
async fn main() {
    configure_logger();

    let profile = get_exposure_profile();
    let client = create_client().await;
    let cancel = CancellationToken::new();

    tokio::spawn(handle_shutdown_signal(cancel.clone()));

    Controller::new(client, profile).run(cancel).await;
}

async fn handle_shutdown_signal(cancel: CancellationToken) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("Couldn't listen for the shutdown signal! {error:?}");
        exit(5)
    }

    info!("Shutdown signal received!");
    cancel.cancel();
}

async fn create_client() -> Client {
    match Client::try_default().await {
        Ok(client) => client,
        Err(error) => {
            log::error!("Couldn't create client! {error:?}");
            exit(6)
        }
    }
}

fn get_exposure_profile() -> ExposureProfile {
    match ExposureProfile::from_env() {
        Ok(profile) => profile,
        Err(error) => {
            log::error!("Couldn't read the exposure profile! {error:?}");
            exit(7)
        }
    }
}

fn configure_logger() {
    env_logger::builder()
        .default_format()
        .format_module_path(false)
        .filter_level(log::LevelFilter::Info)
        .init()
}
