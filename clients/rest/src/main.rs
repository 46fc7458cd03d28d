use std::{process, sync::Arc};

use clap::Parser;
use database::persistence::storage::PersonRepository;

use crate::{
    config::Cli,
    lifecycle::{termination_signal, Lifecycle, LifecycleError},
};

mod config;
mod error;
mod handlers;
mod lifecycle;
mod routes;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    log::info!("Starting persons server [environment: {}]", args.app_env);

    // The store is opened before the HTTP runtime exists, connecting blocks this thread
    let repository = match args.storage_engine().get_engine() {
        Ok(repository) => repository,
        Err(e) => fatal(LifecycleError::from(e)),
    };

    let result = actix_web::rt::System::new().block_on(serve(&args, repository));

    if let Err(e) = result {
        fatal(e);
    }

    log::info!("Server exited cleanly");
}

async fn serve(args: &Cli, repository: Arc<dyn PersonRepository>) -> Result<(), LifecycleError> {
    let shutdown = termination_signal()?;

    let server = Lifecycle::new(args.server_options()).start(repository)?;

    server.wait_for_shutdown(shutdown).await
}

fn fatal(error: LifecycleError) -> ! {
    log::error!("{}", error);
    process::exit(1);
}
