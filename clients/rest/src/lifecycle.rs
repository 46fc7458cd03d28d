use std::{future::Future, io, net::SocketAddr, sync::Arc, time::Duration};

use actix_web::{
    dev::{Server, ServerHandle},
    middleware::{self, Condition},
    web::Data,
    App, HttpServer,
};
use database::persistence::storage::{PersonRepository, StorageError};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::routes;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Unable to open person storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Unable to install termination signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Unable to bind listener to {address}: {source}")]
    Bind { address: String, source: io::Error },

    #[error("Server stopped before a termination signal was received: {0}")]
    ServerExited(String),

    #[error("Graceful shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleState {
    Starting,
    Running,
    ShuttingDown,
}

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub address: String,
    pub port: u16,
    pub http_workers: usize,
    pub log_http: bool,
    /// Upper bound on draining in-flight requests once shutdown starts
    pub drain_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
            http_workers: 2,
            log_http: false,
            drain_timeout: Duration::from_secs(10),
        }
    }
}

/// One-shot server lifecycle: `Starting` until [`Lifecycle::start`] binds the listener, then
/// [`RunningServer`] until the shutdown signal fires.
pub struct Lifecycle {
    state: LifecycleState,
    options: ServerOptions,
}

impl Lifecycle {
    pub fn new(options: ServerOptions) -> Self {
        Self {
            state: LifecycleState::Starting,
            options,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Binds the listener and serves on a background task. Must run inside an actix system.
    pub fn start(
        self,
        repository: Arc<dyn PersonRepository>,
    ) -> Result<RunningServer, LifecycleError> {
        let options = self.options;
        let repository = Data::from(repository);
        let log_http = options.log_http;

        let http_server = HttpServer::new(move || {
            App::new()
                .app_data(repository.clone())
                .configure(routes::configure)
                .wrap(routes::cors())
                .wrap(Condition::new(log_http, middleware::Logger::default()))
        })
        .workers(options.http_workers)
        // Signals are handled by the lifecycle, actix must not stop on its own
        .disable_signals()
        // Our own deadline decides when draining failed, actix waits a little longer
        .shutdown_timeout(options.drain_timeout.as_secs() + 1)
        .bind((options.address.clone(), options.port))
        .map_err(|source| LifecycleError::Bind {
            address: format!("{}:{}", options.address, options.port),
            source,
        })?;

        let local_addrs = http_server.addrs();
        let server: Server = http_server.run();
        let handle = server.handle();
        let task = actix_web::rt::spawn(server);

        for addr in &local_addrs {
            log::info!("Server listening on http://{}", addr);
        }

        Ok(RunningServer {
            state: LifecycleState::Running,
            handle,
            task,
            local_addrs,
            drain_timeout: options.drain_timeout,
        })
    }
}

pub struct RunningServer {
    state: LifecycleState,
    handle: ServerHandle,
    task: JoinHandle<io::Result<()>>,
    local_addrs: Vec<SocketAddr>,
    drain_timeout: Duration,
}

impl RunningServer {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    /// Blocks until `shutdown` resolves, then stops accepting connections and drains the
    /// in-flight ones within the drain timeout.
    pub async fn wait_for_shutdown<F>(mut self, shutdown: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = shutdown => {}
            result = &mut self.task => {
                let reason = match result {
                    Ok(Ok(())) => "server exited".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => e.to_string(),
                };

                return Err(LifecycleError::ServerExited(reason));
            }
        }

        self.state = LifecycleState::ShuttingDown;
        log::info!(
            "Server shutting down, draining for at most {:?}",
            self.drain_timeout
        );

        match tokio::time::timeout(self.drain_timeout, self.handle.stop(true)).await {
            Ok(()) => {
                log::info!("Server stopped");
                Ok(())
            }
            // Connections still open are dropped when the caller exits the process
            Err(_) => Err(LifecycleError::ShutdownTimeout(self.drain_timeout)),
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM
pub fn termination_signal() -> Result<impl Future<Output = ()>, LifecycleError> {
    let (sender, receiver) = tokio::sync::oneshot::channel::<()>();
    let mut sender = Some(sender);

    ctrlc::set_handler(move || {
        if let Some(sender) = sender.take() {
            log::info!("Termination signal received");
            let _ = sender.send(());
        }
    })?;

    Ok(async move {
        let _ = receiver.await;
    })
}
