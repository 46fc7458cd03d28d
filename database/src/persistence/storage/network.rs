use std::{future::Future, pin::Pin, sync::Arc, thread};

use tokio::{
    runtime::Builder,
    sync::mpsc::{Receiver, Sender},
};

use super::{StorageError, StorageResult};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Reply channel for a single storage action
pub type Responder<T> = oneshot::Sender<StorageResult<T>>;

/// Synchronous handle onto a network store running on its own runtime thread. Each call
/// sends one action and blocks until the runtime answers on a oneshot channel.
pub struct NetworkStorage<A> {
    pub action_sender: Sender<A>,
}

impl<A: Send + 'static> NetworkStorage<A> {
    /// Must not be called from inside an async context, `blocking_send` panics there
    pub fn request<T>(&self, action: impl FnOnce(Responder<T>) -> A) -> StorageResult<T> {
        let (sender, receiver) = oneshot::channel::<StorageResult<T>>();

        self.action_sender
            .blocking_send(action(sender))
            .map_err(|_| StorageError::Disconnected)?;

        receiver.recv().map_err(|_| StorageError::Disconnected)?
    }
}

/// Starts a current-thread Tokio runtime on a dedicated thread, opens the client on it and
/// then runs every received action as its own task.
///
/// Returns once the client is connected, or with the connection error.
pub fn start_runtime<C, A, F>(
    thread_name: &str,
    mut action_receiver: Receiver<A>,
    client: F,
    task: fn(Arc<C>, A) -> BoxFuture<()>,
) -> StorageResult<()>
where
    C: Send + Sync + 'static,
    A: Send + 'static,
    F: FnOnce() -> BoxFuture<StorageResult<C>> + Send + 'static,
{
    let (ready_sender, ready_receiver) = oneshot::channel::<StorageResult<()>>();

    thread::Builder::new()
        .name(thread_name.to_string())
        .spawn(move || {
            let rt = match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_sender.send(Err(StorageError::Connection(e.to_string())));
                    return;
                }
            };

            rt.block_on(async move {
                let client = match client().await {
                    Ok(client) => Arc::new(client),
                    Err(e) => {
                        let _ = ready_sender.send(Err(e));
                        return;
                    }
                };

                let _ = ready_sender.send(Ok(()));

                while let Some(action) = action_receiver.recv().await {
                    tokio::spawn(task(client.clone(), action));
                }

                log::info!("Storage runtime stopped, every sender was dropped");
            });
        })
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    ready_receiver
        .recv()
        .map_err(|_| StorageError::Disconnected)?
}
