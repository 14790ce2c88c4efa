use crate::events::AppEvent;
use crate::state::StateStore;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::Runtime;

/// Runs the ingest socket and the config watcher on a tokio runtime owned by
/// a dedicated thread; both report back through `tx`.
pub fn start_background_services(
    tx: Sender<AppEvent>,
    store: StateStore,
    socket_path: PathBuf,
    config_path: PathBuf,
) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async move {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(&socket_path, store, tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(config_path, tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}
