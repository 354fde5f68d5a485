use std::sync::LazyLock;

use crate::modules::{
    context::Initialize, error::TicketMailResult, utils::shutdown::shutdown_signal,
};
use tokio::sync::broadcast;
use tracing::info;

pub static SIGNAL_MANAGER: LazyLock<SignalManager> = LazyLock::new(SignalManager::new);

/// Fans the process shutdown signal out to the HTTP server and background tasks.
pub struct SignalManager {
    sender: broadcast::Sender<()>,
}

impl SignalManager {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        SignalManager { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    pub async fn wait_for_shutdown(&self) {
        let mut receiver = self.subscribe();
        let _ = receiver.recv().await;
    }
}

impl Initialize for SignalManager {
    async fn initialize() -> TicketMailResult<()> {
        tokio::spawn(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, notifying subscribers");
            let _ = SIGNAL_MANAGER.sender.send(());
        });
        Ok(())
    }
}
