use tokio::sync::watch::Sender;

pub async fn notify_on_ctrl_c(tx: Sender<()>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Interrupt received. Stopping...");
            let _ = tx.send(());
            // Keep the channel open so receivers don't also see a close.
            tx.closed().await;
        }
        Err(e) => {
            tracing::error!("Cannot listen for interrupts: {:?}", e);
            std::future::pending::<()>().await;
        }
    }
}
