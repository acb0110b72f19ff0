/*
Process-level behavior around the bridge loops: turning an interrupt into a
shutdown notification the consumer loop can select on.
*/
use tokio::sync::watch::{self, Receiver, Sender};

mod signal;

/// Spawns the interrupt listener and returns the receiving side.
///
/// The sender stays alive for the life of the process, so the receiver only
/// reports a change when an interrupt arrives.
pub fn shutdown_on_interrupt() -> Receiver<()> {
    let (tx, rx) = watch::channel(());
    tokio::spawn(signal::notify_on_ctrl_c(tx));
    rx
}

/// A shutdown pair for callers that decide themselves when to stop.
pub fn shutdown_channel() -> (Sender<()>, Receiver<()>) {
    watch::channel(())
}
