use log::{debug, error, info, warn};
use ticketpress_traits::Notifier;

/// Routes every notification to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn progress(&self, percent: f32, message: &str) {
        debug!("[{:>3.0}%] {}", percent, message);
    }

    fn info(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);
    }

    fn warning(&self, title: &str, message: &str) {
        warn!("{}: {}", title, message);
    }

    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }

    fn cancelled(&self, message: &str) {
        warn!("{}", message);
    }
}
