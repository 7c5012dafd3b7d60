/// User-facing notifications. Fire and forget: implementations must not
/// block the pipeline.
pub trait Notifier: Send + Sync {
    fn progress(&self, percent: f32, message: &str);
    fn info(&self, title: &str, message: &str);
    fn warning(&self, title: &str, message: &str);
    fn success(&self, message: &str);
    fn error(&self, title: &str, message: &str);
    fn cancelled(&self, message: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn progress(&self, _percent: f32, _message: &str) {}
    fn info(&self, _title: &str, _message: &str) {}
    fn warning(&self, _title: &str, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn error(&self, _title: &str, _message: &str) {}
    fn cancelled(&self, _message: &str) {}
}
