//! Progress reporting seam.

/// Receives the progress stream of a sync run.
///
/// Owned by the caller and passed into [`crate::pipeline::run`] by `&mut`.
pub trait Reporter {
    /// Section heading.
    fn title(&mut self, message: &str);
    /// Plain informational line.
    fn text(&mut self, message: &str);
    fn progress_start(&mut self, total: usize);
    fn progress_advance(&mut self, step: usize);
    fn progress_finish(&mut self);
    /// One visible error line.
    fn error(&mut self, message: &str);
    fn success(&mut self, message: &str);
}
