pub mod logging;

/// Gauge submission API of the host agent
pub trait GaugeSink {
    /// Submit a point-in-time value for the metric `name`
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]);
}
