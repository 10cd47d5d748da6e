use super::GaugeSink;

/// [`GaugeSink`] that reports gauges through the logger
#[derive(Debug, Clone)]
pub struct LogSink {
    /// Source reported with every gauge
    source: String,
    /// Number of gauges submitted since the creation of the sink
    submitted: usize,
}

impl LogSink {
    /// Create a new [`LogSink`]
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_owned(),
            submitted: 0,
        }
    }

    /// Number of gauges submitted so far
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}

impl GaugeSink for LogSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.submitted += 1;
        log::info!("[{}] gauge {name} = {value} {tags:?}", self.source);
    }
}
