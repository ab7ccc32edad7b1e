//! Configuration options for CoreKV.

/// Default value size threshold (1KB). Values at or above this size are
/// expected to live in a separate value log rather than inline in a table.
pub const DEFAULT_VALUE_THRESHOLD: usize = 1 << 10;

/// Default MemTable flush threshold (4MB).
pub const DEFAULT_MEMTABLE_SIZE: usize = 4 * 1024 * 1024;

/// Default bloom filter false positive rate (1%).
pub const DEFAULT_BLOOM_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Tuning options shared by the MemTable and the filters built from it.
#[derive(Debug, Clone)]
pub struct Options {
    /// Value size at which a value is treated as separated from its key.
    /// Default: 1KB
    pub value_threshold: usize,

    /// Size threshold for flushing the MemTable (in bytes).
    /// Default: 4MB
    pub memtable_size: usize,

    /// Bloom filter false positive rate.
    /// Default: 0.01 (1%)
    pub bloom_false_positive_rate: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            value_threshold: DEFAULT_VALUE_THRESHOLD,
            memtable_size: DEFAULT_MEMTABLE_SIZE,
            bloom_false_positive_rate: DEFAULT_BLOOM_FALSE_POSITIVE_RATE,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value size threshold.
    pub fn value_threshold(mut self, threshold: usize) -> Self {
        self.value_threshold = threshold;
        self
    }

    /// Sets the MemTable size threshold.
    pub fn memtable_size(mut self, size: usize) -> Self {
        self.memtable_size = size;
        self
    }

    /// Sets the bloom filter false positive rate.
    pub fn bloom_false_positive_rate(mut self, rate: f64) -> Self {
        self.bloom_false_positive_rate = rate;
        self
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.value_threshold == 0 {
            return Err(crate::Error::invalid_argument("value_threshold must be > 0"));
        }
        if self.memtable_size == 0 {
            return Err(crate::Error::invalid_argument("memtable_size must be > 0"));
        }
        if !(self.bloom_false_positive_rate > 0.0 && self.bloom_false_positive_rate < 1.0) {
            return Err(crate::Error::invalid_argument(
                "bloom_false_positive_rate must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();
        assert_eq!(opts.value_threshold, 1024);
        assert_eq!(opts.memtable_size, 4 * 1024 * 1024);
        assert_eq!(opts.bloom_false_positive_rate, 0.01);
    }

    #[test]
    fn test_options_builder() {
        let opts = Options::new()
            .value_threshold(64)
            .memtable_size(8 * 1024)
            .bloom_false_positive_rate(0.05);

        assert_eq!(opts.value_threshold, 64);
        assert_eq!(opts.memtable_size, 8 * 1024);
        assert_eq!(opts.bloom_false_positive_rate, 0.05);
    }

    #[test]
    fn test_options_validation() {
        let mut opts = Options::default();
        assert!(opts.validate().is_ok());

        opts.memtable_size = 0;
        assert!(opts.validate().is_err());

        opts.memtable_size = 1024;
        opts.bloom_false_positive_rate = 1.5;
        assert!(opts.validate().is_err());

        opts.bloom_false_positive_rate = f64::NAN;
        assert!(opts.validate().is_err());

        opts.bloom_false_positive_rate = 0.01;
        opts.value_threshold = 0;
        assert!(opts.validate().is_err());
    }
}
