//! Transaction context and log sinks.

use crate::DEFAULT_GAS_LIMIT;
use pyrite_types::{Address, Word, H256};

/// One log record emitted by `LOG0..LOG4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Account that emitted the log
    pub address: Address,
    /// Up to four indexed topics
    pub topics: Vec<H256>,
    /// Opaque payload
    pub data: Vec<u8>,
}

/// Receiver for log records.
///
/// Logs are journalled per frame and only reach the sink when the
/// transaction completes successfully.
pub trait LogSink {
    /// Called once per surviving log record, in emission order.
    fn on_log(&mut self, log: LogEntry);
}

/// A sink that drops every log.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn on_log(&mut self, _log: LogEntry) {}
}

/// A sink that records every log in order.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    /// The recorded logs
    pub logs: Vec<LogEntry>,
}

impl MemoryLogSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for MemoryLogSink {
    fn on_log(&mut self, log: LogEntry) {
        self.logs.push(log);
    }
}

/// The transaction a root frame executes under.
pub struct Transaction<'a> {
    /// Originating externally-owned address (`ORIGIN`)
    pub origin: Address,
    /// Gas price reported by `GASPRICE`
    pub gas_price: Word,
    /// Gas budget handed to the root frame
    pub gas_limit: Word,
    sink: &'a mut dyn LogSink,
}

impl<'a> Transaction<'a> {
    /// Creates a transaction from the given origin, delivering surviving
    /// logs to `sink`.
    pub fn new(origin: Address, sink: &'a mut dyn LogSink) -> Self {
        Self {
            origin,
            gas_price: Word::zero(),
            gas_limit: Word::from(DEFAULT_GAS_LIMIT),
            sink,
        }
    }

    /// Sets the gas price.
    pub fn with_gas_price(mut self, gas_price: Word) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Sets the gas budget.
    pub fn with_gas_limit(mut self, gas_limit: Word) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Delivers a surviving log record to the sink.
    pub(crate) fn emit_log(&mut self, log: LogEntry) {
        self.sink.on_log(log);
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("origin", &self.origin)
            .field("gas_price", &self.gas_price)
            .field("gas_limit", &self.gas_limit)
            .finish_non_exhaustive()
    }
}
