//! # Pyrite EVM
//!
//! A deterministic EVM byte-code interpreter: it consumes a contract's code
//! and a transaction context, mutates a world state of accounts, and
//! produces a return payload, revert data, or an error verdict.
//!
//! The engine is single-threaded and synchronous. Each sub-call runs
//! against a copy-on-write [`StateView`] layered over its parent's state,
//! so a failing frame discards its effects atomically.
//!
//! ## Example
//!
//! ```rust
//! use pyrite_evm::{InMemoryState, NullLogSink, Processor, Transaction, WorldState};
//! use pyrite_types::{Address, Word};
//!
//! let mut state = InMemoryState::new();
//! let from = Address::from([0x01; 20]);
//! let to = Address::from([0x02; 20]);
//! // PUSH1 0x2a PUSH1 0x00 MSTORE PUSH1 0x20 PUSH1 0x00 RETURN
//! state.create(to, Word::zero(), vec![0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3]);
//!
//! let mut sink = NullLogSink;
//! let mut tx = Transaction::new(from, &mut sink);
//! let outcome = Processor::new(&mut state).run(&mut tx, from, to, vec![], Word::zero(), None);
//! assert!(outcome.exit_reason.is_success());
//! assert_eq!(outcome.output[31], 0x2a);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod account;
pub mod context;
mod interpreter;
pub mod memory;
pub mod opcode;
pub mod processor;
pub mod stack;
pub mod state;
pub mod trace;
pub mod transaction;

// Re-export main types at crate root
pub use account::Account;
pub use context::Context;
pub use memory::Memory;
pub use opcode::Opcode;
pub use processor::{BlockContext, Env, ExitReason, Outcome, Processor};
pub use stack::Stack;
pub use state::{InMemoryState, StateView, WorldState};
pub use trace::{Trace, TraceEvent, TraceSink};
pub use transaction::{LogEntry, LogSink, MemoryLogSink, NullLogSink, Transaction};

/// Maximum operand stack depth per frame
pub const STACK_LIMIT: usize = 1024;

/// Maximum call depth; a call or create past this limit is not entered
pub const MAX_CALL_DEPTH: usize = 1024;

/// Chain identifier reported by the `CHAINID` opcode by default
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Default block and transaction gas limit (30 million gas)
pub const DEFAULT_GAS_LIMIT: u64 = 30_000_000;

/// Execution faults raised while running code.
///
/// Inside a sub-frame these are equivalent to a revert with empty output
/// from the parent's perspective; at the top level the precise kind is
/// reported in the [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// Pop from an empty operand stack
    #[error("stack underflow")]
    StackUnderflow,

    /// Push past the 1024-word stack limit
    #[error("stack overflow")]
    StackOverflow,

    /// Jump to a destination that is not a `JUMPDEST`
    #[error("bad jump destination {dest:#x}")]
    BadJump {
        /// The destination the program attempted to jump to
        dest: pyrite_types::Word,
    },

    /// Unrecognized opcode byte
    #[error("illegal instruction {opcode:#04x}")]
    IllegalInstruction {
        /// The undecodable byte
        opcode: u8,
    },

    /// State-mutating opcode inside a static call
    #[error("state modification inside a static call")]
    StaticViolation,

    /// Contract creation targeting an address already in use
    #[error("created address collides with an existing account")]
    AddressCollision,

    /// Call depth past [`MAX_CALL_DEPTH`]
    #[error("maximum call depth exceeded")]
    DepthExceeded,

    /// Gas exhausted; without metering, raised only by the memory guard
    #[error("out of gas")]
    OutOfGas,
}
