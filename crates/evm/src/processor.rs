//! Top-level execution driver.
//!
//! A [`Processor`] binds the engine to a mutable world state. [`Processor::run`]
//! executes one transaction-level call: it builds the root frame from the
//! callee's code, runs the dispatcher, and either commits the buffered
//! state delta (applying scheduled self-destructs and forwarding logs) or
//! discards it.

use crate::context::Context;
use crate::interpreter::{run_frame, FrameExit, Journal};
use crate::state::{transfer, StateView, WorldState};
use crate::trace::TraceSink;
use crate::transaction::Transaction;
use crate::{ExecutionError, DEFAULT_CHAIN_ID, DEFAULT_GAS_LIMIT};
use pyrite_types::{Address, Word, H256};
use std::collections::BTreeMap;
use tracing::debug;

/// How a transaction-level execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// `STOP`, `SELFDESTRUCT`, or falling off the end of code
    Halted,
    /// `RETURN`; the outcome carries the returned bytes
    Returned,
    /// `REVERT`; state was discarded, the outcome carries the revert data
    Reverted,
    /// An execution fault; state was discarded and the output is empty
    Error(ExecutionError),
}

impl ExitReason {
    /// Whether state mutations were committed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Halted | Self::Returned)
    }
}

/// Result of a transaction-level execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// How execution ended
    pub exit_reason: ExitReason,
    /// Returned or reverted bytes; empty for halts and faults
    pub output: Vec<u8>,
}

/// Block-level values surfaced by the environment opcodes.
#[derive(Debug, Clone)]
pub struct BlockContext {
    /// Block number (`NUMBER`)
    pub number: u64,
    /// Timestamp in seconds (`TIMESTAMP`)
    pub timestamp: u64,
    /// Block gas limit (`GASLIMIT`)
    pub gas_limit: u64,
    /// Proposer address (`COINBASE`)
    pub coinbase: Address,
    /// Difficulty (`DIFFICULTY`)
    pub difficulty: Word,
    hashes: BTreeMap<u64, H256>,
}

impl Default for BlockContext {
    fn default() -> Self {
        Self {
            number: 0,
            timestamp: 0,
            gas_limit: DEFAULT_GAS_LIMIT,
            coinbase: Address::ZERO,
            difficulty: Word::zero(),
            hashes: BTreeMap::new(),
        }
    }
}

impl BlockContext {
    /// Records an ancestor block hash for `BLOCKHASH`.
    pub fn record_block_hash(&mut self, number: u64, hash: H256) {
        self.hashes.insert(number, hash);
    }

    /// The hash `BLOCKHASH` reports for a block number; zero when unknown.
    pub fn block_hash(&self, number: Word) -> H256 {
        if number > Word::from(u64::MAX) {
            return H256::ZERO;
        }
        self.hashes
            .get(&number.low_u64())
            .copied()
            .unwrap_or(H256::ZERO)
    }
}

/// Chain and block environment for one execution.
#[derive(Debug, Clone)]
pub struct Env {
    /// Chain identifier (`CHAINID`)
    pub chain_id: u64,
    /// Block context
    pub block: BlockContext,
}

impl Default for Env {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            block: BlockContext::default(),
        }
    }
}

/// The execution engine, bound to a mutable world state.
pub struct Processor<'a> {
    state: &'a mut dyn WorldState,
    env: Env,
}

impl<'a> Processor<'a> {
    /// Binds an engine to a world state with the default environment.
    pub fn new(state: &'a mut dyn WorldState) -> Self {
        Self {
            state,
            env: Env::default(),
        }
    }

    /// Binds an engine with an explicit chain/block environment.
    pub fn with_env(state: &'a mut dyn WorldState, env: Env) -> Self {
        Self { state, env }
    }

    /// The engine's environment.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Executes `callee`'s code as the root frame of a transaction.
    ///
    /// `value` moves from `caller` to `callee` before the first
    /// instruction; on revert or fault every state effect, including that
    /// transfer, is discarded and the bound world state is left untouched.
    /// Logs reach the transaction's sink only on success, after scheduled
    /// self-destructs have been applied.
    pub fn run(
        &mut self,
        tx: &mut Transaction<'_>,
        caller: Address,
        callee: Address,
        input: Vec<u8>,
        value: Word,
        mut trace_sink: Option<&mut dyn TraceSink>,
    ) -> Outcome {
        debug!(%caller, %callee, input_len = input.len(), "executing transaction");

        let code = self
            .state
            .get(&callee)
            .map(|a| a.code.clone())
            .unwrap_or_default();

        let mut view = StateView::new(self.state);
        if !transfer(&mut view, caller, callee, value) {
            debug!(%caller, "caller cannot fund call value");
            return Outcome {
                exit_reason: ExitReason::Reverted,
                output: Vec::new(),
            };
        }

        let mut frame = Context::new(caller, callee, code, input, value, tx.gas_limit);
        let mut journal = Journal::default();
        let result = run_frame(
            &mut view,
            &self.env,
            tx,
            &mut frame,
            0,
            false,
            &mut journal,
            &mut trace_sink,
        );

        match result {
            Ok(frame_result) => {
                let exit_reason = match frame_result.reason {
                    FrameExit::Halted => ExitReason::Halted,
                    FrameExit::Returned => ExitReason::Returned,
                    FrameExit::Reverted => ExitReason::Reverted,
                };
                if exit_reason.is_success() {
                    for addr in &journal.suicides {
                        debug!(address = %addr, "removing self-destructed account");
                        view.remove(addr);
                    }
                    view.commit();
                    for log in journal.logs {
                        tx.emit_log(log);
                    }
                } else {
                    debug!("transaction reverted");
                }
                Outcome {
                    exit_reason,
                    output: frame_result.output,
                }
            }
            Err(error) => {
                debug!(%error, "transaction failed");
                Outcome {
                    exit_reason: ExitReason::Error(error),
                    output: Vec::new(),
                }
            }
        }
    }
}
