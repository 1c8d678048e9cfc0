//! The fetch-decode-dispatch loop and the sub-call machinery.
//!
//! [`run_frame`] executes one frame to completion. Sub-calls and creates
//! recurse through it with a fresh [`StateView`] and [`Journal`], so a
//! failing sub-frame discards its state, logs and self-destruct list
//! atomically while the parent continues at the next instruction.

use crate::context::Context;
use crate::opcode::Opcode;
use crate::processor::Env;
use crate::state::{transfer, StateView, WorldState};
use crate::trace::{TraceEvent, TraceSink};
use crate::transaction::{LogEntry, Transaction};
use crate::{ExecutionError, MAX_CALL_DEPTH};
use pyrite_types::{word, Address, Word, H256};
use tracing::{debug, trace};

/// How a frame ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameExit {
    /// `STOP`, `SELFDESTRUCT`, or falling off the end of code
    Halted,
    /// `RETURN`
    Returned,
    /// `REVERT`; the output buffer survives
    Reverted,
}

/// Outcome of one frame.
#[derive(Debug)]
pub(crate) struct FrameResult {
    pub reason: FrameExit,
    pub output: Vec<u8>,
}

impl FrameResult {
    fn halted() -> Self {
        Self {
            reason: FrameExit::Halted,
            output: Vec::new(),
        }
    }

    fn is_success(&self) -> bool {
        matches!(self.reason, FrameExit::Halted | FrameExit::Returned)
    }
}

/// Per-frame side-effect buffer: logs and scheduled self-destructs.
///
/// Merged into the parent journal when the frame succeeds, dropped with
/// the frame otherwise.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub logs: Vec<LogEntry>,
    pub suicides: Vec<Address>,
}

impl Journal {
    pub fn absorb(&mut self, other: Journal) {
        self.logs.extend(other.logs);
        self.suicides.extend(other.suicides);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateKind {
    Create,
    Create2,
}

/// Converts a memory span popped off the stack into native offsets.
///
/// A zero length never touches memory, so the offset is ignored; a
/// non-zero span with an offset or length past the address space can only
/// fail the resource guard.
fn mem_span(offset: Word, len: Word) -> Result<(usize, usize), ExecutionError> {
    if len.is_zero() {
        return Ok((0, 0));
    }
    let offset = word::to_usize(offset).ok_or(ExecutionError::OutOfGas)?;
    let len = word::to_usize(len).ok_or(ExecutionError::OutOfGas)?;
    Ok((offset, len))
}

/// Source offsets for the *COPY opcodes; anything unaddressable reads as
/// zero-padding.
fn src_offset(offset: Word) -> usize {
    word::to_usize(offset).unwrap_or(usize::MAX)
}

fn bool_word(value: bool) -> Word {
    if value {
        Word::one()
    } else {
        Word::zero()
    }
}

fn binary(
    frame: &mut Context,
    op: impl Fn(Word, Word) -> Word,
) -> Result<(), ExecutionError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(op(a, b))
}

fn binary_bool(
    frame: &mut Context,
    op: impl Fn(Word, Word) -> bool,
) -> Result<(), ExecutionError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    frame.stack.push(bool_word(op(a, b)))
}

fn ternary(
    frame: &mut Context,
    op: impl Fn(Word, Word, Word) -> Word,
) -> Result<(), ExecutionError> {
    let a = frame.stack.pop()?;
    let b = frame.stack.pop()?;
    let c = frame.stack.pop()?;
    frame.stack.push(op(a, b, c))
}

/// Executes `frame` until it returns, reverts, halts, or faults.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_frame(
    state: &mut dyn WorldState,
    env: &Env,
    tx: &Transaction<'_>,
    frame: &mut Context,
    depth: usize,
    is_static: bool,
    journal: &mut Journal,
    tracer: &mut Option<&mut dyn TraceSink>,
) -> Result<FrameResult, ExecutionError> {
    loop {
        let pc = frame.pc;
        let Some(&byte) = frame.code.get(pc) else {
            // Falling off the end of code is STOP
            return Ok(FrameResult::halted());
        };
        let op = Opcode::decode(byte)
            .ok_or(ExecutionError::IllegalInstruction { opcode: byte })?;

        if let Some(sink) = tracer.as_mut() {
            sink.on_step(TraceEvent {
                pc,
                op: byte,
                stack: frame.stack.items().to_vec(),
            });
        }
        trace!(pc, op = op.name(), depth, "step");
        frame.pc += 1;

        match op {
            Opcode::Stop => return Ok(FrameResult::halted()),

            // Arithmetic
            Opcode::Add => binary(frame, word::add)?,
            Opcode::Mul => binary(frame, word::mul)?,
            Opcode::Sub => binary(frame, word::sub)?,
            Opcode::Div => binary(frame, word::div)?,
            Opcode::SDiv => binary(frame, word::sdiv)?,
            Opcode::Mod => binary(frame, word::rem)?,
            Opcode::SMod => binary(frame, word::smod)?,
            Opcode::AddMod => ternary(frame, word::addmod)?,
            Opcode::MulMod => ternary(frame, word::mulmod)?,
            Opcode::Exp => binary(frame, word::exp)?,
            Opcode::SignExtend => binary(frame, word::sign_extend)?,

            // Comparison and bitwise
            Opcode::Lt => binary_bool(frame, |a, b| a < b)?,
            Opcode::Gt => binary_bool(frame, |a, b| a > b)?,
            Opcode::SLt => binary_bool(frame, word::slt)?,
            Opcode::SGt => binary_bool(frame, word::sgt)?,
            Opcode::Eq => binary_bool(frame, |a, b| a == b)?,
            Opcode::IsZero => {
                let a = frame.stack.pop()?;
                frame.stack.push(bool_word(a.is_zero()))?;
            }
            Opcode::And => binary(frame, |a, b| a & b)?,
            Opcode::Or => binary(frame, |a, b| a | b)?,
            Opcode::Xor => binary(frame, |a, b| a ^ b)?,
            Opcode::Not => {
                let a = frame.stack.pop()?;
                frame.stack.push(!a)?;
            }
            Opcode::Byte => binary(frame, word::byte)?,
            Opcode::Shl => binary(frame, word::shl)?,
            Opcode::Shr => binary(frame, word::shr)?,
            Opcode::Sar => binary(frame, word::sar)?,

            Opcode::Sha3 => {
                let offset = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (offset, len) = mem_span(offset, len)?;
                let hash = H256::keccak256(frame.memory.slice(offset, len)?);
                frame.stack.push(Word::from_big_endian(hash.as_bytes()))?;
            }

            // Environment
            Opcode::Address => frame.stack.push(frame.callee.to_word())?,
            Opcode::Balance => {
                let addr = Address::from_word(frame.stack.pop()?);
                let balance = state.get(&addr).map(|a| a.balance).unwrap_or_default();
                frame.stack.push(balance)?;
            }
            Opcode::Origin => frame.stack.push(tx.origin.to_word())?,
            Opcode::Caller => frame.stack.push(frame.caller.to_word())?,
            Opcode::CallValue => frame.stack.push(frame.value)?,
            Opcode::CallDataLoad => {
                let offset = frame.stack.pop()?;
                let mut buf = [0u8; 32];
                if let Some(base) = word::to_usize(offset) {
                    for (i, slot) in buf.iter_mut().enumerate() {
                        *slot = base
                            .checked_add(i)
                            .and_then(|pos| frame.input.get(pos))
                            .copied()
                            .unwrap_or(0);
                    }
                }
                frame.stack.push(Word::from_big_endian(&buf))?;
            }
            Opcode::CallDataSize => frame.stack.push(Word::from(frame.input.len()))?,
            Opcode::CallDataCopy => {
                let dst = frame.stack.pop()?;
                let src = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (dst, len) = mem_span(dst, len)?;
                frame
                    .memory
                    .store_padded(dst, &frame.input, src_offset(src), len)?;
            }
            Opcode::CodeSize => frame.stack.push(Word::from(frame.code.len()))?,
            Opcode::CodeCopy => {
                let dst = frame.stack.pop()?;
                let src = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (dst, len) = mem_span(dst, len)?;
                frame
                    .memory
                    .store_padded(dst, &frame.code, src_offset(src), len)?;
            }
            Opcode::GasPrice => frame.stack.push(tx.gas_price)?,
            Opcode::ExtCodeSize => {
                let addr = Address::from_word(frame.stack.pop()?);
                let size = state.get(&addr).map(|a| a.code.len()).unwrap_or(0);
                frame.stack.push(Word::from(size))?;
            }
            Opcode::ExtCodeCopy => {
                let addr = Address::from_word(frame.stack.pop()?);
                let dst = frame.stack.pop()?;
                let src = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (dst, len) = mem_span(dst, len)?;
                let code: &[u8] = state.get(&addr).map(|a| a.code.as_slice()).unwrap_or(&[]);
                frame.memory.store_padded(dst, code, src_offset(src), len)?;
            }
            Opcode::ReturnDataSize => {
                frame.stack.push(Word::from(frame.return_data.len()))?;
            }
            Opcode::ReturnDataCopy => {
                let dst = frame.stack.pop()?;
                let src = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (dst, len) = mem_span(dst, len)?;
                frame
                    .memory
                    .store_padded(dst, &frame.return_data, src_offset(src), len)?;
            }

            // Block context
            Opcode::BlockHash => {
                let number = frame.stack.pop()?;
                let hash = env.block.block_hash(number);
                frame.stack.push(Word::from_big_endian(hash.as_bytes()))?;
            }
            Opcode::Coinbase => frame.stack.push(env.block.coinbase.to_word())?,
            Opcode::Timestamp => frame.stack.push(Word::from(env.block.timestamp))?,
            Opcode::Number => frame.stack.push(Word::from(env.block.number))?,
            Opcode::Difficulty => frame.stack.push(env.block.difficulty)?,
            Opcode::GasLimit => frame.stack.push(Word::from(env.block.gas_limit))?,
            Opcode::ChainId => frame.stack.push(Word::from(env.chain_id))?,
            Opcode::SelfBalance => {
                let balance = state
                    .get(&frame.callee)
                    .map(|a| a.balance)
                    .unwrap_or_default();
                frame.stack.push(balance)?;
            }

            // Stack, memory, storage
            Opcode::Pop => {
                frame.stack.pop()?;
            }
            Opcode::MLoad => {
                let offset = frame.stack.pop()?;
                let offset = word::to_usize(offset).ok_or(ExecutionError::OutOfGas)?;
                let value = frame.memory.load_word(offset)?;
                frame.stack.push(value)?;
            }
            Opcode::MStore => {
                let offset = frame.stack.pop()?;
                let value = frame.stack.pop()?;
                let offset = word::to_usize(offset).ok_or(ExecutionError::OutOfGas)?;
                frame.memory.store_word(offset, value)?;
            }
            Opcode::MStore8 => {
                let offset = frame.stack.pop()?;
                let value = frame.stack.pop()?;
                let offset = word::to_usize(offset).ok_or(ExecutionError::OutOfGas)?;
                frame.memory.store_byte(offset, value.byte(0))?;
            }
            Opcode::SLoad => {
                let key = frame.stack.pop()?;
                let value = state
                    .get(&frame.callee)
                    .map(|a| a.load(key))
                    .unwrap_or_default();
                frame.stack.push(value)?;
            }
            Opcode::SStore => {
                if is_static {
                    return Err(ExecutionError::StaticViolation);
                }
                let key = frame.stack.pop()?;
                let value = frame.stack.pop()?;
                state.get_mut(frame.callee).store(key, value);
            }

            // Control flow
            Opcode::Jump => {
                let dest = frame.stack.pop()?;
                jump_to(frame, dest)?;
            }
            Opcode::JumpI => {
                let dest = frame.stack.pop()?;
                let condition = frame.stack.pop()?;
                if !condition.is_zero() {
                    jump_to(frame, dest)?;
                }
            }
            Opcode::Pc => frame.stack.push(Word::from(pc))?,
            Opcode::MSize => frame.stack.push(Word::from(frame.memory.size()))?,
            Opcode::Gas => frame.stack.push(frame.gas)?,
            Opcode::JumpDest => {}

            // Push, dup, swap
            Opcode::Push1
            | Opcode::Push2
            | Opcode::Push3
            | Opcode::Push4
            | Opcode::Push5
            | Opcode::Push6
            | Opcode::Push7
            | Opcode::Push8
            | Opcode::Push9
            | Opcode::Push10
            | Opcode::Push11
            | Opcode::Push12
            | Opcode::Push13
            | Opcode::Push14
            | Opcode::Push15
            | Opcode::Push16
            | Opcode::Push17
            | Opcode::Push18
            | Opcode::Push19
            | Opcode::Push20
            | Opcode::Push21
            | Opcode::Push22
            | Opcode::Push23
            | Opcode::Push24
            | Opcode::Push25
            | Opcode::Push26
            | Opcode::Push27
            | Opcode::Push28
            | Opcode::Push29
            | Opcode::Push30
            | Opcode::Push31
            | Opcode::Push32 => {
                let width = op.push_bytes().unwrap_or(0);
                let mut buf = [0u8; 32];
                for i in 0..width {
                    // Code ending inside the immediate reads as zero
                    buf[32 - width + i] =
                        frame.code.get(frame.pc + i).copied().unwrap_or(0);
                }
                frame.pc += width;
                frame.stack.push(Word::from_big_endian(&buf))?;
            }
            Opcode::Dup1
            | Opcode::Dup2
            | Opcode::Dup3
            | Opcode::Dup4
            | Opcode::Dup5
            | Opcode::Dup6
            | Opcode::Dup7
            | Opcode::Dup8
            | Opcode::Dup9
            | Opcode::Dup10
            | Opcode::Dup11
            | Opcode::Dup12
            | Opcode::Dup13
            | Opcode::Dup14
            | Opcode::Dup15
            | Opcode::Dup16 => {
                let depth = op.dup_depth().unwrap_or(1);
                frame.stack.dup(depth)?;
            }
            Opcode::Swap1
            | Opcode::Swap2
            | Opcode::Swap3
            | Opcode::Swap4
            | Opcode::Swap5
            | Opcode::Swap6
            | Opcode::Swap7
            | Opcode::Swap8
            | Opcode::Swap9
            | Opcode::Swap10
            | Opcode::Swap11
            | Opcode::Swap12
            | Opcode::Swap13
            | Opcode::Swap14
            | Opcode::Swap15
            | Opcode::Swap16 => {
                let depth = op.swap_depth().unwrap_or(1);
                frame.stack.swap(depth)?;
            }

            // Logging
            Opcode::Log0 | Opcode::Log1 | Opcode::Log2 | Opcode::Log3 | Opcode::Log4 => {
                if is_static {
                    return Err(ExecutionError::StaticViolation);
                }
                let offset = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let topic_count = op.log_topics().unwrap_or(0);
                let mut topics = Vec::with_capacity(topic_count);
                for _ in 0..topic_count {
                    topics.push(H256::new(word::to_big_endian(frame.stack.pop()?)));
                }
                let (offset, len) = mem_span(offset, len)?;
                let data = frame.memory.slice(offset, len)?.to_vec();
                journal.logs.push(LogEntry {
                    address: frame.callee,
                    topics,
                    data,
                });
            }

            // System
            Opcode::Return => {
                let offset = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (offset, len) = mem_span(offset, len)?;
                let output = frame.memory.slice(offset, len)?.to_vec();
                return Ok(FrameResult {
                    reason: FrameExit::Returned,
                    output,
                });
            }
            Opcode::Revert => {
                let offset = frame.stack.pop()?;
                let len = frame.stack.pop()?;
                let (offset, len) = mem_span(offset, len)?;
                let output = frame.memory.slice(offset, len)?.to_vec();
                return Ok(FrameResult {
                    reason: FrameExit::Reverted,
                    output,
                });
            }
            Opcode::SelfDestruct => {
                if is_static {
                    return Err(ExecutionError::StaticViolation);
                }
                let beneficiary = Address::from_word(frame.stack.pop()?);
                let balance = state
                    .get(&frame.callee)
                    .map(|a| a.balance)
                    .unwrap_or_default();
                state.get_mut(frame.callee).balance = Word::zero();
                if beneficiary != frame.callee {
                    let account = state.get_mut(beneficiary);
                    account.balance = account.balance.saturating_add(balance);
                }
                journal.suicides.push(frame.callee);
                return Ok(FrameResult::halted());
            }
            Opcode::Call => call_family(
                state, env, tx, frame, depth, is_static, journal, tracer,
                CallKind::Call,
            )?,
            Opcode::CallCode => call_family(
                state, env, tx, frame, depth, is_static, journal, tracer,
                CallKind::CallCode,
            )?,
            Opcode::DelegateCall => call_family(
                state, env, tx, frame, depth, is_static, journal, tracer,
                CallKind::DelegateCall,
            )?,
            Opcode::StaticCall => call_family(
                state, env, tx, frame, depth, is_static, journal, tracer,
                CallKind::StaticCall,
            )?,
            Opcode::Create => create_family(
                state, env, tx, frame, depth, is_static, journal, tracer,
                CreateKind::Create,
            )?,
            Opcode::Create2 => create_family(
                state, env, tx, frame, depth, is_static, journal, tracer,
                CreateKind::Create2,
            )?,
        }
    }
}

fn jump_to(frame: &mut Context, dest: Word) -> Result<(), ExecutionError> {
    match word::to_usize(dest) {
        Some(pc) if frame.is_jumpdest(pc) => {
            frame.pc = pc;
            Ok(())
        }
        _ => Err(ExecutionError::BadJump { dest }),
    }
}

/// The CALL family: pops the argument tuple, composes the sub-frame, runs
/// it against a buffered state view, and pushes the success flag.
#[allow(clippy::too_many_arguments)]
fn call_family(
    state: &mut dyn WorldState,
    env: &Env,
    tx: &Transaction<'_>,
    frame: &mut Context,
    depth: usize,
    is_static: bool,
    journal: &mut Journal,
    tracer: &mut Option<&mut dyn TraceSink>,
    kind: CallKind,
) -> Result<(), ExecutionError> {
    let gas = frame.stack.pop()?;
    let to = Address::from_word(frame.stack.pop()?);
    let value = match kind {
        CallKind::Call | CallKind::CallCode => frame.stack.pop()?,
        _ => Word::zero(),
    };
    if kind == CallKind::Call && is_static && !value.is_zero() {
        return Err(ExecutionError::StaticViolation);
    }
    let in_offset = frame.stack.pop()?;
    let in_len = frame.stack.pop()?;
    let out_offset = frame.stack.pop()?;
    let out_len = frame.stack.pop()?;

    let (in_offset, in_len) = mem_span(in_offset, in_len)?;
    let input = frame.memory.slice(in_offset, in_len)?.to_vec();
    let (out_offset, out_len) = mem_span(out_offset, out_len)?;
    frame.memory.expand(out_offset, out_len)?;

    if depth >= MAX_CALL_DEPTH {
        debug!(depth, "call depth exhausted");
        frame.return_data.clear();
        return frame.stack.push(Word::zero());
    }

    let code = state.get(&to).map(|a| a.code.clone()).unwrap_or_default();
    let (sub_caller, sub_callee, sub_value) = match kind {
        CallKind::Call | CallKind::StaticCall => (frame.callee, to, value),
        CallKind::CallCode => (frame.callee, frame.callee, value),
        CallKind::DelegateCall => (frame.caller, frame.callee, frame.value),
    };
    let sub_static = is_static || kind == CallKind::StaticCall;

    let mut view = StateView::new(state);
    let funded = match kind {
        CallKind::Call => transfer(&mut view, frame.callee, to, value),
        CallKind::CallCode => {
            // Value stays with the callee; only the balance check applies
            value.is_zero()
                || view.get(&frame.callee).map(|a| a.balance).unwrap_or_default() >= value
        }
        _ => true,
    };
    if !funded {
        frame.return_data.clear();
        return frame.stack.push(Word::zero());
    }

    let mut sub = Context::new(sub_caller, sub_callee, code, input, sub_value, gas);
    let mut sub_journal = Journal::default();
    let result = run_frame(
        &mut view,
        env,
        tx,
        &mut sub,
        depth + 1,
        sub_static,
        &mut sub_journal,
        tracer,
    );

    match result {
        Ok(sub_result) if sub_result.is_success() => {
            view.commit();
            journal.absorb(sub_journal);
            write_call_output(frame, &sub_result.output, out_offset, out_len)?;
            frame.return_data = sub_result.output;
            frame.stack.push(Word::one())
        }
        Ok(sub_result) => {
            // Reverted: state is discarded but the revert data survives
            write_call_output(frame, &sub_result.output, out_offset, out_len)?;
            frame.return_data = sub_result.output;
            frame.stack.push(Word::zero())
        }
        Err(error) => {
            debug!(%error, depth, "sub-call failed");
            frame.return_data.clear();
            frame.stack.push(Word::zero())
        }
    }
}

/// Copies at most `out_len` bytes of a sub-call's output into the
/// caller-designated memory region.
fn write_call_output(
    frame: &mut Context,
    output: &[u8],
    out_offset: usize,
    out_len: usize,
) -> Result<(), ExecutionError> {
    let n = out_len.min(output.len());
    frame.memory.store_slice(out_offset, &output[..n])
}

/// CREATE and CREATE2: derives the new address, runs the init code in a
/// buffered view, and installs the returned bytes as the account's code.
#[allow(clippy::too_many_arguments)]
fn create_family(
    state: &mut dyn WorldState,
    env: &Env,
    tx: &Transaction<'_>,
    frame: &mut Context,
    depth: usize,
    is_static: bool,
    journal: &mut Journal,
    tracer: &mut Option<&mut dyn TraceSink>,
    kind: CreateKind,
) -> Result<(), ExecutionError> {
    if is_static {
        return Err(ExecutionError::StaticViolation);
    }
    let value = frame.stack.pop()?;
    let offset = frame.stack.pop()?;
    let len = frame.stack.pop()?;
    let salt = match kind {
        CreateKind::Create2 => Some(frame.stack.pop()?),
        CreateKind::Create => None,
    };
    let (offset, len) = mem_span(offset, len)?;
    let init_code = frame.memory.slice(offset, len)?.to_vec();

    if depth >= MAX_CALL_DEPTH {
        debug!(depth, "create depth exhausted");
        frame.return_data.clear();
        return frame.stack.push(Word::zero());
    }

    let creator = frame.callee;
    if state.get(&creator).map(|a| a.balance).unwrap_or_default() < value {
        frame.return_data.clear();
        return frame.stack.push(Word::zero());
    }

    // The address derives from the creator's nonce before it is bumped
    let nonce = state.get(&creator).map(|a| a.nonce).unwrap_or(0);
    let derived = match salt {
        Some(salt) => creator.create2_contract_address(
            &H256::new(word::to_big_endian(salt)),
            &H256::keccak256(&init_code),
        ),
        None => creator.create_contract_address(nonce),
    };

    if let Some(existing) = state.get(&derived) {
        if existing.nonce != 0 || existing.has_code() {
            // The colliding attempt still burns a nonce; the write-through
            // increment outlives this frame's discarded delta
            state.increment_nonce(creator);
            return Err(ExecutionError::AddressCollision);
        }
    }
    state.get_mut(creator).nonce += 1;

    let mut view = StateView::new(state);
    {
        // A pre-existing balance at the derived address survives; code,
        // nonce and storage start fresh
        let account = view.get_mut(derived);
        account.nonce = 0;
        account.code.clear();
        account.storage.clear();
    }
    if !transfer(&mut view, creator, derived, value) {
        frame.return_data.clear();
        return frame.stack.push(Word::zero());
    }

    debug!(%creator, %derived, code_len = init_code.len(), "entering init code");
    let mut sub = Context::new(creator, derived, init_code, Vec::new(), value, frame.gas);
    let mut sub_journal = Journal::default();
    let result = run_frame(
        &mut view,
        env,
        tx,
        &mut sub,
        depth + 1,
        false,
        &mut sub_journal,
        tracer,
    );

    match result {
        Ok(sub_result) if sub_result.is_success() => {
            view.get_mut(derived).code = sub_result.output;
            view.commit();
            journal.absorb(sub_journal);
            frame.return_data.clear();
            frame.stack.push(derived.to_word())
        }
        Ok(sub_result) => {
            frame.return_data = sub_result.output;
            frame.stack.push(Word::zero())
        }
        Err(error) => {
            debug!(%error, depth, "init code failed");
            frame.return_data.clear();
            frame.stack.push(Word::zero())
        }
    }
}
