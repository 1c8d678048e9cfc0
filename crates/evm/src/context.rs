//! Frame activation record.

use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::stack::Stack;
use pyrite_types::{Address, Word};

/// One activation record: the mutable machine state of a single call
/// frame, together with the immutable identity of the code it runs.
///
/// `callee` is the account whose storage and balance the frame operates
/// on; for `DELEGATECALL`/`CALLCODE` the executed code belongs to a
/// different account.
#[derive(Debug)]
pub struct Context {
    /// Address that invoked this frame
    pub caller: Address,
    /// Account this frame executes as
    pub callee: Address,
    /// Code being executed
    pub code: Vec<u8>,
    /// Input data (call data, or empty for init code)
    pub input: Vec<u8>,
    /// Value attached to the invocation
    pub value: Word,
    /// Gas budget handed to this frame; informational when unmetered
    pub gas: Word,
    /// Program counter
    pub pc: usize,
    /// Operand stack
    pub stack: Stack,
    /// Frame memory
    pub memory: Memory,
    /// Output of the most recent completed sub-call
    pub return_data: Vec<u8>,
    jumpdests: Vec<bool>,
}

impl Context {
    /// Creates a fresh frame over the given code.
    pub fn new(
        caller: Address,
        callee: Address,
        code: Vec<u8>,
        input: Vec<u8>,
        value: Word,
        gas: Word,
    ) -> Self {
        let jumpdests = analyze_jumpdests(&code);
        Self {
            caller,
            callee,
            code,
            input,
            value,
            gas,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            return_data: Vec::new(),
            jumpdests,
        }
    }

    /// Whether `pc` is a valid jump destination: a `JUMPDEST` byte that is
    /// not part of a push immediate.
    pub fn is_jumpdest(&self, pc: usize) -> bool {
        self.jumpdests.get(pc).copied().unwrap_or(false)
    }
}

/// Marks every `JUMPDEST` byte reachable as an instruction, skipping push
/// immediates.
fn analyze_jumpdests(code: &[u8]) -> Vec<bool> {
    let mut valid = vec![false; code.len()];
    let mut pc = 0;
    while pc < code.len() {
        let byte = code[pc];
        match Opcode::decode(byte) {
            Some(Opcode::JumpDest) => {
                valid[pc] = true;
                pc += 1;
            }
            Some(op) => {
                pc += 1 + op.push_bytes().unwrap_or(0);
            }
            None => pc += 1,
        }
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(code: Vec<u8>) -> Context {
        Context::new(
            Address::ZERO,
            Address::ZERO,
            code,
            vec![],
            Word::zero(),
            Word::zero(),
        )
    }

    #[test]
    fn test_jumpdest_detected() {
        // JUMPDEST STOP JUMPDEST
        let ctx = frame(vec![0x5b, 0x00, 0x5b]);
        assert!(ctx.is_jumpdest(0));
        assert!(!ctx.is_jumpdest(1));
        assert!(ctx.is_jumpdest(2));
        assert!(!ctx.is_jumpdest(100));
    }

    #[test]
    fn test_jumpdest_inside_push_immediate_is_invalid() {
        // PUSH2 0x5b 0x5b JUMPDEST
        let ctx = frame(vec![0x61, 0x5b, 0x5b, 0x5b]);
        assert!(!ctx.is_jumpdest(1));
        assert!(!ctx.is_jumpdest(2));
        assert!(ctx.is_jumpdest(3));
    }

    #[test]
    fn test_truncated_push_at_end() {
        // PUSH32 with only one immediate byte present
        let ctx = frame(vec![0x7f, 0x5b]);
        assert!(!ctx.is_jumpdest(1));
    }
}
