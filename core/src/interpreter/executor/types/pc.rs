//! Program counter over an immutable statement sequence
//!
//! The cursor is the only control-flow mechanism: loops, conditionals, function
//! definitions and calls are all expressed as jumps to addresses.

use std::rc::Rc;

use crate::interpreter::parser::{Program, Statement};

/// A statement together with its address
#[derive(Debug, Clone)]
pub struct Located {
    pub address: usize,
    pub statement: Rc<Statement>,
}

#[derive(Debug, Clone)]
pub struct Cursor {
    program: Rc<Program>,
    pc: usize,
}

impl Cursor {
    pub fn new(program: Rc<Program>) -> Self {
        Self { program, pc: 0 }
    }

    /// Fetch the statement at the program counter and advance past it
    pub fn next(&mut self) -> Option<Located> {
        let statement = Rc::clone(self.program.get(self.pc)?);
        let located = Located {
            address: self.pc,
            statement,
        };
        self.pc += 1;
        Some(located)
    }

    /// Statement at `address`, without moving
    pub fn at(&self, address: usize) -> Option<Rc<Statement>> {
        self.program.get(address).cloned()
    }

    /// Statement the next call to [`Cursor::next`] would return
    pub fn peek(&self) -> Option<Rc<Statement>> {
        self.at(self.pc)
    }

    pub fn branch(&mut self, address: usize) {
        self.pc = address;
    }

    pub fn current(&self) -> usize {
        self.pc
    }

    pub fn program(&self) -> &Rc<Program> {
        &self.program
    }
}
