//! Debug driver around the ARM7TDMI-style simulator core.
//!
//! `Armature` owns a [`Simulator`] and layers the policy a debugger front-end
//! needs on top of the raw cycle API: run-until-something-happens, the three
//! step commands, restart, and halt classification (breakpoint hit versus end
//! of program).

use log::{debug, trace};
use thiserror::Error;

use armature_arm7tdmi::arm7tdmi::{self, BkptSource, Memory, SimState, Simulator, StepMode, MODE_ILLEGAL, PC};

pub use armature_arm7tdmi::arm7tdmi::{
    BkptEvent, FlagName, Register, SegmentSpec, WriteRecord, MODE_EXEC, MODE_READ, MODE_WRITE,
};

pub type Result<A> = std::result::Result<A, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Simulator(#[from] arm7tdmi::Error),
}

/// Cycle budget for the open-ended loops. Exhausting it yields
/// [`Outcome::OutOfFuel`] instead of spinning forever on a program that
/// never halts.
pub const DEFAULT_FUEL: u64 = 1_000_000;

/// Why the driver stopped cycling the simulator.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Outcome {
    /// The armed step command is satisfied; execution can continue.
    Paused,

    /// A watchpoint or illegal access latched this event mid-run.
    Breakpoint(BkptEvent),

    /// The program counter ran off the mapped memory: nothing left to fetch.
    Finished,

    /// The fuel budget ran out before anything else happened.
    OutOfFuel,
}

pub struct Armature {
    sim: Simulator,
}

impl Armature {
    /// Build a simulator over the given memory image and reset it, leaving
    /// the first instruction fetched.
    pub fn new(segments: Vec<SegmentSpec>) -> Result<Armature> {
        let mut sim = Simulator::new(Memory::new(segments)?);
        sim.reset()?;
        Ok(Armature { sim })
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.sim
    }

    /// Rewind memory to the loaded image and reset the simulator.
    pub fn restart(&mut self) -> Result<()> {
        self.sim.mem.restore();
        self.sim.reset()?;
        Ok(())
    }

    /// Execute until a breakpoint fires, the program ends or `fuel` cycles
    /// have run.
    pub fn run(&mut self, fuel: u64) -> Result<Outcome> {
        for _ in 0..fuel {
            if let Some(outcome) = self.advance()? {
                return Ok(outcome);
            }
        }
        debug!("out of fuel after {} cycles", fuel);
        Ok(Outcome::OutOfFuel)
    }

    /// Execute exactly one instruction.
    pub fn step_into(&mut self) -> Result<Outcome> {
        self.sim.set_step_condition(StepMode::Into);
        Ok(self.advance()?.unwrap_or(Outcome::Paused))
    }

    /// Execute one instruction, running any function it calls to completion.
    pub fn step_over(&mut self, fuel: u64) -> Result<Outcome> {
        self.step_until_done(StepMode::Forward, fuel)
    }

    /// Execute until the current function returns.
    pub fn step_out(&mut self, fuel: u64) -> Result<Outcome> {
        self.step_until_done(StepMode::Out, fuel)
    }

    fn step_until_done(&mut self, mode: StepMode, fuel: u64) -> Result<Outcome> {
        self.sim.set_step_condition(mode);
        for _ in 0..fuel {
            if let Some(outcome) = self.advance()? {
                return Ok(outcome);
            }
            if self.sim.is_step_done() {
                return Ok(Outcome::Paused);
            }
        }
        debug!("out of fuel after {} cycles", fuel);
        Ok(Outcome::OutOfFuel)
    }

    /// One cycle plus halt classification. `None` means nothing noteworthy
    /// happened and the caller may keep going.
    fn advance(&mut self) -> Result<Option<Outcome>> {
        self.sim.next_instr()?;
        trace!("cycle {}: pc = {:#010x}", self.sim.count_cycle, self.register(PC));

        if !self.sim.bkpt.triggered {
            return Ok(None);
        }

        if let Some(event) = self.sim.bkpt.event {
            // An illegal fetch at the freshly advanced program counter means
            // the program ran off its text: that is the end of the program,
            // not a breakpoint.
            if event.mode == MODE_ILLEGAL && event.source == BkptSource::Memory(self.register(PC)) {
                debug!("program ran off mapped memory at {:#010x}", self.register(PC));
                self.sim.state = SimState::Finished;
                return Ok(Some(Outcome::Finished));
            }

            debug!("halting on {:?}", event);
            self.sim.stop();
            return Ok(Some(Outcome::Breakpoint(event)));
        }

        Ok(None)
    }

    /// Lifecycle state of the underlying simulator.
    pub fn state(&self) -> SimState {
        self.sim.state
    }

    pub fn cycle_count(&self) -> u64 {
        self.sim.count_cycle
    }

    /// The event latched by the most recent cycle, if any.
    pub fn last_event(&self) -> Option<BkptEvent> {
        self.sim.bkpt.event
    }

    /// Current register value, without touching watchpoints.
    pub fn register(&self, id: usize) -> u32 {
        self.sim.regs[id].value()
    }

    /// Current flag value, without touching watchpoints.
    pub fn flag(&self, name: FlagName) -> bool {
        self.sim.flags.flag(name).value()
    }

    pub fn memory(&self) -> &Memory {
        &self.sim.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.sim.mem
    }
}
