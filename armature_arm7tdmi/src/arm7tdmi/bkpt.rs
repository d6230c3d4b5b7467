use super::flag::FlagName;

/// Access-mode bits shared by every breakpoint mask in the simulator, in the
/// manner of Unix permission bits.
///
/// A register, flag or memory byte carries a mask built by OR-ing these
/// together. The same values double as the `mode` of a raised [`BkptEvent`],
/// plus [`MODE_ILLEGAL`] which is never part of a mask.
pub const MODE_EXEC: u8 = 1;
pub const MODE_WRITE: u8 = 2;
pub const MODE_READ: u8 = 4;

/// Reserved event mode for accesses outside the mapped address space.
pub const MODE_ILLEGAL: u8 = 8;

/// Where a breakpoint event originated, together with the identity of the
/// watched object (register id, flag name or byte address).
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BkptSource {
    Register(usize),
    Flag(FlagName),
    Memory(u32),
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct BkptEvent {
    pub source: BkptSource,

    /// One of [`MODE_EXEC`], [`MODE_WRITE`], [`MODE_READ`] or
    /// [`MODE_ILLEGAL`].
    pub mode: u8,
}

/// Single point where watchpoint and illegal-access events are raised.
///
/// The bus is a latch, not a queue: within one cycle the most recent `throw`
/// wins. The simulator clears it at the start of every cycle and inspects
/// `triggered` at the end to decide whether to halt.
#[derive(Debug, Default)]
pub struct BkptBus {
    pub triggered: bool,
    pub event: Option<BkptEvent>,
}

impl BkptBus {
    pub fn new() -> BkptBus {
        BkptBus {
            triggered: false,
            event: None,
        }
    }

    pub fn reset(&mut self) {
        self.triggered = false;
        self.event = None;
    }

    pub fn throw(&mut self, event: BkptEvent) {
        self.triggered = true;
        self.event = Some(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throw_latches_the_most_recent_event() {
        let mut bus = BkptBus::new();
        bus.throw(BkptEvent {
            source: BkptSource::Register(3),
            mode: MODE_WRITE,
        });
        bus.throw(BkptEvent {
            source: BkptSource::Memory(0x100),
            mode: MODE_ILLEGAL,
        });

        assert!(bus.triggered);
        assert_eq!(
            bus.event,
            Some(BkptEvent {
                source: BkptSource::Memory(0x100),
                mode: MODE_ILLEGAL,
            })
        );
    }

    #[test]
    fn reset_clears_the_latch() {
        let mut bus = BkptBus::new();
        bus.throw(BkptEvent {
            source: BkptSource::Flag(FlagName::Z),
            mode: MODE_READ,
        });
        bus.reset();

        assert!(!bus.triggered);
        assert_eq!(bus.event, None);
    }
}
