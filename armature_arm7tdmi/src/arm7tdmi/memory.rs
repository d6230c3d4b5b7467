use std::collections::HashMap;

use super::bkpt::{BkptBus, BkptEvent, BkptSource, MODE_EXEC, MODE_ILLEGAL, MODE_READ, MODE_WRITE};
use super::error::Error;
use super::Result;

/// Loader-facing description of one memory segment: a name, a start address
/// and the initial contents. The exclusive end address is `start + len`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SegmentSpec {
    pub name: String,
    pub start: u32,
    pub data: Vec<u8>,
}

impl SegmentSpec {
    pub fn new(name: impl Into<String>, start: u32, data: Vec<u8>) -> SegmentSpec {
        SegmentSpec {
            name: name.into(),
            start,
            data,
        }
    }
}

#[derive(Debug)]
pub struct Segment {
    pub name: String,
    pub start: u32,

    /// Exclusive end address; always `start + data.len()`.
    pub end: u32,

    data: Vec<u8>,
}

impl Segment {
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// One entry of the memory write log: which segment was written, at which
/// offset from its start, how many bytes, and the value before packing.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct WriteRecord {
    pub segment: String,
    pub offset: u32,
    pub size: u32,
    pub value: u32,
}

/// A sparse byte address space made of named, non-overlapping segments.
///
/// Reads and writes resolve to a single segment and must fit inside it; an
/// access that does not resolve raises an illegal-address event (mode 8) on
/// the bus and has no effect. Every byte carries an optional breakpoint mask
/// (bits 4 = read, 2 = write, 1 = exec) checked on each access.
#[derive(Debug)]
pub struct Memory {
    /// Sorted by ascending start address.
    segments: Vec<Segment>,

    /// Segment contents as loaded, for rewinding.
    initial: Vec<Vec<u8>>,

    /// The largest exclusive end address of any segment.
    pub max_addr: u32,

    /// Byte address to breakpoint mask; an absent entry means no breakpoint.
    breakpoints: HashMap<u32, u8>,

    pub history: Vec<WriteRecord>,
}

impl Memory {
    pub fn new(specs: Vec<SegmentSpec>) -> Result<Memory> {
        let mut segments = Vec::with_capacity(specs.len());
        for spec in specs {
            let len = u32::try_from(spec.data.len())
                .map_err(|_| Error::SegmentAddressOverflow(spec.name.clone()))?;
            let end = spec
                .start
                .checked_add(len)
                .ok_or_else(|| Error::SegmentAddressOverflow(spec.name.clone()))?;
            segments.push(Segment {
                name: spec.name,
                start: spec.start,
                end,
                data: spec.data,
            });
        }
        segments.sort_by_key(|s| s.start);

        for pair in segments.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(Error::OverlappingSegments(
                    pair[0].name.clone(),
                    pair[1].name.clone(),
                ));
            }
        }

        let max_addr = segments.last().map_or(0, |s| s.end);
        let initial = segments.iter().map(|s| s.data.clone()).collect();

        Ok(Memory {
            segments,
            initial,
            max_addr,
            breakpoints: HashMap::new(),
            history: Vec::new(),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment index and in-segment offset of `addr`, provided the whole
    /// `size`-byte access fits inside one segment.
    fn resolve(&self, addr: u32, size: u32) -> Option<(usize, usize)> {
        self.segments
            .iter()
            .position(|s| s.start <= addr && u64::from(addr) + u64::from(size) <= u64::from(s.end))
            .map(|seg| (seg, (addr - self.segments[seg].start) as usize))
    }

    fn mask(&self, addr: u32) -> u8 {
        self.breakpoints.get(&addr).copied().unwrap_or(0)
    }

    /// Read `size` bytes starting at `addr`.
    ///
    /// Returns `None` after raising an illegal-address event when the access
    /// does not resolve. Otherwise checks the exec bit (instruction fetches
    /// only) and the read bit of every covered byte before returning the
    /// bytes. Endianness is the caller's concern.
    pub fn get(&self, addr: u32, size: u32, exec_mode: bool, bkpt: &mut BkptBus) -> Option<Vec<u8>> {
        let (seg, offset) = match self.resolve(addr, size) {
            Some(resolved) => resolved,
            None => {
                bkpt.throw(BkptEvent {
                    source: BkptSource::Memory(addr),
                    mode: MODE_ILLEGAL,
                });
                return None;
            }
        };

        for byte in addr..addr + size {
            let mask = self.mask(byte);
            if exec_mode && mask & MODE_EXEC != 0 {
                bkpt.throw(BkptEvent {
                    source: BkptSource::Memory(byte),
                    mode: MODE_EXEC,
                });
            }
            if mask & MODE_READ != 0 {
                bkpt.throw(BkptEvent {
                    source: BkptSource::Memory(byte),
                    mode: MODE_READ,
                });
            }
        }

        Some(self.segments[seg].data[offset..offset + size as usize].to_vec())
    }

    /// Write the low `size` bytes of `val` at `addr` in little-endian order
    /// and append to the write log.
    ///
    /// An access that does not resolve raises an illegal-address event and
    /// leaves memory untouched. A write breakpoint (bit 2) signals but never
    /// suppresses the write.
    pub fn set(&mut self, addr: u32, val: u32, size: u32, bkpt: &mut BkptBus) {
        let (seg, offset) = match self.resolve(addr, size) {
            Some(resolved) => resolved,
            None => {
                bkpt.throw(BkptEvent {
                    source: BkptSource::Memory(addr),
                    mode: MODE_ILLEGAL,
                });
                return;
            }
        };

        for byte in addr..addr + size {
            if self.mask(byte) & MODE_WRITE != 0 {
                bkpt.throw(BkptEvent {
                    source: BkptSource::Memory(byte),
                    mode: MODE_WRITE,
                });
            }
        }

        let segment = &mut self.segments[seg];
        let bytes = val.to_le_bytes();
        segment.data[offset..offset + size as usize].copy_from_slice(&bytes[..size as usize]);
        self.history.push(WriteRecord {
            segment: segment.name.clone(),
            offset: offset as u32,
            size,
            value: val,
        });
    }

    /// A contiguous image of `[0, max_addr)`: segments in ascending order
    /// with zero padding between and after them. This is the on-disk and
    /// display form of the memory.
    pub fn serialize(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(self.max_addr as usize);
        for segment in &self.segments {
            image.resize(segment.start as usize, 0);
            image.extend_from_slice(&segment.data);
        }
        image.resize(self.max_addr as usize, 0);
        image
    }

    /// Overwrite the breakpoint mask of `addr`. Callers combining modes OR
    /// them into a single mask first.
    pub fn set_breakpoint(&mut self, addr: u32, mask: u8) {
        self.breakpoints.insert(addr, mask);
    }

    pub fn remove_breakpoint(&mut self, addr: u32) {
        self.breakpoints.remove(&addr);
    }

    /// Rewind every segment to its initial contents. Breakpoint masks and
    /// the write log are left alone.
    pub fn restore(&mut self) {
        for (segment, initial) in self.segments.iter_mut().zip(&self.initial) {
            segment.data.copy_from_slice(initial);
        }
    }
}
