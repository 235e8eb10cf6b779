//! Decaying memory
//!
//! Every cell written by a NAND loses the written bit or byte after
//! [`cycles::DECAY`](nandbytecode::cycles::DECAY) cycles unless it is written
//! again. Decay is applied lazily: a pending entry is checked and, when due,
//! collapsed into the physical cell the next time the cell is read.

pub mod addr;

pub use addr::Address;

use {
    crate::utils::static_assert_eq,
    alloc::{boxed::Box, vec},
    hashbrown::{hash_map::Entry, HashMap},
    log::trace,
    nandbytecode::MEMORY_SIZE,
};

static_assert_eq!(MEMORY_SIZE, u16::MAX as usize + 1);

/// What part of a cell is lost
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    /// Whole byte becomes zero
    Byte,
    /// Single bit, index 0 to 7, is cleared
    Bit(u8),
}

impl Granularity {
    /// Apply loss to a byte
    #[inline]
    pub fn apply(self, byte: u8) -> u8 {
        match self {
            Self::Byte => 0,
            Self::Bit(bit) => byte & !(1 << (bit & 7)),
        }
    }
}

/// Pending decay of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decay {
    /// Cycle count at which the cell becomes stale
    pub deadline: u64,
    pub granularity: Granularity,
}

impl Decay {
    #[inline]
    fn due(&self, now: u64) -> bool {
        self.deadline <= now
    }
}

/// 64 KiB of decaying memory
#[derive(Clone)]
pub struct DecayMemory {
    cells: Box<[u8]>,
    decay: HashMap<Address, Decay>,
}

impl Default for DecayMemory {
    fn default() -> Self {
        Self { cells: vec![0; MEMORY_SIZE].into_boxed_slice(), decay: HashMap::new() }
    }
}

impl DecayMemory {
    /// Memory with `image` placed at address 0, the rest zeroed
    ///
    /// Bytes past the end of the address space are ignored.
    pub fn with_image(image: &[u8]) -> Self {
        let mut memory = Self::default();
        let len = image.len().min(MEMORY_SIZE);
        memory.cells[..len].copy_from_slice(&image[..len]);
        memory
    }

    /// Read the logical value of a cell at cycle `now`
    ///
    /// A due decay entry is collapsed into the cell and removed, so this
    /// mutates memory even though it observes it.
    pub fn read(&mut self, addr: Address, now: u64) -> u8 {
        let cell = &mut self.cells[addr.index()];
        if let Entry::Occupied(entry) = self.decay.entry(addr) {
            if entry.get().due(now) {
                let Decay { deadline, granularity } = entry.remove();
                trace!("{addr}: {granularity:?} lost at {deadline}, collapsed at {now}");
                *cell = granularity.apply(*cell);
            }
        }

        *cell
    }

    /// Logical value of a cell at cycle `now`, without collapsing it
    pub fn peek(&self, addr: Address, now: u64) -> u8 {
        let cell = self.cells[addr.index()];
        match self.decay.get(&addr) {
            Some(decay) if decay.due(now) => decay.granularity.apply(cell),
            _ => cell,
        }
    }

    /// Overwrite a cell, pending decay is left as is
    #[inline]
    pub fn write(&mut self, addr: Address, byte: u8) {
        self.cells[addr.index()] = byte;
    }

    /// Drop pending decay of a cell
    ///
    /// Returns the dropped entry.
    #[inline]
    pub fn cancel_decay(&mut self, addr: Address) -> Option<Decay> {
        self.decay.remove(&addr)
    }

    /// Install decay for a cell, replacing the pending one
    ///
    /// Returns the replaced entry.
    pub fn schedule_decay(
        &mut self,
        addr: Address,
        deadline: u64,
        granularity: Granularity,
    ) -> Option<Decay> {
        self.decay.insert(addr, Decay { deadline, granularity })
    }

    /// Pending decay of a cell
    pub fn pending(&self, addr: Address) -> Option<Decay> {
        self.decay.get(&addr).copied()
    }

    /// Number of cells with pending decay
    pub fn pending_count(&self) -> usize {
        self.decay.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Address = Address::new(0x1234);

    #[test]
    fn image_is_zero_extended() {
        let mut mem = DecayMemory::with_image(&[1, 2, 3]);
        assert_eq!(mem.read(Address::new(2), 0), 3);
        assert_eq!(mem.read(Address::new(3), 0), 0);
        assert_eq!(mem.read(Address::new(0xFFFF), 0), 0);
    }

    #[test]
    fn oversized_image_is_truncated() {
        let image = vec![0xAA; MEMORY_SIZE + 16];
        let mut mem = DecayMemory::with_image(&image);
        assert_eq!(mem.read(Address::new(0xFFFF), 0), 0xAA);
    }

    #[test]
    fn byte_decays_at_deadline() {
        let mut mem = DecayMemory::default();
        mem.write(A, 0xFF);
        mem.schedule_decay(A, 128, Granularity::Byte);

        assert_eq!(mem.read(A, 127), 0xFF);
        assert!(mem.pending(A).is_some());
        assert_eq!(mem.read(A, 128), 0);
        assert_eq!(mem.pending(A), None);
    }

    #[test]
    fn bit_decay_keeps_other_bits() {
        let mut mem = DecayMemory::default();
        mem.write(A, 0b1111_1111);
        mem.schedule_decay(A, 10, Granularity::Bit(3));

        assert_eq!(mem.read(A, 9), 0b1111_1111);
        assert_eq!(mem.read(A, 500), 0b1111_0111);
    }

    #[test]
    fn rescheduling_replaces() {
        let mut mem = DecayMemory::default();
        mem.write(A, 0xFF);
        mem.schedule_decay(A, 100, Granularity::Byte);

        let old = mem.schedule_decay(A, 200, Granularity::Bit(0));
        assert_eq!(old, Some(Decay { deadline: 100, granularity: Granularity::Byte }));
        assert_eq!(mem.pending_count(), 1);

        assert_eq!(mem.read(A, 150), 0xFF);
        assert_eq!(mem.read(A, 200), 0xFE);
    }

    #[test]
    fn collapse_happens_once() {
        let mut mem = DecayMemory::default();
        mem.write(A, 0xFF);
        mem.schedule_decay(A, 5, Granularity::Byte);
        assert_eq!(mem.read(A, 5), 0);

        // No entry left, a later write stays
        mem.write(A, 0x42);
        assert_eq!(mem.read(A, 1000), 0x42);
    }

    #[test]
    fn cancelled_decay_keeps_cell() {
        let mut mem = DecayMemory::default();
        mem.write(A, 0xFF);
        mem.schedule_decay(A, 5, Granularity::Byte);

        let cancelled = mem.cancel_decay(A);
        assert_eq!(cancelled, Some(Decay { deadline: 5, granularity: Granularity::Byte }));
        assert_eq!(mem.cancel_decay(A), None);
        assert_eq!(mem.read(A, 500), 0xFF);
    }

    #[test]
    fn peek_does_not_collapse() {
        let mut mem = DecayMemory::default();
        mem.write(A, 0x0F);
        mem.schedule_decay(A, 5, Granularity::Bit(0));

        assert_eq!(mem.peek(A, 4), 0x0F);
        assert_eq!(mem.peek(A, 5), 0x0E);
        assert!(mem.pending(A).is_some());

        assert_eq!(mem.read(A, 5), 0x0E);
        assert_eq!(mem.pending(A), None);
        assert_eq!(mem.peek(A, 5), 0x0E);
    }
}
