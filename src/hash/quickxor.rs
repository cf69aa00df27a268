//! QuickXorHash engine
//!
//! A 160-bit XOR accumulator that folds each input byte in at a bit position
//! advancing by 11 bits per byte, wrapping around a ring made of two 64-bit
//! cells and one 32-bit cell. The total length is mixed into the last eight
//! digest bytes on finalization.
//!
//! The fold is not cryptographic. It is built for speed and for incremental
//! computation where chunk boundaries never affect the result.

use super::output::QuickXorDigest;

/// Width of the accumulator ring in bits
pub const WIDTH_IN_BITS: usize = 160;

/// Bit rotation applied per input byte
pub const SHIFT: usize = 11;

/// Effective width of the last accumulator cell
pub const BITS_IN_LAST_CELL: usize = 32;

/// Digest size in bytes
pub const DIGEST_SIZE: usize = (WIDTH_IN_BITS - 1) / 8 + 1;

/// Number of 64-bit cells backing the accumulator
pub const BLOCK_SIZE: usize = (WIDTH_IN_BITS - 1) / 64 + 1;

const LAST_CELL: usize = BLOCK_SIZE - 1;

/// Streaming QuickXorHash state
///
/// One instance hashes one byte stream. Instances share nothing, so separate
/// streams can be hashed on separate threads with one engine each.
///
/// ```
/// use quickxorhash::hash::QuickXorHash;
///
/// let mut hasher = QuickXorHash::new();
/// hasher.update(b"Hello, ");
/// hasher.update(b"World!");
///
/// assert_eq!(hasher.finalize().to_base64(), "SCgDG9jwBhaA4ApvnQMbyBACAAA=");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickXorHash {
    /// Accumulator cells; only the low 32 bits of the last one are used
    cells: [u64; BLOCK_SIZE],
    /// Bytes folded since the last reset (wrapping)
    length: u64,
    /// Ring position where the next byte starts folding, in [0, 160)
    shift: usize,
}

impl QuickXorHash {
    /// Create a new zeroed hasher
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the hasher for reuse
    pub fn reset(&mut self) {
        self.cells = [0; BLOCK_SIZE];
        self.length = 0;
        self.shift = 0;
    }

    /// Total bytes folded since construction or the last reset
    pub fn bytes_processed(&self) -> u64 {
        self.length
    }

    /// Ring position at which the next byte will be folded
    pub fn rotation_offset(&self) -> usize {
        self.shift
    }

    /// Fold a chunk of data into the state
    ///
    /// Bytes that sit a whole ring width apart land on the same bit position,
    /// so the chunk is first XOR-folded into one value per phase and each
    /// phase is then folded into the cells once.
    pub fn update(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let mut phases = [0u8; WIDTH_IN_BITS];
        for chunk in data.chunks(WIDTH_IN_BITS) {
            for (phase, byte) in phases.iter_mut().zip(chunk) {
                *phase ^= byte;
            }
        }

        let mut index = self.shift / 64;
        let mut offset = self.shift % 64;

        for &value in &phases[..data.len().min(WIDTH_IN_BITS)] {
            self.fold(index, offset, value);

            offset += SHIFT;
            while offset >= cell_width(index) {
                offset -= cell_width(index);
                index = next_cell(index);
            }
        }

        let advance = SHIFT * (data.len() % WIDTH_IN_BITS);
        self.shift = (self.shift + advance) % WIDTH_IN_BITS;
        self.length = self.length.wrapping_add(data.len() as u64);
    }

    /// XOR one byte into the ring at `offset` bits into cell `index`,
    /// spilling the high bits into the next cell when it straddles a boundary
    #[inline]
    fn fold(&mut self, index: usize, offset: usize, value: u8) {
        let value = u64::from(value);
        let width = cell_width(index);

        self.cells[index] ^= (value << offset) & cell_mask(index);

        if offset + 8 > width {
            self.cells[next_cell(index)] ^= value >> (width - offset);
        }
    }

    /// Compute the digest of everything folded so far
    ///
    /// Does not modify the state; calling it twice in a row yields the same
    /// digest, and further updates continue from where they left off.
    pub fn finalize(&self) -> QuickXorDigest {
        let mut out = [0u8; DIGEST_SIZE];

        for (index, cell) in self.cells.iter().enumerate() {
            let start = index * 8;
            let end = (start + 8).min(DIGEST_SIZE);
            out[start..end].copy_from_slice(&cell.to_le_bytes()[..end - start]);
        }

        // Length goes on top of the serialized cells, over the last 8 bytes
        for (dst, src) in out[DIGEST_SIZE - 8..]
            .iter_mut()
            .zip(self.length.to_le_bytes())
        {
            *dst ^= src;
        }

        QuickXorDigest::from(out)
    }

    /// Append the digest bytes to `out`
    pub fn finalize_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.finalize().as_bytes());
    }

    /// Hash a byte slice in one shot
    pub fn digest(data: &[u8]) -> QuickXorDigest {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

#[inline]
const fn cell_width(index: usize) -> usize {
    if index == LAST_CELL {
        BITS_IN_LAST_CELL
    } else {
        64
    }
}

#[inline]
const fn cell_mask(index: usize) -> u64 {
    if index == LAST_CELL {
        (1u64 << BITS_IN_LAST_CELL) - 1
    } else {
        u64::MAX
    }
}

#[inline]
const fn next_cell(index: usize) -> usize {
    if index == LAST_CELL {
        0
    } else {
        index + 1
    }
}

impl std::io::Write for QuickXorHash {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl digest::HashMarker for QuickXorHash {}

impl digest::OutputSizeUser for QuickXorHash {
    type OutputSize = digest::consts::U20;
}

impl digest::Update for QuickXorHash {
    fn update(&mut self, data: &[u8]) {
        QuickXorHash::update(self, data);
    }
}

impl digest::FixedOutput for QuickXorHash {
    fn finalize_into(self, out: &mut digest::Output<Self>) {
        out.copy_from_slice(self.finalize().as_bytes());
    }
}

impl digest::Reset for QuickXorHash {
    fn reset(&mut self) {
        QuickXorHash::reset(self);
    }
}

impl digest::FixedOutputReset for QuickXorHash {
    fn finalize_into_reset(&mut self, out: &mut digest::Output<Self>) {
        out.copy_from_slice(self.finalize().as_bytes());
        QuickXorHash::reset(self);
    }
}
