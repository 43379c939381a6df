//! Pulse classifier and framing state machine for the AcuRite 00523
//! refrigerator/freezer thermometer.
//!
//! The 00523 encodes each bit as an OFF half followed by an ON half of a
//! matching width class: a short OFF (~200us) paired with a long ON
//! (~400us) is a `0` bit, a long OFF paired with a short ON is a `1` bit.
//! A burst opens with four contiguous wide ON pulses (the preamble) and is
//! terminated by a much longer inter-chunk gap.

/// Number of bits in one 00523 candidate word.
pub const BIT_LENGTH: u8 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalClass523 {
    Bit0Off,
    Bit0On,
    Bit1Off,
    Bit1On,
    BitstreamOff,
    BitstreamOn,
    ChunkEnd,
    Inv,
}

/// Classify a single edge event for the 00523 protocol.
///
/// Intervals are closed at the low end, open at the high end, matching the
/// receiver's timing tolerances.
pub fn classify523(level: u8, duration_us: u32) -> SignalClass523 {
    use SignalClass523::*;
    match (level, duration_us) {
        (0, 100..=299) => Bit0Off,
        (0, 300..=499) => Bit1Off,
        (0, 500..=699) => BitstreamOff,
        (1, 100..=299) => Bit1On,
        (1, 300..=499) => Bit0On,
        (1, 500..=699) => BitstreamOn,
        (1, 20_000..=59_999) => ChunkEnd,
        _ => Inv,
    }
}

/// Framing state for a single 00523 decoder instance.
///
/// Invariants: `bitstream_size <= BIT_LENGTH`; unused high bits of
/// `bitstream` are always zero; `bitstream_open` implies `chunk_open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingState523 {
    bitstream: u64,
    bitstream_size: u8,
    bitstream_open: bool,
    chunk_open: bool,
    last_class: SignalClass523,
    bitstream_opener_count: u8,
}

impl Default for FramingState523 {
    fn default() -> Self {
        Self::new()
    }
}

impl FramingState523 {
    pub fn new() -> Self {
        Self {
            bitstream: 0,
            bitstream_size: 0,
            bitstream_open: false,
            chunk_open: false,
            last_class: SignalClass523::Inv,
            bitstream_opener_count: 0,
        }
    }

    pub fn chunk_open(&self) -> bool {
        self.chunk_open
    }

    pub fn bitstream_size(&self) -> u8 {
        self.bitstream_size
    }

    fn open_chunk(&mut self) {
        self.chunk_open = true;
        self.bitstream_open = true;
        self.bitstream = 0;
        self.bitstream_size = 0;
    }

    fn reset_accumulator(&mut self) {
        self.bitstream = 0;
        self.bitstream_size = 0;
    }

    /// Reset accumulator state but preserve `chunk_open` so a spurious
    /// `clear()` mid-burst cannot abort an in-progress preamble or chunk.
    pub fn clear(&mut self) {
        self.bitstream = 0;
        self.bitstream_size = 0;
        self.bitstream_open = false;
        self.bitstream_opener_count = 0;
        self.last_class = SignalClass523::Inv;
    }

    /// Fully reset all state, including `chunk_open`.
    pub fn close_chunk(&mut self) {
        self.chunk_open = false;
        self.bitstream_open = false;
        self.bitstream = 0;
        self.bitstream_size = 0;
        self.bitstream_opener_count = 0;
        self.last_class = SignalClass523::Inv;
    }

    /// Feed one edge event into the state machine. Returns a non-zero
    /// 48-bit candidate word when a bitstream completes on this call, or
    /// zero if more input is needed.
    pub fn parse_rf(&mut self, duration_us: u32, level: u8) -> u64 {
        let class = classify523(level, duration_us);
        let mut emitted: u64 = 0;

        if (self.last_class == SignalClass523::BitstreamOff || !self.chunk_open)
            && class == SignalClass523::BitstreamOn
        {
            self.bitstream_opener_count += 1;
            if self.bitstream_opener_count >= 4 {
                self.bitstream_opener_count = 0;
                if !self.chunk_open {
                    self.open_chunk();
                }
            }
        }

        if self.chunk_open {
            if class == SignalClass523::ChunkEnd {
                if self.bitstream_size == BIT_LENGTH {
                    emitted = self.bitstream;
                }
                self.close_chunk();
            } else {
                match self.last_class {
                    SignalClass523::Bit0Off => match class {
                        SignalClass523::Bit0On if self.bitstream_size < BIT_LENGTH => {
                            self.bitstream_size += 1;
                        }
                        SignalClass523::Bit1On if self.bitstream_size == BIT_LENGTH => {
                            emitted = self.bitstream;
                            self.reset_accumulator();
                        }
                        _ => {
                            self.bitstream_opener_count = 0;
                        }
                    },
                    SignalClass523::Bit1Off => {
                        if class == SignalClass523::Bit1On && self.bitstream_size < BIT_LENGTH {
                            self.bitstream |= 1u64 << (BIT_LENGTH - 1 - self.bitstream_size);
                            self.bitstream_size += 1;
                        }
                    }
                    _ => {}
                }
            }
        }

        self.last_class = class;
        emitted
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn feed_bit(state: &mut FramingState523, bit: u8) -> u64 {
        if bit == 0 {
            state.parse_rf(200, 0);
            state.parse_rf(400, 1)
        } else {
            state.parse_rf(400, 0);
            state.parse_rf(200, 1)
        }
    }

    fn feed_preamble(state: &mut FramingState523) {
        for _ in 0..4 {
            state.parse_rf(600, 1);
        }
    }

    fn feed_bits(state: &mut FramingState523, bits: &[u8]) -> u64 {
        feed_preamble(state);
        for &bit in bits {
            feed_bit(state, bit);
        }
        // A chunk-end gap flushes a full accumulator.
        state.parse_rf(30_000, 1)
    }

    fn bits_of(value: u64, len: u8) -> [u8; 48] {
        let mut bits = [0u8; 48];
        for i in 0..len {
            bits[i as usize] = ((value >> (len - 1 - i)) & 1) as u8;
        }
        bits
    }

    #[test]
    fn classify_table() {
        assert_eq!(classify523(0, 150), SignalClass523::Bit0Off);
        assert_eq!(classify523(0, 350), SignalClass523::Bit1Off);
        assert_eq!(classify523(0, 600), SignalClass523::BitstreamOff);
        assert_eq!(classify523(1, 150), SignalClass523::Bit1On);
        assert_eq!(classify523(1, 350), SignalClass523::Bit0On);
        assert_eq!(classify523(1, 600), SignalClass523::BitstreamOn);
        assert_eq!(classify523(1, 30_000), SignalClass523::ChunkEnd);
        assert_eq!(classify523(0, 50), SignalClass523::Inv);
        assert_eq!(classify523(1, 70_000), SignalClass523::Inv);
    }

    #[test]
    fn size_never_exceeds_bit_length() {
        let mut state = FramingState523::new();
        feed_preamble(&mut state);
        let bits = [1u8; 80];
        for &bit in &bits {
            feed_bit(&mut state, bit);
            assert!(state.bitstream_size() <= BIT_LENGTH);
        }
    }

    #[test]
    fn preamble_starvation_leaves_chunk_closed() {
        // S6: three BITSTREAM_ON pulses then bit signals never opens a chunk.
        let mut state = FramingState523::new();
        state.parse_rf(600, 1);
        state.parse_rf(600, 1);
        state.parse_rf(600, 1);
        let candidate = feed_bit(&mut state, 0);
        assert_eq!(candidate, 0);
        assert!(!state.chunk_open());
    }

    #[test]
    fn all_invalid_pulses_emit_nothing() {
        let mut state = FramingState523::new();
        for _ in 0..50 {
            let out = state.parse_rf(1, 1);
            assert_eq!(out, 0);
        }
        assert!(!state.chunk_open());
    }

    #[test]
    fn round_trips_a_synthetic_block() {
        // A 48-bit word with an arbitrary but fixed bit pattern.
        let value: u64 = 0xC049_8B3C_9942;
        let bits = bits_of(value, BIT_LENGTH);
        let mut state = FramingState523::new();
        let candidate = feed_bits(&mut state, &bits);
        assert_eq!(candidate, value);
    }

    #[test]
    fn clear_preserves_chunk_open() {
        let mut state = FramingState523::new();
        feed_preamble(&mut state);
        assert!(state.chunk_open());
        state.clear();
        assert!(state.chunk_open());
        assert_eq!(state.bitstream_size(), 0);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut state = FramingState523::new();
        feed_preamble(&mut state);
        state.clear();
        let after_one = state;
        state.clear();
        assert_eq!(state, after_one);
    }
}
