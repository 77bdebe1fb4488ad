//! ## Packed HyperLogLog sketch
//! The register sketch whose growth the simulation drives. Registers are the
//! classic HyperLogLog ranks: register index taken from the low `p` bits of a
//! 64-bit hash, rank from the hash's leading-zero count capped at `64 - p`,
//! plus one. Ranks fit 6 bits for every supported precision.
//!
//! [Original HyperLogLog++ paper](https://static.googleusercontent.com/media/research.google.com/en//pubs/archive/40671.pdf)
//!
//! Register storage:
//! - `registers[0..m * 6 / 8]` - `m` ranks packed at 6 bits per register.
//! - one spare trailing byte so every register access reads and writes a
//!   fixed two-byte window, keeping the packing branchless.
//!
//! The number of zero registers and the registers' harmonic sum are stored
//! and updated on every insert, so `estimate` runs in constant time.

use std::mem::size_of;

use crate::error::{Error, Result};

/// Lowest precision with LogLog-Beta coefficients.
pub const MIN_PRECISION: u32 = 4;
/// Highest precision with LogLog-Beta coefficients.
pub const MAX_PRECISION: u32 = 18;

/// Register width in bits.
const REGISTER_WIDTH: usize = 6;
/// Mask selecting one register rank from a two-byte window.
const REGISTER_MASK: u32 = (1 << REGISTER_WIDTH) - 1;

/// Register-level view of a distinct-count sketch, as consumed by the growth
/// simulation: hashes go in, register bytes and estimates come out.
pub trait RegisterSketch: Sized {
    /// Create an empty sketch with `2^precision` registers.
    fn create(precision: u32) -> Result<Self>;

    /// Clear all registers, returning the sketch to its empty state.
    fn reset(&mut self);

    /// Record one pre-hashed element. Registers only ever grow.
    fn insert_hash(&mut self, hash: u64);

    /// Canonical serialized register state.
    fn register_bytes(&self) -> &[u8];

    /// Distinct-count estimate for the current register state.
    fn estimate(&self) -> f64;

    /// In-memory footprint in bytes, struct plus backing storage.
    fn size_of(&self) -> usize;
}

/// Register-width encodings of the packed sketch state. The packed form is
/// the canonical serialization; the dense form spends a full byte per
/// register, the layout byte-per-register stores actually use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Packed6,
    Dense8,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Packed6, Encoding::Dense8];

    pub fn label(&self) -> &'static str {
        match self {
            Encoding::Packed6 => "hll6",
            Encoding::Dense8 => "hll8",
        }
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        match self {
            Encoding::Packed6 => 0,
            Encoding::Dense8 => 1,
        }
    }
}

/// HyperLogLog sketch with `2^precision` registers packed at 6 bits each.
#[derive(Debug, Clone, PartialEq)]
pub struct HyperLogLog {
    precision: u32,
    zero_registers: u32,
    harmonic_sum: f64,
    registers: Vec<u8>,
}

impl HyperLogLog {
    /// Number of registers.
    #[inline]
    fn register_count(&self) -> usize {
        1 << self.precision
    }

    /// Length of the packed register payload, excluding the spare byte.
    #[inline]
    fn packed_len(&self) -> usize {
        self.register_count() * REGISTER_WIDTH / 8
    }

    /// Read register `idx` from its two-byte window.
    #[inline]
    fn get_register(&self, idx: u32) -> u32 {
        let bit_idx = idx as usize * REGISTER_WIDTH;
        let byte_idx = bit_idx / 8;
        let bit_pos = bit_idx % 8;
        let window =
            u32::from(self.registers[byte_idx]) | (u32::from(self.registers[byte_idx + 1]) << 8);
        (window >> bit_pos) & REGISTER_MASK
    }

    /// Set register `idx` to `new_rank` and maintain the zero-register count
    /// and harmonic sum. Callers guarantee `new_rank > old_rank`.
    #[inline]
    fn set_register(&mut self, idx: u32, old_rank: u32, new_rank: u32) {
        let bit_idx = idx as usize * REGISTER_WIDTH;
        let byte_idx = bit_idx / 8;
        let bit_pos = bit_idx % 8;
        let mut window =
            u32::from(self.registers[byte_idx]) | (u32::from(self.registers[byte_idx + 1]) << 8);
        window &= !(REGISTER_MASK << bit_pos);
        window |= new_rank << bit_pos;
        self.registers[byte_idx] = (window & 0xff) as u8;
        self.registers[byte_idx + 1] = (window >> 8) as u8;

        self.zero_registers -= u32::from(old_rank == 0);
        self.harmonic_sum -= 1.0 / (1u64 << old_rank) as f64;
        self.harmonic_sum += 1.0 / (1u64 << new_rank) as f64;
    }

    /// Raise register `idx` to `new_rank` if it is an improvement.
    #[inline]
    fn update_rank(&mut self, idx: u32, new_rank: u32) {
        let old_rank = self.get_register(idx);
        if new_rank > old_rank {
            self.set_register(idx, old_rank, new_rank);
        }
    }

    /// Unpack the registers to one byte per register.
    pub fn expand_registers(&self) -> Vec<u8> {
        (0..self.register_count() as u32)
            .map(|idx| self.get_register(idx) as u8)
            .collect()
    }
}

impl RegisterSketch for HyperLogLog {
    fn create(precision: u32) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::InvalidPrecision(precision));
        }
        let packed_len = (1usize << precision) * REGISTER_WIDTH / 8;
        let mut sketch = Self {
            precision,
            zero_registers: 0,
            harmonic_sum: 0.0,
            registers: vec![0u8; packed_len + 1],
        };
        sketch.reset();
        Ok(sketch)
    }

    fn reset(&mut self) {
        self.registers.fill(0);
        self.zero_registers = 1 << self.precision;
        self.harmonic_sum = self.register_count() as f64;
    }

    #[inline]
    fn insert_hash(&mut self, hash: u64) {
        let idx = (hash as u32) & ((1 << self.precision) - 1);
        let rank = hash.leading_zeros().min(64 - self.precision) + 1;
        self.update_rank(idx, rank);
    }

    #[inline]
    fn register_bytes(&self) -> &[u8] {
        &self.registers[..self.packed_len()]
    }

    fn estimate(&self) -> f64 {
        let m = self.register_count() as f64;
        let zeros = f64::from(self.zero_registers);
        alpha(self.register_count()) * m * (m - zeros)
            / (self.harmonic_sum + beta_horner(zeros, self.precision))
    }

    fn size_of(&self) -> usize {
        size_of::<Self>() + self.registers.len()
    }
}

/// Parameter for bias correction
#[inline]
fn alpha(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / (m as f64)),
    }
}

/// Computes LogLog-Beta estimate bias correction using Horner's method.
///
/// Paper: https://arxiv.org/pdf/1612.02284.pdf
/// Wikipedia: https://en.wikipedia.org/wiki/Horner%27s_method
#[inline]
fn beta_horner(z: f64, precision: u32) -> f64 {
    let beta = BETA[(precision - MIN_PRECISION) as usize];
    let zl = (z + 1.0).ln();
    let mut res = 0.0;
    for i in (1..8).rev() {
        res = res * zl + beta[i];
    }
    res * zl + beta[0] * z
}

/// LogLog-Beta polynomial coefficients for precision in [4..18] range.
const BETA: [[f64; 8]; 15] = [
    // p = 4
    [
        -0.582581413904517,
        -1.93530035756005,
        11.079323758035073,
        -22.131357446444323,
        22.505391846630037,
        -12.000723834917984,
        3.220579408194167,
        -0.342225302271235,
    ],
    // p = 5
    [
        -0.7518999460733967,
        -0.959003007774876,
        5.59973713221416,
        -8.209763699976552,
        6.509125489447204,
        -2.683029373432373,
        0.5612891113138221,
        -0.0463331622196545,
    ],
    // p = 6
    [
        29.825790096961963,
        -31.328708333772592,
        -10.594252303658228,
        -11.572012568909962,
        3.818875437390749,
        -2.416013032853081,
        0.4542208940970826,
        -0.0575155452020420,
    ],
    // p = 7
    [
        2.810292129082006,
        -3.9780498518175995,
        1.3162680041351582,
        -3.92524863358059,
        2.008083575394647,
        -0.7527151937556955,
        0.1265569894242751,
        -0.0109946438726240,
    ],
    // p = 8
    [
        1.0063354488755052,
        -2.005806664051124,
        1.6436974936651412,
        -2.7056080994056617,
        1.392099802442226,
        -0.4647037427218319,
        0.07384282377269775,
        -0.00578554885254223,
    ],
    // p = 9
    [
        -0.09415657458167959,
        -0.7813097592455053,
        1.7151494675071246,
        -1.7371125040651634,
        0.8644150848904892,
        -0.23819027465047218,
        0.03343448400269076,
        -0.00207858528178157,
    ],
    // p = 10
    [
        -0.25935400670790054,
        -0.5259830199980581,
        1.4893303492587684,
        -1.2964271408499357,
        0.6228475621722162,
        -0.1567232677025104,
        0.02054415903878563,
        -0.00112488483925502,
    ],
    // p = 11
    [
        -4.32325553856025e-01,
        -1.08450736399632e-01,
        6.09156550741120e-01,
        -1.65687801845180e-02,
        -7.95829341087617e-02,
        4.71830602102918e-02,
        -7.81372902346934e-03,
        5.84268708489995e-04,
    ],
    // p = 12
    [
        -3.84979202588598e-01,
        1.83162233114364e-01,
        1.30396688841854e-01,
        7.04838927629266e-02,
        -8.95893971464453e-03,
        1.13010036741605e-02,
        -1.94285569591290e-03,
        2.25435774024964e-04,
    ],
    // p = 13
    [
        -0.41655270946462997,
        -0.22146677040685156,
        0.38862131236999947,
        0.4534097974606237,
        -0.36264738324476375,
        0.12304650053558529,
        -0.0170154038455551,
        0.00102750367080838,
    ],
    // p = 14
    [
        -3.71009760230692e-01,
        9.78811941207509e-03,
        1.85796293324165e-01,
        2.03015527328432e-01,
        -1.16710521803686e-01,
        4.31106699492820e-02,
        -5.99583540511831e-03,
        4.49704299509437e-04,
    ],
    // p = 15
    [
        -0.38215145543875273,
        -0.8906940053609084,
        0.3760233577467887,
        0.9933597744068238,
        -0.6557744163831896,
        0.1833234212970361,
        -0.02241529633062872,
        0.00121399789330194,
    ],
    // p = 16
    [
        -0.3733187664375306,
        -1.41704077448123,
        0.40729184796612533,
        1.5615203390658416,
        -0.9924223353428613,
        0.2606468139948309,
        -0.03053811369682807,
        0.00155770210179105,
    ],
    // p = 17
    [
        -0.36775502299404605,
        0.5383142235137797,
        0.7697028927876792,
        0.5500258358645056,
        -0.7457558826114694,
        0.2571183578582195,
        -0.03437902606864149,
        0.00185949146371616,
    ],
    // p = 18
    [
        -0.3647962332596054,
        0.9973041232863503,
        1.5535438623008122,
        1.2593267719802892,
        -1.5332594820911016,
        0.4780104220005659,
        -0.05951025172951174,
        0.00291076804642205,
    ],
];
