//! Test helpers: a deterministic pseudorandom generator and a table of
//! boundary values.

/// Linear-feedback shift register used as the random pattern generator for
/// the host-agreement tests.
pub struct Lfsr {
    state: u32,
}

impl Default for Lfsr {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfsr {
    pub fn new() -> Lfsr {
        Lfsr { state: 0x13371337 }
    }

    fn step(&mut self) {
        let a = (self.state >> 24) & 1;
        let b = (self.state >> 23) & 1;
        let c = (self.state >> 22) & 1;
        let d = (self.state >> 17) & 1;
        let n = a ^ b ^ c ^ d ^ 1;
        self.state <<= 1;
        self.state |= n;
    }

    fn get32(&mut self) -> u32 {
        let mut res: u32 = 0;
        for _ in 0..32 {
            self.step();
            res <<= 1;
            res ^= self.state & 0x1;
        }
        res
    }

    /// The next 64 pseudorandom bits.
    pub fn get64(&mut self) -> u64 {
        ((self.get32() as u64) << 32) | self.get32() as u64
    }
}

/// Values that sit on the interesting boundaries of the four formats.
pub fn special_test_values() -> [f64; 24] {
    [
        f64::NAN,
        -f64::NAN,
        f64::INFINITY,
        f64::NEG_INFINITY,
        0.0,
        -0.0,
        1.0,
        -1.0,
        0.1,
        -0.00001,
        std::f64::consts::PI,
        std::f64::consts::E,
        355. / 113.,
        f64::EPSILON,
        -f64::EPSILON,
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        f64::from_bits(1),
        65504.0,
        65520.0,
        2f64.powi(-126),
        2f64.powi(-149),
        2f64.powi(-150),
    ]
}

#[test]
fn test_lfsr_balance() {
    let mut lfsr = Lfsr::new();

    // Count the number of bits, and the number of 1s.
    let mut items = 0u64;
    let mut ones = 0u64;

    for _ in 0..5000 {
        let mut u = lfsr.get64();
        for _ in 0..64 {
            items += 1;
            ones += u & 1;
            u >>= 1;
        }
    }
    // Make sure that we have around 50% 1s and 50% zeros.
    assert!((ones as f64) < (0.55 * items as f64));
    assert!((ones as f64) > (0.45 * items as f64));
}

#[test]
fn test_lfsr_repetition() {
    let mut lfsr = Lfsr::new();
    let first = lfsr.get64();
    let second = lfsr.get64();

    // Make sure that the items don't repeat themselves too frequently.
    for _ in 0..30000 {
        assert_ne!(first, lfsr.get64());
        assert_ne!(second, lfsr.get64());
    }
}
