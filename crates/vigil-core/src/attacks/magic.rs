//! Magic bitboards for sliding attacks.
//!
//! Magic multipliers are found once at first use by a seeded search, so the
//! tables are identical from run to run without shipping a constant blob.

use std::sync::OnceLock;

use tracing::debug;

use crate::bitboard::Bitboard;

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Debug, Clone, Copy)]
struct Magic {
    mask: u64,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl Magic {
    #[inline(always)]
    fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied.bits() & self.mask;
        self.offset + (relevant.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

struct Slider {
    magics: Vec<Magic>,
    attacks: Vec<Bitboard>,
}

struct SliderTables {
    rook: Slider,
    bishop: Slider,
}

static TABLES: OnceLock<SliderTables> = OnceLock::new();

/// Ray attacks from `sq`, stopping at and including the first blocker.
fn slow_attacks(dirs: &[(i8, i8); 4], sq: usize, occupied: u64) -> u64 {
    let mut attacks = 0u64;
    for &(dr, df) in dirs {
        let (mut r, mut f) = ((sq / 8) as i8 + dr, (sq % 8) as i8 + df);
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r as u32 * 8 + f as u32);
            attacks |= bit;
            if occupied & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

#[cfg(test)]
pub(crate) fn slow_rook_attacks(sq: usize, occupied: u64) -> u64 {
    slow_attacks(&ROOK_DIRS, sq, occupied)
}

#[cfg(test)]
pub(crate) fn slow_bishop_attacks(sq: usize, occupied: u64) -> u64 {
    slow_attacks(&BISHOP_DIRS, sq, occupied)
}

/// Blocker mask: the empty-board rays minus the final edge square of each ray.
fn relevant_mask(dirs: &[(i8, i8); 4], sq: usize) -> u64 {
    let mut mask = 0u64;
    for &(dr, df) in dirs {
        let (mut r, mut f) = ((sq / 8) as i8 + dr, (sq % 8) as i8 + df);
        while (0..8).contains(&(r + dr)) && (0..8).contains(&(f + df)) {
            mask |= 1u64 << (r as u32 * 8 + f as u32);
            r += dr;
            f += df;
        }
    }
    mask
}

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Candidates with few set bits hash far better.
    fn sparse(&mut self) -> u64 {
        self.next() & self.next() & self.next()
    }
}

fn build_slider(dirs: &[(i8, i8); 4], rng: &mut XorShift) -> Slider {
    let mut magics = Vec::with_capacity(64);
    let mut attacks = Vec::new();
    let mut occupancies = Vec::with_capacity(4096);
    let mut reference = Vec::with_capacity(4096);
    let mut epoch = vec![0u32; 4096];
    let mut used = vec![0u64; 4096];
    let mut attempt = 0u32;

    for sq in 0..64 {
        let mask = relevant_mask(dirs, sq);
        let bits = mask.count_ones();
        let size = 1usize << bits;

        occupancies.clear();
        reference.clear();
        // Carry-rippler enumeration of every subset of the mask.
        let mut subset = 0u64;
        loop {
            occupancies.push(subset);
            reference.push(slow_attacks(dirs, sq, subset));
            subset = subset.wrapping_sub(mask) & mask;
            if subset == 0 {
                break;
            }
        }

        let shift = 64 - bits;
        let magic = loop {
            let candidate = rng.sparse();
            if (mask.wrapping_mul(candidate) >> 56).count_ones() < 6 {
                continue;
            }
            attempt += 1;
            let mut ok = true;
            for (&occ, &att) in occupancies.iter().zip(&reference) {
                let idx = (occ.wrapping_mul(candidate) >> shift) as usize;
                if epoch[idx] != attempt {
                    epoch[idx] = attempt;
                    used[idx] = att;
                } else if used[idx] != att {
                    ok = false;
                    break;
                }
            }
            if ok {
                break candidate;
            }
        };

        let entry = Magic { mask, magic, shift, offset: attacks.len() };
        attacks.resize(attacks.len() + size, Bitboard::EMPTY);
        for (&occ, &att) in occupancies.iter().zip(&reference) {
            attacks[entry.index(Bitboard::new(occ))] = Bitboard::new(att);
        }
        magics.push(entry);
    }

    Slider { magics, attacks }
}

fn tables() -> &'static SliderTables {
    TABLES.get_or_init(|| {
        let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
        let rook = build_slider(&ROOK_DIRS, &mut rng);
        let bishop = build_slider(&BISHOP_DIRS, &mut rng);
        debug!(
            rook_entries = rook.attacks.len(),
            bishop_entries = bishop.attacks.len(),
            "slider attack tables ready"
        );
        SliderTables { rook, bishop }
    })
}

#[inline]
pub(crate) fn rook_lookup(sq: usize, occupied: Bitboard) -> Bitboard {
    let slider = &tables().rook;
    slider.attacks[slider.magics[sq].index(occupied)]
}

#[inline]
pub(crate) fn bishop_lookup(sq: usize, occupied: Bitboard) -> Bitboard {
    let slider = &tables().bishop;
    slider.attacks[slider.magics[sq].index(occupied)]
}
