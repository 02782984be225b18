//! Lockless, bucketed transposition table shared by all search threads.
//!
//! Each bucket holds two slots: a depth-preferred slot and an always-replace
//! slot. A slot is two `AtomicU64` words:
//!
//! ```text
//! data word:
//!   bits  0-15  move
//!   bits 16-31  score        (i16, mate scores re-based to the node)
//!   bits 32-47  static eval  (i16, EVAL_NONE when absent)
//!   bits 48-55  depth + DEPTH_OFFSET (never 0 for a filled slot)
//!   bits 56-59  generation
//!   bits 60-61  bound
//!   bit  62     pv node
//!   bit  63     in check
//!
//! key word: hash ^ data
//! ```
//!
//! A reader recomputes `key ^ data` and rejects the slot unless it equals the
//! probed hash, so a torn write or a different position never surfaces. All
//! accesses are `Relaxed`.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use tracing::debug;
use vigil_core::Move;

use super::{MATE_THRESHOLD, TB_WIN_THRESHOLD};

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<TranspositionTable>();
    }
    let _ = check;
};

/// Depth recorded for entries that only carry a static eval.
pub const DEPTH_EVAL_ONLY: i32 = -7;
const DEPTH_OFFSET: i32 = 8;
const EVAL_NONE: i16 = i16::MIN;
const GENERATION_MASK: u8 = 0x0F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// Eval-only entry; the score carries no information.
    None = 0,
    Exact = 1,
    /// Failed high: the true score is at least the stored one.
    Lower = 2,
    /// Failed low: the true score is at most the stored one.
    Upper = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Bound {
        match bits & 0x03 {
            1 => Bound::Exact,
            2 => Bound::Lower,
            3 => Bound::Upper,
            _ => Bound::None,
        }
    }

    /// Whether `score` stored with this bound proves a result against the
    /// `(alpha, beta)` window.
    #[inline]
    pub fn cuts(self, score: i32, alpha: i32, beta: i32) -> bool {
        match self {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
            Bound::None => false,
        }
    }
}

/// Per-entry flags recorded alongside the search result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtFlags {
    pub pv: bool,
    pub in_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtHit {
    /// `Move::NULL` when no move was recorded.
    pub mv: Move,
    pub score: i32,
    pub eval: Option<i32>,
    pub bound: Bound,
    pub depth: i32,
    pub was_pv: bool,
    pub in_check: bool,
}

/// Re-base a decisive score from root distance to node distance.
pub fn score_to_tt(score: i32, ply: usize) -> i16 {
    let ply = ply as i32;
    let adjusted = if score >= TB_WIN_THRESHOLD {
        score + ply
    } else if score <= -TB_WIN_THRESHOLD {
        score - ply
    } else {
        score
    };
    adjusted.clamp(i16::MIN as i32 + 1, i16::MAX as i32) as i16
}

/// Inverse of [`score_to_tt`].
pub fn score_from_tt(score: i16, ply: usize) -> i32 {
    let (score, ply) = (score as i32, ply as i32);
    if score >= TB_WIN_THRESHOLD {
        score - ply
    } else if score <= -TB_WIN_THRESHOLD {
        score + ply
    } else {
        score
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Data(u64);

impl Data {
    #[allow(clippy::too_many_arguments)]
    fn pack(
        mv: Move,
        score: i16,
        eval: i16,
        depth: i32,
        generation: u8,
        bound: Bound,
        flags: TtFlags,
    ) -> Data {
        let depth = (depth.clamp(DEPTH_EVAL_ONLY, 255 - DEPTH_OFFSET) + DEPTH_OFFSET) as u64;
        Data(
            mv.raw() as u64
                | (score as u16 as u64) << 16
                | (eval as u16 as u64) << 32
                | depth << 48
                | ((generation & GENERATION_MASK) as u64) << 56
                | (bound as u64) << 60
                | (flags.pv as u64) << 62
                | (flags.in_check as u64) << 63,
        )
    }

    fn is_empty(self) -> bool {
        self.depth_byte() == 0
    }

    fn mv(self) -> Move {
        Move::from_raw(self.0 as u16).unwrap_or(Move::NULL)
    }

    fn score(self) -> i16 {
        (self.0 >> 16) as u16 as i16
    }

    fn eval(self) -> i16 {
        (self.0 >> 32) as u16 as i16
    }

    fn depth_byte(self) -> u8 {
        (self.0 >> 48) as u8
    }

    fn depth(self) -> i32 {
        self.depth_byte() as i32 - DEPTH_OFFSET
    }

    fn generation(self) -> u8 {
        (self.0 >> 56) as u8 & GENERATION_MASK
    }

    fn bound(self) -> Bound {
        Bound::from_bits(self.0 >> 60)
    }

    fn flags(self) -> TtFlags {
        TtFlags {
            pv: self.0 >> 62 & 1 != 0,
            in_check: self.0 >> 63 != 0,
        }
    }
}

struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    fn new() -> Slot {
        Slot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    /// Data word if the slot holds `hash` and was not torn.
    fn read(&self, hash: u64) -> Option<Data> {
        let key = self.key.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (data != 0 && key ^ data == hash).then_some(Data(data))
    }

    fn peek(&self) -> Data {
        Data(self.data.load(Ordering::Relaxed))
    }

    fn write(&self, hash: u64, data: Data) {
        self.key.store(hash ^ data.0, Ordering::Relaxed);
        self.data.store(data.0, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.key.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

const DEPTH_SLOT: usize = 0;
const ALWAYS_SLOT: usize = 1;

#[repr(align(32))]
struct Bucket {
    slots: [Slot; 2],
}

impl Bucket {
    fn new() -> Bucket {
        Bucket {
            slots: [Slot::new(), Slot::new()],
        }
    }
}

pub struct TranspositionTable {
    buckets: Box<[Bucket]>,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate roughly `mb` megabytes; any bucket count is allowed.
    pub fn new(mb: usize) -> TranspositionTable {
        let count = (mb.max(1) * 1024 * 1024 / std::mem::size_of::<Bucket>()).max(1);
        let buckets: Box<[Bucket]> = (0..count).map(|_| Bucket::new()).collect();
        debug!(mb, buckets = count, "transposition table allocated");
        TranspositionTable {
            buckets,
            generation: AtomicU8::new(0),
        }
    }

    /// Reallocate at a new size, dropping every entry.
    pub fn resize(&mut self, mb: usize) {
        *self = TranspositionTable::new(mb);
    }

    pub fn clear(&self) {
        for bucket in self.buckets.iter() {
            bucket.slots.iter().for_each(Slot::reset);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Call once per search so stale entries lose their protection.
    pub fn new_generation(&self) {
        let next = self.generation.load(Ordering::Relaxed).wrapping_add(1) & GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket(&self, hash: u64) -> &Bucket {
        let index = ((hash as u128 * self.buckets.len() as u128) >> 64) as usize;
        &self.buckets[index]
    }

    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtHit> {
        let data = self
            .bucket(hash)
            .slots
            .iter()
            .find_map(|slot| slot.read(hash))?;
        let flags = data.flags();
        Some(TtHit {
            mv: data.mv(),
            score: score_from_tt(data.score(), ply),
            eval: (data.eval() != EVAL_NONE).then_some(data.eval() as i32),
            bound: data.bound(),
            depth: data.depth(),
            was_pv: flags.pv,
            in_check: flags.in_check,
        })
    }

    /// Same key: overwrite in place, keeping the old move (and eval) when the
    /// new entry has none, and never letting an eval-only entry erase a
    /// searched one. Otherwise the depth-preferred slot is taken when it is
    /// empty, stale, no deeper than the new entry, or the new bound is exact;
    /// failing that the always-replace slot is.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        hash: u64,
        ply: usize,
        mv: Move,
        score: i32,
        eval: Option<i32>,
        bound: Bound,
        depth: i32,
        flags: TtFlags,
    ) {
        let bucket = self.bucket(hash);
        let generation = self.generation.load(Ordering::Relaxed) & GENERATION_MASK;
        let limit = i32::from(i16::MAX);
        let mut eval = eval.map_or(EVAL_NONE, |e| e.clamp(-limit, limit) as i16);
        let mut mv = mv;

        let same = bucket
            .slots
            .iter()
            .find_map(|slot| slot.read(hash).map(|old| (slot, old)));

        let slot = match same {
            Some((slot, old)) => {
                if bound == Bound::None && old.bound() != Bound::None {
                    return;
                }
                if mv.is_null() {
                    mv = old.mv();
                }
                if eval == EVAL_NONE {
                    eval = old.eval();
                }
                slot
            }
            None => {
                let preferred = bucket.slots[DEPTH_SLOT].peek();
                let replace = preferred.is_empty()
                    || preferred.generation() != generation
                    || preferred.depth() <= depth
                    || bound == Bound::Exact;
                &bucket.slots[if replace { DEPTH_SLOT } else { ALWAYS_SLOT }]
            }
        };

        let data = Data::pack(mv, score_to_tt(score, ply), eval, depth, generation, bound, flags);
        slot.write(hash, data);
    }

    /// Permille of sampled slots filled during the current generation.
    pub fn hashfull(&self) -> u32 {
        let generation = self.generation.load(Ordering::Relaxed) & GENERATION_MASK;
        let sample = self.buckets.len().min(500);
        let used = self.buckets[..sample]
            .iter()
            .flat_map(|bucket| bucket.slots.iter())
            .filter(|slot| {
                let data = slot.peek();
                !data.is_empty() && data.generation() == generation
            })
            .count();
        (used * 1000 / (sample * 2)) as u32
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("buckets", &self.buckets.len())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

/// Mate scores outside the tablebase band are kept intact by the re-basing.
const _: () = assert!(MATE_THRESHOLD > TB_WIN_THRESHOLD);
