/// Seed thresholds, largest first. A seed lands in the bucket of the first
/// threshold it reaches.
const SEED_THRESHOLDS: [i32; 20] = [
    769, 513, 385, 257, 193, 129, 97, 65, 49, 33, 25, 17, 13, 9, 7, 5, 4, 3, 2, 1,
];

const TABLE_SIZE: usize = SEED_THRESHOLDS.len();

/// Lookup table for how surprising a result is given both seeds.
///
/// Cell `(winner_bucket, loser_bucket)` holds `winner_bucket - loser_bucket`,
/// so a deep seed beating a top seed lands far down-left of the diagonal and
/// yields a large positive factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedBucketTable {
    cells: [[i32; TABLE_SIZE]; TABLE_SIZE],
}

impl SeedBucketTable {
    pub fn new() -> Self {
        let mut cells = [[0; TABLE_SIZE]; TABLE_SIZE];
        for (row, cells_row) in cells.iter_mut().enumerate() {
            for (col, cell) in cells_row.iter_mut().enumerate() {
                *cell = row as i32 - col as i32;
            }
        }
        Self { cells }
    }

    pub fn upset_factor(&self, winner_seed: i32, loser_seed: i32) -> i32 {
        self.cells[seed_bucket(winner_seed)][seed_bucket(loser_seed)]
    }
}

impl Default for SeedBucketTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn seed_bucket(seed: i32) -> usize {
    SEED_THRESHOLDS
        .iter()
        .position(|threshold| seed >= *threshold)
        .map(|idx| TABLE_SIZE - 1 - idx)
        .unwrap_or(0)
}
