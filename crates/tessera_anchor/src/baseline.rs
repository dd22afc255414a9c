//! The random baseline used to judge the optimizer.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffles the chosen bins among the anchors.
///
/// Bin loads stay as the solver left them; only which anchor sits where is
/// randomized. The same seed always gives the same permutation.
pub fn shuffle_assignment(chosen: &mut [usize], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    chosen.shuffle(&mut rng);
}
