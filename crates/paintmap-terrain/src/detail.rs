//! Unwarped surface detail noise in world space.
//!
//! Three value-noise octaves, each its own [`Value`] source with its own seed.
//! None of the seeds is shared with the domain warp.

use std::sync::LazyLock;

use noise::{NoiseFn, Value};

/// `(frequency in cycles per block, weight, seed)` for each octave.
const OCTAVES: [(f64, f64, u32); 3] = [
    (1.0 / 96.0, 0.55, 6143),
    (1.0 / 32.0, 0.30, 2087),
    (1.0 / 12.0, 0.15, 5651),
];

static SOURCES: LazyLock<[Value; 3]> = LazyLock::new(|| OCTAVES.map(|(_, _, seed)| Value::new(seed)));

/// Detail noise at a world block, in `[-1, 1]`.
pub fn detail_noise(world_x: i32, world_z: i32) -> f64 {
    let x = world_x as f64;
    let z = world_z as f64;
    let sum: f64 = OCTAVES
        .iter()
        .zip(SOURCES.iter())
        .map(|(&(freq, weight, _), source)| weight * source.get([x * freq, z * freq]))
        .sum();
    sum.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warp::WarpParams;

    #[test]
    fn test_detail_noise_is_deterministic_and_bounded() {
        for i in -200..200 {
            let (x, z) = (i * 131, i * -77 + 5);
            let a = detail_noise(x, z);
            assert_eq!(a, detail_noise(x, z));
            assert!((-1.0..=1.0).contains(&a), "detail {a} out of range at ({x}, {z})");
        }
    }

    #[test]
    fn test_detail_noise_varies() {
        let samples: Vec<f64> = (0..64).map(|i| detail_noise(i * 40, 0)).collect();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.2, "detail noise too flat: [{min}, {max}]");
    }

    #[test]
    fn test_detail_noise_is_continuous() {
        for x in -300..300 {
            let jump = (detail_noise(x, 17) - detail_noise(x + 1, 17)).abs();
            assert!(jump < 0.2, "detail jumped {jump} between {x} and {}", x + 1);
        }
    }

    #[test]
    fn test_octave_seeds_are_independent_of_the_warp() {
        let warp_seeds = WarpParams::default().seeds;
        let seeds: Vec<u32> = OCTAVES.iter().map(|&(_, _, seed)| seed).collect();
        for (i, seed) in seeds.iter().enumerate() {
            assert!(!warp_seeds.contains(seed), "octave seed {seed} shared with the warp");
            assert!(!seeds[i + 1..].contains(seed), "octave seed {seed} repeated");
        }
    }

    #[test]
    fn test_octaves_are_decorrelated() {
        let same = (0..32)
            .filter(|&i| {
                let p = [i as f64 * 1.37, -(i as f64) * 0.61];
                SOURCES[0].get(p) == SOURCES[1].get(p)
            })
            .count();
        assert!(same < 2);
    }
}
