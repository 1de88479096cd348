//! Float extraction from the byte stream
//!
//! Each float is the base-256 fraction `b0/256 + b1/256^2 + b2/256^3 + b3/256^4`
//! of four consecutive stream bytes.

use super::stream::SeedData;
use crate::errors::FairplayResult;

/// Bytes consumed per float
pub const BYTES_PER_FLOAT: usize = 4;

/// Convert one 4-byte group into a float in `[0, 1)`
pub fn bytes_to_float(bytes: [u8; BYTES_PER_FLOAT]) -> f64 {
    let mut value = 0.0;
    let mut divisor = 1.0;
    for byte in bytes {
        divisor *= 256.0;
        value += f64::from(byte) / divisor;
    }
    value
}

/// Draw exactly `count` floats for a bet, starting at cursor 0
pub fn final_values(seed: &SeedData, count: usize) -> FairplayResult<Vec<f64>> {
    let mut stream = seed.stream(0)?;
    let mut values = Vec::with_capacity(count);

    for _ in 0..count {
        let mut group = [0u8; BYTES_PER_FLOAT];
        for slot in group.iter_mut() {
            // ByteStream never ends
            *slot = stream.next().unwrap_or_default();
        }
        values.push(bytes_to_float(group));
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_float_bounds() {
        assert_eq!(bytes_to_float([0, 0, 0, 0]), 0.0);
        assert_eq!(bytes_to_float([128, 0, 0, 0]), 0.5);

        let max = bytes_to_float([255, 255, 255, 255]);
        assert!(max < 1.0);
        assert_eq!(max, 1.0 - 1.0 / 4_294_967_296.0);
    }

    #[test]
    fn test_final_values_vector() {
        let seed = SeedData::new("a".repeat(64), "client1", 0);
        let values = final_values(&seed, 3).unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 0.08686228259466588);
        assert_eq!(values[1], 0.39423226565122604);
        assert_eq!(values[2], 0.6733723250217736);
    }

    #[test]
    fn test_prefix_is_stable_across_counts() {
        let seed = SeedData::new("b".repeat(64), "player-seed", 42);
        let short = final_values(&seed, 2).unwrap();
        let long = final_values(&seed, 24).unwrap();

        assert_eq!(&long[..2], &short[..]);
        assert!(long.iter().all(|v| (0.0..1.0).contains(v)));
    }
}
