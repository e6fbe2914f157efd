use rand::rngs::StdRng;
use rand::SeedableRng;

/// Independent generator for one restart or trial, derived from the master
/// seed and the stream index so workers never share generator state.
pub fn stream_rng(master_seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(splitmix64(master_seed ^ splitmix64(stream)))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
