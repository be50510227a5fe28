use rand::RngExt;

/// Number of decimal digits in a code.
pub const OTP_LEN: usize = 6;

/// Uniformly random 6-digit code in `100000..=999999` (never a leading zero).
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(100_000u32..1_000_000).to_string()
}
