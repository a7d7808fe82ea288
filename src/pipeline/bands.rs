//! Fixed five-year age bands

/// Lower bound of the open-ended top band
pub const OPEN_BAND_START: u32 = 85;

/// Width of every closed band
pub const BAND_WIDTH: u32 = 5;

/// Number of bands: 17 closed bands plus `85+`
pub const BAND_COUNT: usize = (OPEN_BAND_START / BAND_WIDTH) as usize + 1;

/// Band labels in order: `0-4`, `5-9`, ..., `80-84`, `85+`
pub fn band_labels() -> Vec<String> {
    let mut labels: Vec<String> = (0..OPEN_BAND_START)
        .step_by(BAND_WIDTH as usize)
        .map(|start| format!("{}-{}", start, start + BAND_WIDTH - 1))
        .collect();
    labels.push(format!("{}+", OPEN_BAND_START));
    labels
}

/// Index of the band holding `age`, closed on the left.
///
/// Negative and non-finite values have no band.
pub fn band_index(age: f64) -> Option<usize> {
    if !age.is_finite() || age < 0.0 {
        return None;
    }
    if age >= OPEN_BAND_START as f64 {
        return Some(BAND_COUNT - 1);
    }
    Some((age / BAND_WIDTH as f64).floor() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let labels = band_labels();
        assert_eq!(labels.len(), 18);
        assert_eq!(labels[0], "0-4");
        assert_eq!(labels[16], "80-84");
        assert_eq!(labels[17], "85+");
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(band_index(0.0), Some(0));
        assert_eq!(band_index(3.0), Some(0));
        assert_eq!(band_index(4.99), Some(0));
        assert_eq!(band_index(5.0), Some(1));
        assert_eq!(band_index(84.9), Some(16));
        assert_eq!(band_index(85.0), Some(17));
        assert_eq!(band_index(86.0), Some(17));
        assert_eq!(band_index(200.0), Some(17));
    }

    #[test]
    fn test_invalid_ages_have_no_band() {
        assert_eq!(band_index(-1.0), None);
        assert_eq!(band_index(f64::NAN), None);
    }
}
