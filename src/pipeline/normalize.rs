//! Key normalization shared by the record and reference tables
//!
//! Joins between the mortality records and the reference tables are plain
//! string equality, so every key goes through the same function on both sides.

/// Width of a normalized geographic code
pub const GEO_CODE_WIDTH: usize = 6;

/// Department names in the division reference that differ from the names
/// used by the boundary file.
pub const DEPARTMENT_NAME_VARIANTS: [(&str, &str); 3] = [
    (
        "ARCHIPIELAGO DE SAN ANDRES PROVIDENCIA Y SANTA CATALINA",
        "SAN ANDRÉS Y PROVIDENCIA",
    ),
    ("BOGOTA D.C.", "BOGOTÁ D.C."),
    ("VALLE", "VALLE DEL CAUCA"),
];

/// Left-pad a geographic code with zeros to [`GEO_CODE_WIDTH`] characters.
///
/// Codes that are already wider are returned unchanged, never truncated.
/// Callers can detect them with [`is_oversized_geo_code`].
pub fn pad_geo_code(raw: &str) -> String {
    let trimmed = raw.trim();
    format!("{:0>width$}", trimmed, width = GEO_CODE_WIDTH)
}

/// True when a normalized code does not fit the fixed code width
pub fn is_oversized_geo_code(code: &str) -> bool {
    code.chars().count() > GEO_CODE_WIDTH
}

/// Trim and uppercase a cause code. Idempotent.
pub fn normalize_cause_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Trim and uppercase a department, municipality or boundary region name.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Map a normalized department name onto the boundary file's spelling.
pub fn canonical_department_name(name: &str) -> String {
    DEPARTMENT_NAME_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == name)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Render a numeric cell as a code string.
///
/// Integral values print without a fractional part so that `5001.0` read
/// from a float column produces the same key as `5001` from an integer column.
pub fn format_numeric_code(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_short_code() {
        assert_eq!(pad_geo_code("5001"), "005001");
        assert_eq!(pad_geo_code("1"), "000001");
    }

    #[test]
    fn test_pad_keeps_full_width_code() {
        assert_eq!(pad_geo_code("123456"), "123456");
    }

    #[test]
    fn test_pad_never_truncates() {
        let padded = pad_geo_code("1234567");
        assert_eq!(padded, "1234567");
        assert!(is_oversized_geo_code(&padded));
    }

    #[test]
    fn test_pad_trims_whitespace() {
        assert_eq!(pad_geo_code(" 5001 "), "005001");
    }

    #[test]
    fn test_cause_code_normalization() {
        assert_eq!(normalize_cause_code(" x95.1 "), "X95.1");
        assert!(normalize_cause_code(" x95.1 ").starts_with("X95"));
    }

    #[test]
    fn test_cause_code_normalization_is_idempotent() {
        for raw in [" x95.1 ", "X950", "i219", "", "  "] {
            let once = normalize_cause_code(raw);
            assert_eq!(normalize_cause_code(&once), once);
        }
    }

    #[test]
    fn test_canonical_department_names() {
        assert_eq!(canonical_department_name("VALLE"), "VALLE DEL CAUCA");
        assert_eq!(canonical_department_name("BOGOTA D.C."), "BOGOTÁ D.C.");
        assert_eq!(canonical_department_name("ANTIOQUIA"), "ANTIOQUIA");
    }

    #[test]
    fn test_format_numeric_code() {
        assert_eq!(format_numeric_code(5001.0), "5001");
        assert_eq!(format_numeric_code(5.5), "5.5");
    }
}
