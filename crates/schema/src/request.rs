use serde::Deserialize;

/// Flat key/value fields of a segmentation request, as posted by clients.
///
/// Everything is optional and kept as text; resolution (and fallback) happens
/// in the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentForm {
    /// Base64 of the encoded image.
    pub input: Option<String>,
    pub net: Option<String>,
    pub diam: Option<String>,
    pub chan1: Option<String>,
    pub chan2: Option<String>,
    pub invert: Option<String>,
    pub keep_size: Option<String>,
    /// Comma-delimited output kinds.
    pub outputs: Option<String>,
    /// Decoder hint such as `png` or `tif`.
    pub format: Option<String>,
}

/// Interpret a form flag. `1`, `true`, `yes` and `on` are true; anything else,
/// including a missing field, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" ON ")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_form_deserializes_partial_json() {
        let form: SegmentForm =
            serde_json::from_str(r#"{"net": "nuclei", "outputs": "mask,geojson"}"#).unwrap();
        assert_eq!(form.net.as_deref(), Some("nuclei"));
        assert_eq!(form.outputs.as_deref(), Some("mask,geojson"));
        assert!(form.input.is_none());
    }
}
