use crate::artifact::ArtifactSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSuccess {
    pub success: bool,
    /// Shape of the decoded input: `[height, width]` or `[height, width, 3]`.
    pub input_shape: Vec<usize>,
    /// Wall-clock seconds spent on the request.
    pub execution_time: f64,
    pub timestamp: String,
    #[serde(flatten)]
    pub artifacts: ArtifactSet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentFailure {
    pub success: bool,
    pub error: String,
}

/// Body of every segmentation reply. Failures never carry artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentResponse {
    Success(SegmentSuccess),
    Failure(SegmentFailure),
}

impl SegmentResponse {
    pub fn success(
        input_shape: Vec<usize>,
        execution_time: f64,
        timestamp: String,
        artifacts: ArtifactSet,
    ) -> Self {
        SegmentResponse::Success(SegmentSuccess {
            success: true,
            input_shape,
            execution_time,
            timestamp,
            artifacts,
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        SegmentResponse::Failure(SegmentFailure {
            success: false,
            error: error.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SegmentResponse::Success(_))
    }

    pub fn artifacts(&self) -> Option<&ArtifactSet> {
        match self {
            SegmentResponse::Success(success) => Some(&success.artifacts),
            SegmentResponse::Failure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Artifact, OutputKind};
    use serde_json::json;

    #[test]
    fn test_success_flattens_artifacts() {
        let mut artifacts = ArtifactSet::new();
        artifacts.insert(OutputKind::Mask, Artifact::Encoded("aGk=".to_string()));
        artifacts.insert(OutputKind::Geojson, Artifact::Features(vec![]));

        let response = SegmentResponse::success(
            vec![100, 100],
            0.25,
            "2024-01-01 00:00:00.000000".to_string(),
            artifacts,
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["input_shape"], json!([100, 100]));
        assert_eq!(value["mask"], "aGk=");
        assert_eq!(value["geojson"], json!([]));
    }

    #[test]
    fn test_failure_has_only_flag_and_error() {
        let value = serde_json::to_value(SegmentResponse::failure("boom")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_deserialize_distinguishes_variants() {
        let ok: SegmentResponse = serde_json::from_value(json!({
            "success": true,
            "input_shape": [3, 4, 3],
            "execution_time": 1.5,
            "timestamp": "t",
            "img": "AAAA"
        }))
        .unwrap();
        assert!(ok.is_success());
        assert_eq!(
            ok.artifacts().unwrap()[&OutputKind::Img],
            Artifact::Encoded("AAAA".to_string())
        );

        let failed: SegmentResponse =
            serde_json::from_value(json!({"success": false, "error": "nope"})).unwrap();
        assert!(!failed.is_success());
        assert!(failed.artifacts().is_none());
    }
}
