use super::model::Curriculum;
use sha2::{Digest, Sha256};

/// Content digest of a snapshot: SHA-256 over its wire JSON, hex encoded.
/// Equal content gives an equal revision regardless of node sharing.
pub fn revision(c: &Curriculum) -> serde_json::Result<String> {
    let bytes = serde_json::to_vec(c)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_curriculum_digest_is_stable() {
        // sha256("[]")
        assert_eq!(
            revision(&Curriculum::new()).unwrap(),
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
    }

    #[test]
    fn revision_tracks_content() {
        let a: Curriculum =
            serde_json::from_value(json!([{ "id": "week_1", "weekTitle": "Week 1" }])).unwrap();
        let b: Curriculum =
            serde_json::from_value(json!([{ "id": "week_1", "weekTitle": "Week 2" }])).unwrap();
        assert_eq!(revision(&a).unwrap(), revision(&a.clone()).unwrap());
        assert_ne!(revision(&a).unwrap(), revision(&b).unwrap());
    }
}
