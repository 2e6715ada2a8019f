use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crisissafe_common::{AnalysisResult, CrisisSafeError};

use crate::normalizer::Normalizer;

/// One archived analysis, stored under the hash of the claim's canonical
/// form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub timestamp: String,
    pub claim_preview: String,
    pub normalized_claim: String,
}

/// Persisted mapping from normalized-claim hash to a previously computed
/// analysis. The whole map is serialized as one pretty-printed JSON object on
/// every write; concurrent writers race and the later write wins. Load and
/// save failures degrade; a broken archive never fails an analysis request.
pub struct Archive {
    path: PathBuf,
    normalizer: Normalizer,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>, normalizer: Normalizer) -> Self {
        Self {
            path: path.into(),
            normalizer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 over the claim's canonical form.
    pub async fn claim_hash(&self, text: &str) -> String {
        let normalized = self.normalizer.canonicalize(text).await;
        hex::encode(Sha256::digest(normalized.as_bytes()))
    }

    /// Look up a previously archived analysis for a semantically equivalent
    /// claim.
    pub async fn lookup(&self, text: &str) -> Option<ArchiveEntry> {
        let hash = self.claim_hash(text).await;
        let mut map = self.load();
        let entry = map.remove(&hash);
        if entry.is_some() {
            debug!(hash = %hash, "Archive hit");
        }
        entry
    }

    /// Store an analysis under the claim's canonical hash. Entries are
    /// insert-only: a key already present is left untouched.
    pub async fn store(&self, text: &str, result: &AnalysisResult) {
        let normalized = self.normalizer.canonicalize(text).await;
        let hash = hex::encode(Sha256::digest(normalized.as_bytes()));

        let mut map = self.load();
        map.entry(hash).or_insert_with(|| ArchiveEntry {
            result: result.clone(),
            timestamp: Utc::now().to_rfc3339(),
            claim_preview: text.chars().take(200).collect(),
            normalized_claim: normalized,
        });
        self.save(&map);
    }

    fn load(&self) -> BTreeMap<String, ArchiveEntry> {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load archive, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn try_load(&self) -> Result<BTreeMap<String, ArchiveEntry>, CrisisSafeError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| CrisisSafeError::Archive(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| CrisisSafeError::Archive(e.to_string()))
    }

    fn save(&self, map: &BTreeMap<String, ArchiveEntry>) {
        let result = serde_json::to_string_pretty(map)
            .map_err(|e| CrisisSafeError::Archive(e.to_string()))
            .and_then(|json| {
                std::fs::write(&self.path, json).map_err(|e| CrisisSafeError::Archive(e.to_string()))
            });
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to persist archive");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisissafe_common::{CheckStatus, Checklist};

    fn sample_result(score: u8) -> AnalysisResult {
        AnalysisResult {
            score,
            flags: vec!["Subjective language detected (score 0.62).".to_string()],
            ai_report: "VERDICT: TRUE\nEXPLANATION: Well documented.".to_string(),
            is_subjective: true,
            checklist: Checklist {
                objective_language: CheckStatus::Fail,
                ai_verification: CheckStatus::Pass,
                ..Checklist::default()
            },
            related_articles: vec![],
            pointers: vec![],
        }
    }

    fn temp_archive(dir: &tempfile::TempDir) -> Archive {
        Archive::new(dir.path().join("archive.json"), Normalizer::rule_based())
    }

    #[tokio::test]
    async fn store_then_lookup_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);

        archive.store("Is covid contagious", &sample_result(75)).await;
        let entry = archive.lookup("Is covid contagious").await.unwrap();

        assert_eq!(entry.result.score, 75);
        assert_eq!(entry.claim_preview, "Is covid contagious");
        assert!(!entry.normalized_claim.is_empty());
    }

    #[tokio::test]
    async fn synonym_spellings_hit_the_same_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);

        archive.store("Is covid contagious", &sample_result(75)).await;

        // Case, fillers, and the covid synonym set all reduce away.
        let hit = archive.lookup("Is the Covid-19 Contagious").await;
        assert!(hit.is_some());
        let hit = archive.lookup("was CORONAVIRUS contagious?").await;
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn distinct_claims_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);

        archive.store("Is covid contagious", &sample_result(75)).await;
        assert!(archive.lookup("Is covid lethal").await.is_none());
    }

    #[tokio::test]
    async fn entries_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);

        archive.store("Is covid contagious", &sample_result(75)).await;
        archive.store("Is covid contagious", &sample_result(10)).await;

        let entry = archive.lookup("Is covid contagious").await.unwrap();
        assert_eq!(entry.result.score, 75);
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);
        assert!(archive.lookup("anything").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let archive = Archive::new(&path, Normalizer::rule_based());
        assert!(archive.lookup("anything").await.is_none());

        // A store after corruption rewrites the file and recovers.
        archive.store("Is covid contagious", &sample_result(75)).await;
        assert!(archive.lookup("Is covid contagious").await.is_some());
    }

    #[tokio::test]
    async fn claim_preview_is_capped_at_200_chars() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);

        let long_claim = format!("covid {}", "x".repeat(400));
        archive.store(&long_claim, &sample_result(50)).await;

        let entry = archive.lookup(&long_claim).await.unwrap();
        assert_eq!(entry.claim_preview.chars().count(), 200);
    }

    #[tokio::test]
    async fn persisted_file_is_a_json_object_keyed_by_hex_digest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = temp_archive(&dir);

        archive.store("Is covid contagious", &sample_result(75)).await;

        let raw = std::fs::read_to_string(archive.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 1);
        let key = map.keys().next().unwrap();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
