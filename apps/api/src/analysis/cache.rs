//! Content-addressed file cache for resume analyses.
//!
//! One JSON file per entry, named by the SHA-256 of the resume text. Writes
//! are best-effort: a cache failure must never fail the analysis that
//! produced the value. A 30-day age sweep runs out-of-band.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::analysis::models::ResumeAnalysis;

const MAX_AGE_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    hash: String,
    value: ResumeAnalysis,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AnalysisCache {
    dir: PathBuf,
}

impl AnalysisCache {
    /// Opens (and creates, best-effort) the cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("Could not create analysis cache dir {}: {e}", dir.display());
        }
        Self { dir }
    }

    /// SHA-256 hex digest of raw resume text — the cache key.
    pub fn content_hash(text: &str) -> String {
        let digest = Sha256::digest(text.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn get(&self, hash: &str) -> Option<ResumeAnalysis> {
        let path = self.entry_path(hash);
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<CacheRecord>(&raw) {
            Ok(record) => Some(record.value),
            Err(e) => {
                // Corrupt entries are treated as misses and removed.
                warn!("Corrupt cache entry {}: {e}", path.display());
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Best-effort write-through. Failures are logged, never surfaced.
    pub fn put(&self, hash: &str, value: &ResumeAnalysis) {
        let record = CacheRecord {
            hash: hash.to_string(),
            value: value.clone(),
            created_at: Utc::now(),
        };
        let path = self.entry_path(hash);
        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!("Cache write failed for {}: {e}", path.display());
                }
            }
            Err(e) => warn!("Cache serialization failed for {hash}: {e}"),
        }
    }

    /// Removes entries older than 30 days. Returns the number evicted.
    /// All failures are logged and ignored — this is housekeeping only.
    pub fn sweep_expired(&self) -> usize {
        let cutoff = Utc::now() - Duration::days(MAX_AGE_DAYS);
        let mut evicted = 0;

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cache sweep could not read {}: {e}", self.dir.display());
                return 0;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let expired = std::fs::read_to_string(&path)
                .ok()
                .and_then(|raw| serde_json::from_str::<CacheRecord>(&raw).ok())
                .map(|record| record.created_at < cutoff)
                // Unreadable records are evicted too.
                .unwrap_or(true);

            if expired {
                match std::fs::remove_file(&path) {
                    Ok(()) => evicted += 1,
                    Err(e) => warn!("Cache sweep could not remove {}: {e}", path.display()),
                }
            }
        }

        debug!("Cache sweep evicted {evicted} entries");
        evicted
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{hash}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::{CandidateProfile, ExtractedEntities};

    fn sample_analysis() -> ResumeAnalysis {
        ResumeAnalysis {
            candidate_profile: CandidateProfile {
                name: Some("Jane Doe".to_string()),
                current_title: Some("Backend Engineer".to_string()),
                location: None,
                summary: None,
            },
            professional_summary: None,
            work_experience: vec![],
            skills: Default::default(),
            education: vec![],
            key_achievements: vec![],
            interview_focus_areas: vec![],
            extracted_entities: ExtractedEntities {
                technologies: vec!["Rust".to_string()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_content_hash_is_stable_sha256_hex() {
        let a = AnalysisCache::content_hash("resume text");
        let b = AnalysisCache::content_hash("resume text");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_text_different_hash() {
        assert_ne!(
            AnalysisCache::content_hash("resume a"),
            AnalysisCache::content_hash("resume b")
        );
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());
        let hash = AnalysisCache::content_hash("text");

        assert!(cache.get(&hash).is_none());
        cache.put(&hash, &sample_analysis());
        let hit = cache.get(&hash).expect("expected cache hit");
        assert_eq!(hit.candidate_profile.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());
        let hash = AnalysisCache::content_hash("text");
        std::fs::write(dir.path().join(format!("{hash}.json")), "not json").unwrap();

        assert!(cache.get(&hash).is_none());
        assert!(!dir.path().join(format!("{hash}.json")).exists());
    }

    #[test]
    fn test_sweep_evicts_old_entries_keeps_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AnalysisCache::new(dir.path());

        let fresh_hash = AnalysisCache::content_hash("fresh");
        cache.put(&fresh_hash, &sample_analysis());

        let old_record = CacheRecord {
            hash: "old".to_string(),
            value: sample_analysis(),
            created_at: Utc::now() - Duration::days(45),
        };
        std::fs::write(
            dir.path().join("old.json"),
            serde_json::to_string(&old_record).unwrap(),
        )
        .unwrap();

        let evicted = cache.sweep_expired();
        assert_eq!(evicted, 1);
        assert!(cache.get(&fresh_hash).is_some());
        assert!(!dir.path().join("old.json").exists());
    }

    #[test]
    fn test_sweep_on_missing_dir_is_harmless() {
        let cache = AnalysisCache {
            dir: PathBuf::from("/nonexistent/cache/dir"),
        };
        assert_eq!(cache.sweep_expired(), 0);
    }
}
