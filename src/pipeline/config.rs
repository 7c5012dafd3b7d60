// src/pipeline/config.rs
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Capture scale and JPEG quality used for one class of job size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityProfile {
    pub scale: f32,
    pub quality: f32,
}

/// Tuning knobs for a `BatchPipeline`.
///
/// Every field has a default, so a config file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest ticket count in one downloaded file when splitting.
    pub max_tickets_per_file: u32,
    /// Largest range a single request may ask for.
    pub max_tickets_total: u32,
    /// Per-asset wait before the asset is treated as absent.
    pub image_load_timeout_ms: u64,
    /// Jobs above this many tickets use `large_job`, the rest `small_job`.
    pub adaptive_threshold: u32,
    pub large_job: QualityProfile,
    pub small_job: QualityProfile,
    pub page_pause_small_ms: u64,
    pub page_pause_large_ms: u64,
    pub between_files_ms: u64,
    /// Flush the encoder and sample memory every N pages.
    pub reclaim_interval_pages: u32,
    pub memory_ceiling_mb: u64,
    /// Evict the session's assets at the end of jobs above this size.
    pub release_assets_above: u32,
    pub asset_cache_capacity: usize,
    pub asset_max_width: u32,
    /// Spool documents to anonymous temp files instead of memory.
    pub spool_to_disk: bool,
    /// Offload pool size; zero runs CPU work inline.
    pub offload_threads: usize,
    /// Resolve ticket fonts against installed system fonts as well as the
    /// bundled faces.
    pub system_fonts: bool,
    /// Extra directory of font files.
    pub font_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_tickets_per_file: 200,
            max_tickets_total: 10_000,
            image_load_timeout_ms: 10_000,
            adaptive_threshold: 100,
            large_job: QualityProfile {
                scale: 2.0,
                quality: 0.80,
            },
            small_job: QualityProfile {
                scale: 3.0,
                quality: 0.95,
            },
            page_pause_small_ms: 10,
            page_pause_large_ms: 30,
            between_files_ms: 500,
            reclaim_interval_pages: 10,
            memory_ceiling_mb: 400,
            release_assets_above: 50,
            asset_cache_capacity: 20,
            asset_max_width: 1200,
            spool_to_disk: true,
            offload_threads: num_cpus::get().saturating_sub(1).max(1),
            system_fonts: true,
            font_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Layers an optional config file (format from its extension) and
    /// `TICKETPRESS__*` environment variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let loaded: PipelineConfig = builder
            .add_source(
                config::Environment::with_prefix("TICKETPRESS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let fail = |msg: &str| Err(PipelineError::Config(msg.to_string()));
        if self.max_tickets_per_file == 0 {
            return fail("max_tickets_per_file must be at least 1");
        }
        if self.max_tickets_total == 0 {
            return fail("max_tickets_total must be at least 1");
        }
        if self.image_load_timeout_ms == 0 {
            return fail("image_load_timeout_ms must be positive");
        }
        for (name, profile) in [("large_job", &self.large_job), ("small_job", &self.small_job)] {
            if !(profile.scale > 0.0 && profile.scale <= 8.0) {
                return Err(PipelineError::Config(format!(
                    "{}.scale must be in (0, 8], got {}",
                    name, profile.scale
                )));
            }
            if !(profile.quality > 0.0 && profile.quality <= 1.0) {
                return Err(PipelineError::Config(format!(
                    "{}.quality must be in (0, 1], got {}",
                    name, profile.quality
                )));
            }
        }
        if self.reclaim_interval_pages == 0 {
            return fail("reclaim_interval_pages must be at least 1");
        }
        if self.asset_cache_capacity == 0 {
            return fail("asset_cache_capacity must be at least 1");
        }
        if self.asset_max_width == 0 {
            return fail("asset_max_width must be at least 1");
        }
        Ok(())
    }

    pub fn is_large_job(&self, total_tickets: u64) -> bool {
        total_tickets > u64::from(self.adaptive_threshold)
    }

    pub fn quality_for(&self, total_tickets: u64) -> QualityProfile {
        if self.is_large_job(total_tickets) {
            self.large_job
        } else {
            self.small_job
        }
    }

    pub fn page_pause(&self, total_tickets: u64) -> Duration {
        Duration::from_millis(if self.is_large_job(total_tickets) {
            self.page_pause_large_ms
        } else {
            self.page_pause_small_ms
        })
    }

    pub fn between_files(&self) -> Duration {
        Duration::from_millis(self.between_files_ms)
    }

    pub fn image_load_timeout(&self) -> Duration {
        Duration::from_millis(self.image_load_timeout_ms)
    }

    pub fn memory_ceiling_bytes(&self) -> usize {
        (self.memory_ceiling_mb as usize).saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tickets_per_file, 200);
        assert!(config.offload_threads >= 1);
    }

    #[test]
    fn quality_switches_above_threshold() {
        let config = PipelineConfig::default();
        assert_eq!(config.quality_for(100), config.small_job);
        assert_eq!(config.quality_for(101), config.large_job);
        assert_eq!(config.page_pause(50), Duration::from_millis(10));
        assert_eq!(config.page_pause(500), Duration::from_millis(30));
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let mut config = PipelineConfig::default();
        config.small_job.quality = 1.5;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn file_overrides_only_named_fields() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "max_tickets_per_file": 50, "large_job": {{ "scale": 1.5, "quality": 0.7 }} }}"#
        )
        .unwrap();
        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.max_tickets_per_file, 50);
        assert_eq!(config.large_job.scale, 1.5);
        assert_eq!(config.max_tickets_total, 10_000);
        assert!(config.system_fonts);
    }

    #[test]
    fn font_settings_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "system_fonts": false, "font_dir": "/opt/ticket-fonts" }}"#
        )
        .unwrap();
        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert!(!config.system_fonts);
        assert_eq!(config.font_dir, Some(PathBuf::from("/opt/ticket-fonts")));
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "max_tickets_per_file": 0 }}"#).unwrap();
        assert!(matches!(
            PipelineConfig::load(Some(file.path())),
            Err(PipelineError::Config(_))
        ));
    }
}
