use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, PartialEq, Deserialize)]
pub struct ReplacerConfig {
    /// Number of frames the replacer is able to track, i.e.,
    /// valid frame ids are in range `[0, capacity)`.
    pub capacity: usize,
    /// Look-back window of the backward k-distance.
    pub k: usize,
    pub log_level: String,
}

impl ReplacerConfig {
    pub fn new(file: &str) -> Result<ReplacerConfig> {
        let mut cfg = config::Config::builder()
            .set_default("capacity", 64)?
            .set_default("k", 2)?
            .set_default("log_level", "info")?;
        if !file.is_empty() {
            cfg = cfg.add_source(config::File::with_name(file))
        }
        cfg = cfg.add_source(config::Environment::with_prefix("LRUK"));
        Ok(cfg.build()?.try_deserialize()?)
    }
}
