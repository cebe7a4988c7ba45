//! Pipeline tuning knobs, loadable from environment variables (optionally
//! via a `.env` file) the way `config_loader.rs` loads JSON config over
//! hardcoded constants in the teacher crate — here generalized to runtime
//! settings instead of domain reference data.

use serde::Deserialize;

const ENV_PREFIX: &str = "CH_XBRL";

/// Runtime configuration for the extraction pipeline binary.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Directory to walk for `.html`/`.xml` filing files.
    pub input_dir: String,
    /// Destination CSV path; overwritten on each run.
    pub output_csv: String,
    /// Max filings processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    8
}

impl PipelineConfig {
    /// Loads from `CH_XBRL_*` environment variables, reading a `.env` file
    /// first if one is present in the current directory.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .set_default("concurrency", default_concurrency() as i64)?
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        settings.try_deserialize().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_from_environment_variables() {
        std::env::set_var("CH_XBRL_INPUT_DIR", "/tmp/filings");
        std::env::set_var("CH_XBRL_OUTPUT_CSV", "/tmp/out.csv");
        std::env::set_var("CH_XBRL_CONCURRENCY", "4");

        let cfg = PipelineConfig::load().unwrap();
        assert_eq!(cfg.input_dir, "/tmp/filings");
        assert_eq!(cfg.output_csv, "/tmp/out.csv");
        assert_eq!(cfg.concurrency, 4);

        std::env::remove_var("CH_XBRL_INPUT_DIR");
        std::env::remove_var("CH_XBRL_OUTPUT_CSV");
        std::env::remove_var("CH_XBRL_CONCURRENCY");
    }
}
