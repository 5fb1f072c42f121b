use std::path::PathBuf;
use tpmap::core::models::proteome::ExperimentKind;
use tpmap::engine::config as core_config;

pub struct AppConfig {
    pub input_path: PathBuf,
    pub kind: ExperimentKind,
    pub core_config: core_config::AnalysisConfig,
}
