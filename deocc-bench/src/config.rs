//! Run configuration: worker count, the trace files to replay (each with an
//! output label), and where to write results. Loadable from a TOML file and
//! overridable by CLI flags, in the manner of `aptos_config`'s `NodeConfig`.

use std::path::PathBuf;

use serde::Deserialize;

fn default_worker_count() -> usize {
    64
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

/// One trace input and the label used to name its output files.
#[derive(Debug, Clone, Deserialize)]
pub struct TracePath {
    pub path: PathBuf,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub trace_paths: Vec<TracePath>,
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            trace_paths: Vec::new(),
            output_directory: default_output_directory(),
        }
    }
}

impl Config {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Applies CLI flag overrides over whatever was loaded from a config
    /// file (or the defaults, if no file was given). CLI traces are
    /// appended after any configured in the file.
    pub fn apply_cli_overrides(
        &mut self,
        worker_count: Option<usize>,
        output_directory: Option<PathBuf>,
        traces: Vec<(PathBuf, String)>,
    ) {
        if let Some(worker_count) = worker_count {
            self.worker_count = worker_count;
        }
        if let Some(output_directory) = output_directory {
            self.output_directory = output_directory;
        }
        self.trace_paths
            .extend(traces.into_iter().map(|(path, label)| TracePath { path, label }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_worker_count() {
        let config = Config::default();
        assert_eq!(config.worker_count, 64);
        assert!(config.trace_paths.is_empty());
    }

    #[test]
    fn loads_worker_count_and_trace_paths_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
            worker_count = 8
            output_directory = "results"

            [[trace_paths]]
            path = "a.csv"
            label = "all"
            "#,
        )
        .unwrap();
        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.output_directory, PathBuf::from("results"));
        assert_eq!(config.trace_paths.len(), 1);
        assert_eq!(config.trace_paths[0].label, "all");
    }

    #[test]
    fn cli_overrides_take_precedence_and_append_traces() {
        let mut config = Config::default();
        config.apply_cli_overrides(
            Some(16),
            Some(PathBuf::from("out")),
            vec![(PathBuf::from("t.csv"), "all".to_string())],
        );
        assert_eq!(config.worker_count, 16);
        assert_eq!(config.output_directory, PathBuf::from("out"));
        assert_eq!(config.trace_paths.len(), 1);
    }
}
