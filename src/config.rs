use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the dataset to open at startup.
pub const DATA_ENV_VAR: &str = "INCIDENTS_DATA";

/// File opened when neither an argument nor the environment names one.
pub const DEFAULT_DATA_FILE: &str = "homicidios_bolivar.parquet";

/// Where the startup dataset path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Argument,
    Environment,
    Default,
}

/// Startup settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub path_source: PathSource,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl DashboardConfig {
    /// Resolve from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args_os().skip(1), std::env::var_os(DATA_ENV_VAR))
    }

    /// First positional argument wins, then the environment value, then
    /// [`DEFAULT_DATA_FILE`]. Empty values are ignored.
    pub fn resolve(
        mut args: impl Iterator<Item = OsString>,
        env_value: Option<OsString>,
    ) -> Self {
        let (data_path, path_source) = match (args.next(), env_value) {
            (Some(arg), _) if !arg.is_empty() => (PathBuf::from(arg), PathSource::Argument),
            (_, Some(env)) if !env.is_empty() => (PathBuf::from(env), PathSource::Environment),
            _ => (PathBuf::from(DEFAULT_DATA_FILE), PathSource::Default),
        };

        Self {
            data_path,
            path_source,
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 500.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = OsString> {
        list.iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn argument_takes_precedence() {
        let cfg = DashboardConfig::resolve(args(&["data.csv"]), Some("env.parquet".into()));
        assert_eq!(cfg.data_path, PathBuf::from("data.csv"));
        assert_eq!(cfg.path_source, PathSource::Argument);
    }

    #[test]
    fn environment_used_without_argument() {
        let cfg = DashboardConfig::resolve(args(&[]), Some("env.parquet".into()));
        assert_eq!(cfg.data_path, PathBuf::from("env.parquet"));
        assert_eq!(cfg.path_source, PathSource::Environment);
    }

    #[test]
    fn falls_back_to_default_file() {
        let cfg = DashboardConfig::resolve(args(&[""]), Some(OsString::new()));
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(cfg.path_source, PathSource::Default);
    }
}
