use crate::config::toml_config::TomlConfig;
use crate::config::{OutputFormat, Overrides, Settings};
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "position-groups")]
#[command(about = "Predict finishing position groups for race results and score them")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Model artifact (JSON random forest)")]
    pub model: Option<String>,

    #[arg(long, help = "Race entries CSV")]
    pub data: Option<String>,

    #[arg(long, help = "Field delimiter of the data file")]
    pub delimiter: Option<char>,

    #[arg(long, help = "Only predict this race")]
    pub race: Option<String>,

    #[arg(long, requires = "race", help = "Only predict this driver of the selected race")]
    pub driver: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[arg(long, help = "Write per-race CSV files into this zip archive")]
    pub export: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn settings(&self) -> Result<Settings> {
        let file = load_file(self.config.as_deref())?;
        Settings::resolve(
            &file,
            Overrides {
                model_path: self.model.clone(),
                data_path: self.data.clone(),
                delimiter: self.delimiter,
                format: self.format,
                export_path: self.export.clone(),
                verbose: self.verbose,
                ..Overrides::default()
            },
        )
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "predictor_web")]
#[command(about = "Web form for position group predictions")]
pub struct WebConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Model artifact (JSON random forest)")]
    pub model: Option<String>,

    #[arg(long, help = "Race entries CSV")]
    pub data: Option<String>,

    #[arg(long)]
    pub delimiter: Option<char>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl WebConfig {
    pub fn settings(&self) -> Result<Settings> {
        let file = load_file(self.config.as_deref())?;
        Settings::resolve(
            &file,
            Overrides {
                model_path: self.model.clone(),
                data_path: self.data.clone(),
                delimiter: self.delimiter,
                host: self.host.clone(),
                port: self.port,
                verbose: self.verbose,
                json_logs: self.json_logs,
                ..Overrides::default()
            },
        )
    }
}

fn load_file(path: Option<&str>) -> Result<TomlConfig> {
    match path {
        Some(path) => TomlConfig::from_file(path),
        None => Ok(TomlConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_resolve_to_settings() {
        let cli = CliConfig::parse_from([
            "position-groups",
            "--model",
            "forest.json",
            "--data",
            "races.tsv",
            "--delimiter",
            "\t",
            "--race",
            "Monaco 2021",
            "--format",
            "json",
        ]);
        let settings = cli.settings().unwrap();
        assert_eq!(settings.model_path, "forest.json");
        assert_eq!(settings.delimiter, b'\t');
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(cli.race.as_deref(), Some("Monaco 2021"));
    }

    #[test]
    fn test_driver_requires_race() {
        let parsed = CliConfig::try_parse_from(["position-groups", "--driver", "Lewis Hamilton"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_web_flags() {
        let web = WebConfig::parse_from([
            "predictor_web",
            "--model",
            "forest.json",
            "--data",
            "races.csv",
            "--port",
            "3000",
        ]);
        assert_eq!(web.settings().unwrap().bind_address(), "127.0.0.1:3000");
    }
}
