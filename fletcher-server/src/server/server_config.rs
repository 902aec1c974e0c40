// General imports
use anyhow::{Result, anyhow};
use clap::Parser;
use fletcher_core::selection::time_range::ServerTimeZone;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to serve the application on
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub address: String,

    /// Assets directory
    #[arg(long, default_value = ".")]
    pub assets_dir: String,

    /// Corpus file (.csv, .json, .jsonl or .ndjson) with title, text, timestamp and an optional keep column
    #[arg(long, default_value = "data/corpus.csv")]
    pub corpus: PathBuf,

    /// Document-topic weight matrix as CSV, one row per kept document
    #[arg(long, default_value = "data/doc_topic_matrix.csv")]
    pub matrix: PathBuf,

    /// The matrix file starts with a header row
    #[arg(long)]
    pub matrix_header: bool,

    /// JSON array of topic names, one per matrix column
    #[arg(long)]
    pub topics: Option<PathBuf>,

    /// Read request dates at this fixed UTC offset instead of the host time zone
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset_hours: Option<i32>,

    /// Rows per record batch when reading the data files
    #[arg(long, default_value_t = 1024)]
    pub batch_size: usize,
}

impl ServerConfig {
    pub fn time_zone(&self) -> Result<ServerTimeZone> {
        match self.utc_offset_hours {
            None => Ok(ServerTimeZone::Local),
            Some(hours) => ServerTimeZone::from_utc_offset_hours(hours)
                .ok_or_else(|| anyhow!("UTC offset of {hours} hours is out of range")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() -> Result<()> {
        let config = ServerConfig::try_parse_from(["fletcher-server"])?;
        assert_eq!(config.address, "127.0.0.1:5000");
        assert_eq!(config.assets_dir, ".");
        assert_eq!(config.corpus, PathBuf::from("data/corpus.csv"));
        assert_eq!(config.matrix, PathBuf::from("data/doc_topic_matrix.csv"));
        assert!(!config.matrix_header);
        assert!(config.topics.is_none());
        assert_eq!(config.batch_size, 1024);
        assert_eq!(config.time_zone()?, ServerTimeZone::Local);
        Ok(())
    }

    #[test]
    fn test_server_config_time_zone() -> Result<()> {
        let config = ServerConfig::try_parse_from([
            "fletcher-server",
            "--utc-offset-hours",
            "-5",
            "--matrix-header",
        ])?;
        assert!(config.matrix_header);
        assert_eq!(
            config.time_zone()?,
            ServerTimeZone::from_utc_offset_hours(-5).unwrap()
        );

        let config = ServerConfig::try_parse_from(["fletcher-server", "--utc-offset-hours", "30"])?;
        assert!(config.time_zone().is_err());
        Ok(())
    }
}
