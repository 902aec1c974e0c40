// General imports
use anyhow::{Context, Result};
use std::sync::Arc;

// From crates
use fletcher_core::corpus::{
    corpus_loader::{load_corpus, load_topic_matrix},
    topic_vocabulary::TopicVocabulary,
};
use fletcher_core::selection::selection_context::SelectionContext;

use super::server_config::ServerConfig;

#[derive(Clone, Debug)]
pub struct ServerState {
    /// Corpus, topic matrix and vocabulary shared read-only by every request
    pub context: Arc<SelectionContext>,
}

impl ServerState {
    pub fn new(context: SelectionContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    /// Load the data files named in the configuration
    ///
    /// # Arguments
    ///
    /// `config` - &ServerConfig, the server configuration
    ///
    /// # Errors
    ///
    /// Unreadable files and corpus or matrix invariant violations are fatal
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let corpus = load_corpus(&config.corpus, config.batch_size)?;
        let matrix = load_topic_matrix(&config.matrix, config.matrix_header, config.batch_size)?;
        let vocabulary = match &config.topics {
            Some(path) => TopicVocabulary::from_json_file(path)?,
            None => TopicVocabulary::default(),
        };
        tracing::debug!(
            "Loaded {} documents from {:?} and a {}x{} topic matrix from {:?}",
            corpus.len(),
            config.corpus,
            matrix.n_rows(),
            matrix.n_columns(),
            config.matrix
        );

        let context = SelectionContext::builder()
            .with_corpus(corpus)
            .with_matrix(matrix)
            .with_vocabulary(vocabulary)
            .with_time_zone(config.time_zone()?)
            .build()
            .context("Corpus and topic matrix are inconsistent")?;
        Ok(Self::new(context))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use fletcher_core::error::ContextError;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &std::path::Path, name: &str, content: &str) -> Result<String> {
        let path = dir.join(name);
        std::fs::File::create(&path)?.write_all(content.as_bytes())?;
        Ok(path.to_string_lossy().to_string())
    }

    #[test]
    fn test_server_state_from_config() -> Result<()> {
        let tmp_dir = tempdir()?;
        let corpus = write_file(
            tmp_dir.path(),
            "corpus.csv",
            "title,text,timestamp,keep\n\
             a,first,1577880000,1\n\
             b,dropped,1577900000,0\n\
             c,second,1577966400,1\n",
        )?;
        let matrix = write_file(
            tmp_dir.path(),
            "matrix.csv",
            "x,y,z\n0.1,0.7,0.2\n0.5,0.3,0.2\n",
        )?;
        let topics = write_file(tmp_dir.path(), "topics.json", r#"["x", "y", "z"]"#)?;

        let config = ServerConfig::try_parse_from([
            "fletcher-server",
            "--corpus",
            corpus.as_str(),
            "--matrix",
            matrix.as_str(),
            "--matrix-header",
            "--topics",
            topics.as_str(),
            "--utc-offset-hours",
            "0",
        ])?;
        let state = ServerState::from_config(&config)?;
        let context = state.context.as_ref();
        assert_eq!(context.corpus().len(), 2);
        assert_eq!(context.corpus().documents()[1].title, "c");
        assert_eq!(context.corpus().documents()[1].id, 2);
        assert_eq!(context.vocabulary().names(&[1, 2, 0]), vec!["y", "z", "x"]);
        assert_eq!(context.ranking(0).indices(), &[1, 2, 0]);

        tmp_dir.close()?;
        Ok(())
    }

    #[test]
    fn test_server_state_row_count_mismatch() -> Result<()> {
        let tmp_dir = tempdir()?;
        let corpus = write_file(
            tmp_dir.path(),
            "corpus.csv",
            "title,text,timestamp\na,first,1577880000\n",
        )?;
        let matrix = write_file(tmp_dir.path(), "matrix.csv", "0.1,0.7,0.2\n0.5,0.3,0.2\n")?;
        let topics = write_file(tmp_dir.path(), "topics.json", r#"["x", "y", "z"]"#)?;

        let config = ServerConfig::try_parse_from([
            "fletcher-server",
            "--corpus",
            corpus.as_str(),
            "--matrix",
            matrix.as_str(),
            "--topics",
            topics.as_str(),
        ])?;
        let err = ServerState::from_config(&config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ContextError>(),
            Some(&ContextError::RowCountMismatch {
                rows: 2,
                documents: 1
            })
        );

        tmp_dir.close()?;
        Ok(())
    }

    #[test]
    fn test_server_state_missing_files() -> Result<()> {
        let tmp_dir = tempdir()?;
        let missing = tmp_dir.path().join("missing.csv");
        let missing = missing.to_string_lossy().to_string();
        let config = ServerConfig::try_parse_from([
            "fletcher-server",
            "--corpus",
            missing.as_str(),
            "--matrix",
            missing.as_str(),
        ])?;
        assert!(ServerState::from_config(&config).is_err());
        Ok(())
    }
}
