//! `medalign prepare` — Build token-budgeted prompts and join gold responses.

use crate::output::write_rows;
use clap::Args;
use medalign_config::{MissingEhrPolicy, OutputFormat, PrepConfig};
use medalign_prompt::build_dataset;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct PrepareArgs {
    /// Directory holding the benchmark files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Maximum model input length in tokens
    #[arg(long)]
    pub context_length: Option<usize>,

    /// Tokens reserved for the model's answer
    #[arg(long)]
    pub generation_length: Option<usize>,

    /// Target tokenizer: tiktoken alias, tokenizer.json path, or hub model id
    #[arg(short, long)]
    pub tokenizer: Option<String>,

    /// Leave EHR timelines out of every prompt
    #[arg(long)]
    pub no_ehr: bool,

    /// What to do when a patient has no timeline: fail or skip
    #[arg(long)]
    pub missing_ehr: Option<MissingEhrPolicy>,

    /// Output format: jsonl or tsv
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PrepareArgs {
    /// Command-line flags win over file and environment settings.
    pub fn apply(&self, config: &mut PrepConfig) {
        if let Some(dir) = &self.data_dir {
            config.data.root = dir.clone();
        }
        if let Some(length) = self.context_length {
            config.context_length = length;
        }
        if let Some(length) = self.generation_length {
            config.generation_length = length;
        }
        if let Some(tokenizer) = &self.tokenizer {
            config.tokenizer = tokenizer.clone();
        }
        if self.no_ehr {
            config.include_ehr = false;
        }
        if let Some(policy) = self.missing_ehr {
            config.missing_ehr = policy;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
    }
}

pub fn run(config_path: &Path, args: PrepareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PrepConfig::load_from(config_path)?;
    args.apply(&mut config);
    config.validate()?;

    let dataset = build_dataset(&config)?;

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_rows(&mut writer, &dataset.rows, config.output.format)?;
            writer.flush()?;
            info!(path = %path.display(), rows = dataset.rows.len(), "Wrote evaluation rows");
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_rows(&mut writer, &dataset.rows, config.output.format)?;
            writer.flush()?;
        }
    }

    eprintln!("{}", serde_json::to_string_pretty(&dataset.summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = PrepareArgs {
            data_dir: Some(PathBuf::from("/data/medalign")),
            context_length: Some(8192),
            generation_length: Some(512),
            tokenizer: Some("gpt-4".into()),
            no_ehr: true,
            missing_ehr: Some(MissingEhrPolicy::Skip),
            format: Some(OutputFormat::Tsv),
            output: None,
        };
        let mut config = PrepConfig::default();
        args.apply(&mut config);

        assert_eq!(config.data.root, PathBuf::from("/data/medalign"));
        assert_eq!(config.context_length, 8192);
        assert_eq!(config.generation_length, 512);
        assert_eq!(config.tokenizer, "gpt-4");
        assert!(!config.include_ehr);
        assert_eq!(config.missing_ehr, MissingEhrPolicy::Skip);
        assert_eq!(config.output.format, OutputFormat::Tsv);
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = PrepConfig::default();
        PrepareArgs::default().apply(&mut config);
        assert_eq!(config.context_length, 4096);
        assert!(config.include_ehr);
        assert_eq!(config.tokenizer, "tiktoken");
    }
}
