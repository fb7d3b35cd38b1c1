//! `medalign tokens` — Count tokens in a file.

use medalign_config::PrepConfig;
use medalign_tokenizer::TokenizerSet;
use std::path::Path;

pub fn run(
    config_path: &Path,
    file: &Path,
    tokenizer: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = PrepConfig::load_from(config_path)?;
    let name = tokenizer.unwrap_or(config.tokenizer);

    let text = std::fs::read_to_string(file)?;
    let tokenizers = TokenizerSet::resolve(&name)?;

    let fast = tokenizers.fast.count(&text)?;
    let target = tokenizers.target.count(&text)?;

    println!("📄 {}", file.display());
    println!("   chars:                {}", text.chars().count());
    println!("   {:<22}{fast}", format!("{} (fast):", tokenizers.fast.name()));
    println!("   {:<22}{target}", format!("{} (target):", tokenizers.target.name()));

    Ok(())
}
