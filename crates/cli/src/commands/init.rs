//! `medalign init` — Write a default configuration file.

use medalign_config::PrepConfig;
use std::path::Path;

pub fn run(config_path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 MedAlign — Configuration Setup");
    println!("=================================\n");

    if config_path.exists() && !force {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or re-run with --force.\n");
        return Ok(());
    }

    if let Some(dir) = config_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("✅ Created config directory: {}", dir.display());
        }
    }

    std::fs::write(config_path, PrepConfig::default_toml())?;
    println!("✅ Wrote config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set [data] root to the directory holding the benchmark files");
    println!("   2. Pick a tokenizer (tiktoken alias, tokenizer.json path, or hub model id)");
    println!("   3. Run `medalign check`, then `medalign prepare`");

    Ok(())
}
