//! `medalign check` — Verify configuration and benchmark data layout.

use medalign_config::PrepConfig;
use medalign_records::patient_id_from_file_name;
use std::path::Path;

pub fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 MedAlign Check — Data Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config = match PrepConfig::load_from(config_path) {
        Ok(config) => {
            if config_path.exists() {
                println!("  ✅ Config file valid: {}", config_path.display());
            } else {
                println!("  ⚠️  No config file, using defaults — run `medalign init`");
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config file invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    let layout = config.layout();

    for (path, what) in [
        (&layout.instructions, "Instructions file"),
        (&layout.references, "Clinician responses file"),
    ] {
        if path.is_file() {
            println!("  ✅ {what}: {}", path.display());
        } else {
            println!("  ❌ {what} missing: {}", path.display());
            issues += 1;
        }
    }

    if layout.ehr_dir.is_dir() {
        let (mut patients, mut unrecognized) = (0usize, 0usize);
        for entry in std::fs::read_dir(&layout.ehr_dir)?.flatten() {
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().to_str().and_then(patient_id_from_file_name) {
                Some(_) => patients += 1,
                None => unrecognized += 1,
            }
        }
        println!(
            "  ✅ EHR directory: {} ({patients} timelines)",
            layout.ehr_dir.display()
        );
        if unrecognized > 0 {
            println!(
                "  ⚠️  {unrecognized} file(s) without a numeric patient id will be skipped"
            );
        }
        if patients == 0 {
            println!("  ❌ EHR directory has no timelines");
            issues += 1;
        }
    } else {
        println!("  ❌ EHR directory missing: {}", layout.ehr_dir.display());
        issues += 1;
    }

    println!(
        "  ℹ️  Budget: {} context, {} reserved for generation, tokenizer '{}'",
        config.context_length, config.generation_length, config.tokenizer
    );

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
