//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# layerguard configuration

[analyzer]
# File or directory to check (default: current directory)
# target = "./internal"

# Entries to skip. Plain entries match when a file or directory name
# contains them; entries with * ? [ are globs over the relative path.
ignore = ["test", ".git", "vendor"]

# Module import path. Read from the nearest go.mod when unset.
# module = "github.com/acme/app"

# Also report verified files and ignored entries
verbose = false

# Worker threads for per-file checks (default: one per CPU)
# parallelism = 4

[layers]
# Outermost layer first. A file may import its own layer and any layer
# listed after it; importing an earlier layer is a violation.
order = ["external", "adapter", "application", "domain"]

[output]
# Print violations after all other results
violations_at_bottom = false
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("layerguard.toml");
    write_config(config_path, force)?;

    println!("Created layerguard.toml");
    println!("\nNext steps:");
    println!("  1. Edit [layers] order to match your package layout");
    println!("  2. Run: layerguard check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerguard_core::Config;
    use tempfile::TempDir;

    #[test]
    fn template_parses_and_validates() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(
            config.dependency_orders,
            vec!["external", "adapter", "application", "domain"]
        );
        assert_eq!(config.ignore, vec!["test", ".git", "vendor"]);
    }

    #[test]
    fn existing_config_needs_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("layerguard.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
