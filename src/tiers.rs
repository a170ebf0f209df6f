use std::path::{Path, PathBuf};

use crate::config;
use crate::error;

// ── CLI commands ──────────────────────────────────────────────────────

/// Print each tier and whether scans enable it by default.
///
/// # Errors
///
/// Returns errors from config loading.
pub fn cmd_list() -> Result<(), error::Error> {
    let root = PathBuf::from(".");
    let config = config::Config::load(&root)?;
    let defaults = config.default_tiers();

    println!("strict       on (always)");
    println!("extended     {}", if defaults.extended { "on" } else { "off" });
    println!("paren-fixer  {}", if defaults.paren_fixer { "on" } else { "off" });
    Ok(())
}

/// Enable a tier by default in `.ucfix.toml`.
///
/// # Errors
///
/// Returns `Error::UnknownTier` for unrecognized names, or config I/O errors.
pub fn cmd_enable(name: &str) -> Result<(), error::Error> {
    if name == "strict" {
        println!("The strict tier is always enabled.");
        return Ok(());
    }
    let root = PathBuf::from(".");
    set_in_config(&root, name, true)?;
    println!("Enabled tier: {name}");
    Ok(())
}

/// Disable a tier by default in `.ucfix.toml`.
///
/// # Errors
///
/// Returns `Error::UnknownTier` for unrecognized names, or config I/O errors.
pub fn cmd_disable(name: &str) -> Result<(), error::Error> {
    if name == "strict" {
        println!("The strict tier cannot be disabled.");
        return Ok(());
    }
    let root = PathBuf::from(".");
    set_in_config(&root, name, false)?;
    println!("Disabled tier: {name}");
    Ok(())
}

// ── Config file editing ───────────────────────────────────────────────

/// Parse `.ucfix.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ConfigParse` on parse
/// failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), error::Error> {
    let config_path = root.join(".ucfix.toml");
    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(error::Error::Io(e)),
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        error::Error::ConfigParse {
            path: config_path.clone(),
            reason: e.to_string(),
        }
    })?;

    Ok((config_path, doc))
}

/// Flip one tier's default in `.ucfix.toml`, preserving file formatting and
/// comments. Creates the `[tiers]` table if it doesn't exist.
///
/// # Errors
///
/// Returns `Error::UnknownTier` for unrecognized tier names,
/// `Error::ConfigParse` if the config can't be parsed,
/// or `Error::Io` if writing fails.
fn set_in_config(root: &Path, name: &str, enabled: bool) -> Result<(), error::Error> {
    let Some(key) = toml_key_for(name) else {
        return Err(error::Error::UnknownTier { name: name.to_string() });
    };
    let (config_path, mut doc) = read_config_doc(root)?;

    if !doc.contains_key("tiers") {
        doc["tiers"] = toml_edit::Item::Table(toml_edit::Table::new());
    }

    doc["tiers"][key] = toml_edit::value(enabled);

    std::fs::write(&config_path, doc.to_string())?;
    Ok(())
}

/// Map a CLI tier name to its `.ucfix.toml` key.
fn toml_key_for(name: &str) -> Option<&'static str> {
    match name {
        "extended" => Some("extended"),
        "paren-fixer" => Some("paren_fixer"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn enable_writes_tier_table_and_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".ucfix.toml"),
            "# scan scope\ninclude = [\"Src/\"]\n",
        )
        .unwrap();
        set_in_config(dir.path(), "extended", true).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".ucfix.toml")).unwrap();
        assert!(content.contains("# scan scope"));
        assert!(content.contains("include"));
        assert!(content.contains("extended = true"));

        let config = config::Config::load(dir.path()).unwrap();
        assert!(config.default_tiers().extended);
    }

    #[test]
    fn disable_flips_an_existing_key_in_place() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".ucfix.toml"),
            "[tiers]\nextended = true\nparen_fixer = true\n",
        )
        .unwrap();
        set_in_config(dir.path(), "paren-fixer", false).unwrap();

        let config = config::Config::load(dir.path()).unwrap();
        assert!(config.default_tiers().extended);
        assert!(!config.default_tiers().paren_fixer);
    }

    #[test]
    fn enable_creates_the_config_file_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        set_in_config(dir.path(), "extended", true).unwrap();
        let content = std::fs::read_to_string(dir.path().join(".ucfix.toml")).unwrap();
        assert!(content.contains("[tiers]"));
        assert!(content.contains("extended = true"));
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            set_in_config(dir.path(), "gold", true),
            Err(error::Error::UnknownTier { .. })
        ));
    }
}
