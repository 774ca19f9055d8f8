//! Minimal, concrete on-disk representation of an [`isa_model::Isa`]:
//! a TOML encoding round-tripped through `isa-model`'s serde derives.
//!
//! This stands in for the textual ISA grammar a real toolchain would
//! parse; every model type already derives `Serialize`/`Deserialize`,
//! so there is no bespoke grammar to maintain here.

use std::fs;
use std::path::Path;

use isa_model::Isa;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("serializing ISA: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Loads an [`Isa`] from a TOML file and finalizes its name-resolution
/// index, so the result is immediately usable with `validate`/`execute`.
pub fn load_file(path: impl AsRef<Path>) -> Result<Isa, LoaderError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_str(&text, path)
}

fn load_str(text: &str, path: &Path) -> Result<Isa, LoaderError> {
    let mut isa: Isa = toml::from_str(text).map_err(|source| LoaderError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    isa.finalize();
    log::debug!("loaded ISA '{}' from '{}'", isa.name, path.display());
    Ok(isa)
}

/// Serializes `isa` to TOML and writes it to `path`.
pub fn save_file(isa: &Isa, path: impl AsRef<Path>) -> Result<(), LoaderError> {
    let path = path.as_ref();
    let text = toml::to_string_pretty(isa)?;
    fs::write(path, text).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("saved ISA '{}' to '{}'", isa.name, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isa_model::model::{Endianness, Register, RegisterKind};

    #[test]
    fn round_trips_through_toml() {
        let isa = Isa::new(
            "toy",
            32,
            Endianness::Little,
            vec![Register {
                name: "R".into(),
                kind: RegisterKind::GeneralPurpose,
                width: 32,
                count: Some(4),
                fields: vec![],
            }],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
            vec![],
        );

        let dir = std::env::temp_dir();
        let path = dir.join("isa-loader-roundtrip-test.toml");
        save_file(&isa, &path).unwrap();
        let loaded = load_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.name, "toy");
        assert!(loaded.get_register("R").is_some());
    }
}
