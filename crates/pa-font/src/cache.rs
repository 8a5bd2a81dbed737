//! Cache persisté des rampes générées, clé = identité de police.
//!
//! Un fichier JSON plat `{ "identité": "rampe..." }`, consulté avant toute
//! mesure d'encre. `refresh` contourne la lecture et écrase l'entrée.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pa_core::ramp::CharRamp;

/// Nom de fichier par défaut du cache, relatif au répertoire courant.
pub const DEFAULT_CACHE_FILE: &str = "char_cache.json";

/// Cache clé → rampe sur disque.
///
/// # Example
/// ```
/// use pa_font::cache::RampCache;
/// use pa_core::ramp::CharRamp;
/// let dir = tempfile::tempdir().unwrap();
/// let cache = RampCache::new(dir.path().join("cache.json"));
/// let ramp = cache
///     .get_or_build("default", false, || Ok(CharRamp::default_ramp()))
///     .unwrap();
/// assert!(ramp.len() >= 2);
/// ```
pub struct RampCache {
    path: PathBuf,
}

impl RampCache {
    /// Cache adossé au fichier donné. Le fichier peut ne pas exister encore.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Emplacement par défaut : `char_cache.json` dans le répertoire courant.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(PathBuf::from(DEFAULT_CACHE_FILE))
    }

    /// Retourne la rampe en cache pour `key`, ou construit, persiste et
    /// retourne le résultat de `build`.
    ///
    /// `refresh = true` ignore l'entrée existante et la réécrit. Un cache
    /// illisible (JSON corrompu) est traité comme vide, pas comme une erreur.
    ///
    /// # Errors
    /// Propage l'échec de `build` ou de l'écriture du fichier de cache.
    pub fn get_or_build<F>(&self, key: &str, refresh: bool, build: F) -> Result<CharRamp>
    where
        F: FnOnce() -> Result<CharRamp>,
    {
        let mut entries = if refresh { HashMap::new() } else { self.load() };
        if !refresh {
            if let Some(cached) = entries.get(key) {
                if let Ok(ramp) = cached.parse::<CharRamp>() {
                    log::debug!("rampe en cache pour '{key}' ({} glyphes)", ramp.len());
                    return Ok(ramp);
                }
                log::warn!("entrée de cache invalide pour '{key}', recalcul");
            }
        }

        let ramp = build()?;
        if refresh {
            // Ne pas perdre les autres entrées lors d'un refresh ciblé.
            entries = self.load();
        }
        entries.insert(key.to_string(), ramp.glyphs().iter().collect::<String>());
        self.store(&entries)?;
        Ok(ramp)
    }

    fn load(&self) -> HashMap<String, String> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    fn store(&self, entries: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("sérialisation du cache")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("écriture de {}", self.path.display()))?;
        Ok(())
    }
}
