//! Entradas do catálogo de mods.

use serde::{Deserialize, Serialize};

/// Licenças consideradas livres (comparação case-insensitive por substring).
const FREE_LICENSE_MARKERS: &[&str] = &[
    "mit",
    "apache",
    "gpl",
    "lgpl",
    "bsd",
    "mpl",
    "cc0",
    "public domain",
    "unlicense",
];

/// Origem de um mod.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModSource {
    Modrinth,
    Curseforge,
    Github,
    /// Qualquer outra origem.
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ModSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModSource::Modrinth => write!(f, "modrinth"),
            ModSource::Curseforge => write!(f, "curseforge"),
            ModSource::Github => write!(f, "github"),
            ModSource::Unknown => write!(f, "unknown"),
        }
    }
}

/// Um mod disponível no catálogo.
///
/// Somente leitura para o pipeline de recomendação.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Identificador único.
    pub id: String,

    /// Nome de exibição.
    pub name: String,

    /// Versão.
    #[serde(default)]
    pub version: String,

    /// Descrição livre.
    #[serde(default)]
    pub description: String,

    /// Autor.
    #[serde(default)]
    pub author: String,

    /// Licença.
    #[serde(default)]
    pub license: String,

    /// Origem.
    #[serde(default)]
    pub source: ModSource,
}

impl CatalogEntry {
    /// Cria uma entrada com os campos obrigatórios.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: String::new(),
            description: description.into(),
            author: String::new(),
            license: String::new(),
            source: ModSource::Unknown,
        }
    }

    /// Define a versão.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Define o autor.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Define a licença.
    #[must_use]
    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    /// Define a origem.
    #[must_use]
    pub fn with_source(mut self, source: ModSource) -> Self {
        self.source = source;
        self
    }

    /// Verifica se a licença é livre.
    pub fn is_free_license(&self) -> bool {
        let license = self.license.to_lowercase();
        FREE_LICENSE_MARKERS.iter().any(|m| license.contains(m))
    }
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} v{} by {} [{}] - {}",
            self.name, self.version, self.author, self.license, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_license_detection() {
        let entry = CatalogEntry::new("a", "A", "").with_license("Apache-2.0");
        assert!(entry.is_free_license());

        let entry = CatalogEntry::new("b", "B", "").with_license("Public Domain");
        assert!(entry.is_free_license());

        let entry = CatalogEntry::new("c", "C", "").with_license("All Rights Reserved");
        assert!(!entry.is_free_license());

        let entry = CatalogEntry::new("d", "D", "");
        assert!(!entry.is_free_license());
    }

    #[test]
    fn test_deserialize_minimal_entry() {
        let entry: CatalogEntry =
            serde_json::from_str(r#"{"id": "x", "name": "X", "source": "forgejo"}"#).unwrap();

        assert_eq!(entry.id, "x");
        assert_eq!(entry.source, ModSource::Unknown);
        assert!(entry.description.is_empty());
    }

    #[test]
    fn test_display() {
        let entry = CatalogEntry::new("magic-realms-2", "Magic Realms", "Spells")
            .with_version("2.1.0")
            .with_author("MysticCoder")
            .with_license("Apache-2.0");

        assert_eq!(
            entry.to_string(),
            "Magic Realms v2.1.0 by MysticCoder [Apache-2.0] - Spells"
        );
    }
}
