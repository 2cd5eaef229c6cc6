//! Tipos de erro do HaiTale.

use thiserror::Error;

/// Tipo de resultado padrão do HaiTale.
pub type HaitaleResult<T> = Result<T, HaitaleError>;

/// Erros possíveis no HaiTale.
///
/// Falhas do caminho de IA (rede, quota, parse) não aparecem aqui: elas são
/// tratadas dentro do pipeline de recomendação e convertidas em fallback.
#[derive(Error, Debug)]
pub enum HaitaleError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Erro ao criar cliente HTTP: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Catálogo indisponível: {0}")]
    Catalog(String),
}

impl HaitaleError {
    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de catálogo.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        Self::Catalog(msg.into())
    }
}
