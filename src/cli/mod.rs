//! Interface de linha de comando do HaiTale.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HaiTale - recomendações de mods a partir de uma descrição de mundo.
#[derive(Parser, Debug)]
#[command(name = "haitale")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "haitale.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recomenda mods para a descrição de mundo.
    Recommend {
        /// Descrição do mundo (texto livre).
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,

        /// Arquivo JSON com o catálogo de mods.
        #[arg(long, default_value = "catalog.json")]
        catalog: PathBuf,
    },

    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Diagnostica problemas de configuração.
    Doctor {
        /// Arquivo JSON com o catálogo de mods.
        #[arg(long, default_value = "catalog.json")]
        catalog: PathBuf,
    },

    /// Mostra versão.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recommend() {
        let cli = Cli::try_parse_from(["haitale", "recommend", "magic", "castle"]).unwrap();

        match cli.command {
            Commands::Recommend { words, catalog } => {
                assert_eq!(words, vec!["magic", "castle"]);
                assert_eq!(catalog, PathBuf::from("catalog.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_recommend_requires_words() {
        assert!(Cli::try_parse_from(["haitale", "recommend"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["haitale", "-v", "-c", "other.toml", "doctor"]).unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert!(matches!(cli.command, Commands::Doctor { .. }));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
