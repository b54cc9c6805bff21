//! CLI argument parsing

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "searchrag")]
#[command(about = "Answer a question from indexed documents with Azure AI Search and Azure OpenAI")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: level from config)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Question to answer
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["searchrag"]).unwrap();
        assert!(cli.query.is_none());
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_query_and_flags() {
        let cli = Cli::try_parse_from(["searchrag", "-v", "--config", "rag.toml", "休暇の申請方法は？"])
            .unwrap();
        assert_eq!(cli.query.as_deref(), Some("休暇の申請方法は？"));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("rag.toml")));
    }

    #[test]
    fn test_empty_query_is_accepted() {
        let cli = Cli::try_parse_from(["searchrag", ""]).unwrap();
        assert_eq!(cli.query.as_deref(), Some(""));
    }
}
