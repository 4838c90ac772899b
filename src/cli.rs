// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "model-viewer")]
#[command(about = "Framed, animated glTF model viewer", long_about = None)]
pub struct Cli {
    /// glTF / GLB file to display
    #[arg(env = "MODEL_FILE", default_value = "Boy.glb")]
    pub model: PathBuf,

    /// JSON config file; missing fields use defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Animation clip to play (falls back to the first clip)
    #[arg(long)]
    pub clip: Option<String>,

    /// Vertical field of view in degrees
    #[arg(long)]
    pub fov: Option<f32>,

    /// Disable the status overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_model() {
        let cli = Cli::parse_from(["model-viewer", "assets/Robot.glb", "--no-ui"]);
        assert_eq!(cli.model, PathBuf::from("assets/Robot.glb"));
        assert!(cli.no_ui);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["model-viewer", "--clip", "walk", "--fov", "50", "--config", "v.json"]);
        assert_eq!(cli.clip.as_deref(), Some("walk"));
        assert_eq!(cli.fov, Some(50.0));
        assert_eq!(cli.config, Some(PathBuf::from("v.json")));
    }
}
