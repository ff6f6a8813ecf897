mod app;
mod audio;
mod config;

use app::App;
use clap::Parser;
use config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "reflex-app", version, about = "Reaction-time game")]
struct Cli {
    /// Player name shown on the leaderboard
    name: Option<String>,
    /// Optional contact email stored with each score
    email: Option<String>,
    /// Disable the cue and feedback tones
    #[arg(long)]
    mute: bool,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(name) = self.name {
            config.player.name = Some(name);
        }
        if let Some(email) = self.email {
            config.player.email = Some(email);
        }
        if self.mute {
            config.audio = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    log::set_max_level(log::LevelFilter::Warn);

    let cli = Cli::parse();
    let mut config = AppConfig::load();
    cli.apply(&mut config);
    log::set_max_level(config.log_level.as_level_filter());

    let player = config.player_session()?;
    App::new(&config, player).run()
}
