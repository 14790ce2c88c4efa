use anyhow::Context;
use clap::{Parser, Subcommand};
use powerhalo::config::{self, CardConfig};
use powerhalo::scene::compose;
use powerhalo::state::StateSnapshot;
use powerhalo::sys::server::SOCKET_PATH;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "powerhalo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the user config directory)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Socket a running widget listens on for readings
    #[arg(short = 's', long, global = true, default_value = SOCKET_PATH)]
    socket: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Write the default configuration unless one exists.
    Init,
    /// Print the scene for a state snapshot as JSON.
    Scene {
        /// JSON object mapping entity ids to their states
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Render the scene for a state snapshot to a PNG file.
    #[cfg(feature = "render")]
    Render {
        #[arg(long)]
        state: Option<PathBuf>,
        #[arg(short = 'o', long)]
        output: PathBuf,
        #[arg(long, default_value_t = 480)]
        width: i32,
        #[arg(long, default_value_t = 600)]
        height: i32,
    },
    /// Open the widget and listen for readings.
    #[cfg(feature = "gui")]
    Show {
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Send a reading to a running widget.
    Set { entity: String, value: String },
    /// Drop a reading from a running widget.
    Unset { entity: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command.clone() {
        Commands::Init => {
            let path = config::write_default_config(&config_path(&cli)?)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Scene { state } => {
            let (_, config) = load(&cli)?;
            let scene = compose(&config, &load_snapshot(state.as_deref())?);
            println!("{}", serde_json::to_string_pretty(&scene)?);
            Ok(())
        }
        #[cfg(feature = "render")]
        Commands::Render {
            state,
            output,
            width,
            height,
        } => {
            let (_, config) = load(&cli)?;
            let scene = compose(&config, &load_snapshot(state.as_deref())?);
            let colors = powerhalo::render::ThemeColors::default();
            powerhalo::render::render_png(&scene, width, height, &colors, &output)?;
            Ok(())
        }
        #[cfg(feature = "gui")]
        Commands::Show { state } => show(&cli, state.as_deref()),
        Commands::Set { entity, value } => {
            send_command(&cli.socket, &format!("set {} {}", entity, value))
        }
        Commands::Unset { entity } => send_command(&cli.socket, &format!("unset {}", entity)),
    }
}

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    let path = match &cli.config {
        Some(p) => p.clone(),
        None => config::get_config_path()?,
    };
    // the watcher compares against absolute event paths
    Ok(std::path::absolute(&path)?)
}

fn load(cli: &Cli) -> anyhow::Result<(PathBuf, CardConfig)> {
    let path = config_path(cli)?;
    let config = config::load_config(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    Ok((path, config))
}

fn load_snapshot(path: Option<&Path>) -> anyhow::Result<StateSnapshot> {
    match path {
        Some(p) => StateSnapshot::load(p)
            .with_context(|| format!("Failed to load state snapshot {}", p.display())),
        None => Ok(StateSnapshot::default()),
    }
}

#[cfg(feature = "gui")]
fn show(cli: &Cli, state: Option<&Path>) -> anyhow::Result<()> {
    use powerhalo::dashboard::Dashboard;
    use powerhalo::gui::app::AppModel;
    use powerhalo::state::StateStore;
    use powerhalo::sys::runtime;
    use relm4::prelude::*;

    let (path, config) = load(cli)?;
    let store = StateStore::new(load_snapshot(state)?);

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx, store.clone(), cli.socket.clone(), path.clone());

    let dashboard = Dashboard::new(path, config, store);
    let app = RelmApp::new("org.powerhalo.powerhalo");

    app.run::<AppModel>((dashboard, rx));
    Ok(())
}

fn send_command(socket: &Path, cmd: &str) -> anyhow::Result<()> {
    let mut stream = UnixStream::connect(socket).map_err(|e| {
        anyhow::anyhow!(
            "Failed to connect to powerhalo at {}: {}. Is the widget running?",
            socket.display(),
            e
        )
    })?;

    writeln!(stream, "{}", cmd)?;
    Ok(())
}
