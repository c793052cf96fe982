use clap::{Parser, Subcommand};
use snaplink::caption::{self, Captioner, NoCaptioner};
use snaplink::config::{self, AppConfig};
use snaplink::history::History;
use snaplink::imaging::RustBackend;
use snaplink::share::{self, ShareOptions};
use snaplink::{link, logging, output, render};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "snaplink")]
#[command(about = "Share images as self-contained links")]
#[command(long_about = "\
Share images as self-contained links

The link is the image: the picture is compressed to a small JPEG and the
whole thing, name and caption included, is encoded into the URL. Nothing is
uploaded and nothing expires.

  snaplink share photo.png           # print a share URL
  snaplink view '<URL or token>'     # decode a link
  snaplink history                   # recent shares

Captions come from Gemini when the API_KEY environment variable is set
(see [caption] in the config). Without it, shares get a stock caption.

Run 'snaplink gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/snaplink/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file (overrides [history] path)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress an image and print its share link
    Share {
        file: PathBuf,
        /// Skip the AI caption
        #[arg(long)]
        no_caption: bool,
        /// Width bound in pixels
        #[arg(long)]
        max_width: Option<u32>,
        /// JPEG quality, 0 < q <= 1
        #[arg(long)]
        quality: Option<f32>,
        /// Also write the viewer page to this file
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Decode a share link or token
    View {
        /// Share URL or bare token
        #[arg(value_name = "LINK")]
        input: String,
        /// Write the decoded image to this file
        #[arg(long)]
        save: Option<PathBuf>,
        /// Write the viewer page (or the invalid-link page) to this file
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// List recent shares
    History {
        /// Forget all recent shares
        #[arg(long, conflicts_with = "url")]
        clear: bool,
        /// Print the share URL of the entry with this id (or unique id prefix)
        #[arg(long, value_name = "ID")]
        url: Option<String>,
    },
    /// Write the landing page with recent shares
    Landing {
        #[arg(long)]
        html: PathBuf,
    },
    /// Show what this tool does
    About {
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = load_config(cli.config.as_deref())?;
    let history_path = cli
        .history
        .clone()
        .or_else(|| config.history.resolved_path());

    match cli.command {
        Command::Share {
            file,
            no_caption,
            max_width,
            quality,
            html,
        } => {
            if let Some(w) = max_width {
                config.compression.max_width = w;
            }
            if let Some(q) = quality {
                config.compression.quality = q;
            }
            config.validate()?;

            let captioner: Box<dyn Captioner> = if no_caption {
                Box::new(NoCaptioner)
            } else {
                caption::from_config(&config.caption)
            };
            let options = ShareOptions::from_config(&config);
            let shared =
                share::share_file(&RustBackend::new(), captioner.as_ref(), &file, &options)?;

            output::print_share_output(&shared);
            if let Some(out) = html {
                render::write_page(&out, render::render_viewer(&shared.record, &shared.url))?;
            }

            if let Some(path) = &history_path {
                let mut history = History::load(path, config.history.capacity);
                history.record(shared.entry);
                if let Err(e) = history.save(path) {
                    warn!(path = %path.display(), error = %e, "could not save history");
                }
            }
        }
        Command::View { input, save, html } => {
            let token = link::extract_token(&input);
            let Some(record) = link::decode_with(token, config.link.version_policy()) else {
                if let Some(out) = html {
                    render::write_page(&out, render::render_invalid_link())?;
                }
                output::print_invalid_link();
                return Ok(ExitCode::FAILURE);
            };

            output::print_view_output(&record);
            if let Some(out) = save {
                std::fs::write(&out, record.payload.decode_bytes()?)?;
                debug!(path = %out.display(), "image saved");
            }
            if let Some(out) = html {
                let (_, url) = share::link_for(&record, &config.link.base_url);
                render::write_page(&out, render::render_viewer(&record, &url))?;
            }
        }
        Command::History { clear, url } => {
            let mut history = load_history(history_path.as_deref(), config.history.capacity);

            if clear {
                if let Some(path) = &history_path {
                    history.clear(path)?;
                }
                println!("History cleared");
            } else if let Some(id) = url {
                let Some(entry) = history.find(&id) else {
                    eprintln!("No history entry matches '{id}'");
                    return Ok(ExitCode::FAILURE);
                };
                let (_, url) = share::link_for(&entry.to_record(), &config.link.base_url);
                println!("{url}");
            } else {
                output::print_history(&history);
            }
        }
        Command::Landing { html } => {
            let history = load_history(history_path.as_deref(), config.history.capacity);
            render::write_page(&html, render::render_landing(&history, &config.link.base_url))?;
        }
        Command::About { html } => match html {
            Some(out) => render::write_page(&out, render::render_about())?,
            None => print!("{}", render::ABOUT_MARKDOWN),
        },
        // Printed before the config is loaded, so a broken config can be regenerated.
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// An explicit `--config` path, else the platform default. Missing files
/// fall back to the stock defaults.
fn load_config(explicit: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    match explicit.map(Path::to_path_buf).or_else(config::default_config_path) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            config::load_config(&path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn load_history(path: Option<&Path>, capacity: usize) -> History {
    path.map(|p| History::load(p, capacity))
        .unwrap_or_else(|| History::empty(capacity))
}
