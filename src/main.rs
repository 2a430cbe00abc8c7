//! # Recibo CLI
//!
//! Command-line interface for 58mm Bluetooth receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # Find a printer and remember it
//! recibo link
//!
//! # Print the stored receipt, with one-off overrides
//! recibo print --header "Shop" --text "Hello\nWorld" --align center
//!
//! # Body from a file, or "-" for stdin
//! recibo print --file notes.txt --size lg
//!
//! # Inspect without printing
//! recibo encode --header "Shop" --text "Hi"
//! recibo preview --as-printed
//!
//! # AI helpers (needs GEMINI_API_KEY)
//! recibo extract https://example.com/article
//! echo "some long notes" | recibo reformat
//! ```

use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use recibo::{
    PrintOutcome, PrintSession, PrinterConfig, ReciboError,
    document::{self, FontSize, TextAlign},
    ir::TextEncoding,
    preview::{PreviewRenderer, WriterSurface, render_preview},
    printer::PrinterProfile,
    store::ConfigStore,
    transform::{API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiTransform, Graceful},
    transport::{
        BleTransport, BtleCentral, Central, DeviceLinker, TransportOptions,
        memory::{MemoryCentral, MemoryDevice},
    },
};

/// Recibo - ESC/POS receipts for 58mm Bluetooth printers
#[derive(Parser, Debug)]
#[command(name = "recibo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, global = true, env = "RECIBO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bluetooth scan window in seconds
    #[arg(long, global = true, default_value_t = 5)]
    scan_secs: u64,

    /// Per-stage transport timeout in seconds (0 disables it)
    #[arg(long, global = true, default_value_t = 5)]
    timeout_secs: u64,

    /// Send text as UTF-8 instead of PC437
    #[arg(long, global = true)]
    utf8: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the receipt
    Print {
        #[command(flatten)]
        overrides: DocumentArgs,

        /// Route to the linked Bluetooth printer for this print
        #[arg(long, conflicts_with = "no_ble")]
        ble: bool,

        /// Route to the OS print path for this print
        #[arg(long)]
        no_ble: bool,

        /// Write the OS print output here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Send to an in-memory printer and report what would be written
        #[arg(long, conflicts_with = "no_ble")]
        dry_run: bool,
    },

    /// Discover a Bluetooth printer and remember it
    Link,

    /// Forget the linked printer
    Unlink,

    /// Write the ESC/POS byte stream to a file, or as hex to stdout
    Encode {
        #[command(flatten)]
        overrides: DocumentArgs,

        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Show the receipt as plain text
    Preview {
        #[command(flatten)]
        overrides: DocumentArgs,

        /// Show characters the printer cannot print as '?'
        #[arg(long)]
        as_printed: bool,
    },

    /// Show or reset the stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Extract readable text from a web page
    Extract {
        url: String,

        #[command(flatten)]
        ai: AiArgs,
    },

    /// Reformat text for a narrow receipt (reads stdin if no text is given)
    Reformat {
        text: Option<String>,

        #[command(flatten)]
        ai: AiArgs,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored settings as JSON
    Show,
    /// Restore the default settings
    Reset,
}

/// One-off overrides of the stored document fields.
#[derive(clap::Args, Debug, Default)]
struct DocumentArgs {
    /// Header text
    #[arg(long)]
    header: Option<String>,

    /// Body text (`\n` starts a new line)
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the body from a file, or "-" for stdin
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    #[arg(long, value_enum)]
    size: Option<SizeArg>,

    #[arg(long, value_enum)]
    align: Option<AlignArg>,

    /// Bold body text
    #[arg(long)]
    bold: bool,
}

#[derive(clap::Args, Debug)]
struct AiArgs {
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API endpoint, for proxies and local gateways
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    api_base: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SizeArg {
    Sm,
    Base,
    Lg,
    Xl,
}

impl From<SizeArg> for FontSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Sm => FontSize::Sm,
            SizeArg::Base => FontSize::Base,
            SizeArg::Lg => FontSize::Lg,
            SizeArg::Xl => FontSize::Xl,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlignArg {
    Left,
    Center,
    Right,
}

impl From<AlignArg> for TextAlign {
    fn from(align: AlignArg) -> Self {
        match align {
            AlignArg::Left => TextAlign::Left,
            AlignArg::Center => TextAlign::Center,
            AlignArg::Right => TextAlign::Right,
        }
    }
}

impl DocumentArgs {
    fn apply(&self, config: &mut PrinterConfig) -> Result<(), ReciboError> {
        if let Some(header) = &self.header {
            config.header_text = header.clone();
        }
        if let Some(text) = &self.text {
            config.content = text.replace("\\n", "\n");
        }
        if let Some(path) = &self.file {
            config.content = read_input(path)?;
        }
        if let Some(size) = self.size {
            config.font_size = size.into();
        }
        if let Some(align) = self.align {
            config.text_align = align.into();
        }
        if self.bold {
            config.bold = true;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recibo=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        debug!(error = ?e, "Command failed");
        eprintln!("Error: {}", e.user_message());
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ReciboError> {
    let store = open_store(cli.config.as_deref())?;
    let encoding = if cli.utf8 {
        TextEncoding::Utf8
    } else {
        TextEncoding::Cp437
    };

    match &cli.command {
        Commands::Print {
            overrides,
            ble,
            no_ble,
            out,
            dry_run,
        } => {
            let mut config = store.load();
            overrides.apply(&mut config)?;
            if *ble {
                config.use_bluetooth = true;
            }
            if *no_ble {
                config.use_bluetooth = false;
            }

            let outcome = if *dry_run {
                config.use_bluetooth = true;
                let name = config
                    .linked_printer_name
                    .get_or_insert_with(|| "dry-run".to_string())
                    .clone();
                let printer = MemoryDevice::printer(&name);
                let central = MemoryCentral::new().with_device(printer.clone());
                let outcome = print(&cli, central, config, store, encoding, out.as_deref()).await?;
                if let PrintOutcome::Bluetooth { .. } = outcome {
                    println!("Dry run: {} writes", printer.writes().len());
                    print_hex(&printer.written())?;
                }
                outcome
            } else if config.use_bluetooth {
                // Adapter failures surface from the session, which clears
                // the Bluetooth flag before reporting them.
                print(&cli, open_central(&cli), config, store, encoding, out.as_deref()).await?
            } else {
                // The OS print path never touches Bluetooth.
                print(&cli, MemoryCentral::new(), config, store, encoding, out.as_deref()).await?
            };

            if let PrintOutcome::Bluetooth { bytes } = outcome {
                eprintln!("Printed {} bytes", bytes);
            }
        }

        Commands::Link => {
            let mut session = session(&cli, open_central(&cli), store.load(), store, encoding);
            let name = session.link().await?;
            println!("Linked {}", name.as_deref().unwrap_or("unnamed printer"));
        }

        Commands::Unlink => {
            let mut session = session(&cli, MemoryCentral::new(), store.load(), store, encoding);
            session.unlink()?;
            println!("Printer unlinked");
        }

        Commands::Encode { overrides, out } => {
            let mut config = store.load();
            overrides.apply(&mut config)?;
            let bytes = document::encode_with(&config, encoding);
            match out {
                Some(path) => {
                    std::fs::write(path, &bytes)?;
                    eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => print_hex(&bytes)?,
            }
        }

        Commands::Preview {
            overrides,
            as_printed,
        } => {
            let mut config = store.load();
            overrides.apply(&mut config)?;
            let text = if *as_printed {
                PreviewRenderer::for_profile(&PrinterProfile::BLE_58MM)
                    .as_printed(true)
                    .render(&document::compile(&config))
            } else {
                render_preview(&config, &PrinterProfile::BLE_58MM)
            };
            print!("{}", text);
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = store.load();
                let json = serde_json::to_string_pretty(&config)
                    .map_err(|e| ReciboError::Store(e.into()))?;
                println!("{}", json);
            }
            ConfigAction::Reset => {
                store.reset()?;
                println!("Settings reset ({})", store.path().display());
            }
        },

        Commands::Extract { url, ai } => {
            let transform = gemini(ai)?;
            println!("{}", transform.extract(url).await);
        }

        Commands::Reformat { text, ai } => {
            let input = match text {
                Some(text) => text.clone(),
                None => read_input(Path::new("-"))?,
            };
            let transform = gemini(ai)?;
            println!("{}", transform.reformat(&input).await);
        }
    }

    Ok(())
}

fn open_store(path: Option<&Path>) -> Result<ConfigStore, ReciboError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => ConfigStore::default_path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no config directory; pass --config")
        })?,
    };
    debug!(path = %path.display(), "Using settings file");
    Ok(ConfigStore::new(path))
}

fn open_central(cli: &Cli) -> BtleCentral {
    BtleCentral::system()
        .with_scan_window(Duration::from_secs(cli.scan_secs))
        .with_chooser(prompt_for_device)
}

fn session<C: Central>(
    cli: &Cli,
    central: C,
    config: PrinterConfig,
    store: ConfigStore,
    encoding: TextEncoding,
) -> PrintSession<C> {
    let timeout = (cli.timeout_secs > 0).then(|| Duration::from_secs(cli.timeout_secs));
    let options = TransportOptions::default().with_stage_timeout(timeout);
    let transport = BleTransport::new(DeviceLinker::new(central), options);
    PrintSession::new(config, transport)
        .with_store(store)
        .with_encoding(encoding)
}

async fn print<C: Central>(
    cli: &Cli,
    central: C,
    config: PrinterConfig,
    store: ConfigStore,
    encoding: TextEncoding,
    out: Option<&Path>,
) -> Result<PrintOutcome, ReciboError> {
    let mut session = session(cli, central, config, store, encoding);
    match out {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            session.print(&mut WriterSurface::new(file)).await
        }
        None => session.print(&mut WriterSurface::new(io::stdout())).await,
    }
}

fn gemini(ai: &AiArgs) -> Result<Graceful<GeminiTransform>, ReciboError> {
    let client = GeminiTransform::new(ai.api_key.clone())?
        .with_model(ai.model.clone())
        .with_base_url(ai.api_base.clone());
    Ok(Graceful::new(client))
}

/// Stdin stand-in for a platform device picker. An empty answer cancels.
fn prompt_for_device(labels: &[String]) -> Option<usize> {
    if labels.len() == 1 {
        return Some(0);
    }
    eprintln!("Printers found:");
    for (index, label) in labels.iter().enumerate() {
        eprintln!("  {}) {}", index + 1, label);
    }
    eprint!("Choose a printer [1-{}, empty to cancel]: ", labels.len());
    io::stderr().flush().ok()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer).ok()?;
    let choice: usize = answer.trim().parse().ok()?;
    choice.checked_sub(1).filter(|index| *index < labels.len())
}

fn read_input(path: &Path) -> Result<String, ReciboError> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Hex dump, 16 bytes per line.
fn print_hex(bytes: &[u8]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for line in bytes.chunks(16) {
        let hex: Vec<String> = line.iter().map(|b| format!("{:02X}", b)).collect();
        writeln!(stdout, "{}", hex.join(" "))?;
    }
    Ok(())
}
