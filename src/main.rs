mod audio;
mod audio_api;
mod clock;
mod input;
mod loader;
mod looper;
mod machine;
mod shared;
mod tui;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use audio::library::SampleLibrary;
use clock::{Clock, MonotonicClock};
use input::{TriggerTech, classify};
use looper::beats::BeatCatalog;
use machine::Machine;
use tui::input::UiEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    init_logging();

    // args: an optional samples directory, plus a trigger-technology flag
    let mut tech = TriggerTech::EdgeButton;
    let mut dir: Option<PathBuf> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--touch" => tech = TriggerTech::TouchPad,
            "--external" => tech = TriggerTech::ExternalLine,
            other => dir = Some(PathBuf::from(other)),
        }
    }
    let dir = dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    // Build the catalog, patch slots from any WAVs on disk, then freeze it.
    let mut library = SampleLibrary::default_catalog();
    let imported = loader::wav::import_into_library(&dir, &mut library);
    if imported > 0 {
        info!(imported, "catalog slots overridden from disk");
    }
    let library = Arc::new(library);

    let mut beats = BeatCatalog::builtin();
    let beats_path = dir.join("beats.json");
    if beats_path.exists() {
        match beats.extend_from_file(&beats_path) {
            Ok(n) => info!(n, "user beats loaded"),
            Err(e) => warn!(error = %e, "ignoring malformed beats.json"),
        }
    }

    let playing_mask = Arc::new(AtomicU32::new(0));
    let audio = Arc::new(audio::start_audio(library.clone(), playing_mask.clone())?);
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let machine = Arc::new(Mutex::new(Machine::new(library, beats, playing_mask)));
    let shutdown = Arc::new(AtomicBool::new(false));
    let looper = looper::spawn_looper(
        machine.clone(),
        audio.clone(),
        clock.clone(),
        shutdown.clone(),
    )?;

    terminal::enable_raw_mode()?;
    // Real press/release detection; falls back gracefully if unsupported.
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::PushKeyboardEnhancementFlags(
            crossterm::event::KeyboardEnhancementFlags::REPORT_EVENT_TYPES
        )
    );
    let _guard = RawModeGuard;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut cmds = Vec::new();
    loop {
        let ds = machine
            .lock()
            .map(|m| m.display_state())
            .unwrap_or_default();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        for event in tui::input::poll_input(tick_rate, tech)? {
            match event {
                UiEvent::Quit => {
                    shutdown.store(true, Ordering::Relaxed);
                    let _ = looper.join();
                    drop(term);
                    return Ok(());
                }
                UiEvent::Edge(edge) => {
                    let Some(action) = classify(tech, edge) else {
                        continue;
                    };
                    cmds.clear();
                    let now = clock.now_us();
                    if let Ok(mut m) = machine.lock() {
                        m.handle_input(action, now, &mut cmds);
                    }
                    for &cmd in &cmds {
                        audio.send(cmd);
                    }
                }
            }
        }
    }
}

// The TUI owns stdout, so diagnostics go to a file; RUST_LOG filters as usual.
fn init_logging() {
    if let Ok(file) = std::fs::File::create("padkit.log") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .try_init();
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::event::PopKeyboardEnhancementFlags
        );
        let _ = terminal::disable_raw_mode();
    }
}
