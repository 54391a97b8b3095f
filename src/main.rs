//! scan-detect - watch a keyboard event stream for barcode scans
//!
//! Prints every scan (and, optionally, every rejected candidate) as it is
//! detected, then a session summary on exit.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use scan_detect::{
    config::{Config, OutputConfig, ScannerConfig},
    keyboard::{
        virtual_send, InputEvent, KeyCode, KeyboardListener, PollStatus, TerminalListener,
        VirtualScanner,
    },
    ScanEvent, ScanStats, Scanner,
};

/// Longest the main loop sleeps before checking timers again
const TICK: Duration = Duration::from_millis(50);

/// Global listener poll interval; must stay well below scanner key intervals
const GLOBAL_POLL: Duration = Duration::from_millis(1);

type CliScanner = Scanner<mpsc::Receiver<InputEvent>, mpsc::Sender<ScanEvent>>;

/// detect barcode scanner input among ordinary typing
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// read settings from this file instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// where keyboard events come from
    #[clap(short = 's', long, value_enum, default_value_t = Source::Terminal)]
    source: Source,

    /// print one JSON object per line
    #[clap(long)]
    json: bool,

    /// type BARCODE as a virtual scanner (needs the virtual-send feature)
    #[clap(long, value_name = "BARCODE")]
    send_test: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// keys typed into this terminal, including pastes
    Terminal,
    /// every key on the system, polled from the OS
    Global,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(barcode) = &cli.send_test {
        return send_test(barcode);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    if cli.json {
        config.output.json = true;
    }

    let (input_tx, input_rx) = mpsc::channel::<InputEvent>();
    let (scan_tx, scan_rx) = mpsc::channel::<ScanEvent>();

    let mut scanner = Scanner::new(config.scanner.clone(), scan_tx)?;
    scanner.attach(input_rx)?;

    let mut reporter = Reporter::new(config.output.clone());
    match cli.source {
        Source::Terminal => run_terminal(&mut scanner, input_tx, &scan_rx, &mut reporter)?,
        Source::Global => run_global(&mut scanner, input_tx, &scan_rx, &mut reporter)?,
    }
    scanner.detach();

    // Raw mode is off again, plain newlines from here
    reporter.raw = false;
    reporter.print_summary();
    Ok(())
}

fn run_terminal(
    scanner: &mut CliScanner,
    input_tx: mpsc::Sender<InputEvent>,
    scan_rx: &mpsc::Receiver<ScanEvent>,
    reporter: &mut Reporter,
) -> Result<()> {
    let mut listener = TerminalListener::new(input_tx).context("entering raw mode")?;
    let releases = listener.reports_releases();
    if let Some(warning) = release_warning(scanner.detector().config(), releases) {
        log::warn!("{}", warning);
    }
    reporter.raw = true;
    reporter.notice("Listening on this terminal, Ctrl+C to quit");

    loop {
        if listener.poll(wait_time(scanner))? == PollStatus::Quit {
            break;
        }
        scanner.pump(Instant::now())?;
        reporter.drain(scan_rx);
    }
    Ok(())
}

fn run_global(
    scanner: &mut CliScanner,
    input_tx: mpsc::Sender<InputEvent>,
    scan_rx: &mpsc::Receiver<ScanEvent>,
    reporter: &mut Reporter,
) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("installing Ctrl+C handler")?;

    let mut listener = KeyboardListener::new(input_tx);
    reporter.notice("Listening to all keyboard input, Ctrl+C to quit");

    while running.load(Ordering::SeqCst) {
        listener.poll();
        scanner.pump(Instant::now())?;
        reporter.drain(scan_rx);
        thread::sleep(GLOBAL_POLL);
    }
    Ok(())
}

/// Long presses need key releases, which plain terminals never report
fn release_warning(config: &ScannerConfig, reports_releases: bool) -> Option<String> {
    match config.scan_button_code {
        Some(code) if !reports_releases => Some(format!(
            "terminal does not report key releases; scan button {} will register \
             one long press and then stay held (try --source global)",
            KeyCode(code)
        )),
        _ => None,
    }
}

/// Time until the scanner next needs attention, capped at [`TICK`]
fn wait_time(scanner: &CliScanner) -> Duration {
    scanner
        .next_deadline()
        .map(|deadline| deadline.saturating_duration_since(Instant::now()))
        .map_or(TICK, |wait| wait.min(TICK))
}

fn send_test(barcode: &str) -> Result<()> {
    if !VirtualScanner::is_available() {
        bail!("built without the virtual-send feature");
    }
    if barcode.is_empty() {
        bail!("nothing to send");
    }

    println!("Sending {:?} in 1 second, focus the target window", barcode);
    thread::sleep(Duration::from_secs(1));

    VirtualScanner::new(virtual_send::DEFAULT_KEY_INTERVAL)
        .send_scan(barcode)
        .map_err(anyhow::Error::msg)?;
    println!("Sent.");
    Ok(())
}

/// Prints scan outcomes and keeps the session statistics
struct Reporter {
    output: OutputConfig,
    stats: ScanStats,
    /// Terminal is in raw mode and needs explicit carriage returns
    raw: bool,
}

impl Reporter {
    fn new(output: OutputConfig) -> Self {
        Self {
            output,
            stats: ScanStats::new(),
            raw: false,
        }
    }

    fn drain(&mut self, scan_rx: &mpsc::Receiver<ScanEvent>) {
        while let Ok(event) = scan_rx.try_recv() {
            self.stats.record(&event);
            if let Some(line) = self.format(&event) {
                self.print(&line);
            }
        }
    }

    fn format(&self, event: &ScanEvent) -> Option<String> {
        if self.output.json {
            return self.format_json(event).map(|value| value.to_string());
        }

        let body = match event {
            ScanEvent::Scanned(scan) => format!(
                "SCAN {} x{} ({} ms)",
                scan.text,
                scan.quantity,
                scan.duration.as_millis()
            ),
            ScanEvent::Rejected { reason, details } if self.output.show_rejected => format!(
                "REJECTED {:?}: {} ({} chars in {} ms)",
                details.candidate,
                reason,
                details.length(),
                details.duration.as_millis()
            ),
            ScanEvent::LongPress => "LONG PRESS".to_string(),
            _ => return None,
        };

        if self.output.timestamps {
            Some(format!(
                "[{}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                body
            ))
        } else {
            Some(body)
        }
    }

    fn format_json(&self, event: &ScanEvent) -> Option<serde_json::Value> {
        let mut value = match event {
            ScanEvent::Scanned(scan) => json!({
                "event": "scan",
                "text": scan.text,
                "quantity": scan.quantity,
                "duration_ms": scan.duration.as_millis() as u64,
            }),
            ScanEvent::Rejected { reason, details } if self.output.show_rejected => json!({
                "event": "rejected",
                "reason": reason.as_str(),
                "candidate": details.candidate,
                "length": details.length(),
                "duration_ms": details.duration.as_millis() as u64,
            }),
            ScanEvent::LongPress => json!({ "event": "long_press" }),
            _ => return None,
        };

        if self.output.timestamps {
            value["timestamp"] = json!(chrono::Local::now().to_rfc3339());
        }
        Some(value)
    }

    fn notice(&self, message: &str) {
        // Keep stdout machine-readable in JSON mode
        if self.output.json {
            log::info!("{}", message);
        } else {
            self.print(message);
        }
    }

    fn print(&self, line: &str) {
        let ending = if self.raw { "\r\n" } else { "\n" };
        let mut out = stdout().lock();
        let _ = write!(out, "{}{}", line, ending);
        let _ = out.flush();
    }

    fn print_summary(&self) {
        if self.output.json {
            let summary: serde_json::Map<String, serde_json::Value> = self
                .stats
                .summary_lines()
                .into_iter()
                .map(|line| (line.label, json!(line.value)))
                .collect();
            self.print(&json!({ "event": "summary", "stats": summary }).to_string());
            return;
        }

        self.print("");
        self.print("scan-detect session complete.");
        for line in self.stats.summary_lines() {
            self.print(&format!("{:<14} {}", format!("{}:", line.label), line.value));
        }
    }
}
