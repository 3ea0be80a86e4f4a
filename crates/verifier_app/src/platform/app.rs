use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use chrono::Local;
use verifier_core::{update, AppState, Effect, Msg};
use verifier_engine::{EngineHandle, HistoryStore, ReqwestBackend};
use verifier_logging::{verifier_info, verifier_warn};

use super::config::{self, AppConfig};
use super::effects::EffectRunner;
use super::input::{self, Command, ParseError};
use super::{logging, render};

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Core(Msg),
    Line(String),
    InputClosed,
}

enum Flow {
    Continue,
    Exit,
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG));
    let loaded = config::load(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        Ok(None) | Err(_) => AppConfig::default(),
    };
    logging::initialize(config.log_destination);
    match loaded {
        Ok(Some(_)) => verifier_info!("loaded config from {}", config_path.display()),
        Ok(None) => verifier_info!("no config at {}; using defaults", config_path.display()),
        Err(err) => verifier_warn!("{err:#}; using defaults"),
    }

    let backend = ReqwestBackend::new(config.client_settings())
        .with_context(|| format!("configuring backend {}", config.base_url))?;
    let engine = EngineHandle::new(Arc::new(backend)).context("starting engine worker")?;
    let history = HistoryStore::new(
        config.storage_dir.clone(),
        Arc::new(|| Local::now().to_rfc3339()),
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(engine, history, event_tx.clone());
    spawn_stdin_reader(event_tx);

    let mut app = App {
        state: AppState::new(),
        runner,
        out: io::stdout(),
    };
    app.print(input::HELP.iter().map(|line| line.to_string()))?;
    if let Flow::Exit = app.dispatch(Msg::FormAttached(config.initial_values()))? {
        return Ok(());
    }

    while let Ok(event) = event_rx.recv() {
        let flow = match event {
            AppEvent::Core(msg) => app.dispatch(msg)?,
            AppEvent::Line(line) => app.command(&line)?,
            AppEvent::InputClosed => Flow::Exit,
        };
        if let Flow::Exit = flow {
            break;
        }
    }
    verifier_info!("verifier session ended");
    Ok(())
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if event_tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

struct App {
    state: AppState,
    runner: EffectRunner,
    out: io::Stdout,
}

impl App {
    fn command(&mut self, line: &str) -> io::Result<Flow> {
        match input::parse(line) {
            Ok(Command::Form(msgs)) => {
                for msg in msgs {
                    if let Flow::Exit = self.dispatch(msg)? {
                        return Ok(Flow::Exit);
                    }
                }
                Ok(Flow::Continue)
            }
            Ok(Command::Show) => {
                self.print(render::render(&self.state.view()))?;
                Ok(Flow::Continue)
            }
            Ok(Command::History) => {
                let log = self.runner.history().load();
                self.print(render::render_history(&log))?;
                Ok(Flow::Continue)
            }
            Ok(Command::Help) => {
                self.print(input::HELP.iter().map(|line| line.to_string()))?;
                Ok(Flow::Continue)
            }
            Ok(Command::Quit) => Ok(Flow::Exit),
            Err(ParseError::Empty) => Ok(Flow::Continue),
            Err(err) => {
                self.print([format!("? {err}")])?;
                Ok(Flow::Continue)
            }
        }
    }

    /// One turn of the update loop: apply, run effects, re-render if dirty.
    fn dispatch(&mut self, msg: Msg) -> io::Result<Flow> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let host_effects = self.runner.run(effects);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;

        let mut flow = Flow::Continue;
        for effect in host_effects {
            match effect {
                Effect::FocusField(field) => {
                    verifier_info!("focus moved to {}", field.name());
                }
                Effect::Navigate { target } => {
                    verifier_info!("navigating away to {target}");
                    self.print([format!("→ Weiterleitung zu {target}")])?;
                    flow = Flow::Exit;
                }
                other => verifier_warn!("unexpected host effect {other:?}"),
            }
        }
        if let (Flow::Continue, Some(view)) = (&flow, view) {
            self.print(render::render(&view))?;
        }
        Ok(flow)
    }

    fn print<I>(&mut self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out = self.out.lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}
