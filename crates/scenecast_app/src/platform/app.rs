use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cast_logging::cast_debug;
use scenecast_core::{
    update, JobKind, Msg, ReconcilerState, ReconcilerView, VideoOptions,
};
use scenecast_runner::{
    JobRunner, PushChannel, PushSink, ReqwestGenerationApi, RunnerConfig, StateStore,
};

use super::effects::{self, EffectRunner};
use super::logging::{self, LogDestination};
use super::persistence;

const CONFIG_FILENAME: &str = "scenecast.json";

/// Everything the main loop reacts to: reconciler messages plus the few
/// front-end-only commands (attach/detach simulate closing the popup).
pub(crate) enum AppEvent {
    Core(Msg),
    Render,
    Attach,
    Detach,
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    logging::initialize(LogDestination::File);

    let base_dir = std::env::current_dir()?;
    let store = Arc::new(StateStore::open(&base_dir)?);
    let config = RunnerConfig::load(&base_dir.join(CONFIG_FILENAME));
    let push = Arc::new(PushChannel::new());
    let push_sink: Arc<dyn PushSink> = push.clone();
    let runner = JobRunner::new(
        Arc::new(ReqwestGenerationApi::new()),
        store.clone(),
        push_sink,
        config,
    );

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let effects = EffectRunner::new(
        runner,
        store.clone(),
        event_tx.clone(),
        base_dir.join("output"),
    );

    let mut session = Session {
        state: None,
        effects,
        store,
        push,
        event_tx: event_tx.clone(),
    };
    session.attach();

    print_usage();
    spawn_stdin_reader(event_tx);

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Core(msg) => session.dispatch(msg),
            AppEvent::Render => session.render_current(),
            AppEvent::Attach => session.attach(),
            AppEvent::Detach => session.detach(),
            AppEvent::Quit => break,
        }
    }

    Ok(())
}

/// One attachment cycle of the front end. `state` is `None` while detached;
/// runner messages arriving in that window are dropped, the same way a
/// closed popup misses them. The store keeps the truth.
struct Session {
    state: Option<ReconcilerState>,
    effects: EffectRunner,
    store: Arc<StateStore>,
    push: Arc<PushChannel>,
    event_tx: Sender<AppEvent>,
}

impl Session {
    fn attach(&mut self) {
        let receiver = self.push.attach();
        let event_tx = self.event_tx.clone();
        thread::spawn(move || loop {
            match receiver.try_recv() {
                Ok(event) => {
                    let msg = Msg::PushReceived(effects::map_push(event));
                    if event_tx.send(AppEvent::Core(msg)).is_err() {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => thread::sleep(Duration::from_millis(20)),
                Err(TryRecvError::Disconnected) => break,
            }
        });

        self.state = Some(ReconcilerState::new());
        let draft = persistence::load_draft(&self.store);
        println!("[attached]");
        self.dispatch(Msg::Attached { draft });
    }

    fn detach(&mut self) {
        self.push.detach();
        self.effects.stop_polling();
        self.state = None;
        println!("[detached] jobs keep running; `attach` to reconcile");
    }

    fn dispatch(&mut self, msg: Msg) {
        let Some(state) = self.state.take() else {
            cast_debug!("Front end detached; dropping message");
            return;
        };
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = Some(state);
        self.effects.run(effects);
        if was_dirty {
            render(&view);
        }
    }

    fn render_current(&self) {
        match &self.state {
            Some(state) => render(&state.view()),
            None => println!("[detached]"),
        }
    }
}

fn render(view: &ReconcilerView) {
    if let Some(busy) = view.busy {
        println!("[busy] {busy} (cancel to dismiss)");
    }
    println!(
        "step {}/3 | captured: {} | image: {} | video: {}",
        view.step,
        if view.captured_image.is_some() { "yes" } else { "no" },
        view.transformed_url.as_deref().unwrap_or("-"),
        view.video_url.as_deref().unwrap_or("-"),
    );
}

fn spawn_stdin_reader(event_tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            let events = parse_line(&line);
            if events.is_empty() {
                print_usage();
                continue;
            }
            for event in events {
                if event_tx.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = event_tx.send(AppEvent::Quit);
    });
}

fn parse_line(line: &str) -> Vec<AppEvent> {
    let trimmed = line.trim();
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (trimmed, ""),
    };

    match command {
        "capture" if !rest.is_empty() => vec![AppEvent::Core(Msg::ViewCaptured {
            image: rest.to_string(),
        })],
        "transform" => {
            let mut events = Vec::new();
            if !rest.is_empty() {
                events.push(AppEvent::Core(Msg::PromptEdited {
                    kind: JobKind::Transform,
                    text: rest.to_string(),
                }));
            }
            events.push(AppEvent::Core(Msg::TransformRequested));
            events
        }
        "video" => {
            let mut events = Vec::new();
            if !rest.is_empty() {
                events.push(AppEvent::Core(Msg::PromptEdited {
                    kind: JobKind::Video,
                    text: rest.to_string(),
                }));
            }
            events.push(AppEvent::Core(Msg::VideoRequested));
            events
        }
        "options" => match parse_options(rest) {
            Some(options) => vec![AppEvent::Core(Msg::VideoOptionsEdited { options })],
            None => Vec::new(),
        },
        "download" => match rest {
            "image" => vec![AppEvent::Core(Msg::DownloadRequested {
                kind: JobKind::Transform,
            })],
            "video" => vec![AppEvent::Core(Msg::DownloadRequested {
                kind: JobKind::Video,
            })],
            _ => Vec::new(),
        },
        "status" => vec![AppEvent::Render],
        "cancel" => vec![AppEvent::Core(Msg::CancelRequested)],
        "reset" => vec![AppEvent::Core(Msg::ResetRequested)],
        "detach" => vec![AppEvent::Detach],
        "attach" => vec![AppEvent::Attach],
        "quit" | "exit" => vec![AppEvent::Quit],
        _ => Vec::new(),
    }
}

fn parse_options(rest: &str) -> Option<VideoOptions> {
    let mut parts = rest.split_whitespace();
    let duration = parts.next()?.to_string();
    let generate_audio = match parts.next() {
        Some("on") | None => true,
        Some("off") => false,
        Some(_) => return None,
    };
    Some(VideoOptions {
        duration,
        generate_audio,
    })
}

fn print_usage() {
    println!(
        "commands: capture <uri> | transform [prompt] | video [prompt] | \
         options <duration> [on|off] | status | cancel | reset | \
         download image|video | detach | attach | quit"
    );
}
