//! Application orchestration layer
//!
//! `Application` owns the game session: the engine, the gesture resolver, and the lifecycle
//! coordinator. Resolver and coordinator borrow the engine for each call, so there is exactly
//! one writer per piece of engine state. Input actions arrive in order over a channel from the
//! input thread and are interleaved with animation ticks on a single task.

use crate::config::Config;
use crate::engine::maze::EngineEvent;
use crate::engine::{Engine, LifecycleSnapshot, MazeEngine};
use crate::error::Result;
use crate::input::{GestureResolver, InputAction};
use crate::lifecycle::LifecycleCoordinator;
use crate::persist::SnapshotStore;
use crate::ui::{UIRenderer, ViewState};
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;

/// Game session coordinator
pub struct Application {
    engine: MazeEngine,
    resolver: GestureResolver,
    lifecycle: LifecycleCoordinator,
    store: Option<SnapshotStore>,
    ui_renderer: Box<dyn UIRenderer>,
    view_state: ViewState,
    tick: Duration,
}

impl Application {
    /// Build a session from configuration, restoring the saved game unless `fresh` is set.
    pub fn new(config: &Config, ui_renderer: Box<dyn UIRenderer>, fresh: bool) -> Result<Self> {
        let store = SnapshotStore::new(config.snapshot_path());
        let saved = if fresh {
            store.clear()?;
            None
        } else {
            match store.load() {
                Ok(saved) => saved.filter(|snapshot| !snapshot.is_empty()),
                Err(err) => {
                    warn!("ignoring unreadable snapshot {}: {}", store.path().display(), err);
                    None
                }
            }
        };

        Self::with_engine(
            MazeEngine::new()?,
            Some(store),
            saved.as_ref(),
            ui_renderer,
            config.tick(),
        )
    }

    /// Wire an existing engine into a session. `saved` is restored into it on create.
    pub fn with_engine(
        mut engine: MazeEngine,
        store: Option<SnapshotStore>,
        saved: Option<&LifecycleSnapshot>,
        ui_renderer: Box<dyn UIRenderer>,
        tick: Duration,
    ) -> Result<Self> {
        let lifecycle = LifecycleCoordinator::create(&mut engine, saved);
        let (width, height) = ui_renderer.get_terminal_size()?;
        let mut view_state = ViewState::new(width, height);
        view_state.sync_from(&engine);

        Ok(Self {
            engine,
            resolver: GestureResolver::new(),
            lifecycle,
            store,
            ui_renderer,
            view_state,
            tick,
        })
    }

    pub fn engine(&self) -> &MazeEngine {
        &self.engine
    }

    pub fn lifecycle(&self) -> &LifecycleCoordinator {
        &self.lifecycle
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    /// Run the game loop until quit, until the input channel closes, or until the process is
    /// asked to terminate.
    pub async fn run(&mut self, actions: UnboundedReceiver<InputAction>) -> Result<()> {
        self.run_until(actions, termination()).await
    }

    /// Run the game loop until quit, until the input channel closes, or until `stop` resolves.
    ///
    /// The session is checkpointed and destroyed on every exit, including errors. The first
    /// error encountered is returned.
    pub async fn run_until<F>(
        &mut self,
        mut actions: UnboundedReceiver<InputAction>,
        stop: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let outcome = self.event_loop(&mut actions, stop).await;
        if let Err(ref err) = outcome {
            warn!("game loop failed: {}", err);
        }
        let saved = self.shutdown();
        let cleaned = self.ui_renderer.cleanup();
        outcome.and(saved).and(cleaned)
    }

    async fn event_loop<F>(
        &mut self,
        actions: &mut UnboundedReceiver<InputAction>,
        stop: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        self.ui_renderer.initialize()?;
        self.lifecycle.resume(&mut self.engine)?;
        self.render()?;

        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(stop);

        let mut running = true;
        while running {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    info!("termination requested");
                    running = false;
                }
                action = actions.recv() => {
                    running = match action {
                        Some(action) => self.handle_action(action)?,
                        None => {
                            info!("input channel closed");
                            false
                        }
                    };
                }
                _ = ticker.tick() => self.on_tick(),
            }
            if running {
                self.render()?;
            }
        }
        Ok(())
    }

    /// Apply one input action. Returns false when the player asked to quit.
    pub fn handle_action(&mut self, action: InputAction) -> Result<bool> {
        match action {
            InputAction::Quit => return Ok(false),
            InputAction::Fling(sample) => {
                let direction = self.resolver.fling(&mut self.engine, sample);
                self.view_state.last_direction = direction;
            }
            InputAction::Key(code) => {
                if self.resolver.key(&mut self.engine, code) {
                    self.view_state.last_direction = self.resolver.last();
                } else {
                    debug!("unhandled key {:?}", code);
                }
            }
            InputAction::Menu(command) => match command.engine_command() {
                Some(engine_command) => {
                    self.engine.send_command(engine_command);
                    self.view_state.status_line.clear_message();
                }
                None => self.view_state.show_about = true,
            },
            InputAction::DismissDialog => self.view_state.show_about = false,
            InputAction::FocusLost => self.enter_background()?,
            InputAction::FocusGained => {
                self.lifecycle.resume(&mut self.engine)?;
                self.view_state.paused = false;
            }
            InputAction::Resize { width, height } => {
                self.view_state.update_terminal_size(width, height);
            }
            InputAction::NoAction => {}
        }
        Ok(true)
    }

    /// Advance the ball animation by one step.
    pub fn on_tick(&mut self) {
        match self.engine.tick() {
            Some(EngineEvent::GoalReached { remaining }) => {
                self.view_state
                    .status_line
                    .set_message(format!("Goal! {} to go", remaining));
            }
            Some(EngineEvent::MapCompleted { name, moves }) => {
                self.view_state
                    .status_line
                    .set_message(format!("Cleared {} in {} moves", name, moves));
            }
            None => {}
        }
    }

    /// Pause and checkpoint together, as the host does when it loses visibility.
    fn enter_background(&mut self) -> Result<()> {
        self.lifecycle.pause(&mut self.engine)?;
        let snapshot = self.lifecycle.checkpoint(&mut self.engine)?;
        self.view_state.paused = true;
        if let Err(err) = self.persist(&snapshot) {
            warn!("checkpoint not saved: {}", err);
            self.view_state
                .status_line
                .set_message("Could not save progress".to_string());
        }
        Ok(())
    }

    /// Final checkpoint, then destroy. The snapshot is written after the engine is released.
    fn shutdown(&mut self) -> Result<()> {
        self.lifecycle.pause(&mut self.engine)?;
        let snapshot = self.lifecycle.checkpoint(&mut self.engine)?;
        self.lifecycle.destroy(&mut self.engine);
        info!("session ended on map {}", self.engine.map_index());
        self.persist(&snapshot)
    }

    fn persist(&self, snapshot: &LifecycleSnapshot) -> Result<()> {
        match &self.store {
            Some(store) => store.save(snapshot),
            None => Ok(()),
        }
    }

    fn render(&mut self) -> Result<()> {
        self.view_state.sync_from(&self.engine);
        self.ui_renderer.render(&self.view_state)
    }
}

/// Resolves when the process receives a hangup, terminate, or interrupt signal.
async fn termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let handlers = (
            signal(SignalKind::hangup()),
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        );
        let (Ok(mut hangup), Ok(mut terminate), Ok(mut interrupt)) = handlers else {
            warn!("signal handlers unavailable; only quit and focus loss save the game");
            return std::future::pending().await;
        };
        tokio::select! {
            _ = hangup.recv() => info!("received SIGHUP"),
            _ = terminate.recv() => info!("received SIGTERM"),
            _ = interrupt.recv() => info!("received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("signal handlers unavailable; only quit and focus loss save the game");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::maps::MazeMap;
    use crate::engine::{Direction, EngineCommand};
    use crate::error::TiltMazeError;
    use crate::input::{GestureSample, MenuCommand};
    use crate::lifecycle::LifecycleState;
    use crate::ui::MockUIRenderer;
    use ratatui::crossterm::event::KeyCode;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn maps() -> Vec<MazeMap> {
        vec![
            MazeMap::parse("corridor", "#######\n#O...x#\n#.#####\n#x....#\n#######").unwrap(),
            MazeMap::parse("second", "#####\n#O.x#\n#####").unwrap(),
        ]
    }

    fn app(store: Option<SnapshotStore>, saved: Option<&LifecycleSnapshot>) -> Application {
        Application::with_engine(
            MazeEngine::with_maps(maps()).unwrap(),
            store,
            saved,
            Box::new(MockUIRenderer::new()),
            Duration::from_millis(5),
        )
        .unwrap()
    }

    fn settle(app: &mut Application) {
        for _ in 0..16 {
            app.on_tick();
        }
    }

    #[test]
    fn arrow_key_rolls_ball_while_foregrounded() {
        let mut app = app(None, None);
        app.lifecycle.resume(&mut app.engine).unwrap();

        assert!(app.handle_action(InputAction::Key(KeyCode::Down)).unwrap());
        settle(&mut app);
        assert_eq!(app.engine().ball(), (1, 3));
        assert_eq!(app.view_state().last_direction, Direction::Down);
    }

    #[test]
    fn unhandled_key_does_not_move() {
        let mut app = app(None, None);
        app.lifecycle.resume(&mut app.engine).unwrap();
        app.handle_action(InputAction::Key(KeyCode::Char('z'))).unwrap();
        settle(&mut app);
        assert_eq!(app.engine().ball(), (1, 1));
        assert_eq!(app.view_state().last_direction, Direction::None);
    }

    #[test]
    fn fling_collects_goal_and_reports_it() {
        let mut app = app(None, None);
        app.lifecycle.resume(&mut app.engine).unwrap();
        app.handle_action(InputAction::Fling(GestureSample::new(250.0, -40.0)))
            .unwrap();
        settle(&mut app);
        assert_eq!(app.engine().ball(), (5, 1));
        assert_eq!(app.engine().remaining_goals(), 1);
        assert_eq!(
            app.view_state().status_line.message.as_deref(),
            Some("Goal! 1 to go")
        );
    }

    #[test]
    fn focus_loss_freezes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.toml"));
        let mut app = app(Some(store.clone()), None);
        app.lifecycle.resume(&mut app.engine).unwrap();

        app.handle_action(InputAction::Key(KeyCode::Right)).unwrap();
        app.on_tick();
        app.handle_action(InputAction::FocusLost).unwrap();
        assert_eq!(app.lifecycle().state(), LifecycleState::Background);
        assert!(!app.engine().is_listening());
        assert!(app.view_state().paused);

        let frozen = app.engine().ball();
        settle(&mut app);
        assert_eq!(app.engine().ball(), frozen);

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, app.engine().save_state());

        app.handle_action(InputAction::FocusGained).unwrap();
        settle(&mut app);
        assert_eq!(app.engine().ball(), (5, 1));
    }

    #[test]
    fn menu_commands_reach_engine_and_dialog() {
        let mut app = app(None, None);
        app.handle_action(InputAction::Menu(MenuCommand::MapNext))
            .unwrap();
        assert_eq!(app.engine().map_index(), 1);

        app.handle_action(InputAction::Menu(MenuCommand::About))
            .unwrap();
        assert!(app.view_state().show_about);
        app.handle_action(InputAction::DismissDialog).unwrap();
        assert!(!app.view_state().show_about);

        assert!(!app.handle_action(InputAction::Quit).unwrap());
    }

    #[tokio::test]
    async fn run_checkpoints_and_destroys_on_quit() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.toml"));
        let mut app = app(Some(store.clone()), None);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(InputAction::Menu(MenuCommand::MapNext)).unwrap();
        tx.send(InputAction::Quit).unwrap();

        app.run_until(rx, std::future::pending()).await.unwrap();

        assert_eq!(app.lifecycle().state(), LifecycleState::Destroyed);
        assert!(!app.engine().is_listening());
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.int("map"), Some(1));
    }

    #[tokio::test]
    async fn run_checkpoints_when_input_channel_closes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.toml"));
        let mut app = app(Some(store.clone()), None);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(InputAction::Menu(MenuCommand::MapNext)).unwrap();
        drop(tx);

        app.run_until(rx, std::future::pending()).await.unwrap();

        assert_eq!(app.lifecycle().state(), LifecycleState::Destroyed);
        assert!(!app.engine().is_listening());
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, app.engine().save_state());
        assert_eq!(saved.int("map"), Some(1));
    }

    #[tokio::test]
    async fn run_checkpoints_when_stop_fires() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.toml"));
        let mut app = app(Some(store.clone()), None);

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(InputAction::Menu(MenuCommand::MapNext)).unwrap();

        let stop = tokio::time::sleep(Duration::from_millis(20));
        app.run_until(rx, stop).await.unwrap();
        drop(tx);

        assert_eq!(app.lifecycle().state(), LifecycleState::Destroyed);
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.int("map"), Some(1));
    }

    /// Renderer that fails on the nth call to `render` and records cleanup.
    struct FailingRenderer {
        renders: usize,
        fail_on: usize,
        cleaned: Arc<AtomicBool>,
    }

    impl UIRenderer for FailingRenderer {
        fn render(&mut self, _view_state: &ViewState) -> Result<()> {
            self.renders += 1;
            if self.renders == self.fail_on {
                return Err(TiltMazeError::ui("draw failed"));
            }
            Ok(())
        }

        fn initialize(&mut self) -> Result<()> {
            Ok(())
        }

        fn cleanup(&mut self) -> Result<()> {
            self.cleaned.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn get_terminal_size(&self) -> Result<(u16, u16)> {
            Ok((80, 24))
        }
    }

    #[tokio::test]
    async fn render_failure_still_checkpoints_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.toml"));
        let cleaned = Arc::new(AtomicBool::new(false));
        let renderer = FailingRenderer {
            renders: 0,
            fail_on: 2,
            cleaned: Arc::clone(&cleaned),
        };
        let mut app = Application::with_engine(
            MazeEngine::with_maps(maps()).unwrap(),
            Some(store.clone()),
            None,
            Box::new(renderer),
            Duration::from_millis(5),
        )
        .unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(InputAction::Menu(MenuCommand::MapNext)).unwrap();

        let result = app.run_until(rx, std::future::pending()).await;
        drop(tx);

        assert!(matches!(result, Err(TiltMazeError::UIError { .. })));
        assert_eq!(app.lifecycle().state(), LifecycleState::Destroyed);
        assert!(!app.engine().is_listening());
        assert!(cleaned.load(Ordering::SeqCst));
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved, app.engine().save_state());
        assert_eq!(saved.int("map"), Some(1));
    }

    #[test]
    fn status_line_shows_moves_and_last_roll() {
        let mut app = app(None, None);
        app.lifecycle.resume(&mut app.engine).unwrap();
        app.handle_action(InputAction::Key(KeyCode::Down)).unwrap();
        app.render().unwrap();
        assert_eq!(
            app.view_state().format_status_line(),
            "corridor (1/2) | goals: 2 | moves: 1 | last: down"
        );
    }

    #[test]
    fn saved_game_is_restored_on_create() {
        let mut source = MazeEngine::with_maps(maps()).unwrap();
        source.send_command(EngineCommand::MapNext);
        let saved = source.save_state();

        let app = app(None, Some(&saved));
        assert_eq!(app.engine().map_index(), 1);
        assert_eq!(app.view_state().maze_name, "second");
    }
}
