//! GNOME theme source backed by the dconf settings store.
//!
//! GNOME has no push notification for GTK theme changes that works
//! everywhere, so this source watches the directory holding the dconf
//! database and, whenever the database file is written, asks the desktop's
//! own settings tool for the current theme name. Any write to the database
//! fires the watcher, so the name is compared with the last one seen and
//! the registered callback only runs when it actually changed.
//!
//! # Commands
//!
//! - `gsettings get org.gnome.desktop.interface gtk-theme` (preferred)
//! - `dconf read /org/gnome/desktop/interface/gtk-theme`
//!
//! Both print the name in single quotes, e.g. `'Adwaita-dark'`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use directories::BaseDirs;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use parking_lot::Mutex;
use themewatch_core::logging::targets;
use themewatch_core::{HandleId, NotificationCallback, SourceKind, ThemeSource, ThemeState};

use super::command::{CommandRunner, SystemCommandRunner};
use crate::error::{SourceError, SourceResult};
use crate::settings::GnomeSettings;
use crate::variants::guess_variants;

/// The dconf database file inside the watched directory.
const SETTINGS_STORE_FILE: &str = "user";

/// Which settings tool answers theme queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeQuery {
    Gsettings,
    Dconf,
}

impl ThemeQuery {
    pub fn program(self) -> &'static str {
        match self {
            ThemeQuery::Gsettings => "gsettings",
            ThemeQuery::Dconf => "dconf",
        }
    }

    pub fn args(self) -> &'static [&'static str] {
        match self {
            ThemeQuery::Gsettings => &["get", "org.gnome.desktop.interface", "gtk-theme"],
            ThemeQuery::Dconf => &["read", "/org/gnome/desktop/interface/gtk-theme"],
        }
    }

    /// Pick the first available tool.
    fn probe(runner: &dyn CommandRunner) -> SourceResult<Self> {
        [ThemeQuery::Gsettings, ThemeQuery::Dconf]
            .into_iter()
            .find(|query| runner.exists(query.program()))
            .ok_or_else(|| {
                SourceError::missing_command([
                    ThemeQuery::Gsettings.program(),
                    ThemeQuery::Dconf.program(),
                ])
            })
    }
}

/// Strip the quoting and whitespace the settings tools print.
pub fn parse_theme_name(stdout: &str) -> Option<String> {
    let name = stdout.replace('\'', "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Map a GTK theme name to a theme state.
///
/// When guessing, the theme is dark iff it is its own guessed night variant
/// and high contrast is never reported. Otherwise the configured names
/// decide.
pub fn classify_theme(name: &str, settings: &GnomeSettings) -> ThemeState {
    if settings.guess_light_and_dark_themes {
        ThemeState::new(guess_variants(name).is_night(), false)
    } else {
        ThemeState::new(
            name == settings.dark_theme,
            name == settings.high_contrast_theme,
        )
    }
}

/// Returns true if any of `paths` is the settings store file.
fn touches_settings_store<'a>(mut paths: impl Iterator<Item = &'a Path>) -> bool {
    paths.any(|path| path.file_name().is_some_and(|name| name == SETTINGS_STORE_FILE))
}

/// Remembers the last theme name seen by a watch thread.
#[derive(Debug, Default)]
struct ThemeNameTracker {
    last: Option<String>,
}

impl ThemeNameTracker {
    /// Record `name`, returning true if it differs from the previous one.
    fn observe(&mut self, name: String) -> bool {
        if self.last.as_deref() == Some(name.as_str()) {
            return false;
        }
        self.last = Some(name);
        true
    }
}

/// State shared between the source and its watch thread.
struct GnomeShared {
    runner: Arc<dyn CommandRunner>,
    query: ThemeQuery,
    settings: GnomeSettings,
}

impl GnomeShared {
    fn current_theme(&self) -> Option<String> {
        let program = self.query.program();
        let output = match self.runner.run(program, self.query.args()) {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(target: targets::GNOME, program, error = %err, "Could not run theme query");
                return None;
            }
        };

        if !output.is_success() {
            tracing::error!(
                target: targets::GNOME,
                program,
                exit_code = output.exit_code,
                stdout = %output.stdout.trim(),
                stderr = %output.stderr.trim(),
                "Theme query failed"
            );
            return None;
        }

        parse_theme_name(&output.stdout)
    }

    fn current_state(&self) -> ThemeState {
        self.current_theme()
            .map(|name| classify_theme(&name, &self.settings))
            .unwrap_or_default()
    }
}

struct Listener {
    handle: HandleId,
    stopping: Arc<AtomicBool>,
    debouncer: Option<Debouncer<RecommendedWatcher>>,
    thread: Option<JoinHandle<()>>,
}

impl Listener {
    fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    fn shut_down(mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        // Dropping the debouncer closes the event channel and wakes the thread.
        drop(self.debouncer.take());

        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == std::thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                tracing::error!(target: targets::GNOME, handle = %self.handle, "Settings store watch thread panicked");
            }
        }
    }
}

/// Watches the dconf database and queries the GTK theme name.
pub struct GnomePollingSource {
    shared: Arc<GnomeShared>,
    watch_dir: PathBuf,
    debounce: Duration,
    listener: Mutex<Option<Listener>>,
    next_handle: AtomicU64,
}

impl GnomePollingSource {
    /// Create a source using the system settings tools and `~/.config/dconf`.
    pub fn new(settings: &GnomeSettings) -> SourceResult<Self> {
        let watch_dir = Self::default_watch_dir()
            .ok_or_else(|| SourceError::unsupported("Could not determine the home directory"))?;
        Self::with_runner(settings, Arc::new(SystemCommandRunner), watch_dir)
    }

    /// Create a source with an explicit command runner and watch directory.
    ///
    /// Fails if neither `gsettings` nor `dconf` is available.
    pub fn with_runner(
        settings: &GnomeSettings,
        runner: Arc<dyn CommandRunner>,
        watch_dir: impl Into<PathBuf>,
    ) -> SourceResult<Self> {
        let query = ThemeQuery::probe(runner.as_ref())?;
        let watch_dir = watch_dir.into();
        tracing::debug!(
            target: targets::GNOME,
            program = query.program(),
            watch_dir = %watch_dir.display(),
            "Created GNOME polling source"
        );

        Ok(Self {
            shared: Arc::new(GnomeShared {
                runner,
                query,
                settings: settings.clone(),
            }),
            watch_dir,
            debounce: settings.debounce(),
            listener: Mutex::new(None),
            next_handle: AtomicU64::new(0),
        })
    }

    /// `<config dir>/dconf`, if a home directory is known.
    pub fn default_watch_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.config_dir().join("dconf"))
    }

    /// The settings tool this source queries.
    pub fn query(&self) -> ThemeQuery {
        self.shared.query
    }

    /// The directory being watched.
    pub fn watch_dir(&self) -> &Path {
        &self.watch_dir
    }

    /// The current GTK theme name, or `None` if the query failed.
    pub fn current_theme(&self) -> Option<String> {
        self.shared.current_theme()
    }

    fn spawn_listener(&self, callback: NotificationCallback) -> SourceResult<Listener> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(self.debounce, tx)
            .map_err(|err| SourceError::watch(&self.watch_dir, err.to_string()))?;
        debouncer
            .watcher()
            .watch(&self.watch_dir, RecursiveMode::NonRecursive)
            .map_err(|err| SourceError::watch(&self.watch_dir, err.to_string()))?;

        let handle = HandleId::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        let stopping = Arc::new(AtomicBool::new(false));
        let thread = std::thread::Builder::new()
            .name("themewatch-gnome".to_string())
            .spawn({
                let shared = Arc::clone(&self.shared);
                let stopping = Arc::clone(&stopping);
                move || {
                    watch_loop(rx, &shared, &stopping, &callback);
                }
            })?;

        Ok(Listener {
            handle,
            stopping,
            debouncer: Some(debouncer),
            thread: Some(thread),
        })
    }
}

/// Why a watch loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchExit {
    /// The event channel closed after a stop was requested.
    Stopped,
    /// The event channel closed on its own.
    Disconnected,
}

fn watch_loop(
    rx: Receiver<DebounceEventResult>,
    shared: &GnomeShared,
    stopping: &AtomicBool,
    callback: &NotificationCallback,
) -> WatchExit {
    let mut tracker = ThemeNameTracker::default();
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                if !touches_settings_store(events.iter().map(|event| event.path.as_path())) {
                    continue;
                }
                tracing::trace!(target: targets::GNOME, "Settings store changed");
                if let Some(name) = shared.current_theme()
                    && tracker.observe(name)
                {
                    tracing::debug!(target: targets::GNOME, theme = ?tracker.last, "GTK theme changed");
                    callback();
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(target: targets::GNOME, error = ?err, "Settings store watch error");
            }
            Err(_) => {
                if stopping.load(Ordering::SeqCst) {
                    tracing::debug!(target: targets::GNOME, "Settings store watch closed");
                    return WatchExit::Stopped;
                }
                tracing::error!(
                    target: targets::GNOME,
                    "Settings store watch closed unexpectedly; theme changes will no longer be detected"
                );
                return WatchExit::Disconnected;
            }
        }
    }
}

impl ThemeSource for GnomePollingSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GnomePolling
    }

    fn is_dark_theme_enabled(&self) -> bool {
        self.shared.current_state().dark
    }

    fn is_high_contrast_enabled(&self) -> bool {
        self.shared.current_state().high_contrast
    }

    fn state(&self) -> ThemeState {
        self.shared.current_state()
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        let mut listener = self.listener.lock();
        if let Some(existing) = listener.as_ref() {
            tracing::error!(
                target: targets::GNOME,
                handle = %existing.handle,
                "Settings store is already being watched"
            );
            return HandleId::NONE;
        }

        match self.spawn_listener(callback) {
            Ok(spawned) => {
                let handle = spawned.handle;
                tracing::debug!(target: targets::GNOME, %handle, "Watching settings store");
                *listener = Some(spawned);
                handle
            }
            Err(err) => {
                tracing::error!(target: targets::GNOME, error = %err, "Could not watch settings store");
                HandleId::NONE
            }
        }
    }

    fn delete_event_handler(&self, handle: HandleId) {
        let listener = {
            let mut listener = self.listener.lock();
            match listener.as_ref() {
                Some(current) if current.handle == handle && !handle.is_none() => listener.take(),
                _ => None,
            }
        };

        match listener {
            Some(listener) => listener.shut_down(),
            None => tracing::trace!(target: targets::GNOME, %handle, "Ignoring unknown handle"),
        }
    }

    fn is_available(&self) -> bool {
        self.is_active()
    }

    fn is_active(&self) -> bool {
        match self.listener.lock().as_ref() {
            Some(listener) => listener.is_alive(),
            None => true,
        }
    }
}

impl Drop for GnomePollingSource {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.shut_down();
        }
    }
}

impl std::fmt::Debug for GnomePollingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GnomePollingSource")
            .field("query", &self.shared.query)
            .field("watch_dir", &self.watch_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::linux::command::CommandOutput;
    use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind};
    use std::collections::VecDeque;
    use std::io;
    use std::time::Instant;
    use themewatch_core::DelegatingSource;

    /// Scripted runner: `exists` answers from a fixed list, `run` pops
    /// queued outputs and repeats the last one.
    struct ScriptedRunner {
        programs: Vec<&'static str>,
        outputs: Mutex<VecDeque<CommandOutput>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(programs: &[&'static str], outputs: &[CommandOutput]) -> Arc<Self> {
            Arc::new(Self {
                programs: programs.to_vec(),
                outputs: Mutex::new(outputs.iter().cloned().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn set_theme(&self, name: &str) {
            *self.outputs.lock() = VecDeque::from([CommandOutput::success(format!("'{name}'\n"))]);
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            self.calls.lock().push(format!("{program} {}", args.join(" ")));
            let mut outputs = self.outputs.lock();
            let output = if outputs.len() > 1 {
                outputs.pop_front()
            } else {
                outputs.front().cloned()
            };
            output.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no output scripted"))
        }

        fn exists(&self, program: &str) -> bool {
            self.programs.contains(&program)
        }
    }

    fn theme(name: &str) -> CommandOutput {
        CommandOutput::success(format!("'{name}'\n"))
    }

    #[test]
    fn test_missing_commands_fail_construction() {
        let runner = ScriptedRunner::new(&[], &[]);
        let err = GnomePollingSource::with_runner(&GnomeSettings::default(), runner, "/tmp")
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingCommand { .. }));
    }

    #[test]
    fn test_prefers_gsettings() {
        let runner = ScriptedRunner::new(&["dconf", "gsettings"], &[theme("Adwaita-dark")]);
        let source =
            GnomePollingSource::with_runner(&GnomeSettings::default(), runner.clone(), "/tmp")
                .unwrap();
        assert_eq!(source.query(), ThemeQuery::Gsettings);
        assert!(source.is_dark_theme_enabled());
        assert_eq!(
            runner.calls.lock()[0],
            "gsettings get org.gnome.desktop.interface gtk-theme"
        );
    }

    #[test]
    fn test_falls_back_to_dconf() {
        let runner = ScriptedRunner::new(&["dconf"], &[theme("Adwaita")]);
        let source =
            GnomePollingSource::with_runner(&GnomeSettings::default(), runner.clone(), "/tmp")
                .unwrap();
        assert_eq!(source.query(), ThemeQuery::Dconf);
        assert!(!source.is_dark_theme_enabled());
        assert_eq!(
            runner.calls.lock()[0],
            "dconf read /org/gnome/desktop/interface/gtk-theme"
        );
    }

    #[test]
    fn test_parse_theme_name() {
        assert_eq!(parse_theme_name("'Adwaita-dark'\n"), Some("Adwaita-dark".to_string()));
        assert_eq!(parse_theme_name("  Yaru  "), Some("Yaru".to_string()));
        assert_eq!(parse_theme_name("''\n"), None);
    }

    #[test]
    fn test_failed_query_degrades_to_light() {
        let failure = CommandOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "No such schema".to_string(),
        };
        let runner = ScriptedRunner::new(&["gsettings"], &[failure]);
        let source =
            GnomePollingSource::with_runner(&GnomeSettings::default(), runner, "/tmp").unwrap();
        assert_eq!(source.current_theme(), None);
        assert_eq!(source.state(), ThemeState::default());
    }

    #[test]
    fn test_classify_guessing() {
        let settings = GnomeSettings::default();
        assert_eq!(classify_theme("Adwaita", &settings), ThemeState::new(false, false));
        assert_eq!(classify_theme("Arc-Dark", &settings), ThemeState::new(true, false));
        // Guessing never reports high contrast.
        assert_eq!(classify_theme("HighContrast", &settings), ThemeState::new(false, false));
    }

    #[test]
    fn test_classify_configured_names() {
        let settings = GnomeSettings {
            guess_light_and_dark_themes: false,
            dark_theme: "Yaru-dark".to_string(),
            ..GnomeSettings::default()
        };
        assert_eq!(classify_theme("Yaru-dark", &settings), ThemeState::new(true, false));
        assert_eq!(classify_theme("Adwaita-dark", &settings), ThemeState::new(false, false));
        assert_eq!(classify_theme("HighContrast", &settings), ThemeState::new(false, true));
    }

    #[test]
    fn test_settings_store_filter() {
        let paths = [PathBuf::from("/home/u/.config/dconf/user.LK3X"), PathBuf::from("/home/u/.config/dconf/user")];
        assert!(touches_settings_store(paths.iter().map(PathBuf::as_path)));
        assert!(!touches_settings_store(paths[..1].iter().map(PathBuf::as_path)));
        assert!(!touches_settings_store(std::iter::empty()));
    }

    #[test]
    fn test_tracker_reports_only_changes() {
        let mut tracker = ThemeNameTracker::default();
        assert!(tracker.observe("Adwaita".to_string()));
        assert!(!tracker.observe("Adwaita".to_string()));
        assert!(tracker.observe("Adwaita-dark".to_string()));
    }

    fn store_events(names: &[&str]) -> DebounceEventResult {
        Ok(names
            .iter()
            .map(|name| DebouncedEvent {
                path: PathBuf::from("/home/u/.config/dconf").join(name),
                kind: DebouncedEventKind::Any,
            })
            .collect())
    }

    fn shared_with(runner: Arc<ScriptedRunner>) -> GnomeShared {
        GnomeShared {
            runner,
            query: ThemeQuery::Gsettings,
            settings: GnomeSettings::default(),
        }
    }

    fn counting_callback() -> (NotificationCallback, Arc<AtomicU64>) {
        let fired = Arc::new(AtomicU64::new(0));
        let fired_clone = fired.clone();
        let callback: NotificationCallback = Arc::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        (callback, fired)
    }

    #[test]
    fn test_watch_loop_filters_and_dedups_by_name() {
        let runner = ScriptedRunner::new(&["gsettings"], &[theme("Adwaita")]);
        let shared = shared_with(runner.clone());
        let (callback, fired) = counting_callback();
        let (tx, rx) = mpsc::channel();

        // Lock files and unrelated writes never trigger a query.
        tx.send(store_events(&["user.LK3X", "other"])).unwrap();
        // First name seen notifies, the same name again does not.
        tx.send(store_events(&["user"])).unwrap();
        tx.send(store_events(&["user.LK3X", "user"])).unwrap();
        // Watch errors are logged and skipped.
        tx.send(Err(notify::Error::generic("overflow"))).unwrap();
        drop(tx);

        let stopping = AtomicBool::new(false);
        assert_eq!(watch_loop(rx, &shared, &stopping, &callback), WatchExit::Disconnected);
        assert_eq!(runner.calls.lock().len(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_watch_loop_reports_name_change() {
        let runner = ScriptedRunner::new(
            &["gsettings"],
            &[theme("Adwaita"), theme("Adwaita-dark"), theme("Adwaita-dark")],
        );
        let shared = shared_with(runner.clone());
        let (callback, fired) = counting_callback();
        let (tx, rx) = mpsc::channel();

        for _ in 0..3 {
            tx.send(store_events(&["user"])).unwrap();
        }
        drop(tx);

        let stopping = AtomicBool::new(true);
        assert_eq!(watch_loop(rx, &shared, &stopping, &callback), WatchExit::Stopped);
        assert_eq!(runner.calls.lock().len(), 3);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_watch_loop_failed_query_does_not_notify() {
        let failure = CommandOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "dconf unavailable".to_string(),
        };
        let runner = ScriptedRunner::new(&["gsettings"], &[failure]);
        let shared = shared_with(runner.clone());
        let (callback, fired) = counting_callback();
        let (tx, rx) = mpsc::channel();

        tx.send(store_events(&["user"])).unwrap();
        drop(tx);

        let stopping = AtomicBool::new(false);
        assert_eq!(watch_loop(rx, &shared, &stopping, &callback), WatchExit::Disconnected);
        assert_eq!(runner.calls.lock().len(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_wrapped_source_queries_once_per_state() {
        let runner = ScriptedRunner::new(&["gsettings"], &[theme("Adwaita-dark")]);
        let source =
            GnomePollingSource::with_runner(&GnomeSettings::default(), runner.clone(), "/tmp")
                .unwrap();

        assert_eq!(source.state(), ThemeState::new(true, false));
        assert_eq!(runner.calls.lock().len(), 1);

        let wrapped: Box<dyn ThemeSource> = Box::new(DelegatingSource::new(source));
        assert_eq!(wrapped.state(), ThemeState::new(true, false));
        assert_eq!(runner.calls.lock().len(), 2);
    }

    #[test]
    fn test_dead_watch_thread_reports_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(&["gsettings"], &[theme("Adwaita")]);
        let settings = GnomeSettings {
            debounce_ms: 10,
            ..GnomeSettings::default()
        };
        let source = GnomePollingSource::with_runner(&settings, runner, dir.path()).unwrap();

        let handle = source.create_event_handler(Arc::new(|| {}));
        assert!(!handle.is_none());
        assert!(source.is_active());

        // Close the event channel without asking the thread to stop.
        drop(
            source
                .listener
                .lock()
                .as_mut()
                .and_then(|listener| listener.debouncer.take()),
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while source.is_active() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(!source.is_active());
        assert!(!source.is_available());

        source.delete_event_handler(handle);
        assert!(source.is_active());
    }

    #[test]
    fn test_register_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(&["gsettings"], &[theme("Adwaita")]);
        let source =
            GnomePollingSource::with_runner(&GnomeSettings::default(), runner, dir.path()).unwrap();

        assert!(source.is_active());
        let handle = source.create_event_handler(Arc::new(|| {}));
        assert!(!handle.is_none());
        assert!(source.is_active());

        // Only one watch at a time.
        assert!(source.create_event_handler(Arc::new(|| {})).is_none());

        source.delete_event_handler(handle);
        source.delete_event_handler(handle);
        source.delete_event_handler(HandleId::NONE);
        assert!(source.is_available());

        // A fresh registration gets a fresh handle.
        let second = source.create_event_handler(Arc::new(|| {}));
        assert!(!second.is_none());
        assert_ne!(second, handle);
        source.delete_event_handler(second);
    }

    #[test]
    fn test_missing_watch_dir_fails_registration() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(&["gsettings"], &[theme("Adwaita")]);
        let source = GnomePollingSource::with_runner(
            &GnomeSettings::default(),
            runner,
            dir.path().join("missing"),
        )
        .unwrap();

        assert!(source.create_event_handler(Arc::new(|| {})).is_none());
        assert!(source.is_active());
    }

    #[test]
    #[ignore] // Depends on filesystem notification timing
    fn test_settings_store_write_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new(&["gsettings"], &[theme("Adwaita")]);
        let settings = GnomeSettings::default();
        let source =
            GnomePollingSource::with_runner(&settings, runner.clone(), dir.path()).unwrap();

        let fired = Arc::new(AtomicU64::new(0));
        let fired_clone = fired.clone();
        let handle = source.create_event_handler(Arc::new(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        std::fs::write(dir.path().join("user"), b"one").unwrap();
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Same theme name: the write is ignored.
        std::fs::write(dir.path().join("user"), b"two").unwrap();
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        runner.set_theme("Adwaita-dark");
        std::fs::write(dir.path().join("user"), b"three").unwrap();
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        // Unrelated files never trigger a query.
        std::fs::write(dir.path().join("other"), b"x").unwrap();
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(fired.load(Ordering::SeqCst), 2);

        source.delete_event_handler(handle);
    }
}
