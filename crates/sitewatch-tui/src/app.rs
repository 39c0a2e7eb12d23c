//! Application core — event loop, input handling, action dispatch.
//!
//! Ownership discipline: the [`Monitor`] mutates the roster and checking
//! flag, the [`HistoryCache`] mutates its entries, and this module mutates
//! only the expansion set, selection, and notification toast. Every handled
//! event or action is followed by a redraw, so no state change is ever left
//! un-rendered.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use sitewatch_core::{
    CheckOutcome, CoreError, ExpansionState, HistoryCache, Monitor, SiteKey, classify,
};

use crate::action::{Action, Notification};
use crate::event::{Event, EventReader};
use crate::tui::Tui;
use crate::ui::{self, CardRegion, CardView, View};

/// How long a notification toast stays in the footer.
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// Top-level application state and event loop.
pub struct App {
    monitor: Monitor,
    history: HistoryCache,
    expansion: ExpansionState,
    /// Index of the keyboard-selected card.
    selected: usize,
    running: bool,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Card screen regions from the last draw, for mouse hit-testing.
    card_regions: Vec<CardRegion>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancels the background tasks on shutdown.
    cancel: CancellationToken,
}

impl App {
    pub fn new(monitor: Monitor, history: HistoryCache) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            monitor,
            history,
            expansion: ExpansionState::new(),
            selected: 0,
            running: true,
            notification: None,
            card_regions: Vec::new(),
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        self.spawn_state_bridge();
        self.spawn_startup();

        let mut events = EventReader::new(Duration::from_millis(250));
        self.draw(&mut tui)?;
        info!("event loop started");

        while self.running {
            tokio::select! {
                Some(event) = events.next() => self.handle_event(event),
                Some(action) = self.action_rx.recv() => self.handle_action(action),
            }
            self.draw(&mut tui)?;
        }

        events.stop();
        self.cancel.cancel();
        tui.exit()
    }

    // ── Background tasks ─────────────────────────────────────────────

    /// Forward monitor change notifications into the action loop so
    /// background mutations (checking flag, merge results) redraw.
    fn spawn_state_bridge(&self) {
        let mut rx = self.monitor.subscribe();
        let tx = self.action_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() || tx.send(Action::StateChanged).is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Startup sequence: load the roster (drawn via the state bridge),
    /// then auto-trigger the first check if anything was loaded.
    fn spawn_startup(&self) {
        let monitor = self.monitor.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match monitor.load_roster().await {
                Ok(sites) if sites.is_empty() => {
                    let _ = tx.send(Action::Notify(Notification::warning("no sites configured")));
                }
                Ok(sites) => {
                    let _ = tx.send(Action::Notify(Notification::info(format!(
                        "monitoring {} sites",
                        sites.len()
                    ))));
                    report_check(monitor.check_all().await, &tx);
                }
                Err(e) => {
                    let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
                }
            }
        });
    }

    /// Run one manual check in the background. The monitor's own
    /// single-flight guard makes rapid re-triggers harmless.
    fn trigger_check(&self) {
        let monitor = self.monitor.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            report_check(monitor.check_all().await, &tx);
        });
    }

    // ── Input handling ───────────────────────────────────────────────

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            // The next draw picks up the new size.
            Event::Resize(_, _) => {}
            Event::Tick => self.expire_notification(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('r') => self.trigger_check(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.monitor.roster().len();
                self.selected = (self.selected + 1).min(count.saturating_sub(1));
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(site) = self.monitor.roster().get(self.selected) {
                    self.toggle_card(SiteKey::from(site));
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        // Only clicks on a card's main rows toggle — clicks on history
        // rows resolve to the card but must not re-toggle it.
        if let Some((key, main)) = ui::hit_test(&self.card_regions, mouse.row) {
            if main {
                self.toggle_card(key.clone());
            }
        }
    }

    /// Toggle one card. Expanding an identity whose history is not yet
    /// cached issues exactly one fetch; the card shows the loading
    /// presentation until it lands. Collapsing never evicts the entry.
    fn toggle_card(&mut self, key: SiteKey) {
        let expanded = self.expansion.toggle(&key);
        debug!(site = %key, expanded, "toggled card");

        if expanded && self.history.peek(&key).is_none() {
            let history = self.history.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                history.get(&key).await;
                let _ = tx.send(Action::HistoryLoaded(key));
            });
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            // Redraw follows every handled action; nothing else to do.
            Action::StateChanged => {}
            Action::HistoryLoaded(key) => debug!(site = %key, "history ready"),
            Action::Notify(notice) => self.notification = Some((notice, Instant::now())),
        }
    }

    fn expire_notification(&mut self) {
        if let Some((_, shown_at)) = &self.notification {
            if shown_at.elapsed() > NOTIFICATION_TTL {
                self.notification = None;
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let view = self.build_view();
        let mut regions = Vec::new();
        tui.terminal.draw(|frame| {
            regions = ui::render(frame, &view);
        })?;
        self.card_regions = regions;
        Ok(())
    }

    /// Project the current state into the renderer's view model.
    fn build_view(&mut self) -> View {
        let checking = self.monitor.is_checking();
        let roster = self.monitor.roster();
        self.selected = self.selected.min(roster.len().saturating_sub(1));

        let cards = roster
            .iter()
            .map(|site| {
                let key = SiteKey::from(site);
                let expanded = self.expansion.is_expanded(&key);
                let history = expanded.then(|| self.history.peek(&key)).flatten();
                CardView {
                    base_url: site.base_url.clone(),
                    status: classify(site, checking),
                    expanded,
                    history,
                    key,
                }
            })
            .collect();

        View {
            cards,
            checking,
            last_check: self.monitor.last_check(),
            selected: self.selected,
            notification: self.notification.as_ref().map(|(n, _)| n.clone()),
        }
    }
}

/// Map a check outcome onto user-facing notices. Successful checks stay
/// quiet — the merged results speak for themselves on the next draw.
/// Transient backend failures get a warning toast; anything else an error.
fn report_check(result: Result<CheckOutcome, CoreError>, tx: &mpsc::UnboundedSender<Action>) {
    match result {
        Ok(CheckOutcome::Completed { merged }) => debug!(merged, "check completed"),
        Ok(CheckOutcome::AlreadyChecking) => debug!("duplicate check request ignored"),
        Ok(CheckOutcome::NoEnabledSites) => {
            let _ = tx.send(Action::Notify(Notification::warning(
                "no sites with checks enabled",
            )));
        }
        Err(e) if e.is_transient() => {
            let _ = tx.send(Action::Notify(Notification::warning(e.to_string())));
        }
        Err(e) => {
            let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
        }
    }
}
