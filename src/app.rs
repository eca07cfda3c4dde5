use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rand::RngCore;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::confetti::Confetti;
use crate::journey::effects::{EffectKind, EffectScheduler, Timings};
use crate::journey::{stage, IconSet, Stage, LAST_STAGE};
use crate::ui::layout::{Hit, JourneyLayout};

/// How long the progress fill takes to catch up with a stage change
const PROGRESS_SLIDE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Progress bar fill, easing from the previous stage's ratio to the current one
#[derive(Debug, Clone, Copy)]
pub struct ProgressSlide {
    from: f64,
    to: f64,
    started: Instant,
}

impl ProgressSlide {
    fn settled(ratio: f64, now: Instant) -> Self {
        Self {
            from: ratio,
            to: ratio,
            started: now,
        }
    }

    fn retarget(&mut self, to: f64, now: Instant) {
        self.from = self.ratio(now);
        self.to = to;
        self.started = now;
    }

    pub fn ratio(&self, now: Instant) -> f64 {
        let t = now.saturating_duration_since(self.started).as_secs_f64()
            / PROGRESS_SLIDE.as_secs_f64();
        let t = t.clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - t).powi(3);
        self.from + (self.to - self.from) * eased
    }
}

/// Fill ratio for `index`: 0.0 at the first stage, 1.0 at the last
pub fn stage_ratio(index: usize) -> f64 {
    index.min(LAST_STAGE) as f64 / LAST_STAGE as f64
}

/// Owner of the walkthrough state. Rendering only ever reads it.
pub struct App {
    pub current_stage: usize,
    pub show_message: bool,
    pub show_confetti: bool,
    pub hovered: Option<usize>,
    pub popup: Popup,
    pub should_quit: bool,
    pub launched_at: Instant,

    // When the bubble last became visible (drives the entrance animation)
    pub message_shown_at: Option<Instant>,
    pub confetti: Option<Confetti>,
    pub progress: ProgressSlide,

    pub icons: IconSet,
    pub hotel_name: String,
    pub marketing_url: String,

    confetti_enabled: bool,
    confetti_count: usize,
    effects: EffectScheduler,
    rng: Box<dyn RngCore>,
}

impl App {
    /// Must be called from within a tokio runtime: entering the first stage
    /// arms its delayed effects.
    pub fn new(config: &AppConfig, confetti_enabled: bool) -> Self {
        Self::with_rng(config, confetti_enabled, Box::new(rand::thread_rng()))
    }

    pub fn with_rng(config: &AppConfig, confetti_enabled: bool, rng: Box<dyn RngCore>) -> Self {
        let now = Instant::now();
        let start = config.start_stage.min(LAST_STAGE);

        let mut app = Self {
            current_stage: start,
            show_message: false,
            show_confetti: false,
            hovered: None,
            popup: Popup::None,
            should_quit: false,
            launched_at: now,

            message_shown_at: None,
            confetti: None,
            progress: ProgressSlide::settled(stage_ratio(start), now),

            icons: config.icons,
            hotel_name: config.hotel_name.clone(),
            marketing_url: config.marketing_url.clone(),

            confetti_enabled,
            confetti_count: config.confetti_count,
            effects: EffectScheduler::new(config.timings()),
            rng,
        };

        app.enter_stage(now);
        app
    }

    pub fn stage(&self) -> &'static Stage {
        stage(self.current_stage)
    }

    pub fn timings(&self) -> Timings {
        self.effects.timings()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_stage > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.current_stage < LAST_STAGE
    }

    /// Stage markers at or before the current stage are drawn active
    pub fn is_reached(&self, index: usize) -> bool {
        index <= self.current_stage
    }

    pub fn go_previous(&mut self) {
        if self.can_go_previous() {
            self.change_stage(self.current_stage - 1);
        }
    }

    pub fn go_next(&mut self) {
        if self.can_go_next() {
            self.change_stage(self.current_stage + 1);
        }
    }

    /// Jump straight to any stage. Selecting the stage already shown replays
    /// its entrance.
    pub fn select_stage(&mut self, index: usize) {
        let index = index.min(LAST_STAGE);
        self.change_stage(index);
        self.raise_confetti(Instant::now());
    }

    pub fn hover(&mut self, index: usize) {
        self.hovered = Some(index.min(LAST_STAGE));
    }

    pub fn unhover(&mut self) {
        self.hovered = None;
    }

    fn change_stage(&mut self, index: usize) {
        let now = Instant::now();
        tracing::debug!(
            from = self.stage().title,
            to = stage(index).title,
            "stage change"
        );
        self.current_stage = index;
        self.progress.retarget(stage_ratio(index), now);
        self.enter_stage(now);
    }

    /// Hide the bubble, raise confetti and re-arm the delayed effects
    fn enter_stage(&mut self, now: Instant) {
        self.show_message = false;
        self.message_shown_at = None;
        self.raise_confetti(now);
        self.effects.rearm();
    }

    fn raise_confetti(&mut self, now: Instant) {
        // A burst still in flight keeps falling; an empty layer gets a fresh batch
        if self.confetti.is_none() && self.confetti_enabled {
            self.confetti = Some(Confetti::mount(self.confetti_count, &mut *self.rng, now));
        }
        self.show_confetti = true;
    }

    /// Apply any delayed effects that came due
    pub fn tick(&mut self) {
        let now = Instant::now();
        for effect in self.effects.drain_due() {
            match effect {
                EffectKind::RevealMessage => {
                    self.show_message = true;
                    self.message_shown_at = Some(now);
                }
                EffectKind::ClearConfetti => {
                    self.show_confetti = false;
                    self.confetti = None;
                }
            }
        }

        // Nothing left in flight; the flag stays up until its window closes
        if self.confetti.as_ref().is_some_and(|c| c.finished(now)) {
            self.confetti = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.popup == Popup::Help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
            ) {
                self.popup = Popup::None;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,

            KeyCode::Left | KeyCode::Char('h') => self.go_previous(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.go_next(),
            KeyCode::Home => self.select_stage(0),
            KeyCode::End => self.select_stage(LAST_STAGE),

            // 1-6 jump to a stage
            KeyCode::Char(c @ '1'..='6') => self.select_stage(c as usize - '1' as usize),

            KeyCode::Char('?') => self.popup = Popup::Help,
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, layout: &JourneyLayout) {
        if self.popup != Popup::None {
            if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                self.popup = Popup::None;
            }
            return;
        }

        let hit = layout.hit(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => match hit {
                Some(Hit::Marker(i)) => self.hover(i),
                _ => self.unhover(),
            },
            MouseEventKind::Down(MouseButton::Left) => match hit {
                Some(Hit::Marker(i)) => self.select_stage(i),
                Some(Hit::Previous) => self.go_previous(),
                Some(Hit::Next) => self.go_next(),
                None => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::STAGE_COUNT;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::layout::Rect;
    use tokio::time::sleep;

    const REVEAL: Duration = Duration::from_millis(300);
    const WINDOW: Duration = Duration::from_millis(3000);
    const SLACK: Duration = Duration::from_millis(10);

    fn app() -> App {
        App::with_rng(
            &AppConfig::default(),
            true,
            Box::new(StdRng::seed_from_u64(3)),
        )
    }

    /// App with the launch effects already played out
    async fn settled_app() -> App {
        let mut app = app();
        sleep(WINDOW + SLACK).await;
        app.tick();
        assert!(app.show_message);
        assert!(!app.show_confetti);
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_plays_entrance() {
        let mut app = app();
        assert_eq!(app.current_stage, 0);
        assert!(!app.show_message);
        assert!(app.show_confetti);
        assert!(app.confetti.is_some());

        sleep(REVEAL + SLACK).await;
        app.tick();
        assert!(app.show_message);
        assert!(app.message_shown_at.is_some());
        assert!(app.show_confetti);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_every_stage() {
        let mut app = app();
        for i in 0..STAGE_COUNT {
            app.select_stage(i);
            assert_eq!(app.current_stage, i);
            assert_eq!(app.stage().title, STAGES_TITLES[i]);
        }
    }

    const STAGES_TITLES: [&str; STAGE_COUNT] = [
        "Guest has booked",
        "Pre-arrival",
        "Arrival",
        "In-stay",
        "Departure",
        "Post-departure",
    ];

    #[tokio::test(start_paused = true)]
    async fn test_previous_clamps_at_first_stage() {
        let mut app = settled_app().await;
        assert!(!app.can_go_previous());
        app.go_previous();
        assert_eq!(app.current_stage, 0);
        // Clamped no-op leaves the display alone
        assert!(app.show_message);
        assert!(!app.show_confetti);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_clamps_at_last_stage() {
        let mut app = app();
        app.select_stage(LAST_STAGE);
        assert_eq!(app.stage().title, "Post-departure");
        app.go_next();
        assert_eq!(app.current_stage, LAST_STAGE);
        assert!(!app.can_go_next());
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_steps_forward_reach_in_stay() {
        let mut app = app();
        app.go_next();
        app.go_next();
        app.go_next();
        assert_eq!(app.current_stage, 3);
        assert_eq!(app.stage().title, "In-stay");
        assert_eq!(app.stage().message, crate::journey::STAGES[3].message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_is_a_free_jump() {
        let mut app = app();
        app.select_stage(4);
        assert_eq!(app.current_stage, 4);
        app.select_stage(1);
        assert_eq!(app.current_stage, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_hides_then_reveals_message() {
        let mut app = settled_app().await;

        app.go_next();
        assert!(!app.show_message);
        assert!(app.show_confetti);

        sleep(REVEAL - SLACK).await;
        app.tick();
        assert!(!app.show_message);

        sleep(SLACK * 2).await;
        app.tick();
        assert!(app.show_message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_transition_suppresses_first_reveal() {
        let mut app = settled_app().await;

        app.go_next();
        sleep(Duration::from_millis(200)).await;
        app.go_next();

        // First reveal was due at 300ms; the second isn't due until 500ms
        sleep(Duration::from_millis(150)).await;
        app.tick();
        assert!(!app.show_message);
        assert_eq!(app.current_stage, 2);

        sleep(Duration::from_millis(160)).await;
        app.tick();
        assert!(app.show_message);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confetti_window() {
        let mut app = settled_app().await;

        app.select_stage(2);
        assert!(app.show_confetti);
        assert!(app.confetti.is_some());

        sleep(WINDOW - SLACK).await;
        app.tick();
        assert!(app.show_confetti);

        sleep(SLACK * 2).await;
        app.tick();
        assert!(!app.show_confetti);
        assert!(app.confetti.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_transition_extends_confetti() {
        let mut app = settled_app().await;

        app.go_next();
        sleep(Duration::from_millis(2000)).await;
        app.go_next();

        // Past the first window, inside the second
        sleep(Duration::from_millis(1500)).await;
        app.tick();
        assert!(app.show_confetti);

        sleep(Duration::from_millis(1600)).await;
        app.tick();
        assert!(!app.show_confetti);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselecting_current_stage_replays_entrance() {
        let mut app = settled_app().await;

        app.select_stage(0);
        assert_eq!(app.current_stage, 0);
        assert!(app.show_confetti);
        assert!(!app.show_message);

        sleep(WINDOW + SLACK).await;
        app.tick();
        assert!(app.show_message);
        assert!(!app.show_confetti);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_change_after_batch_landed_mounts_new_batch() {
        let config = AppConfig {
            confetti_window_ms: 10_000,
            ..AppConfig::default()
        };
        let mut app = App::with_rng(&config, true, Box::new(StdRng::seed_from_u64(3)));

        // Every particle has landed but the window is still open
        sleep(Duration::from_millis(6100)).await;
        app.tick();
        assert!(app.show_confetti);
        assert!(app.confetti.is_none());

        app.go_next();
        assert!(app.show_confetti);
        let batch = app.confetti.as_ref().unwrap();
        assert!(batch.poses(Instant::now() + Duration::from_secs(1)).count() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_app_aborts_pending_effects() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let before = metrics.num_alive_tasks();

        let app = app();
        assert_eq!(metrics.num_alive_tasks(), before + 2);

        drop(app);
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(metrics.num_alive_tasks(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confetti_disabled_keeps_flag_semantics() {
        let mut app = App::with_rng(
            &AppConfig::default(),
            false,
            Box::new(StdRng::seed_from_u64(3)),
        );
        assert!(app.show_confetti);
        assert!(app.confetti.is_none());
        app.go_next();
        assert!(app.show_confetti);
        assert!(app.confetti.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_does_not_navigate() {
        let mut app = app();
        app.hover(4);
        assert_eq!(app.hovered, Some(4));
        assert_eq!(app.current_stage, 0);
        app.unhover();
        assert_eq!(app.hovered, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyboard_navigation() {
        let mut app = app();
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.current_stage, 2);
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.current_stage, 1);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.current_stage, 2);
        app.handle_key(key(KeyCode::Char('5')));
        assert_eq!(app.current_stage, 4);
        app.handle_key(key(KeyCode::End));
        assert_eq!(app.current_stage, LAST_STAGE);
        app.handle_key(key(KeyCode::Home));
        assert_eq!(app.current_stage, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_popup_swallows_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('?')));
        assert_eq!(app.popup, Popup::Help);

        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.current_stage, 0);

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.popup, Popup::None);
        assert!(!app.should_quit);

        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mouse_hover_and_click() {
        let mut app = app();
        let layout = JourneyLayout::new(Rect::new(0, 0, 120, 40));

        let marker = layout.markers[4];
        app.handle_mouse(mouse(MouseEventKind::Moved, marker.x + 1, marker.y + 1), &layout);
        assert_eq!(app.hovered, Some(4));
        assert_eq!(app.current_stage, 0);

        app.handle_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), marker.x + 1, marker.y + 1),
            &layout,
        );
        assert_eq!(app.current_stage, 4);

        let next = layout.next;
        app.handle_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), next.x + 1, next.y + 1),
            &layout,
        );
        assert_eq!(app.current_stage, 5);

        let prev = layout.previous;
        app.handle_mouse(
            mouse(MouseEventKind::Down(MouseButton::Left), prev.x + 1, prev.y + 1),
            &layout,
        );
        assert_eq!(app.current_stage, 4);

        app.handle_mouse(mouse(MouseEventKind::Moved, 0, 0), &layout);
        assert_eq!(app.hovered, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_slides_to_new_stage() {
        let mut app = app();
        let start = Instant::now();
        app.select_stage(LAST_STAGE);

        let early = app.progress.ratio(start + Duration::from_millis(100));
        assert!(early > 0.0 && early < 1.0);
        assert_eq!(app.progress.ratio(start + Duration::from_secs(1)), 1.0);
    }

    #[test]
    fn test_stage_ratio() {
        assert_eq!(stage_ratio(0), 0.0);
        assert_eq!(stage_ratio(LAST_STAGE), 1.0);
        assert!((stage_ratio(3) - 0.6).abs() < f64::EPSILON);
    }
}
