//! Session flow: screen phases, scoring, and intel breaks
//!
//! The frame driver calls [`Session::frame`] once per display refresh. The
//! session decides whether the simulation is live, turns simulation events
//! into score, and asks the host to fetch an intel briefing every
//! `INTEL_INTERVAL` points. Briefing fetches are asynchronous; each one is
//! tagged with a ticket so a result that arrives after the break is over (or
//! after a restart) is dropped.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::Viewport;
use crate::consts::{INTEL_INTERVAL, POINTS_PER_KILL};
use crate::highscore::HighScore;
use crate::intel::IntelBrief;
use crate::persistence::KeyValueStore;
use crate::sim::{GameEvent, GameState, TickInput, fire, tick};

/// Top-level screen phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    Start,
    /// Active gameplay
    Playing,
    /// Frozen while an intel briefing is shown
    FactBreak,
    /// Run ended
    GameOver,
}

/// Request for the host to fetch a briefing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRequest {
    pub ticket: u64,
    pub topic: String,
}

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    pub events: Vec<GameEvent>,
    pub fact_request: Option<FactRequest>,
    pub new_high_score: bool,
}

/// What the briefing overlay should display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefingView<'a> {
    Loading,
    Ready(&'a IntelBrief),
    /// Fetch gave up (watchdog) without a briefing; offer a manual continue
    Interrupted,
}

/// One player's run plus the persisted high score
pub struct Session<S: KeyValueStore> {
    state: GameState,
    phase: GamePhase,
    score: u64,
    high_score: HighScore,
    store: S,
    rng: Pcg32,
    fact_ticket: u64,
    fact: Option<IntelBrief>,
    fact_loading: bool,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(viewport: Viewport, seed: u64, store: S) -> Self {
        let high_score = HighScore::load(&store);
        Self {
            state: GameState::new(viewport),
            phase: GamePhase::Start,
            score: 0,
            high_score,
            store,
            rng: Pcg32::seed_from_u64(seed),
            fact_ticket: 0,
            fact: None,
            fact_loading: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.value
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rng_mut(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Begin a new run (from the title screen or after game over)
    pub fn start(&mut self) {
        self.score = 0;
        self.state.reset();
        self.phase = GamePhase::Playing;
        self.fact = None;
        self.fact_loading = false;
        // Orphan any briefing still in flight
        self.fact_ticket += 1;
        log::info!("Mission start (high score {})", self.high_score.value);
    }

    /// Pointer moved to `x`: steer, and try to fire while playing
    pub fn pointer_move(&mut self, x: f32, now_ms: f64) {
        self.state.player.target_x = x;
        self.pointer_click(now_ms);
    }

    /// Pointer pressed: try to fire while playing
    pub fn pointer_click(&mut self, now_ms: f64) {
        if self.phase == GamePhase::Playing {
            fire(&mut self.state, now_ms);
        }
    }

    /// Canvas resized
    pub fn resize(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    /// Run one simulation tick and apply its events
    pub fn frame(&mut self, now_ms: f64) -> FrameOutput {
        let input = TickInput {
            active: self.phase == GamePhase::Playing,
            score: self.score,
            now_ms,
        };
        let events = tick(&mut self.state, &input, &mut self.rng);

        let mut output = FrameOutput::default();
        for event in &events {
            match event {
                GameEvent::EnemyDestroyed { name, .. } => {
                    self.score += POINTS_PER_KILL;
                    if self.high_score.record(self.score, &mut self.store) {
                        output.new_high_score = true;
                    }
                    if self.phase == GamePhase::Playing
                        && self.score.is_multiple_of(INTEL_INTERVAL)
                    {
                        output.fact_request = Some(self.begin_fact_break(name));
                    }
                }
                GameEvent::GameOver => {
                    if matches!(self.phase, GamePhase::Playing | GamePhase::FactBreak) {
                        self.phase = GamePhase::GameOver;
                        self.fact_loading = false;
                        log::info!(
                            "Mission failed at {} (high score {})",
                            self.score,
                            self.high_score.value
                        );
                    }
                }
            }
        }
        output.events = events;
        output
    }

    fn begin_fact_break(&mut self, topic: &str) -> FactRequest {
        self.phase = GamePhase::FactBreak;
        self.fact_ticket += 1;
        self.fact = None;
        self.fact_loading = true;
        log::info!("Intel break at {} on {}", self.score, topic);
        FactRequest {
            ticket: self.fact_ticket,
            topic: topic.to_string(),
        }
    }

    /// Hand over a fetched briefing. Returns false if it arrived too late.
    pub fn deliver_fact(&mut self, ticket: u64, brief: IntelBrief) -> bool {
        if ticket != self.fact_ticket || self.phase != GamePhase::FactBreak {
            log::debug!("Discarding stale intel for ticket {}", ticket);
            return false;
        }
        self.fact = Some(brief);
        self.fact_loading = false;
        true
    }

    /// Stop waiting on the pending fetch. Ignored once the briefing has
    /// arrived or the break is over.
    pub fn fact_failed(&mut self, ticket: u64) {
        if ticket == self.fact_ticket && self.phase == GamePhase::FactBreak && self.fact.is_none()
        {
            log::warn!("Intel fetch timed out for ticket {}", ticket);
            self.fact_loading = false;
        }
    }

    /// Leave the briefing and return to combat
    pub fn resume(&mut self) {
        if self.phase == GamePhase::FactBreak {
            self.phase = GamePhase::Playing;
            self.fact = None;
            self.fact_loading = false;
        }
    }

    pub fn briefing(&self) -> Option<BriefingView<'_>> {
        if self.phase != GamePhase::FactBreak {
            return None;
        }
        Some(match (&self.fact, self.fact_loading) {
            (Some(brief), _) => BriefingView::Ready(brief),
            (None, true) => BriefingView::Loading,
            (None, false) => BriefingView::Interrupted,
        })
    }
}

/// Zero-padded 7 digit score for the HUD
pub fn format_score(score: u64) -> String {
    format!("{:07}", score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intel::{Category, ThreatLevel};
    use crate::persistence::MemoryStore;
    use crate::sim::{Enemy, EnemyKind, Projectile};

    fn session() -> Session<MemoryStore> {
        Session::new(Viewport::new(800.0, 600.0), 42, MemoryStore::new())
    }

    fn brief() -> IntelBrief {
        IntelBrief {
            topic: "Radar Cross Section".to_string(),
            fact: "Angled panels scatter radar energy away from the receiver.".to_string(),
            category: Category::FutureWarfare,
            fun_emoji: "📡".to_string(),
            threat_level: ThreatLevel::Medium,
        }
    }

    /// Stage a guaranteed kill and run one quiet frame
    fn kill_one(session: &mut Session<MemoryStore>, now_ms: f64) -> FrameOutput {
        let mut enemy = Enemy::new(EnemyKind::Recon, 100.0, 0.0);
        enemy.bounds.y = 100.0;
        session.state.enemies.push(enemy);
        session.state.projectiles.push(Projectile::new(120.0, 150.0));
        session.state.last_spawn_ms = now_ms;
        session.frame(now_ms)
    }

    #[test]
    fn test_start_screen_is_inert() {
        let mut s = session();
        assert_eq!(s.phase(), GamePhase::Start);
        s.pointer_click(1_000.0);
        let out = s.frame(5_000.0);
        assert!(out.events.is_empty());
        assert_eq!(s.state().entity_count(), 0);
    }

    #[test]
    fn test_each_kill_scores_fixed_points() {
        let mut s = session();
        s.start();
        let out = kill_one(&mut s, 10_000.0);
        assert_eq!(out.events.len(), 1);
        assert_eq!(s.score(), 100);
        assert!(out.fact_request.is_none());
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_fact_break_every_500_points() {
        let mut s = session();
        s.start();
        for i in 0..4 {
            assert!(kill_one(&mut s, 10_000.0 + i as f64).fact_request.is_none());
        }
        let out = kill_one(&mut s, 20_000.0);
        let request = out.fact_request.expect("break at 500");
        assert_eq!(request.topic, "X-1 Recon Drone");
        assert_eq!(s.phase(), GamePhase::FactBreak);
        assert_eq!(s.briefing(), Some(BriefingView::Loading));

        // Simulation frozen during the break
        s.state.projectiles.push(Projectile::new(300.0, 300.0));
        s.frame(30_000.0);
        assert_eq!(s.state().projectiles[0].bounds.y, 300.0);
        assert!(s.state().enemies.is_empty());

        assert!(s.deliver_fact(request.ticket, brief()));
        assert_eq!(s.briefing(), Some(BriefingView::Ready(&brief())));

        s.resume();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.briefing(), None);
    }

    #[test]
    fn test_pointer_fires_only_while_playing() {
        let mut s = session();
        s.start();
        s.pointer_move(200.0, 1_000.0);
        assert_eq!(s.state().projectiles.len(), 2);
        assert_eq!(s.state().player.target_x, 200.0);

        for i in 0..5 {
            kill_one(&mut s, 10_000.0 + i as f64);
        }
        assert_eq!(s.phase(), GamePhase::FactBreak);
        let before = s.state().projectiles.len();
        s.pointer_click(50_000.0);
        assert_eq!(s.state().projectiles.len(), before);
    }

    #[test]
    fn test_stale_fact_is_discarded_after_restart() {
        let mut s = session();
        s.start();
        let mut request = None;
        for i in 0..5 {
            request = kill_one(&mut s, 10_000.0 + i as f64).fact_request.or(request);
        }
        let request = request.unwrap();

        s.start();
        assert!(!s.deliver_fact(request.ticket, brief()));
        assert_eq!(s.phase(), GamePhase::Playing);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_failed_fetch_shows_interrupted() {
        let mut s = session();
        s.start();
        let mut ticket = 0;
        for i in 0..5 {
            if let Some(r) = kill_one(&mut s, 10_000.0 + i as f64).fact_request {
                ticket = r.ticket;
            }
        }
        s.fact_failed(ticket);
        assert_eq!(s.briefing(), Some(BriefingView::Interrupted));
        s.resume();
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_late_briefing_replaces_interrupted() {
        let mut s = session();
        s.start();
        let mut request = None;
        for i in 0..5 {
            request = kill_one(&mut s, 10_000.0 + i as f64).fact_request.or(request);
        }
        let request = request.unwrap();

        s.fact_failed(request.ticket);
        assert_eq!(s.briefing(), Some(BriefingView::Interrupted));

        assert!(s.deliver_fact(request.ticket, brief()));
        assert_eq!(s.briefing(), Some(BriefingView::Ready(&brief())));
    }

    #[test]
    fn test_timeout_after_delivery_is_ignored() {
        let mut s = session();
        s.start();
        let mut request = None;
        for i in 0..5 {
            request = kill_one(&mut s, 10_000.0 + i as f64).fact_request.or(request);
        }
        let request = request.unwrap();

        assert!(s.deliver_fact(request.ticket, brief()));
        s.fact_failed(request.ticket);
        assert_eq!(s.briefing(), Some(BriefingView::Ready(&brief())));

        // A watchdog firing after resume must not touch the next break
        s.resume();
        s.fact_failed(request.ticket);
        assert_eq!(s.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_collision_ends_run_once() {
        let mut s = session();
        s.start();
        let hull = s.state().player.bounds;
        let mut enemy = Enemy::new(EnemyKind::Heavy, hull.x, 0.0);
        enemy.bounds.y = hull.y;
        s.state.enemies.push(enemy);
        s.state.last_spawn_ms = 10_000.0;

        let out = s.frame(10_000.0);
        assert_eq!(out.events, vec![GameEvent::GameOver]);
        assert_eq!(s.phase(), GamePhase::GameOver);

        let out = s.frame(10_016.0);
        assert!(out.events.is_empty());

        s.start();
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.state().enemies.is_empty());
    }

    #[test]
    fn test_high_score_tracks_running_score() {
        let mut store = MemoryStore::new();
        store.set(HighScore::STORAGE_KEY, "150").unwrap();
        let mut s = Session::new(Viewport::new(800.0, 600.0), 1, store);
        assert_eq!(s.high_score(), 150);
        s.start();

        assert!(!kill_one(&mut s, 10_000.0).new_high_score);
        assert!(kill_one(&mut s, 10_001.0).new_high_score);
        assert_eq!(s.high_score(), 200);
        assert_eq!(s.store.get(HighScore::STORAGE_KEY).as_deref(), Some("200"));
    }

    #[test]
    fn test_format_score_pads() {
        assert_eq!(format_score(0), "0000000");
        assert_eq!(format_score(1500), "0001500");
    }
}
