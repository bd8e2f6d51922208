//! Presentation and input boundaries.
//!
//! Rendering, key hardware, and real time live behind these traits. The
//! engine only promises the draw/flip cadence, the armed response window,
//! and the announcement text; pair them with the step clock and scripted
//! responses and a whole run becomes a deterministic function of its seed.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::task::plan::Side;

/// Screen slots a scene can place a stimulus in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Left,
    Right,
    Centre,
    CentreTop,
    CentreBottom,
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

/// Content of one rendered frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub items: Vec<(String, Slot)>,
    /// Backdrop room shown during reveals.
    pub room: Option<String>,
    pub treasure: bool,
    /// Choice screens draw the two response containers.
    pub containers: bool,
}

impl Scene {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn of(items: Vec<(String, Slot)>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

/// Where frames go.
pub trait Screen {
    fn draw(&mut self, scene: &Scene);
    fn flip(&mut self);
    /// Instruction, feedback, or warning text held on screen by the caller.
    fn announce(&mut self, text: &str);
}

/// Discards frames and logs announcements. The headless default.
#[derive(Default)]
pub struct LogScreen;

impl Screen for LogScreen {
    fn draw(&mut self, _scene: &Scene) {}

    fn flip(&mut self) {}

    fn announce(&mut self, text: &str) {
        info!("{text}");
    }
}

/// Keeps everything it is shown, for assertions.
#[derive(Default)]
pub struct RecordingScreen {
    pub frames: Vec<Scene>,
    pub flips: usize,
    pub announcements: Vec<String>,
}

impl Screen for RecordingScreen {
    fn draw(&mut self, scene: &Scene) {
        // A frame may be drawn thousands of times; keep one copy per change.
        if self.frames.last() != Some(scene) {
            self.frames.push(scene.clone());
        }
    }

    fn flip(&mut self) {
        self.flips += 1;
    }

    fn announce(&mut self, text: &str) {
        self.announcements.push(text.to_string());
    }
}

/// Clonable handle over a [`RecordingScreen`], so frames stay readable
/// after a session has consumed the screen box.
#[derive(Clone, Default)]
pub struct SharedScreen {
    inner: Rc<RefCell<RecordingScreen>>,
}

impl SharedScreen {
    pub fn handle(&self) -> Rc<RefCell<RecordingScreen>> {
        Rc::clone(&self.inner)
    }
}

impl Screen for SharedScreen {
    fn draw(&mut self, scene: &Scene) {
        self.inner.borrow_mut().draw(scene);
    }

    fn flip(&mut self) {
        self.inner.borrow_mut().flip();
    }

    fn announce(&mut self, text: &str) {
        self.inner.borrow_mut().announce(text);
    }
}

/// A left/right press stamped with the window time it arrived at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Response {
    pub side: Side,
    pub at_seconds: f64,
}

/// Supplies responses to an armed window.
pub trait ResponseSource {
    /// Called once when a stage opens its window. Input queued before this
    /// point must not leak into the new window.
    fn arm(&mut self);

    fn poll(&mut self, now: f64) -> Option<Response>;
}

/// One scripted entry per armed window; `None` sits out the whole window.
pub struct ScriptedResponses {
    script: VecDeque<Option<(Side, f64)>>,
    armed: Option<(Side, f64)>,
}

impl ScriptedResponses {
    pub fn new(script: Vec<Option<(Side, f64)>>) -> Self {
        Self {
            script: script.into(),
            armed: None,
        }
    }
}

impl ResponseSource for ScriptedResponses {
    fn arm(&mut self) {
        self.armed = self.script.pop_front().flatten();
    }

    fn poll(&mut self, now: f64) -> Option<Response> {
        match self.armed {
            Some((side, at)) if now >= at => {
                self.armed = None;
                Some(Response {
                    side,
                    at_seconds: at,
                })
            }
            _ => None,
        }
    }
}

/// Seeded simulated participant for headless runs. Owns its rng so the
/// experiment stream stays untouched. Every armed window gets a response
/// time; draws past the window model lapses and surface as timeouts.
pub struct RandomResponder {
    rng: SmallRng,
    armed: Option<(Side, f64)>,
}

impl RandomResponder {
    const RT_LO: f64 = 0.3;
    const RT_HI: f64 = 2.4;

    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            armed: None,
        }
    }
}

impl ResponseSource for RandomResponder {
    fn arm(&mut self) {
        let side = if self.rng.random_bool(0.5) {
            Side::Left
        } else {
            Side::Right
        };
        let at = self.rng.random_range(Self::RT_LO..Self::RT_HI);
        self.armed = Some((side, at));
    }

    fn poll(&mut self, now: f64) -> Option<Response> {
        match self.armed {
            Some((side, at)) if now >= at => {
                self.armed = None;
                Some(Response {
                    side,
                    at_seconds: at,
                })
            }
            _ => None,
        }
    }
}

/// Stage timing reference, reset at each timed interval.
pub trait Clock {
    fn reset(&mut self);
    fn elapsed_seconds(&mut self) -> f64;
}

pub struct WallClock {
    origin: Instant,
}

impl Default for WallClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn reset(&mut self) {
        self.origin = Instant::now();
    }

    fn elapsed_seconds(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Virtual clock advancing a fixed step per read. Poll loops make progress
/// without real time passing, and identically on every run.
pub struct StepClock {
    now: f64,
    step: f64,
}

impl StepClock {
    pub fn new(step: f64) -> Self {
        Self { now: 0.0, step }
    }

    /// A frame-rate-like default step.
    pub fn frame() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl Clock for StepClock {
    fn reset(&mut self) {
        self.now = 0.0;
    }

    fn elapsed_seconds(&mut self) -> f64 {
        let t = self.now;
        self.now += self.step;
        t
    }
}

/// Everything one run needs at the boundary, plus the experiment rng.
pub struct Session {
    pub screen: Box<dyn Screen>,
    pub responses: Box<dyn ResponseSource>,
    pub clock: Box<dyn Clock>,
    pub rng: SmallRng,
}

impl Session {
    pub fn new(
        screen: Box<dyn Screen>,
        responses: Box<dyn ResponseSource>,
        clock: Box<dyn Clock>,
        seed: u64,
    ) -> Self {
        Self {
            screen,
            responses,
            clock,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Log-only screen, simulated participant, virtual clock.
    pub fn headless(seed: u64, participant_seed: u64) -> Self {
        Self::new(
            Box::new(LogScreen),
            Box::new(RandomResponder::new(participant_seed)),
            Box::new(StepClock::frame()),
            seed,
        )
    }

    /// Draws and flips `scene` until `seconds` elapse on the stage clock.
    pub fn present_for(&mut self, scene: &Scene, seconds: f64) {
        self.clock.reset();
        while self.clock.elapsed_seconds() < seconds {
            self.screen.draw(scene);
            self.screen.flip();
        }
    }

    /// Clock-only wait, no frames.
    pub fn hold(&mut self, seconds: f64) {
        self.clock.reset();
        while self.clock.elapsed_seconds() < seconds {}
    }

    /// Arms the response source, then draws `scene` until a response lands
    /// or the window closes. A `None` window waits as long as it takes, so
    /// the source must eventually respond.
    pub fn await_response(&mut self, scene: &Scene, window: Option<f64>) -> Option<Response> {
        self.responses.arm();
        self.clock.reset();
        loop {
            let now = self.clock.elapsed_seconds();
            if let Some(limit) = window {
                if now >= limit {
                    return None;
                }
            }
            self.screen.draw(scene);
            self.screen.flip();
            if let Some(response) = self.responses.poll(now) {
                return Some(response);
            }
        }
    }
}
