use super::*;
use crate::Gain;
use crate::atlas::Atlas;
use crate::atlas::Kind;
use crate::calibrate::Calibrator;
use crate::calibrate::MinimapCompass;
use crate::capability::Actuator;
use crate::capability::Command;
use crate::capability::Frame;
use crate::capability::Frames;
use crate::capability::Key;
use crate::capability::Ocr;
use crate::capability::Recognition;
use crate::capability::Signal;
use crate::capability::Signals;
use crate::config::Config;
use crate::config::KeyMap;
use crate::decide::Decision;
use crate::decide::Resolver;
use crate::decide::aim;
use crate::detect::Detector;
use crate::detect::Screen;
use crate::detect::Verdict;
use crate::error::Fault;
use crate::error::Halt;
use crate::locate::Matcher;
use crate::locate::Tracker;
use crate::navigate::Event;
use crate::navigate::Follower;
use crate::navigate::Leg;
use crate::navigate::Stall;
use crate::navigate::Steering;
use crate::vision::Extractor;
use crate::vision::Observation;
use crate::vision::Palette;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How long a key is held for a press.
const TAP: Duration = Duration::from_millis(100);

/// Collaborators the pilot drives.
pub struct Rig<F, A, O> {
    pub frames: F,
    pub actuator: A,
    pub ocr: Arc<O>,
    pub signals: Signals,
}

/// How a run ended short of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every stage was cleared. Carries the checkpoint the next run starts from.
    Completed(RunCheckpoint),
    /// Stopped on request, or the frame source gave out.
    Stopped(RunCheckpoint),
}

/// Why a tick ended early.
enum Interrupt {
    Fault(Fault),
    Capability(anyhow::Error),
}

impl From<Fault> for Interrupt {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}

impl From<anyhow::Error> for Interrupt {
    fn from(error: anyhow::Error) -> Self {
        Self::Capability(error)
    }
}

/// The map being walked.
struct Course {
    map: String,
    tracker: Tracker,
    follower: Follower,
}

/// The run loop.
///
/// One frame per tick goes through extraction, screen classification and
/// whichever of navigation or decision the phase calls for, and the
/// resulting commands go out before the next capture. Only OCR runs off the
/// loop. Pose, checkpoint and gain are owned here and nowhere else.
pub struct Pilot<F, A, O> {
    config: Config,
    fingerprint: String,
    atlas: Atlas,
    rig: Rig<F, A, O>,
    store: CheckpointStore,
    stored: Option<RunCheckpoint>,
    checkpoint: RunCheckpoint,
    saved: Option<RunCheckpoint>,
    phase: Phase,
    keys: KeyMap,
    extractor: Extractor,
    matcher: Matcher,
    detector: Detector,
    resolver: Resolver,
    steering: Steering,
    calibrator: Option<Calibrator>,
    course: Option<Course>,
    attempts: usize,
    cooldown: usize,
    lost: usize,
    reading: Option<Reading>,
    epoch: u64,
    seen: Option<Screen>,
    answered: Option<u64>,
    lingering: usize,
    loading: bool,
    walking: bool,
    departed: Option<Duration>,
    resuming: bool,
}

impl<F, A, O> Pilot<F, A, O>
where
    F: Frames,
    A: Actuator,
    O: Ocr + 'static,
{
    /// A fresh run. Any stored checkpoint only lends its counters; call
    /// [`Pilot::resume`] to continue from it instead.
    pub fn new(config: Config, atlas: Atlas, rig: Rig<F, A, O>, store: CheckpointStore) -> anyhow::Result<Self> {
        let fingerprint = config.fingerprint()?;
        let keys = config.keys()?;
        let stored = store.load()?;
        let world = config.settings.world.clamp(0, u32::MAX as i64) as u32;
        let mut checkpoint = RunCheckpoint::new(world, fingerprint.clone()).with_difficulty(config.difficulty());
        if let Some(ref stored) = stored {
            checkpoint.counters = stored.counters.clone();
        }
        log::info!(
            "[pilot] {} maps, configuration {}",
            atlas.len(),
            &fingerprint[..fingerprint.len().min(12)]
        );
        Ok(Self {
            extractor: Extractor::new(Palette::live(), config.accuracy()),
            matcher: Matcher::new(config.tuning.min_map_confidence),
            detector: Detector::new(config.tuning.stuck()),
            resolver: config.resolver(),
            steering: Steering::new(config.gain()),
            calibrator: None,
            config,
            fingerprint,
            atlas,
            rig,
            store,
            stored,
            checkpoint,
            saved: None,
            phase: Phase::Idle,
            keys,
            course: None,
            attempts: 0,
            cooldown: 0,
            lost: 0,
            reading: None,
            epoch: 0,
            seen: None,
            answered: None,
            lingering: 0,
            loading: false,
            walking: false,
            departed: None,
            resuming: false,
        })
    }

    /// Uses a measured camera gain instead of the configured one.
    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.steering = Steering::new(gain);
        self
    }
    /// Measures the camera gain when the run starts, seeded with the
    /// configured one. Set it before [`Pilot::resume`] so a resumed run
    /// calibrates too.
    pub fn with_calibration(mut self, calibrator: Calibrator) -> Self {
        self.calibrator = Some(calibrator);
        self
    }

    /// Continues from the stored checkpoint, if there is one.
    ///
    /// A checkpoint written under another configuration is never resumed
    /// silently: the pilot refuses with `ConfigurationDrift` and leaves the
    /// file alone.
    pub fn resume(mut self) -> Result<Self, Halt> {
        let Some(stored) = self.stored.take() else {
            log::info!("[pilot] no checkpoint, starting fresh");
            return Ok(self);
        };
        if let Err(reason) = stored.validate(&self.fingerprint) {
            log::error!("[pilot] {}", reason);
            return Err(Halt {
                reason,
                checkpoint: Some(stored),
            });
        }
        log::info!("[pilot] resuming at {}", stored);
        self.checkpoint = stored.clone();
        self.saved = Some(stored);
        if self.calibrator.is_some() {
            self.resuming = true;
            self.transition(Trigger::Start);
        } else {
            self.transition(Trigger::Resumed);
        }
        Ok(self)
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }
    pub fn checkpoint(&self) -> &RunCheckpoint {
        &self.checkpoint
    }
    pub fn rig(&self) -> &Rig<F, A, O> {
        &self.rig
    }

    pub async fn run(&mut self) -> Result<Outcome, Halt> {
        let tick = self.config.tuning.tick();
        loop {
            match self.rig.signals.current() {
                Signal::Stop => return Ok(self.stop("stop requested")),
                Signal::Pause => match self.pause().await {
                    Some(outcome) => return Ok(outcome),
                    None => continue,
                },
                Signal::Run => {}
            }
            if self.phase == Phase::Calibrating {
                if let Err(fault) = self.calibrate().await {
                    return Err(self.halt(fault));
                }
            }
            let started = Instant::now();
            let frame = match self.rig.frames.capture() {
                Ok(frame) => frame,
                Err(e) => return Ok(self.stop(&format!("no frame: {:#}", e))),
            };
            match self.tick(&frame) {
                Ok(()) => {}
                Err(Interrupt::Fault(fault)) => return Err(self.halt(fault)),
                Err(Interrupt::Capability(e)) => return Ok(self.stop(&format!("{:#}", e))),
            }
            // only a finished run comes back to idle
            if self.phase == Phase::Idle {
                return Ok(Outcome::Completed(self.checkpoint.clone()));
            }
            self.wait(started + tick).await;
        }
    }
}

impl<F, A, O> Pilot<F, A, O>
where
    F: Frames,
    A: Actuator,
    O: Ocr + 'static,
{
    fn tick(&mut self, frame: &Frame) -> Result<(), Interrupt> {
        let observation = match self.extractor.extract(frame) {
            Ok(observation) => Some(observation),
            Err(fault) => {
                log::trace!("[pilot] {}", fault);
                None
            }
        };
        let verdict = self.detector.poll(frame, observation.as_ref())?;
        if let Verdict::Screen(screen) = verdict {
            if self.seen != Some(screen) {
                self.seen = Some(screen);
                self.epoch += 1;
                self.lingering = 0;
            }
        }
        match self.phase.clone() {
            Phase::Idle => self.transition(Trigger::Start),
            Phase::Calibrating => {
                log::info!("[pilot] camera gain {:.2} counts/deg", self.steering.gain());
                self.transition(Trigger::Calibrated);
                if std::mem::take(&mut self.resuming) {
                    log::info!("[pilot] back at {}", self.checkpoint);
                } else {
                    self.enter()?;
                }
            }
            before @ (Phase::Navigating | Phase::Deciding(_) | Phase::Combat) => {
                if let Verdict::Screen(screen) = verdict {
                    self.transition(Trigger::Screen(screen));
                }
                let entering = self.phase != before;
                match self.phase.clone() {
                    Phase::Navigating => {
                        if entering {
                            self.rejoin();
                        }
                        self.navigate(observation.as_ref())?;
                    }
                    Phase::Deciding(screen) => {
                        if entering {
                            self.release()?;
                        }
                        self.decide(frame, screen)?;
                    }
                    Phase::Combat if entering => self.release()?,
                    _ => {}
                }
            }
            Phase::StageComplete => self.advance()?,
            Phase::NextStage => self.travel(frame, verdict)?,
            Phase::RunComplete => self.finish()?,
            Phase::Paused(_) | Phase::Error => {}
        }
        Ok(())
    }

    /// Runs the calibrator once, if one was given, reading the arrow off live
    /// frames.
    async fn calibrate(&mut self) -> Result<(), Fault> {
        let Some(calibrator) = self.calibrator.take() else {
            return Ok(());
        };
        let mut compass = MinimapCompass::new(&mut self.rig.frames, self.extractor.clone());
        let gain = calibrator
            .run(&mut compass, &mut self.rig.actuator, self.steering.gain())
            .await?;
        self.steering = Steering::new(gain);
        Ok(())
    }

    fn transition(&mut self, trigger: Trigger) {
        let from = self.phase.clone();
        let to = from.clone().next(trigger);
        if to == from {
            return;
        }
        log::info!("[pilot] {} -> {}", from, to);
        if matches!(from, Phase::Deciding(_)) {
            self.reading = None;
            self.answered = None;
        }
        self.phase = to;
    }

    /// Stage entry: fresh map search, portal weights fixed for the stage,
    /// technique casts, checkpoint.
    fn enter(&mut self) -> Result<(), Interrupt> {
        self.course = None;
        self.attempts = 0;
        self.cooldown = 0;
        self.lost = 0;
        self.loading = false;
        self.departed = None;
        self.resolver.set_portals(self.config.portal_policy());
        log::info!(
            "[pilot] entering world {} stage {}",
            self.checkpoint.world,
            self.checkpoint.stage
        );
        let casts = self
            .config
            .techniques()
            .into_iter()
            .flat_map(|slot| [Command::Tap(Key::Slot(slot), TAP), Command::Tap(Key::Technique, TAP)])
            .collect::<Vec<_>>();
        self.emit(casts)?;
        self.save()
    }

    /// Picks the walk back up after a screen or a fight interrupted it.
    fn rejoin(&mut self) {
        if let Some(course) = self.course.as_mut() {
            if matches!(course.follower.leg(), Leg::Handoff(_)) {
                course.follower.resume();
            }
        }
    }

    fn navigate(&mut self, observation: Option<&Observation>) -> Result<(), Interrupt> {
        let Some(observation) = observation else {
            return Ok(());
        };
        match self.course.take() {
            None => self.locate(observation),
            Some(mut course) => {
                let walked = self.walk(&mut course, observation);
                self.course = Some(course);
                walked
            }
        }
    }

    /// Global map selection with backoff between failed attempts.
    fn locate(&mut self, observation: &Observation) -> Result<(), Interrupt> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return Ok(());
        }
        let selection = match self.matcher.select(observation, &self.atlas) {
            Ok(selection) => selection,
            Err(Fault::NoMapMatch { best, .. }) => {
                self.attempts += 1;
                if self.attempts >= self.config.tuning.map_retry_budget {
                    return Err(Fault::NoMapMatch {
                        attempts: self.attempts,
                        best,
                    }
                    .into());
                }
                self.cooldown = self.attempts * self.config.tuning.map_retry_backoff;
                log::debug!(
                    "[pilot] no map yet (best {:.3}), attempt {} of {}, waiting {} ticks",
                    best,
                    self.attempts,
                    self.config.tuning.map_retry_budget,
                    self.cooldown
                );
                return Ok(());
            }
            Err(fault) => return Err(fault.into()),
        };
        let map = self
            .atlas
            .get(&selection.map)
            .ok_or_else(|| anyhow::anyhow!("selected map {} is not in the atlas", selection.map))?;
        let stamp = MapStamp {
            name: map.name().to_string(),
            digest: map.fingerprint().digest(),
        };
        let mut follower = Follower::new(map.waypoints().to_vec(), self.steering)
            .with_walkable(map.walkable().clone())
            .with_stall(Stall::new(self.checkpoint.stage as u64));
        if self.checkpoint.map.as_ref() == Some(&stamp) {
            log::info!("[pilot] back on {}, skipping waypoints {:?}", stamp.name, self.checkpoint.visited);
            follower.restore(&self.checkpoint.visited);
        } else {
            self.checkpoint.step = 0;
            self.checkpoint.visited.clear();
        }
        log::info!("[pilot] walking {} from {}", stamp.name, selection.pose);
        self.checkpoint.map = Some(stamp);
        self.course = Some(Course {
            map: selection.map,
            tracker: Tracker::new(selection.pose).with_streak(self.config.tuning.lost_streak),
            follower,
        });
        self.attempts = 0;
        self.save()
    }

    /// One tracking and steering step on the current map. A lost pose stops
    /// the walk and is searched for again, first nearby, then globally.
    fn walk(&mut self, course: &mut Course, observation: &Observation) -> Result<(), Interrupt> {
        let map = self
            .atlas
            .get(&course.map)
            .ok_or_else(|| anyhow::anyhow!("map {} is not in the atlas", course.map))?;
        let tracked = course
            .tracker
            .update(observation, map)
            .or_else(|_| course.tracker.relocate(observation, map));
        let pose = match tracked {
            Ok(pose) => {
                self.lost = 0;
                pose
            }
            Err(fault) => {
                self.emit(course.follower.halt())?;
                if let Ok(selection) = self.matcher.select(observation, &self.atlas) {
                    if selection.map == course.map {
                        log::info!("[pilot] found again at {}", selection.pose);
                        course.tracker = Tracker::new(selection.pose).with_streak(self.config.tuning.lost_streak);
                        self.lost = 0;
                        return Ok(());
                    }
                }
                self.lost += 1;
                log::warn!(
                    "[pilot] {} (recovery {} of {})",
                    fault,
                    self.lost,
                    self.config.tuning.lost_streak
                );
                if self.lost >= self.config.tuning.lost_streak {
                    return Err(fault.into());
                }
                return Ok(());
            }
        };
        let step = course.follower.step(pose);
        self.emit(step.commands)?;
        self.checkpoint.visited = course.follower.visits();
        self.checkpoint.step = self.checkpoint.visited.len();
        match step.event {
            None => {}
            Some(Event::Arrived(waypoint)) => log::debug!("[pilot] passed {}", waypoint),
            Some(Event::Handoff(waypoint)) => {
                log::info!("[pilot] reached {}", waypoint);
                self.lingering = 0;
                if waypoint.kind == Kind::Interaction {
                    self.emit(vec![Command::Tap(Key::Interact, TAP)])?;
                }
            }
            Some(Event::StageComplete) => self.transition(Trigger::StageCleared),
        }
        if step.event.is_none() && matches!(course.follower.leg(), Leg::Handoff(_)) {
            self.lingering += 1;
            if self.lingering > crate::HANDOFF_PATIENCE {
                log::debug!("[pilot] nothing came of the hand-off, walking on");
                course.follower.resume();
            }
        }
        Ok(())
    }

    /// Reads the options of a decision screen off the loop, then answers.
    fn decide(&mut self, frame: &Frame, screen: Screen) -> Result<(), Interrupt> {
        if self.answered == Some(self.epoch) {
            self.lingering += 1;
            if self.lingering > crate::HANDOFF_PATIENCE {
                log::debug!("[pilot] {} is still up, reading it again", screen);
                self.epoch += 1;
                self.lingering = 0;
            }
            return Ok(());
        }
        if self.reading.as_ref().is_some_and(|r| r.epoch() != self.epoch) {
            log::debug!("[pilot] screen changed under the reading, discarding it");
            self.reading = None;
        }
        match self.reading.as_mut().map(Reading::take) {
            None => {
                self.save()?;
                self.reading = Some(Reading::spawn(self.rig.ocr.clone(), frame, screen, self.epoch));
                Ok(())
            }
            Some(None) => Ok(()),
            Some(Some(read)) => {
                self.reading = None;
                let options = read.unwrap_or_else(|e| {
                    log::warn!("[pilot] ocr failed: {:#}", e);
                    Vec::new()
                });
                self.answer(frame, screen, &options)
            }
        }
    }

    fn answer(&mut self, frame: &Frame, screen: Screen, options: &[Recognition]) -> Result<(), Interrupt> {
        let decision = self.resolver.choose(&screen, options);
        self.answered = Some(self.epoch);
        self.lingering = 0;
        self.checkpoint.counters.decisions += 1;
        if decision.is_default() {
            log::warn!(
                "[pilot] {}",
                Fault::DecisionAmbiguous {
                    screen,
                    fallback: decision.index,
                }
            );
        } else {
            log::info!("[pilot] {}: {}", screen, decision);
        }
        let commands = match screen {
            Screen::PortalChoice => self.approach(frame, options, &decision),
            _ => vec![
                Command::Tap(Key::Slot(decision.index.min(3) as u8 + 1), TAP),
                Command::Tap(Key::Interact, TAP),
            ],
        };
        self.emit(commands)
    }

    /// Turns toward the chosen portal and walks into it.
    fn approach(&mut self, frame: &Frame, portals: &[Recognition], decision: &Decision) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(portal) = portals.get(decision.index) {
            self.resolver.set_branch(decision.label.clone());
            let turn = aim(portal.rect.centre_x(), frame.screen().width());
            commands.extend(self.steering.rotate(turn));
        }
        if !std::mem::replace(&mut self.walking, true) {
            commands.push(Command::Hold(Key::Forward));
        }
        commands
    }

    fn advance(&mut self) -> Result<(), Interrupt> {
        self.release()?;
        self.course = None;
        self.checkpoint.counters.stages += 1;
        let last = self.checkpoint.stage >= self.config.tuning.stages_per_run;
        if !last {
            self.checkpoint.stage += 1;
            self.checkpoint.step = 0;
            self.checkpoint.visited.clear();
            self.checkpoint.map = None;
            self.resolver.set_branch(None);
            self.save()?;
        }
        self.transition(Trigger::Advance { last });
        Ok(())
    }

    /// Between stages: pick a portal, walk through, wait out the loading.
    /// Without a portal or a loading screen for longer than the stuck
    /// timeout, the run halts.
    fn travel(&mut self, frame: &Frame, verdict: Verdict) -> Result<(), Interrupt> {
        let now = frame.timestamp();
        let since = *self.departed.get_or_insert(now);
        match verdict {
            Verdict::Screen(Screen::LoadingTransition) => {
                self.departed = Some(now);
                if !self.loading {
                    log::debug!("[pilot] loading");
                    self.loading = true;
                    self.reading = None;
                }
                self.release()
            }
            Verdict::Screen(Screen::PortalChoice) if !self.loading => {
                self.departed = Some(now);
                self.decide(frame, Screen::PortalChoice)
            }
            Verdict::Screen(Screen::Navigating) if self.loading => {
                self.transition(Trigger::Entered);
                self.enter()
            }
            verdict => {
                let waited = now.saturating_sub(since);
                if waited > self.config.tuning.stuck() {
                    let screen = match verdict {
                        Verdict::Screen(screen) => Some(screen),
                        Verdict::Defer => None,
                    };
                    return Err(Fault::ScreenStuck { screen, waited }.into());
                }
                if verdict == Verdict::Screen(Screen::Navigating) && !self.walking {
                    self.walking = true;
                    self.emit(vec![Command::Hold(Key::Forward)])?;
                }
                Ok(())
            }
        }
    }

    fn finish(&mut self) -> Result<(), Interrupt> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or_default();
        let mut counters = self.checkpoint.counters.clone();
        counters.tally(now, self.config.settings.timezone);
        log::info!(
            "[pilot] run complete, {} this week, {} in total",
            counters.week_runs,
            counters.runs
        );
        self.checkpoint = RunCheckpoint {
            counters,
            ..RunCheckpoint::new(self.checkpoint.world, self.fingerprint.clone())
                .with_difficulty(self.checkpoint.difficulty)
        };
        self.save()?;
        self.transition(Trigger::Finished);
        Ok(())
    }
}

impl<F, A, O> Pilot<F, A, O>
where
    F: Frames,
    A: Actuator,
    O: Ocr + 'static,
{
    async fn pause(&mut self) -> Option<Outcome> {
        if let Err(Interrupt::Capability(e)) = self.release() {
            log::warn!("[pilot] could not release keys: {:#}", e);
        }
        self.transition(Trigger::Pause);
        if self.rig.signals.unpaused().await == Signal::Stop {
            return Some(self.stop("stop requested while paused"));
        }
        self.detector.reset();
        self.transition(Trigger::Resume);
        None
    }

    /// Sleeps out the tick, letting a pending reading finish meanwhile.
    async fn wait(&mut self, deadline: Instant) {
        if let Some(reading) = self.reading.as_mut().filter(|r| r.is_pending()) {
            reading.settle(deadline.saturating_duration_since(Instant::now())).await;
        }
        tokio::time::sleep_until(deadline).await;
    }

    fn stop(&mut self, reason: &str) -> Outcome {
        if let Err(Interrupt::Capability(e)) = self.release() {
            log::warn!("[pilot] could not release keys: {:#}", e);
        }
        log::info!("[pilot] stopped at {}: {}", self.checkpoint, reason);
        Outcome::Stopped(self.checkpoint.clone())
    }

    /// Enters `Error`. Held keys are let go and nothing is sent afterwards;
    /// the last saved checkpoint goes back to the caller untouched.
    fn halt(&mut self, reason: Fault) -> Halt {
        if let Err(Interrupt::Capability(e)) = self.release() {
            log::warn!("[pilot] could not release keys: {:#}", e);
        }
        log::error!("[pilot] halting: {}", reason);
        self.transition(Trigger::Fail);
        Halt {
            reason,
            checkpoint: self.saved.clone(),
        }
    }

    fn release(&mut self) -> Result<(), Interrupt> {
        let mut commands = self
            .course
            .as_mut()
            .map(|course| course.follower.halt())
            .unwrap_or_default();
        if std::mem::take(&mut self.walking) {
            commands.push(Command::Release(Key::Forward));
        }
        self.emit(commands)
    }

    fn emit(&mut self, commands: Vec<Command>) -> Result<(), Interrupt> {
        for command in commands {
            log::trace!("[pilot] {}", command);
            self.rig.actuator.send(self.keys.render(&command))?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), Interrupt> {
        self.store.save(&self.checkpoint)?;
        self.saved = Some(self.checkpoint.clone());
        Ok(())
    }
}
