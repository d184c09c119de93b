use super::*;
use crate::atlas::Kind;
use crate::atlas::Waypoint;
use crate::capability::Command;
use crate::capability::Key;
use crate::locate::Pose;
use crate::vision::Grid;
use crate::vision::Point;
use crate::vision::wrap;

/// Where the follower is in its walk over the waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// No target yet; the next step picks one.
    Ready,
    /// Walking toward the waypoint at this index. Locked until arrival.
    Approaching(usize),
    /// Stopped at an interaction or danger waypoint until resumed.
    Handoff(usize),
    /// The destination was reached.
    Complete,
}

/// Something the run loop has to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Arrived(Waypoint),
    Handoff(Waypoint),
    StageComplete,
}

/// Output of one control tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    pub commands: Vec<Command>,
    pub event: Option<Event>,
}

/// Waypoint follower.
///
/// Picks the nearest unvisited waypoint, leaving the destination for last,
/// and keeps it as the target until it is reached. Equidistant candidates go
/// to the smallest turn, then to recording order. Interaction and danger
/// waypoints stop the walk and hand off; the walk continues after `resume`.
#[derive(Debug, Clone)]
pub struct Follower {
    waypoints: Vec<Waypoint>,
    visited: Vec<bool>,
    leg: Leg,
    steering: Steering,
    radii: Radii,
    walkable: Option<Grid>,
    detour: Option<Point>,
    holding: bool,
    stall: Stall,
}

impl Follower {
    pub fn new(waypoints: Vec<Waypoint>, steering: Steering) -> Self {
        Self {
            visited: vec![false; waypoints.len()],
            waypoints,
            leg: Leg::Ready,
            steering,
            radii: Radii::default(),
            walkable: None,
            detour: None,
            holding: false,
            stall: Stall::new(0),
        }
    }
    pub fn with_radii(mut self, radii: Radii) -> Self {
        self.radii = radii;
        self
    }
    /// Floor grid consulted before detouring around danger waypoints.
    pub fn with_walkable(mut self, walkable: Grid) -> Self {
        self.walkable = Some(walkable);
        self
    }
    pub fn with_stall(mut self, stall: Stall) -> Self {
        self.stall = stall;
        self
    }
    /// Marks the waypoints at these recording indices as visited.
    /// Indices past the end are ignored.
    pub fn restore(&mut self, indices: &[usize]) {
        for &i in indices {
            if let Some(visited) = self.visited.get_mut(i) {
                *visited = true;
            }
        }
    }

    pub fn leg(&self) -> Leg {
        self.leg
    }
    pub fn target(&self) -> Option<Waypoint> {
        match self.leg {
            Leg::Approaching(i) | Leg::Handoff(i) => Some(self.waypoints[i]),
            Leg::Ready | Leg::Complete => None,
        }
    }
    pub fn detour(&self) -> Option<Point> {
        self.detour
    }
    pub fn is_moving(&self) -> bool {
        self.holding
    }
    pub fn visited(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }
    /// Recording indices of the waypoints reached so far.
    pub fn visits(&self) -> Vec<usize> {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
            .collect()
    }

    /// Continues after a hand-off was dealt with.
    pub fn resume(&mut self) {
        if let Leg::Handoff(i) = self.leg {
            log::debug!("[follower] resuming after {}", self.waypoints[i]);
            self.leg = Leg::Ready;
        }
    }

    /// Stops walking, e.g. before a pause.
    pub fn halt(&mut self) -> Vec<Command> {
        self.stall.reset();
        if std::mem::take(&mut self.holding) {
            vec![Command::Release(Key::Forward)]
        } else {
            Vec::new()
        }
    }

    pub fn step(&mut self, pose: Pose) -> Step {
        let mut step = Step::default();
        let target = match self.leg {
            Leg::Handoff(_) | Leg::Complete => return step,
            Leg::Approaching(i) => i,
            Leg::Ready => match self.engage(&pose) {
                Some(i) => i,
                None => return self.finish(step),
            },
        };
        let waypoint = self.waypoints[target];
        let target = if pose.position.distance(&waypoint.at) <= self.radii.of(waypoint.kind) {
            self.visited[target] = true;
            self.detour = None;
            log::debug!("[follower] arrived at {}", waypoint);
            match waypoint.kind {
                Kind::Destination => return self.finish(step),
                Kind::Interaction | Kind::Danger => {
                    step.commands.extend(self.halt());
                    step.event = Some(Event::Handoff(waypoint));
                    self.leg = Leg::Handoff(target);
                    return step;
                }
                Kind::Path => {
                    step.event = Some(Event::Arrived(waypoint));
                    match self.engage(&pose) {
                        Some(next) => next,
                        None => return self.finish(step),
                    }
                }
            }
        } else {
            target
        };
        let goal = self.waypoints[target].at;
        if let Some(detour) = self.detour {
            if pose.position.distance(&detour) <= self.radii.path {
                self.detour = None;
            }
        }
        let aim = self.detour.unwrap_or(goal);
        let bearing = pose.position.bearing(&aim);
        step.commands.extend(self.steering.turn(pose.heading, bearing));
        if !self.holding {
            self.holding = true;
            self.stall.reset();
            step.commands.push(Command::Hold(Key::Forward));
        } else if let Some(dodge) = self.stall.observe(pose.position) {
            step.commands.extend(dodge);
        }
        step
    }

    fn finish(&mut self, mut step: Step) -> Step {
        step.commands.extend(self.halt());
        step.event = Some(Event::StageComplete);
        self.leg = Leg::Complete;
        step
    }

    /// Chooses and locks the next target, planning a detour if needed.
    fn engage(&mut self, pose: &Pose) -> Option<usize> {
        let next = self.choose(pose)?;
        self.leg = Leg::Approaching(next);
        self.detour = self.plan(pose.position, self.waypoints[next].at, next);
        log::debug!(
            "[follower] heading for {}{}",
            self.waypoints[next],
            self.detour.map(|d| format!(" via {}", d)).unwrap_or_default()
        );
        Some(next)
    }

    fn choose(&self, pose: &Pose) -> Option<usize> {
        let open = (0..self.waypoints.len())
            .filter(|i| !self.visited[*i])
            .collect::<Vec<usize>>();
        let before = open
            .iter()
            .copied()
            .filter(|i| self.waypoints[*i].kind != Kind::Destination)
            .collect::<Vec<usize>>();
        let pool = if before.is_empty() { open } else { before };
        let distance = |i: &usize| pose.position.distance(&self.waypoints[*i].at);
        let turn = |i: &usize| wrap(pose.position.bearing(&self.waypoints[*i].at) - pose.heading).abs();
        let nearest = pool.iter().map(distance).min_by(|a, b| a.total_cmp(b))?;
        pool.iter()
            .filter(|i| distance(*i) <= nearest + crate::TIE_EPSILON)
            .min_by(|a, b| turn(*a).total_cmp(&turn(*b)))
            .copied()
    }

    /// Side step around the first unvisited danger waypoint that lies within
    /// clearance of the straight line, provided the floor is walkable there.
    fn plan(&self, from: Point, to: Point, target: usize) -> Option<Point> {
        let walkable = self.walkable.as_ref()?;
        let clearance = crate::DANGER_CLEARANCE;
        let (ux, uy) = (to.x - from.x, to.y - from.y);
        let length = (ux * ux + uy * uy).sqrt();
        if length <= f32::EPSILON {
            return None;
        }
        let (ux, uy) = (ux / length, uy / length);
        let blocker = self
            .waypoints
            .iter()
            .enumerate()
            .filter(|(i, w)| *i != target && !self.visited[*i] && w.kind == Kind::Danger)
            .map(|(_, w)| {
                let along = ((w.at.x - from.x) * ux + (w.at.y - from.y) * uy).clamp(0.0, length);
                let closest = Point::new(from.x + ux * along, from.y + uy * along);
                (along, closest, w.at)
            })
            .filter(|(_, closest, danger)| closest.distance(danger) < clearance)
            .min_by(|a, b| a.0.total_cmp(&b.0))?;
        let (_, closest, danger) = blocker;
        let gap = closest.distance(&danger);
        let (nx, ny) = if gap > f32::EPSILON {
            ((closest.x - danger.x) / gap, (closest.y - danger.y) / gap)
        } else {
            (-uy, ux)
        };
        let reach = clearance * 1.5;
        [1.0, -1.0]
            .into_iter()
            .map(|side| Point::new(danger.x + side * nx * reach, danger.y + side * ny * reach))
            .find(|p| {
                let (x, y) = p.rounded();
                walkable.get(x, y)
            })
    }
}
