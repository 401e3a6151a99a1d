//! A single trail-following agent.
//!
//! Each tick an agent moves one unit along its heading, marks the cell it
//! lands in, probes the field ahead, ahead-left and ahead-right, and turns
//! toward the strongest reading. Near the edges two separate rules take over:
//! a targeted escape heading once the agent crosses the outer one-cell band,
//! and, after steering, a fresh random heading if the agent sits on or beyond
//! the outermost row or column.

use crate::config::SensorConfig;
use crate::jitter::Jitter;
use crate::trail::{TrailField, OUT_OF_RANGE};
use glam::Vec2;
use physarum_core::Xorshift64;
use std::f32::consts::{FRAC_PI_2, PI};

/// Readings below this total (sentinels counted as -1) trigger a jitter turn.
pub const WEAK_SIGNAL: i32 = 8;

/// An agent crossing the outer band near the top is sent straight down if it
/// is above this row.
const TOP_ESCAPE_ROWS: f32 = 15.0;

/// An agent crossing the outer band near the bottom is sent straight up if it
/// is within this many rows of the bottom edge.
const BOTTOM_ESCAPE_ROWS: f32 = 5.0;

/// The three probe readings of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readings {
    pub forward: i32,
    pub left: i32,
    pub right: i32,
}

impl Readings {
    pub fn all_out_of_range(&self) -> bool {
        self.forward == OUT_OF_RANGE && self.left == OUT_OF_RANGE && self.right == OUT_OF_RANGE
    }

    /// Sum of the three readings; sentinels contribute -1 each.
    pub fn total(&self) -> i32 {
        self.forward + self.left + self.right
    }
}

/// The steering rule that fired during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steer {
    /// Every probe was out of range; heading turned by π.
    Reverse,
    /// The signal was weak; heading nudged by the contained offset.
    Jitter(f32),
    /// Forward was at least as strong as both sides.
    Hold,
    /// Turned toward the left probe.
    Left,
    /// Turned toward the right probe.
    Right,
}

impl Steer {
    /// Picks the first matching rule.
    ///
    /// Draws from `jitter` only when the weak-signal rule fires.
    pub fn decide(r: Readings, jitter: &Jitter) -> Self {
        if r.all_out_of_range() {
            Steer::Reverse
        } else if r.total() < WEAK_SIGNAL {
            Steer::Jitter(jitter.next_offset())
        } else if r.forward >= r.left && r.forward >= r.right {
            Steer::Hold
        } else if r.left > r.forward && r.left >= r.right {
            Steer::Left
        } else {
            // Remaining case: right > forward && right > left.
            Steer::Right
        }
    }

    /// Applies the rule to `heading`, turning by `angle` for left/right.
    pub fn apply(self, heading: f32, angle: f32) -> f32 {
        match self {
            Steer::Reverse if heading > PI => heading - PI,
            Steer::Reverse => heading + PI,
            Steer::Jitter(offset) => heading + offset,
            Steer::Hold => heading,
            Steer::Left => heading - angle,
            Steer::Right => heading + angle,
        }
    }
}

/// Parameters of the initial position/heading distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    pub center: Vec2,
    /// Agents start at most this far from `center`.
    pub radius: f32,
    /// Maximum deviation from the heading toward `center`, degrees.
    pub angle_deviation_deg: f32,
}

impl SpawnArea {
    /// Spawn area around the middle of a `width` x `height` grid, using
    /// integer halves as the center.
    pub fn centered(width: usize, height: usize, radius: f32, angle_deviation_deg: f32) -> Self {
        Self {
            center: Vec2::new((width / 2) as f32, (height / 2) as f32),
            radius,
            angle_deviation_deg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    position: Vec2,
    /// Radians; never normalised.
    heading: f32,
    rng: Xorshift64,
}

impl Agent {
    /// Places an agent explicitly. `rng` feeds its edge re-randomisation.
    pub fn new(position: Vec2, heading: f32, rng: Xorshift64) -> Self {
        Self {
            position,
            heading,
            rng,
        }
    }

    /// Draws a position uniformly in radius and angle around the spawn center
    /// and a heading pointing back at the center, off by a bounded deviation.
    pub fn spawn(area: &SpawnArea, spawn_rng: &mut Xorshift64, rng: Xorshift64) -> Self {
        let r = spawn_rng.next_f32() * area.radius;
        let theta = spawn_rng.next_angle();
        let position = area.center + r * Vec2::new(theta.cos(), theta.sin());

        let to_center = area.center - position;
        let center_angle = to_center.y.atan2(to_center.x);
        let dev = area.angle_deviation_deg;
        let deviation = spawn_rng.next_range(-dev, dev).to_radians();

        Self::new(position, center_angle + deviation, rng)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = heading;
    }

    fn probe(&self, field: &TrailField, reach: f32, angle: f32) -> i32 {
        let at = self.position + reach * Vec2::new(angle.cos(), angle.sin());
        field.sample(at.x as i64, at.y as i64)
    }

    /// Advances the agent by one tick and returns the steering rule applied.
    pub fn step(&mut self, field: &TrailField, sensors: SensorConfig, jitter: &Jitter) -> Steer {
        let w = field.width() as f32;
        let h = field.height() as f32;

        self.position += Vec2::new(self.heading.cos(), self.heading.sin());
        let Vec2 { x, y } = self.position;

        if x < 1.0 || x >= w - 1.0 || y < 1.0 || y >= h - 1.0 {
            if x < 1.0 {
                self.heading = 0.0;
            } else if x >= w - 1.0 {
                self.heading = PI;
            }
            if y < TOP_ESCAPE_ROWS {
                self.heading = FRAC_PI_2;
            } else if y >= h - BOTTOM_ESCAPE_ROWS {
                self.heading = 3.0 * FRAC_PI_2;
            }
        }

        if x >= 0.0 && x < w && y >= 0.0 && y < h {
            field.deposit(x as i64, y as i64);
        }

        let reach = sensors.reach as f32;
        let readings = Readings {
            forward: self.probe(field, reach, self.heading),
            left: self.probe(field, reach, self.heading - sensors.angle),
            right: self.probe(field, reach, self.heading + sensors.angle),
        };
        let steer = Steer::decide(readings, jitter);
        self.heading = steer.apply(self.heading, sensors.angle);

        // Independent of the escape rule above; both may fire.
        if x <= 0.0 || x >= w - 1.0 || y <= 0.0 || y >= h - 1.0 {
            self.heading = self.rng.next_angle();
        }

        steer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trail::DEFAULT_DECAY;
    use std::f32::consts::TAU;

    fn field(w: usize, h: usize) -> TrailField {
        TrailField::new(w, h, DEFAULT_DECAY).unwrap()
    }

    fn sensors(reach: i32, angle_deg: f32) -> SensorConfig {
        SensorConfig {
            reach,
            angle: angle_deg.to_radians(),
        }
    }

    fn agent_at(x: f32, y: f32, heading: f32) -> Agent {
        Agent::new(Vec2::new(x, y), heading, Xorshift64::new(7))
    }

    // ---- Steering rule ----

    #[test]
    fn decide_reverses_when_all_out_of_range() {
        let r = Readings {
            forward: -1,
            left: -1,
            right: -1,
        };
        let jitter = Jitter::new();
        assert_eq!(Steer::decide(r, &jitter), Steer::Reverse);
        assert_eq!(jitter.value(), 0, "reverse must not touch the accumulator");
    }

    #[test]
    fn decide_counts_sentinels_as_minus_one() {
        // 9 - 1 - 1 = 7 < 8.
        let r = Readings {
            forward: 9,
            left: -1,
            right: -1,
        };
        assert!(matches!(Steer::decide(r, &Jitter::new()), Steer::Jitter(_)));
        // 10 - 1 - 1 = 8 is strong enough.
        let r = Readings { forward: 10, ..r };
        assert_eq!(Steer::decide(r, &Jitter::new()), Steer::Hold);
    }

    #[test]
    fn decide_breaks_ties_in_priority_order() {
        let jitter = Jitter::new();
        let all_equal = Readings {
            forward: 50,
            left: 50,
            right: 50,
        };
        assert_eq!(Steer::decide(all_equal, &jitter), Steer::Hold);
        let sides_equal = Readings {
            forward: 10,
            left: 50,
            right: 50,
        };
        assert_eq!(Steer::decide(sides_equal, &jitter), Steer::Left);
        let right_wins = Readings {
            forward: 10,
            left: 20,
            right: 50,
        };
        assert_eq!(Steer::decide(right_wins, &jitter), Steer::Right);
    }

    #[test]
    fn reverse_subtracts_above_pi_and_adds_otherwise() {
        assert!((Steer::Reverse.apply(4.0, 0.5) - (4.0 - PI)).abs() < 1e-6);
        assert!((Steer::Reverse.apply(PI, 0.5) - 2.0 * PI).abs() < 1e-6);
        assert!((Steer::Reverse.apply(-1.0, 0.5) - (PI - 1.0)).abs() < 1e-6);
    }

    // ---- Spawning ----

    #[test]
    fn zero_radius_spawns_exactly_at_center() {
        let area = SpawnArea::centered(64, 48, 0.0, 30.0);
        let mut rng = Xorshift64::new(3);
        let agent = Agent::spawn(&area, &mut rng, Xorshift64::new(4));
        assert_eq!(agent.position(), Vec2::new(32.0, 24.0));
        assert!(agent.heading().abs() <= 30_f32.to_radians() + 1e-6);
    }

    #[test]
    fn centered_uses_integer_halves() {
        let area = SpawnArea::centered(65, 47, 10.0, 0.0);
        assert_eq!(area.center, Vec2::new(32.0, 23.0));
    }

    #[test]
    fn zero_deviation_points_straight_at_center() {
        let area = SpawnArea::centered(200, 200, 50.0, 0.0);
        let mut rng = Xorshift64::new(11);
        for i in 0..100 {
            let agent = Agent::spawn(&area, &mut rng, Xorshift64::stream(11, i));
            let to_center = area.center - agent.position();
            if to_center.length() < 1e-3 {
                continue;
            }
            let dir = Vec2::new(agent.heading().cos(), agent.heading().sin());
            assert!(dir.dot(to_center.normalize()) > 0.9999);
        }
    }

    // ---- Scenario A: spawn at center, first deposit ----

    #[test]
    fn first_step_from_center_deposits_next_to_center() {
        let f = field(64, 64);
        let area = SpawnArea::centered(64, 64, 0.0, 30.0);
        let mut agent = Agent::spawn(&area, &mut Xorshift64::new(5), Xorshift64::new(6));
        assert_eq!(agent.position(), area.center);

        agent.step(&f, sensors(6, 30.0), &Jitter::new());

        let p = agent.position();
        assert!((p - area.center).length() <= 1.0 + 1e-5);
        assert_eq!(f.get(p.x as usize, p.y as usize), Some(255));
        assert_eq!(f.lit_cells(), 1);
    }

    // ---- Scenario B: only forward in range ----

    #[test]
    fn forward_only_reading_keeps_heading() {
        // 21 rows leave exactly one trusted row (y = 10).
        let f = field(100, 21);
        f.deposit(47, 10);
        let mut agent = agent_at(40.5, 10.5, 0.0);
        let jitter = Jitter::new();

        let steer = agent.step(&f, sensors(6, 30.0), &jitter);

        assert_eq!(steer, Steer::Hold);
        assert_eq!(agent.heading(), 0.0);
        assert_eq!(jitter.value(), 0);
    }

    // ---- Scenario C: left strictly strongest ----

    #[test]
    fn strongest_left_turns_by_sensor_angle() {
        let f = field(100, 100);
        // Agent moves to (51.5, 50.5); left probe at 45° lands on (58, 43).
        f.deposit(58, 43);
        let mut agent = agent_at(50.5, 50.5, 0.0);
        let s = sensors(10, 45.0);

        let steer = agent.step(&f, s, &Jitter::new());

        assert_eq!(steer, Steer::Left);
        assert_eq!(agent.heading(), -s.angle);
    }

    #[test]
    fn strongest_right_turns_by_sensor_angle() {
        let f = field(100, 100);
        f.deposit(58, 57);
        let mut agent = agent_at(50.5, 50.5, 0.0);
        let s = sensors(10, 45.0);

        assert_eq!(agent.step(&f, s, &Jitter::new()), Steer::Right);
        assert_eq!(agent.heading(), s.angle);
    }

    // ---- Weak signal ----

    #[test]
    fn empty_field_applies_shared_jitter() {
        let f = field(100, 100);
        let mut agent = agent_at(50.5, 50.5, 1.0);
        let jitter = Jitter::new();

        let steer = agent.step(&f, sensors(6, 30.0), &jitter);

        assert!(matches!(steer, Steer::Jitter(o) if (o + 0.08).abs() < 1e-6));
        assert!((agent.heading() - 0.92).abs() < 1e-6);
        assert_eq!(jitter.value(), 1);
    }

    // ---- All sentinel ----

    #[test]
    fn all_sentinel_reverses_heading() {
        // A 20x20 grid has no trusted cells at all.
        let f = field(20, 20);
        let mut low = agent_at(5.5, 5.5, 0.3);
        assert_eq!(low.step(&f, sensors(6, 30.0), &Jitter::new()), Steer::Reverse);
        assert!((low.heading() - (0.3 + PI)).abs() < 1e-6);

        let mut high = agent_at(9.5, 9.5, 4.0);
        high.step(&f, sensors(6, 30.0), &Jitter::new());
        assert!((high.heading() - (4.0 - PI)).abs() < 1e-6);
    }

    // ---- Edges ----

    #[test]
    fn crossing_left_band_escapes_rightward_before_sensing() {
        let f = field(100, 100);
        let mut agent = agent_at(1.5, 50.5, PI);
        let jitter = Jitter::new();

        agent.step(&f, sensors(30, 30.0), &jitter);

        // Escape heading 0 sends every probe into the trusted interior; the
        // empty field then triggers a jitter turn from heading 0.
        assert!((agent.heading() - (-0.08)).abs() < 1e-6);
        assert_eq!(f.get(0, 50), Some(255));
    }

    #[test]
    fn top_escape_applies_only_after_crossing_outer_band() {
        let f = field(100, 100);
        // y = 10.5 is inside the 15-row zone but not past the outer band.
        let mut inside = agent_at(50.5, 10.5, 0.0);
        inside.step(&f, sensors(6, 30.0), &Jitter::new());
        assert!((inside.heading() - (-0.08)).abs() < 1e-6);

        // Crossing y < 1 forces heading π/2 before sensing.
        let mut crossing = agent_at(50.5, 1.2, -FRAC_PI_2);
        crossing.step(&f, sensors(20, 30.0), &Jitter::new());
        assert!((crossing.heading() - (FRAC_PI_2 - 0.08)).abs() < 1e-5);
    }

    #[test]
    fn both_edge_rules_fire_on_the_outermost_row() {
        let f = field(100, 100);
        let rng = Xorshift64::new(1234);
        let mut expected = rng.clone();
        let mut agent = Agent::new(Vec2::new(50.5, 98.5), FRAC_PI_2, rng);
        let jitter = Jitter::new();

        agent.step(&f, sensors(20, 30.0), &jitter);

        // Escape sent it upward, probes landed inside and the weak signal drew
        // a jitter offset; then the outermost-row check re-randomised.
        assert_eq!(jitter.value(), 1);
        assert_eq!(agent.heading(), expected.next_angle());
        assert_eq!(f.get(50, 99), Some(255));
    }

    #[test]
    fn top_rows_override_left_edge_escape() {
        let f = field(100, 100);
        let mut agent = agent_at(1.5, 8.5, PI);
        let jitter = Jitter::new();

        // Lands at x = 0.5, y = 8.5: the x rule picks 0, then y < 15 picks π/2.
        let steer = agent.step(&f, sensors(20, 30.0), &jitter);

        // Sensing from π/2: only the left probe (10, 25) is trusted, so the
        // weak signal draws one jitter offset. A heading of 0 would end at -0.08.
        assert!(matches!(steer, Steer::Jitter(_)));
        assert_eq!(jitter.value(), 1);
        assert!((agent.heading() - (FRAC_PI_2 - 0.08)).abs() < 1e-5);
        assert_eq!(f.get(0, 8), Some(255));
    }

    #[test]
    fn bottom_rows_override_right_edge_escape() {
        let (w, h) = (100.0, 100.0);
        let f = field(100, 100);
        // Left probe from heading 3π/2 at reach 20 lands on (89, 79).
        f.deposit(89, 79);
        let mut agent = agent_at(w - 1.5, h - 3.5, 0.0);
        let jitter = Jitter::new();

        // Lands at x = 99.5, y = 96.5: the x rule picks π, then y >= h - 5
        // picks 3π/2. Sensing from π would see no trail and jitter instead.
        let steer = agent.step(&f, sensors(20, 30.0), &jitter);

        assert_eq!(steer, Steer::Left);
        assert_eq!(jitter.value(), 0);
        assert_eq!(f.get(99, 96), Some(255));
    }

    #[test]
    fn right_edge_escape_turns_back_before_sensing() {
        let f = field(100, 100);
        // Forward probe from heading π at reach 20 lands on (79, 50).
        f.deposit(79, 50);
        let rng = Xorshift64::new(99);
        let mut expected = rng.clone();
        let mut agent = Agent::new(Vec2::new(98.5, 50.5), 0.0, rng);
        let jitter = Jitter::new();

        let steer = agent.step(&f, sensors(20, 30.0), &jitter);

        // Heading 0 would probe past the right edge and reverse.
        assert_eq!(steer, Steer::Hold);
        assert_eq!(jitter.value(), 0);
        // x = 99.5 >= w - 1, so the outermost-column check re-randomises.
        assert_eq!(agent.heading(), expected.next_angle());
    }

    #[test]
    fn leaving_the_grid_skips_deposit_and_rerandomises() {
        let f = field(100, 100);
        let mut agent = agent_at(0.2, 50.5, PI);
        agent.step(&f, sensors(6, 30.0), &Jitter::new());
        assert!(agent.position().x < 0.0);
        assert_eq!(f.lit_cells(), 0);
        assert!((0.0..TAU).contains(&agent.heading()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn spawn_stays_within_radius(
                seed: u64,
                radius in 0.0_f32..400.0,
                deviation in 0.0_f32..180.0,
            ) {
                let area = SpawnArea::centered(1920, 1080, radius, deviation);
                let mut rng = Xorshift64::new(seed);
                for i in 0..50 {
                    let agent = Agent::spawn(&area, &mut rng, Xorshift64::stream(seed, i));
                    let d = (agent.position() - area.center).length();
                    prop_assert!(d <= radius + 1e-3, "distance {d} > radius {radius}");
                }
            }

            #[test]
            fn all_sentinel_turns_by_exactly_pi(heading in -20.0_f32..20.0) {
                let f = TrailField::new(20, 20, DEFAULT_DECAY).unwrap();
                let mut agent = Agent::new(Vec2::new(9.5, 9.5), heading, Xorshift64::new(1));
                let steer = agent.step(&f, SensorConfig { reach: 6, angle: 0.5 }, &Jitter::new());
                prop_assert_eq!(steer, Steer::Reverse);
                let expected = if heading > PI { heading - PI } else { heading + PI };
                prop_assert!((agent.heading() - expected).abs() < 1e-5);
            }
        }
    }
}
