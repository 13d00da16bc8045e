//! Square spiral layout
//!
//! Walks outward from the origin: right 1, up 1, left 2, down 2, right 3,
//! up 3, ... Each call to [`SpiralLayout::advance`] places one number at the
//! current cursor, then turns if the current run is complete and steps one
//! block forward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::prime::is_prime_u64;
use crate::consts::LABEL_THRESHOLD;
use crate::settings::{Rgba, Theme};

/// Facing of the spiral cursor, in turning order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    /// Counter-clockwise successor (on screen)
    pub fn next(self) -> Self {
        match self {
            Direction::Right => Direction::Up,
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
        }
    }

    /// Unit step in screen space (y grows downward)
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Right => Vec2::X,
            Direction::Up => Vec2::NEG_Y,
            Direction::Left => Vec2::NEG_X,
            Direction::Down => Vec2::Y,
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Up => 1,
            Direction::Left => 2,
            Direction::Down => 3,
        }
    }
}

/// Run lengths at the start of the walk, per direction
pub const INITIAL_RUN_LENGTHS: [u32; 4] = [1, 1, 2, 2];

/// Cursor state of the walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpiralCursor {
    /// Top-left corner of the next block, canvas space
    pub position: Vec2,
    pub direction: Direction,
    /// Blocks to draw before turning, indexed by direction
    pub run_lengths: [u32; 4],
    /// Steps already taken in the current run
    pub steps_in_run: u32,
}

impl SpiralCursor {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            direction: Direction::Right,
            run_lengths: INITIAL_RUN_LENGTHS,
            steps_in_run: 0,
        }
    }

    /// Run length for the current facing
    pub fn current_run(&self) -> u32 {
        self.run_lengths[self.direction.index()]
    }

    /// Turn if the current run is complete, then step once.
    /// Returns true when a turn happened.
    fn step(&mut self, block_size: f32) -> bool {
        let turned = self.steps_in_run == self.current_run();
        if turned {
            self.run_lengths[self.direction.index()] += 2;
            self.direction = self.direction.next();
            self.steps_in_run = 0;
        }
        self.steps_in_run += 1;
        self.position += self.direction.unit() * block_size;
        turned
    }
}

/// Text label attached to a block
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    /// Block center, canvas space
    pub center: Vec2,
}

/// Everything the renderer needs to draw one revealed number
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub number: u64,
    /// Top-left corner, canvas space
    pub position: Vec2,
    pub size: f32,
    pub color: Rgba,
    pub prime: bool,
    pub label: Option<LabelSpec>,
}

/// Spiral layout engine
#[derive(Debug, Clone)]
pub struct SpiralLayout {
    cursor: SpiralCursor,
    origin: Vec2,
    block_size: f32,
    theme: Theme,
    turns: u64,
}

impl SpiralLayout {
    /// Start a spiral whose first block is centered on `center`
    pub fn new(center: Vec2, block_size: f32, theme: Theme) -> Self {
        let origin = center - Vec2::splat(block_size / 2.0);
        Self {
            cursor: SpiralCursor::new(origin),
            origin,
            block_size,
            theme,
            turns: 0,
        }
    }

    /// Top-left corner of block 1
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cursor(&self) -> &SpiralCursor {
        &self.cursor
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Total number of turns taken so far
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Place `number` at the cursor and advance the walk
    pub fn advance(&mut self, number: u64) -> DrawCommand {
        let prime = is_prime_u64(number);
        let position = self.cursor.position;
        let label = (number < LABEL_THRESHOLD).then(|| LabelSpec {
            text: number.to_string(),
            center: position + Vec2::splat(self.block_size / 2.0),
        });

        let command = DrawCommand {
            number,
            position,
            size: self.block_size,
            color: self.theme.block_color(prime),
            prime,
            label,
        };

        if self.cursor.step(self.block_size) {
            self.turns += 1;
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ThemePreset;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Closed-form Ulam spiral coordinates (math axes, y up) for n >= 1
    fn ulam(n: i64) -> (i64, i64) {
        if n == 1 {
            return (0, 0);
        }
        let mut k = 0;
        while (2 * k + 1) * (2 * k + 1) < n {
            k += 1;
        }
        let side = 2 * k;
        let mut m = (2 * k + 1) * (2 * k + 1);
        if n >= m - side {
            return (k - (m - n), -k);
        }
        m -= side;
        if n >= m - side {
            return (-k, -k + (m - n));
        }
        m -= side;
        if n >= m - side {
            return (-k + (m - n), k);
        }
        (k, k - (m - n - side))
    }

    fn layout() -> SpiralLayout {
        SpiralLayout::new(Vec2::ZERO, 1.0, ThemePreset::Classic.theme())
    }

    /// Grid cell of a command relative to block 1 (screen axes)
    fn cell(layout: &SpiralLayout, cmd: &DrawCommand) -> (i64, i64) {
        let rel = (cmd.position - layout.origin()) / layout.block_size();
        (rel.x.round() as i64, rel.y.round() as i64)
    }

    #[test]
    fn test_direction_cycle() {
        let mut dir = Direction::Right;
        let mut seen = vec![dir];
        for _ in 0..4 {
            dir = dir.next();
            seen.push(dir);
        }
        assert_eq!(
            seen,
            vec![Direction::Right, Direction::Up, Direction::Left, Direction::Down, Direction::Right]
        );
        assert_eq!(Direction::Up.unit(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_matches_closed_form_first_fifty() {
        let mut layout = layout();
        for n in 1..=50u64 {
            let cmd = layout.advance(n);
            let (x, y) = ulam(n as i64);
            assert_eq!(cell(&layout, &cmd), (x, -y), "n = {}", n);
        }
    }

    #[test]
    fn test_first_blocks() {
        let mut layout = layout();
        let cells: Vec<_> = (1..=10).map(|n| {
            let cmd = layout.advance(n);
            cell(&layout, &cmd)
        }).collect();
        assert_eq!(
            cells,
            vec![(0, 0), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_turn_timing() {
        let mut layout = layout();
        let mut turn_at = Vec::new();
        for n in 1..=30u64 {
            let before = layout.turns();
            layout.advance(n);
            if layout.turns() > before {
                // Turn decided while placing block n, i.e. after n - 1 steps
                turn_at.push(n - 1);
            }
            if turn_at.len() == 4 {
                break;
            }
        }
        // Steps between turns: 1, 1, 2, 2
        let gaps: Vec<u64> = turn_at
            .iter()
            .scan(0, |prev, &t| {
                let gap = t - *prev;
                *prev = t;
                Some(gap)
            })
            .collect();
        assert_eq!(gaps, vec![1, 1, 2, 2]);
        assert_eq!(layout.cursor().run_lengths, [3, 3, 4, 4]);
    }

    #[test]
    fn test_run_length_sequence() {
        let mut layout = layout();
        let mut runs = Vec::new();
        let mut current = 0;
        let mut dir = layout.cursor().direction;
        for n in 1..=200u64 {
            layout.advance(n);
            let now = layout.cursor().direction;
            if now != dir {
                runs.push(current);
                current = 0;
                dir = now;
            }
            current += 1;
        }
        let expected: Vec<u32> = (1..).flat_map(|k| [k, k]).take(runs.len()).collect();
        assert_eq!(runs, expected);
        assert!(runs.len() >= 10);
    }

    #[test]
    fn test_colors_and_labels() {
        let theme = ThemePreset::Night.theme();
        let mut layout = SpiralLayout::new(Vec2::new(400.0, 300.0), 10.0, theme);
        let first = layout.advance(1);
        assert_eq!(first.position, Vec2::new(395.0, 295.0));
        assert_eq!(first.color, theme.composite);
        let label = first.label.unwrap();
        assert_eq!(label.text, "1");
        assert_eq!(label.center, Vec2::new(400.0, 300.0));

        let second = layout.advance(2);
        assert!(second.prime);
        assert_eq!(second.color, theme.prime);
        assert_eq!(second.size, 10.0);

        for n in 3..LABEL_THRESHOLD {
            assert!(layout.advance(n).label.is_some());
        }
        assert!(layout.advance(LABEL_THRESHOLD).label.is_none());
    }

    proptest! {
        #[test]
        fn cursor_invariants_hold(count in 1u64..2_000) {
            let mut layout = layout();
            let mut cells = HashSet::new();
            let mut last: Option<(i64, i64)> = None;
            for n in 1..=count {
                let cmd = layout.advance(n);
                let c = cell(&layout, &cmd);
                prop_assert!(cells.insert(c), "cell {:?} reused", c);
                if let Some((px, py)) = last {
                    prop_assert_eq!((c.0 - px).abs() + (c.1 - py).abs(), 1);
                }
                last = Some(c);
                let cursor = layout.cursor();
                prop_assert!(cursor.steps_in_run <= cursor.current_run());
            }
        }
    }
}
