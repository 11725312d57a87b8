//! Ball-and-paddle physics for Pongforge.
//!
//! Everything here is pure: [`advance`] takes the current ball, both paddle
//! offsets and the [`Field`] geometry, and returns the next ball. No clocks,
//! no randomness, no I/O, so a tick sequence is exactly reproducible.
//!
//! # Frame convention
//!
//! Position is integrated first and every collision test looks at the
//! *post-move* position. A ball at `y = 389` moving `dy = 2` lands on
//! `y = 391`, is reported there, and leaves that frame with `dy = -2`.
//!
//! ```text
//!   (0,0) ───────────────────────────── x ──→ (width)
//!     │ ▌left paddle                right paddle ▐
//!     │ ▌x = left_paddle_x     x = right_paddle_x ▐
//!     y              ● ball
//!     ↓ (height)
//! ```

#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// Geometry of the play field and the ball's launch parameters.
///
/// `Default` reproduces the reference table: 800 × 390 field, paddles 80
/// tall sitting on the `x = 20` and `x = 770` planes, ball launched from
/// `(395, 195)` at `(2, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Horizontal extent. A ball with `x` outside `[0, width]` is lost.
    pub width: f64,
    /// Vertical extent. A ball with `y` outside `[0, height]` bounces.
    pub height: f64,
    /// Height of both paddles.
    pub paddle_height: f64,
    /// The left paddle's x-plane.
    pub left_paddle_x: f64,
    /// The right paddle's x-plane.
    pub right_paddle_x: f64,
    /// Where both paddles start when a game begins.
    pub paddle_start: f64,
    /// Ball position after launch or reset.
    pub center: (f64, f64),
    /// Ball velocity after launch or reset.
    pub launch_velocity: (f64, f64),
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 390.0,
            paddle_height: 80.0,
            left_paddle_x: 20.0,
            right_paddle_x: 770.0,
            paddle_start: 200.0,
            center: (395.0, 195.0),
            launch_velocity: (2.0, 2.0),
        }
    }
}

impl Field {
    /// Clamps a client-reported paddle offset into `[0, height - paddle_height]`
    /// so a paddle can never leave the field.
    pub fn clamp_paddle(&self, position: f64) -> f64 {
        let max = (self.height - self.paddle_height).max(0.0);
        position.clamp(0.0, max)
    }

    /// Returns `true` if `y` lies on a paddle whose top edge is at `paddle`.
    fn covers(&self, paddle: f64, y: f64) -> bool {
        y >= paddle && y <= paddle + self.paddle_height
    }
}

// ---------------------------------------------------------------------------
// Ball
// ---------------------------------------------------------------------------

/// Ball position and per-tick velocity. Serializes as `{x, y, dx, dy}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Ball {
    /// A ball at the field center with the launch velocity.
    pub fn launch(field: &Field) -> Self {
        Self {
            x: field.center.0,
            y: field.center.1,
            dx: field.launch_velocity.0,
            dy: field.launch_velocity.1,
        }
    }
}

// ---------------------------------------------------------------------------
// Stepping
// ---------------------------------------------------------------------------

/// Advances the ball by one tick.
///
/// `left` and `right` are the top edges of the two paddles. The steps, all
/// against the post-move position:
///
/// 1. integrate `(x, y) += (dx, dy)`;
/// 2. `y` outside `[0, height]` → reflect `dy`;
/// 3. travelling left, `x <= left_paddle_x` and the left paddle covers `y`
///    → reflect `dx` (mirrored for the right paddle);
/// 4. `x` outside `[0, width]` → the ball was missed: relaunch from center.
///
/// The direction check in step 3 means a ball already heading away from a
/// paddle is never reflected back into it.
pub fn advance(ball: Ball, left: f64, right: f64, field: &Field) -> Ball {
    let mut next = Ball {
        x: ball.x + ball.dx,
        y: ball.y + ball.dy,
        ..ball
    };

    if next.y < 0.0 || next.y > field.height {
        next.dy = -next.dy;
    }

    if next.dx < 0.0 && next.x <= field.left_paddle_x && field.covers(left, next.y) {
        next.dx = -next.dx;
    } else if next.dx > 0.0
        && next.x >= field.right_paddle_x
        && field.covers(right, next.y)
    {
        next.dx = -next.dx;
    }

    if next.x < 0.0 || next.x > field.width {
        return Ball::launch(field);
    }

    next
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f64, y: f64, dx: f64, dy: f64) -> Ball {
        Ball { x, y, dx, dy }
    }

    #[test]
    fn test_advance_integrates_velocity() {
        let field = Field::default();
        let next = advance(ball(100.0, 100.0, 2.0, 2.0), 200.0, 200.0, &field);
        assert_eq!(next, ball(102.0, 102.0, 2.0, 2.0));
    }

    #[test]
    fn test_advance_reflects_off_bottom_wall_post_move() {
        let field = Field::default();
        let next = advance(ball(300.0, 389.0, 2.0, 2.0), 0.0, 0.0, &field);
        // Reported where it landed, velocity already flipped.
        assert_eq!(next, ball(302.0, 391.0, 2.0, -2.0));
    }

    #[test]
    fn test_advance_reflects_off_top_wall() {
        let field = Field::default();
        let next = advance(ball(300.0, 1.0, 2.0, -2.0), 0.0, 0.0, &field);
        assert_eq!(next, ball(302.0, -1.0, 2.0, 2.0));
    }

    #[test]
    fn test_advance_wall_bounds_are_inclusive() {
        let field = Field::default();
        let next = advance(ball(300.0, 388.0, 2.0, 2.0), 0.0, 0.0, &field);
        assert_eq!(next.y, 390.0);
        assert_eq!(next.dy, 2.0, "y == height is still inside the field");
    }

    #[test]
    fn test_advance_left_paddle_reflects() {
        let field = Field::default();
        let next = advance(ball(22.0, 230.0, -2.0, 0.0), 200.0, 0.0, &field);
        assert_eq!(next, ball(20.0, 230.0, 2.0, 0.0));
    }

    #[test]
    fn test_advance_left_paddle_edges_count_as_hits() {
        let field = Field::default();
        let top = advance(ball(22.0, 200.0, -2.0, 0.0), 200.0, 0.0, &field);
        let bottom = advance(ball(22.0, 280.0, -2.0, 0.0), 200.0, 0.0, &field);
        assert_eq!(top.dx, 2.0);
        assert_eq!(bottom.dx, 2.0);
    }

    #[test]
    fn test_advance_left_paddle_miss_keeps_going() {
        let field = Field::default();
        let next = advance(ball(22.0, 100.0, -2.0, 0.0), 200.0, 0.0, &field);
        assert_eq!(next, ball(20.0, 100.0, -2.0, 0.0));
    }

    #[test]
    fn test_advance_ball_leaving_left_paddle_is_not_reflected_back() {
        let field = Field::default();
        // Inside the paddle zone but already heading right.
        let next = advance(ball(16.0, 230.0, 2.0, 0.0), 200.0, 0.0, &field);
        assert_eq!(next, ball(18.0, 230.0, 2.0, 0.0));
    }

    #[test]
    fn test_advance_right_paddle_reflects() {
        let field = Field::default();
        let next = advance(ball(768.0, 240.0, 2.0, 2.0), 0.0, 200.0, &field);
        assert_eq!(next, ball(770.0, 242.0, -2.0, 2.0));
    }

    #[test]
    fn test_advance_miss_on_left_resets_to_launch() {
        let field = Field::default();
        let next = advance(ball(1.0, 100.0, -2.0, 2.0), 300.0, 0.0, &field);
        assert_eq!(next, Ball::launch(&field));
        assert_eq!(next, ball(395.0, 195.0, 2.0, 2.0));
    }

    #[test]
    fn test_advance_miss_on_right_resets_to_launch() {
        let field = Field::default();
        let next = advance(ball(799.0, 10.0, 2.0, 2.0), 0.0, 300.0, &field);
        assert_eq!(next, Ball::launch(&field));
    }

    #[test]
    fn test_advance_exact_bounce_frames_from_launch() {
        // Paddles parked at 200. From (395,195) moving (2,2): y passes 390 on
        // tick 98 (y = 391), then the ball meets the right paddle on tick 188
        // at (771, 211).
        let field = Field::default();
        let mut b = Ball::launch(&field);
        let mut first_dy_flip = None;
        let mut first_dx_flip = None;
        for tick in 1..=200u32 {
            let prev = b;
            b = advance(b, 200.0, 200.0, &field);
            if first_dy_flip.is_none() && b.dy != prev.dy {
                first_dy_flip = Some((tick, b.y));
            }
            if first_dx_flip.is_none() && b.dx != prev.dx {
                first_dx_flip = Some((tick, b.x, b.y));
            }
        }
        assert_eq!(first_dy_flip, Some((98, 391.0)));
        assert_eq!(first_dx_flip, Some((188, 771.0, 211.0)));
    }

    #[test]
    fn test_advance_position_is_prev_plus_velocity_except_on_reset() {
        let field = Field::default();
        let launch = Ball::launch(&field);
        let mut b = launch;
        let mut resets = 0;
        for tick in 0..5_000u32 {
            // Paddles wander so the ball both hits and misses.
            let left = f64::from(tick % 311);
            let right = f64::from((tick * 7) % 311);
            let prev = b;
            b = advance(b, left, right, &field);
            if b == launch {
                resets += 1;
                continue;
            }
            assert_eq!(b.x, prev.x + prev.dx, "tick {tick}");
            assert_eq!(b.y, prev.y + prev.dy, "tick {tick}");
            let outside = b.y < 0.0 || b.y > field.height;
            assert_eq!(b.dy == -prev.dy, outside, "tick {tick}: dy flips iff y left the field");
        }
        assert!(resets > 0, "expected at least one missed ball");
    }

    #[test]
    fn test_clamp_paddle_limits_to_field() {
        let field = Field::default();
        assert_eq!(field.clamp_paddle(-50.0), 0.0);
        assert_eq!(field.clamp_paddle(150.0), 150.0);
        assert_eq!(field.clamp_paddle(1_000.0), 310.0);
    }

    #[test]
    fn test_ball_serializes_as_flat_object() {
        let json = serde_json::to_value(ball(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 2.0, "dx": 3.0, "dy": 4.0}));
    }
}
