use crate::app::Vec2;

const MIN_SMOOTH_TIME_SECONDS: f32 = 0.0001;

/// Critically damped spring toward `target`. `velocity` carries state between calls and
/// `max_speed` caps the approach speed. The result never overshoots `target`.
pub fn smooth_damp(
    current: Vec2,
    target: Vec2,
    velocity: &mut Vec2,
    smooth_time: f32,
    max_speed: f32,
    dt: f32,
) -> Vec2 {
    if dt <= 0.0 {
        return current;
    }
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME_SECONDS);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let mut change = current - target;
    let max_change = max_speed * smooth_time;
    let change_length = change.length();
    if change_length > max_change && change_length > 0.0 {
        change = change.scale(max_change / change_length);
    }
    let clamped_target = current - change;

    let temp = (*velocity + change.scale(omega)).scale(dt);
    *velocity = (*velocity - temp.scale(omega)).scale(decay);
    let mut output = clamped_target + (change + temp).scale(decay);

    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec2::ZERO;
    }
    output
}

/// Moves at most `max_delta` toward `target`.
pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + delta.scale(max_delta / distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let target = Vec2::new(10.0, -4.0);
        let mut position = Vec2::ZERO;
        let mut velocity = Vec2::ZERO;
        let mut previous_distance = position.distance(target);

        for _ in 0..240 {
            position = smooth_damp(position, target, &mut velocity, 0.1, f32::INFINITY, DT);
            let distance = position.distance(target);
            assert!(distance <= previous_distance + 1e-5);
            previous_distance = distance;
        }

        assert!(position.distance(target) < 1e-3);
    }

    #[test]
    fn smooth_damp_respects_max_speed() {
        let mut velocity = Vec2::ZERO;
        let mut position = Vec2::ZERO;
        let target = Vec2::new(100.0, 0.0);
        let max_speed = 5.0;

        for _ in 0..30 {
            let next = smooth_damp(position, target, &mut velocity, 0.05, max_speed, DT);
            assert!(next.distance(position) <= max_speed * DT * 1.5);
            position = next;
        }
    }

    #[test]
    fn smooth_damp_with_zero_dt_holds_position() {
        let mut velocity = Vec2::new(3.0, 0.0);
        let current = Vec2::new(1.0, 1.0);
        assert_eq!(
            smooth_damp(current, Vec2::ZERO, &mut velocity, 0.1, 10.0, 0.0),
            current
        );
    }

    #[test]
    fn move_towards_advances_at_constant_step() {
        let start = Vec2::ZERO;
        let target = Vec2::new(3.0, 4.0);

        let step = move_towards(start, target, 1.0);
        assert!((step.length() - 1.0).abs() < 1e-5);
        assert_eq!(move_towards(step, target, 10.0), target);
        assert_eq!(move_towards(target, target, 1.0), target);
    }
}
