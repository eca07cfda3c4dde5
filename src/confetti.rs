//! Decorative confetti burst shown after a stage change.
//!
//! A batch is generated once per mount. Every particle gets its own column,
//! colour, delay and duration, then falls from one screen-height above the
//! top to one screen-height below, spinning twice and fading out.

use rand::Rng;
use ratatui::style::Color;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_PIECES: usize = 50;

pub const PALETTE: [Color; 5] = [
    Color::Rgb(0xFF, 0xD7, 0x00), // gold
    Color::Rgb(0xFF, 0x69, 0xB4), // hot pink
    Color::Rgb(0x41, 0x69, 0xE1), // royal blue
    Color::Rgb(0x32, 0xCD, 0x32), // lime green
    Color::Rgb(0xFF, 0x45, 0x00), // orange red
];

const MAX_DELAY_SECS: f32 = 2.0;
const MIN_DURATION_SECS: f32 = 2.0;
const DURATION_SPREAD_SECS: f32 = 2.0;
const FULL_SPIN_DEG: f32 = 720.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Horizontal position as a fraction of the width, 0.0..1.0
    pub x: f32,
    pub color: Color,
    pub delay: Duration,
    pub duration: Duration,
}

/// Where a particle is at a given moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticlePose {
    pub x: f32,
    /// Vertical position as a fraction of the height; visible while in 0.0..1.0
    pub y: f32,
    pub rotation_deg: f32,
    pub opacity: f32,
}

impl Particle {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(0.0..1.0),
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            delay: Duration::from_secs_f32(rng.gen_range(0.0..MAX_DELAY_SECS)),
            duration: Duration::from_secs_f32(
                MIN_DURATION_SECS + rng.gen_range(0.0..DURATION_SPREAD_SECS),
            ),
        }
    }

    /// Pose `since_mount` after the batch was mounted. `None` before the
    /// particle's delay has passed and after it has finished.
    pub fn pose(&self, since_mount: Duration) -> Option<ParticlePose> {
        let active = since_mount.checked_sub(self.delay)?;
        if active >= self.duration {
            return None;
        }

        let t = ease_out(active.as_secs_f32() / self.duration.as_secs_f32());
        Some(ParticlePose {
            x: self.x,
            y: -1.0 + 2.0 * t,
            rotation_deg: FULL_SPIN_DEG * t,
            opacity: 1.0 - t,
        })
    }
}

/// CSS `ease-out`, approximated
fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(2)
}

/// One mounted batch of particles
#[derive(Debug, Clone)]
pub struct Confetti {
    particles: Vec<Particle>,
    mounted_at: Instant,
}

impl Confetti {
    pub fn mount<R: Rng + ?Sized>(count: usize, rng: &mut R, now: Instant) -> Self {
        let particles = (0..count).map(|_| Particle::random(rng)).collect();
        Self {
            particles,
            mounted_at: now,
        }
    }

    #[cfg(test)]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles currently in flight, with their colours
    pub fn poses(&self, now: Instant) -> impl Iterator<Item = (ParticlePose, Color)> + '_ {
        let since = now.saturating_duration_since(self.mounted_at);
        self.particles
            .iter()
            .filter_map(move |p| p.pose(since).map(|pose| (pose, p.color)))
    }

    /// True once every particle has run to completion
    pub fn finished(&self, now: Instant) -> bool {
        let since = now.saturating_duration_since(self.mounted_at);
        self.particles.iter().all(|p| since >= p.delay + p.duration)
    }
}
