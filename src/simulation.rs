// Spring-damper particle simulation: every frame each particle drifts by its
// velocity, loses some of it to friction and is pulled back toward its
// origin. Pointer movement kicks nearby particles away.

use tracing::trace;
use vecmath::{vec2_add, vec2_len, vec2_scale, vec2_sub, Vector2};

use crate::config::Physics;
use crate::particle::Particle;
use crate::surface::Surface;

#[derive(Debug, Default)]
pub struct Simulation {
    physics: Physics,
    particles: Vec<Particle>,
}

impl Simulation {
    pub fn new(physics: Physics) -> Self {
        Simulation {
            physics,
            particles: Vec::new(),
        }
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Swaps in a freshly built field. The previous particles are dropped.
    pub fn replace(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn step(&mut self) {
        let Physics {
            friction,
            attraction,
            ..
        } = self.physics;
        for particle in &mut self.particles {
            particle.pos = vec2_add(particle.pos, particle.vel);
            particle.vel = vec2_scale(particle.vel, friction);
            let to_origin = vec2_sub(particle.origin(), particle.pos);
            particle.vel = vec2_add(particle.vel, vec2_scale(to_origin, attraction));
        }
    }

    /// Pushes every particle within the effect radius away from `pointer`,
    /// with a force falling off linearly from 1 at the pointer to 0 at the
    /// radius. Only velocities change; positions follow on the next step.
    pub fn apply_pointer(&mut self, pointer: Vector2<f64>) {
        let radius = self.physics.effect_radius;
        let strength = self.physics.impulse_strength;
        let mut pushed = 0usize;
        for particle in &mut self.particles {
            let delta = vec2_sub(particle.pos, pointer);
            let distance = vec2_len(delta);
            if distance < radius {
                let force = (radius - distance) / radius;
                // atan2(0, 0) is 0 here, so a particle right under the
                // pointer is pushed along +x
                let angle = delta[1].atan2(delta[0]);
                let kick = [angle.cos() * force * strength, angle.sin() * force * strength];
                particle.vel = vec2_add(particle.vel, kick);
                pushed += 1;
            }
        }
        trace!(x = pointer[0], y = pointer[1], pushed, "pointer impulse");
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        let size = self.physics.particle_size;
        for particle in &self.particles {
            surface.fill_square(particle.pos[0], particle.pos[1], size, particle.color());
        }
    }

    /// One animation frame.
    pub fn advance<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.step();
        self.draw(surface);
    }
}
