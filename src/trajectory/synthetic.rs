//! Synthetic collective motion, for demos and tests.

use super::Trajectories;

use ndarray::Array3;

use rand::Rng;

/// Parameters of a synthetic flock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flock {
    /// Number of frames to simulate.
    pub frames: usize,
    /// Number of entities in the flock.
    pub entities: usize,
    /// Side length of the square arena.
    pub extent: f64,
    /// Maximum distance an entity covers in one frame.
    pub max_speed: f64,
}

impl Default for Flock {
    fn default() -> Self {
        Self {
            frames: 512,
            entities: 128,
            extent: 100.0,
            max_speed: 2.0,
        }
    }
}

/// Reflect a coordinate (and its velocity) back into `[0, extent]`.
fn bounce(p: &mut f64, v: &mut f64, extent: f64) {
    if *p < 0.0 {
        *p = -*p;
        *v = -*v;
    } else if *p > extent {
        *p = 2.0 * extent - *p;
        *v = -*v;
    }
    *p = p.clamp(0.0, extent);
}

impl Flock {
    /// Simulate the flock.  Each frame has the variables `[x, y, speed]`.
    ///
    /// Entities steer towards the flock's mean heading with some random jitter, and bounce off
    /// the walls of the arena.
    pub fn simulate<R: Rng>(&self, rng: &mut R) -> Trajectories {
        let n = self.entities;
        let jitter = 0.25 * self.max_speed;

        let mut pos: Vec<[f64; 2]> = (0..n)
            .map(|_| [rng.gen_range(0.0..=self.extent), rng.gen_range(0.0..=self.extent)])
            .collect();
        let mut vel: Vec<[f64; 2]> = (0..n)
            .map(|_| {
                [
                    rng.gen_range(-self.max_speed..=self.max_speed),
                    rng.gen_range(-self.max_speed..=self.max_speed),
                ]
            })
            .collect();

        let mut data = Array3::zeros((self.frames, n, 3));
        for f in 0..self.frames {
            let mut mean = [0.0, 0.0];
            for v in &vel {
                mean[0] += v[0] / n as f64;
                mean[1] += v[1] / n as f64;
            }

            for e in 0..n {
                let [mut x, mut y] = pos[e];
                let [mut vx, mut vy] = vel[e];

                vx = 0.9 * vx + 0.1 * mean[0] + rng.gen_range(-jitter..=jitter);
                vy = 0.9 * vy + 0.1 * mean[1] + rng.gen_range(-jitter..=jitter);

                let speed = vx.hypot(vy);
                if speed > self.max_speed {
                    vx *= self.max_speed / speed;
                    vy *= self.max_speed / speed;
                }

                x += vx;
                y += vy;
                bounce(&mut x, &mut vx, self.extent);
                bounce(&mut y, &mut vy, self.extent);

                pos[e] = [x, y];
                vel[e] = [vx, vy];

                data[[f, e, 0]] = x;
                data[[f, e, 1]] = y;
                data[[f, e, 2]] = vx.hypot(vy);
            }
        }

        Trajectories::new(data)
    }
}
