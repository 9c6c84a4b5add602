use foundation::math::Vec3;

/// A body in the miniature solar-system scene.
///
/// Positions and radii use the scene's own scaled units, laid out along the
/// +X axis; they are display values, not astronomy.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    pub name: &'static str,
    pub center: Vec3,
    pub radius: f64,
    pub color: [f32; 4],
    pub visible: bool,
}

impl CelestialBody {
    fn new(name: &'static str, distance: f64, radius: f64, color: [f32; 4]) -> Self {
        Self {
            name,
            center: Vec3::new(distance, 0.0, 0.0),
            radius,
            color,
            visible: true,
        }
    }
}

/// The sun, the eight planets, and the Moon, plus focus navigation over them.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySystem {
    bodies: Vec<CelestialBody>,
    focus: Option<usize>,
}

pub fn solar_system() -> BodySystem {
    let bodies = vec![
        CelestialBody::new("Sun", 0.0, 696_340.0, [1.0, 0.65, 0.0, 1.0]),
        CelestialBody::new("Mercury", 1.0e6, 50_000.0, [0.5, 0.5, 0.5, 1.0]),
        CelestialBody::new("Venus", 2.0e6, 120_000.0, [0.96, 0.96, 0.86, 1.0]),
        CelestialBody::new("Earth", 3.0e6, 127_000.0, [0.0, 0.0, 1.0, 1.0]),
        CelestialBody::new("Mars", 4.0e6, 70_000.0, [1.0, 0.0, 0.0, 1.0]),
        CelestialBody::new("Jupiter", 6.0e6, 400_000.0, [0.96, 0.64, 0.38, 1.0]),
        CelestialBody::new("Saturn", 8.0e6, 350_000.0, [1.0, 0.84, 0.0, 1.0]),
        CelestialBody::new("Uranus", 10.0e6, 250_000.0, [0.0, 1.0, 1.0, 1.0]),
        CelestialBody::new("Neptune", 12.0e6, 240_000.0, [0.0, 0.75, 1.0, 1.0]),
        CelestialBody::new("Moon", 3.0e6 + 300_000.0, 30_000.0, [0.83, 0.83, 0.83, 1.0]),
    ];
    BodySystem {
        bodies,
        focus: None,
    }
}

impl BodySystem {
    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }

    pub fn is_in_focus_mode(&self) -> bool {
        self.focus.is_some()
    }

    pub fn focused(&self) -> Option<&CelestialBody> {
        self.focus.map(|i| &self.bodies[i])
    }

    /// Focus one body: it becomes the only visible entity.
    pub fn focus(&mut self, index: usize) -> Option<&CelestialBody> {
        if index >= self.bodies.len() {
            return None;
        }
        self.focus = Some(index);
        for (i, body) in self.bodies.iter_mut().enumerate() {
            body.visible = i == index;
        }
        Some(&self.bodies[index])
    }

    /// Advance focus, wrapping past the last body.
    pub fn focus_next(&mut self) -> Option<&CelestialBody> {
        let next = match self.focus {
            Some(i) if i + 1 < self.bodies.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.focus(next)
    }

    /// Step focus backwards, wrapping past the first body.
    pub fn focus_previous(&mut self) -> Option<&CelestialBody> {
        let prev = match self.focus {
            Some(i) if i > 0 => i - 1,
            _ => self.bodies.len().saturating_sub(1),
        };
        self.focus(prev)
    }

    /// Leave focus mode: every body visible again.
    pub fn reset(&mut self) {
        self.focus = None;
        for body in &mut self.bodies {
            body.visible = true;
        }
    }
}
