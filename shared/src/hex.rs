use serde::{Deserialize, Serialize};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Vertex radius as a fraction of the hex size. The inset leaves a visible
/// gap between neighbouring cells.
pub const HEX_INSET: f64 = 0.95;

/// Axial hex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implied third cube coordinate.
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn distance(&self, other: Hex) -> u32 {
        axial_distance(*self, other)
    }

    pub fn neighbors(&self) -> [Hex; 6] {
        let Hex { q, r } = *self;
        [
            Hex::new(q + 1, r),
            Hex::new(q + 1, r - 1),
            Hex::new(q, r - 1),
            Hex::new(q - 1, r),
            Hex::new(q - 1, r + 1),
            Hex::new(q, r + 1),
        ]
    }

    pub fn to_pixel(&self, size: f64) -> (f64, f64) {
        axial_to_pixel(self.q, self.r, size)
    }
}

impl From<(i32, i32)> for Hex {
    fn from((q, r): (i32, i32)) -> Self {
        Hex::new(q, r)
    }
}

/// Project an axial coordinate to the centre of its cell in scene pixels.
///
/// Both tile placement and `center_on` go through this, so a cell is always
/// drawn where the viewport thinks it is.
pub fn axial_to_pixel(q: i32, r: i32, size: f64) -> (f64, f64) {
    let q = q as f64;
    let r = r as f64;
    let x = size * 1.5 * q;
    let y = size * (SQRT_3 / 2.0 * q + SQRT_3 * r);
    (x, y)
}

/// Six polygon vertices around the origin at `k * 60deg`, inset by [`HEX_INSET`].
pub fn hex_corners(size: f64) -> [(f64, f64); 6] {
    let radius = size * HEX_INSET;
    std::array::from_fn(|k| {
        let angle = (60.0 * k as f64).to_radians();
        (radius * angle.cos(), radius * angle.sin())
    })
}

/// Closed SVG path for one cell, e.g. `M57.00,0.00 L28.50,49.36 ... Z`.
pub fn hex_path(size: f64) -> String {
    let mut path = String::with_capacity(96);
    for (k, (x, y)) in hex_corners(size).iter().enumerate() {
        let cmd = if k == 0 { 'M' } else { 'L' };
        if k > 0 {
            path.push(' ');
        }
        path.push_str(&format!("{cmd}{x:.2},{y:.2}"));
    }
    path.push_str(" Z");
    path
}

/// Graph distance between two hexes (number of rings apart).
pub fn axial_distance(a: Hex, b: Hex) -> u32 {
    let dq = a.q - b.q;
    let dr = a.r - b.r;
    ((dq.abs() + (dq + dr).abs() + dr.abs()) / 2) as u32
}

/// Every hex within `radius` steps of `center`, ordered by `q` then `r`.
pub fn hexes_within(center: Hex, radius: u32) -> Vec<Hex> {
    let n = radius as i32;
    let mut out = Vec::with_capacity((3 * n * (n + 1) + 1) as usize);
    for dq in -n..=n {
        let r_min = (-n).max(-dq - n);
        let r_max = n.min(-dq + n);
        for dr in r_min..=r_max {
            out.push(Hex::new(center.q + dq, center.r + dr));
        }
    }
    out
}

/// Inclusive axial bounding box used for viewport-scoped fetches.
/// Unset edges are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_q: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_q: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_r: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_r: Option<i32>,
}

impl Bounds {
    pub const fn new(min_q: i32, max_q: i32, min_r: i32, max_r: i32) -> Self {
        Self {
            min_q: Some(min_q),
            max_q: Some(max_q),
            min_r: Some(min_r),
            max_r: Some(max_r),
        }
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.min_q.is_none_or(|v| hex.q >= v)
            && self.max_q.is_none_or(|v| hex.q <= v)
            && self.min_r.is_none_or(|v| hex.r >= v)
            && self.max_r.is_none_or(|v| hex.r <= v)
    }

    /// Query string without the leading `?`; empty when fully unbounded.
    pub fn query_string(&self) -> String {
        let pairs = [
            ("minQ", self.min_q),
            ("maxQ", self.max_q),
            ("minR", self.min_r),
            ("maxR", self.max_r),
        ];
        pairs
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{key}={v}")))
            .collect::<Vec<_>>()
            .join("&")
    }
}
