//! Error diffusion kernel over mosaic cells.

/// How a cell's residual colour error is spread to cells not yet visited
/// in the forward pass.
///
/// Each neighbour at `(dx, dy)` receives `error * weight / divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    /// `(dx, dy, weight)` entries; `dy` is never negative.
    pub entries: &'static [(i32, i32, u8)],

    /// Each neighbor receives `error * weight / divisor`.
    pub divisor: u8,
}

impl Kernel {
    /// Iterate over `(dx, dy, fraction)`.
    pub fn fractions(&self) -> impl Iterator<Item = (i32, i32, f32)> + '_ {
        let divisor = self.divisor as f32;
        self.entries
            .iter()
            .map(move |&(dx, dy, w)| (dx, dy, w as f32 / divisor))
    }

    /// Fraction of the error the kernel propagates in total.
    pub fn propagation(&self) -> f32 {
        self.fractions().map(|(_, _, f)| f).sum()
    }
}

/// Floyd-Steinberg kernel, 100% propagation (16/16).
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // bottom-left
        (0, 1, 5),  // bottom
        (1, 1, 1),  // bottom-right
    ],
    divisor: 16,
};
