use crate::geometry::Point;

/// Which canvas coordinate a guideline pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Vertical line at a canvas x coordinate.
    X,
    /// Horizontal line at a canvas y coordinate.
    Y,
}

impl Axis {
    /// Axis with the larger absolute displacement. Ties go to `Y`.
    pub fn dominant(diff: Point) -> Axis {
        if diff.x.abs() > diff.y.abs() { Axis::X } else { Axis::Y }
    }
}

/// Ruler guidelines in canvas space, one ordered list per axis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Guidelines {
    x: Vec<i32>,
    y: Vec<i32>,
}

impl Guidelines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, axis: Axis) -> &[i32] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    fn list_mut(&mut self, axis: Axis) -> &mut Vec<i32> {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    pub fn add(&mut self, axis: Axis, value: i32) {
        self.list_mut(axis).push(value);
    }

    /// Drop every guideline on `axis` at `value`. Returns how many went.
    pub fn remove(&mut self, axis: Axis, value: i32) -> usize {
        let list = self.list_mut(axis);
        let before = list.len();
        list.retain(|&v| v != value);
        before - list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axis_follows_larger_displacement() {
        assert_eq!(Axis::dominant(Point::new(-9, 3)), Axis::X);
        assert_eq!(Axis::dominant(Point::new(2, -5)), Axis::Y);
        assert_eq!(Axis::dominant(Point::new(4, 4)), Axis::Y);
    }

    #[test]
    fn remove_only_touches_its_axis() {
        let mut g = Guidelines::new();
        g.add(Axis::X, 3);
        g.add(Axis::Y, 3);
        g.add(Axis::X, 3);
        g.add(Axis::X, 5);
        assert_eq!(g.remove(Axis::X, 3), 2);
        assert_eq!(g.list(Axis::X), &[5]);
        assert_eq!(g.list(Axis::Y), &[3]);
        assert_eq!(g.remove(Axis::Y, 7), 0);
    }
}
