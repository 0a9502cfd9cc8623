// ============================================================================
// FLOOD FILL — 4-connected bucket fill on a single layer
// ============================================================================

use crate::canvas::PixelBuffer;
use crate::color::Color;
use crate::geometry::Point;

/// Fill the 4-connected region containing `seed` with `fill`.
///
/// The seed's colour is captured once up front. A pixel is painted as soon as
/// it is discovered and neighbours are compared against that captured colour,
/// so a repainted pixel never matches again and acts as the visited marker.
/// Uses a DFS `Vec` stack, so region size is bounded by memory rather than
/// call depth.
///
/// Returns the number of pixels painted (0 when `fill` already equals the
/// seed colour).
pub fn flood_fill(buf: &mut PixelBuffer, seed: Point, fill: Color) -> usize {
    let original = buf.get_pixel(seed.x, seed.y);
    if original == fill {
        return 0;
    }

    let w = buf.width() as i32;
    let h = buf.height() as i32;

    let mut painted = 1;
    buf.put_pixel(seed.x, seed.y, fill);
    let mut stack: Vec<Point> = Vec::with_capacity(256);
    stack.push(seed);

    while let Some(p) = stack.pop() {
        // Up, down, left, right
        let neighbours = [
            (p.y > 0).then(|| Point::new(p.x, p.y - 1)),
            (p.y < h - 1).then(|| Point::new(p.x, p.y + 1)),
            (p.x > 0).then(|| Point::new(p.x - 1, p.y)),
            (p.x < w - 1).then(|| Point::new(p.x + 1, p.y)),
        ];
        for n in neighbours.into_iter().flatten() {
            if buf.get_pixel(n.x, n.y) == original {
                buf.put_pixel(n.x, n.y, fill);
                painted += 1;
                stack.push(n);
            }
        }
    }

    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::CHROMA;

    const C: Color = Color::rgb(1, 2, 3);
    const WALL: Color = Color::rgb(40, 40, 40);

    #[test]
    fn fills_whole_blank_canvas() {
        let mut buf = PixelBuffer::blank(8, 8);
        assert_eq!(flood_fill(&mut buf, Point::new(0, 0), C), 64);
        assert!(buf.pixels().iter().all(|&p| p == C));
    }

    #[test]
    fn same_colour_is_a_no_op() {
        let mut buf = PixelBuffer::new_filled(3, 3, C);
        assert_eq!(flood_fill(&mut buf, Point::new(1, 1), C), 0);
    }

    #[test]
    fn stops_at_walls_and_ignores_diagonals() {
        // . . W .
        // . . W .
        // W W . .
        // . . . .
        let mut buf = PixelBuffer::blank(4, 4);
        for &(x, y) in &[(2, 0), (2, 1), (0, 2), (1, 2)] {
            buf.put_pixel(x, y, WALL);
        }
        let n = flood_fill(&mut buf, Point::new(0, 0), C);
        assert_eq!(n, 4);
        for &(x, y) in &[(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(buf.get_pixel(x, y), C);
        }
        // (2,2) touches the filled block only diagonally.
        assert_eq!(buf.get_pixel(2, 2), CHROMA);
        assert_eq!(buf.get_pixel(3, 0), CHROMA);
    }

    #[test]
    fn fills_exactly_the_connected_region() {
        // Checkerboard-ish maze: compare against a reference BFS.
        let mut buf = PixelBuffer::blank(9, 7);
        for y in 0..7 {
            for x in 0..9 {
                if (x * 7 + y * 3) % 5 == 0 {
                    buf.put_pixel(x, y, WALL);
                }
            }
        }
        let before = buf.clone();
        let seed = Point::new(1, 1);
        let original = before.get_pixel(1, 1);

        let mut region = vec![false; 63];
        let mut queue = std::collections::VecDeque::from([seed]);
        region[(seed.y * 9 + seed.x) as usize] = true;
        while let Some(p) = queue.pop_front() {
            for d in [Point::new(1, 0), Point::new(-1, 0), Point::new(0, 1), Point::new(0, -1)] {
                let n = p + d;
                if before.in_bounds(n.x, n.y)
                    && !region[(n.y * 9 + n.x) as usize]
                    && before.get_pixel(n.x, n.y) == original
                {
                    region[(n.y * 9 + n.x) as usize] = true;
                    queue.push_back(n);
                }
            }
        }

        let n = flood_fill(&mut buf, seed, C);
        assert_eq!(n, region.iter().filter(|&&r| r).count());
        for y in 0..7 {
            for x in 0..9 {
                let expected = if region[(y * 9 + x) as usize] { C } else { before.get_pixel(x, y) };
                assert_eq!(buf.get_pixel(x, y), expected, "({x},{y})");
            }
        }
    }

    #[test]
    fn large_canvas_does_not_overflow_the_stack() {
        let mut buf = PixelBuffer::blank(1024, 1024);
        assert_eq!(flood_fill(&mut buf, Point::new(512, 512), C), 1024 * 1024);
    }
}
