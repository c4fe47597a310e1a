use crate::braille::BrailleCanvas;

/// Clip a segment to the canvas pixel rectangle (Liang-Barsky).
/// Returns `None` when the segment lies entirely outside.
fn clip_to_canvas(canvas: &BrailleCanvas, from: (i32, i32), to: (i32, i32)) -> Option<((i32, i32), (i32, i32))> {
    let max_x = (canvas.width() * 2) as f64 - 1.0;
    let max_y = (canvas.height() * 4) as f64 - 1.0;
    if max_x < 0.0 || max_y < 0.0 {
        return None;
    }

    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (dx, dy) = ((to.0 - from.0) as f64, (to.1 - from.1) as f64);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [(-dx, x0), (dx, max_x - x0), (-dy, y0), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| ((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

/// Bresenham line, clipped to the canvas first so far off-screen
/// endpoints at high zoom cost nothing
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let Some(((mut x, mut y), (x1, y1))) = clip_to_canvas(canvas, (x0, y0), (x1, y1)) else {
        return;
    };

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = (x1 - x).signum();
    let sy = (y1 - y).signum();
    let mut err = dx + dy;

    loop {
        canvas.set_pixel_signed(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Two-pixel line for the selected country outline. The extra stroke is
/// offset across the line's major axis.
pub fn draw_thick_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    draw_line(canvas, x0, y0, x1, y1);
    if (x1 - x0).abs() >= (y1 - y0).abs() {
        draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
    } else {
        draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dots(canvas: &BrailleCanvas) -> u32 {
        canvas
            .rows()
            .flat_map(|row| row.chars().collect::<Vec<_>>())
            .map(|ch| (ch as u32 - 0x2800).count_ones())
            .sum()
    }

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        // Top dot row of every cell: 0x01 | 0x08
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        // Left column of both cells: 0x01 | 0x02 | 0x04 | 0x40
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_far_endpoints_are_clipped() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, -1_000_000, 0, 1_000_000, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");

        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, -50, -50, -10, -10);
        assert_eq!(dots(&canvas), 0);
    }

    #[test]
    fn test_thick_line_sets_more_dots() {
        let mut thin = BrailleCanvas::new(5, 2);
        let mut thick = BrailleCanvas::new(5, 2);
        draw_line(&mut thin, 0, 0, 9, 3);
        draw_thick_line(&mut thick, 0, 0, 9, 3);
        assert!(dots(&thick) > dots(&thin));
    }
}
