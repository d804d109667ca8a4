use crate::display::{Point, TextExtent};
use crate::job::ReceiptGeometry;

/// Left edge for a line centred within `width_px`, never left of the margin.
///
/// Text wider than the printable area starts at the margin and clips on the right.
pub fn centered_x(width_px: i32, text_width_px: i32, margin_px: i32) -> i32 {
    margin_px.max((width_px - text_width_px).div_euclid(2))
}

/// Positions of the three marks on a receipt.
/// 收據上三個繪製位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptLayout {
    pub task: Point,
    pub timestamp: Point,
    /// Blank mark that forces the paper feed past the tear bar.
    pub feed_mark: Point,
}

impl ReceiptLayout {
    /// Lays the receipt out top to bottom from the measured task extent.
    /// 依任務文字的量測尺寸由上而下配置收據。
    pub fn compute(geometry: &ReceiptGeometry, width_px: i32, task_extent: TextExtent) -> Self {
        let margin = geometry.margin_px;
        let task = Point::new(
            centered_x(width_px, task_extent.width, margin),
            margin + geometry.task_offset_px,
        );
        let timestamp = Point::new(
            margin,
            task.y + task_extent.height + geometry.timestamp_gap_px,
        );
        let feed_mark = Point::new(
            margin,
            timestamp.y + geometry.timestamp_line_px + geometry.bottom_padding_px,
        );
        Self {
            task,
            timestamp,
            feed_mark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_text_is_centred() {
        assert_eq!(centered_x(639, 199, 20), 220);
        assert_eq!(centered_x(639, 200, 20), 219);
    }

    #[test]
    fn wide_text_collapses_to_margin() {
        // Exactly filling the printable area.
        assert_eq!(centered_x(639, 599, 20), 20);
        assert_eq!(centered_x(639, 600, 20), 20);
        assert_eq!(centered_x(639, 2000, 20), 20);
    }

    #[test]
    fn centring_matches_formula_across_widths() {
        let width = 639;
        let margin = 20;
        for text_width in (0..1200).step_by(7) {
            let x = centered_x(width, text_width, margin);
            assert_eq!(x, margin.max((width - text_width).div_euclid(2)));
            assert!(x >= margin);
            if text_width > width - 2 * margin {
                assert_eq!(x, margin);
            }
        }
    }

    #[test]
    fn layout_stacks_lines_with_fixed_gaps() {
        let geometry = ReceiptGeometry::thermal_80mm();
        let layout = ReceiptLayout::compute(&geometry, 639, TextExtent::new(239, 45));
        assert_eq!(layout.task, Point::new(200, 40));
        assert_eq!(layout.timestamp, Point::new(20, 125));
        assert_eq!(layout.feed_mark, Point::new(20, 265));
    }
}
