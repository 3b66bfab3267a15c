use crate::api::layout::LayoutPlan;
use crate::core::{Direction, FrequencyBand, Path, Transform};
use crate::render::{FillPrimitive, LineCap, RenderFrame, StrokePrimitive};

const BAND_FILL_ALPHA: f64 = 0.075;
const BAND_STROKE_ALPHA: f64 = 0.1;

/// Shaded frequency bands behind the per-carrier charts, with separators at
/// the band edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandOverlay {
    pub downstream: Path,
    pub upstream: Path,
    pub separators: Path,
}

impl BandOverlay {
    /// Builds the overlay in device pixels for bands sorted by start bin.
    ///
    /// Edges of neighbouring bands that end up within one stroke width of
    /// each other share a single separator at the centre bin between them.
    #[must_use]
    pub fn build(bands: &[FrequencyBand], bin_count: usize, layout: &LayoutPlan) -> Self {
        let mut overlay = Self::default();
        let (Some(first), Some(last)) = (bands.first(), bands.last()) else {
            return overlay;
        };

        let s = layout.stroke_width;
        let half = 0.5 * s;
        let top = layout.plot.y;
        let bottom = layout.plot.bottom();
        let origin = layout.plot.x;
        let scale_x = layout.scale_x(bin_count);
        let edge_start = |bin: usize| origin + ((bin as f64 + 0.5) * scale_x).floor();
        let edge_end = |bin: usize| origin + ((bin as f64 + 0.5) * scale_x).ceil();

        let start = edge_start(first.start);
        let fill = overlay.fill_mut(first.direction);
        fill.move_to(start, bottom);
        fill.line_to(start, top);
        overlay.separator(start + half, top, bottom, half);

        for pair in bands.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let mut end = edge_end(before.end);
            let mut start = edge_start(after.start);

            if start - end <= s {
                let center = (after.start as f64 + before.end as f64) / 2.0;
                let pos = origin + ((center + 0.5) * scale_x).floor() + half;
                end = pos;
                start = pos;
                overlay.separator(pos, top, bottom, half);
            } else {
                overlay.separator(end - half, top, bottom, half);
                overlay.separator(start + half, top, bottom, half);
            }

            let fill = overlay.fill_mut(before.direction);
            fill.line_to(end, top);
            fill.line_to(end, bottom);
            fill.close();

            let fill = overlay.fill_mut(after.direction);
            fill.move_to(start, bottom);
            fill.line_to(start, top);
        }

        let end = edge_end(last.end);
        let fill = overlay.fill_mut(last.direction);
        fill.line_to(end, top);
        fill.line_to(end, bottom);
        fill.close();
        overlay.separator(end - half, top, bottom, half);

        overlay
    }

    fn fill_mut(&mut self, direction: Direction) -> &mut Path {
        match direction {
            Direction::Downstream => &mut self.downstream,
            Direction::Upstream => &mut self.upstream,
        }
    }

    fn separator(&mut self, pos: f64, top: f64, bottom: f64, half: f64) {
        self.separators.move_to(pos, bottom - half);
        self.separators.line_to(pos, top + half);
    }

    /// Upstream fill, downstream fill, then separators. `colored` selects
    /// the direction accents instead of the neutral fill.
    pub fn paint(&self, frame: &mut RenderFrame, layout: &LayoutPlan, colored: bool) {
        let palette = &layout.palette;
        let (downstream, upstream) = if colored {
            (palette.downstream, palette.upstream)
        } else {
            (palette.neutral_fill, palette.neutral_fill)
        };

        frame.push_fill(FillPrimitive::new(
            self.upstream.clone(),
            Transform::identity(),
            upstream.with_alpha(BAND_FILL_ALPHA),
        ));
        frame.push_fill(FillPrimitive::new(
            self.downstream.clone(),
            Transform::identity(),
            downstream.with_alpha(BAND_FILL_ALPHA),
        ));
        frame.push_stroke(StrokePrimitive::new(
            self.separators.clone(),
            Transform::identity(),
            palette.neutral_stroke.with_alpha(BAND_STROKE_ALPHA),
            layout.stroke_width,
            LineCap::Square,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::BandOverlay;
    use crate::api::layout::LayoutPlan;
    use crate::api::params::GraphParams;
    use crate::core::{AxisPlan, AxisRange, Direction, FrequencyBand, LabelFormat, PathCommand};
    use crate::render::ApproxTextMeasure;

    fn layout() -> LayoutPlan {
        let x = AxisPlan::new(AxisRange::new(0.0, 518.0), &[50, 100], 4.0, LabelFormat::Integer);
        let y = AxisPlan::new(AxisRange::new(0.0, 65.0), &[10], 3.75, LabelFormat::Integer);
        LayoutPlan::compute(&GraphParams::default(), &x, &y, None, &ApproxTextMeasure)
    }

    #[test]
    fn no_bands_no_geometry() {
        let overlay = BandOverlay::build(&[], 518, &layout());
        assert!(overlay.downstream.is_empty());
        assert!(overlay.upstream.is_empty());
        assert!(overlay.separators.is_empty());
    }

    #[test]
    fn adjacent_bands_share_one_separator() {
        let bands = [
            FrequencyBand::new(0, 99, Direction::Upstream),
            FrequencyBand::new(100, 199, Direction::Downstream),
        ];
        let overlay = BandOverlay::build(&bands, 518, &layout());

        assert_eq!(overlay.upstream.subpath_count(), 1);
        assert_eq!(overlay.downstream.subpath_count(), 1);
        // outer edges plus one shared separator
        assert_eq!(overlay.separators.subpath_count(), 3);
        assert!(matches!(
            overlay.upstream.commands().last(),
            Some(PathCommand::Close)
        ));
    }

    #[test]
    fn separated_bands_get_two_separators_between_them() {
        let bands = [
            FrequencyBand::new(0, 99, Direction::Downstream),
            FrequencyBand::new(150, 199, Direction::Downstream),
        ];
        let overlay = BandOverlay::build(&bands, 518, &layout());
        assert_eq!(overlay.downstream.subpath_count(), 2);
        assert_eq!(overlay.separators.subpath_count(), 4);
    }

    #[test]
    fn edges_near_the_index_limit_still_merge() {
        let bands = [
            FrequencyBand::new(0, usize::MAX - 1, Direction::Downstream),
            FrequencyBand::new(usize::MAX, usize::MAX, Direction::Upstream),
        ];
        let overlay = BandOverlay::build(&bands, usize::MAX, &layout());
        assert_eq!(overlay.separators.subpath_count(), 3);
        assert!(overlay.separators.is_finite());
    }
}
