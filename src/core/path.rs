//! Vector path geometry in user-space units plus the affine transform that
//! maps it to device pixels.

use std::fmt::Write as _;

/// One path-construction command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Close,
}

const DEFAULT_PRECISION_DIGITS: i32 = 5;

/// Polyline path built from move/line/close commands.
///
/// Coordinates are rounded to a fixed number of decimal digits and line
/// segments that would not move the pen are dropped, so identical input
/// always yields identical commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
    round_factor: f64,
    open: (f64, f64),
    last: (f64, f64),
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Path {
    #[must_use]
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_PRECISION_DIGITS)
    }

    /// Creates a path rounding coordinates to `digits` decimal places.
    #[must_use]
    pub fn with_precision(digits: i32) -> Self {
        Self {
            commands: Vec::new(),
            round_factor: 10f64.powi(digits),
            open: (0.0, 0.0),
            last: (0.0, 0.0),
        }
    }

    fn round(&self, value: f64) -> f64 {
        // `+ 0.0` folds negative zero.
        (value * self.round_factor).round() / self.round_factor + 0.0
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let point = (self.round(x), self.round(y));
        self.commands.push(PathCommand::MoveTo {
            x: point.0,
            y: point.1,
        });
        self.open = point;
        self.last = point;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let point = (self.round(x), self.round(y));
        if point == self.last {
            return;
        }
        self.commands.push(PathCommand::LineTo {
            x: point.0,
            y: point.1,
        });
        self.last = point;
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
        self.last = self.open;
    }

    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Number of subpaths (one per `MoveTo`).
    #[must_use]
    pub fn subpath_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, PathCommand::MoveTo { .. }))
            .count()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(|command| match *command {
            PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => {
                x.is_finite() && y.is_finite()
            }
            PathCommand::Close => true,
        })
    }

    /// Serializes the path as compact SVG path data, picking the shorter of
    /// the absolute and relative form for every command.
    #[must_use]
    pub fn to_svg_data(&self) -> String {
        let mut out = String::new();
        let mut open = (0.0, 0.0);
        let mut last = (0.0, 0.0);

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo { x, y } => {
                    let absolute = svg_command('M', x, y);
                    let relative =
                        svg_command('m', self.round(x - last.0), self.round(y - last.1));
                    out.push_str(if relative.len() < absolute.len() {
                        &relative
                    } else {
                        &absolute
                    });
                    open = (x, y);
                    last = (x, y);
                }
                PathCommand::LineTo { x, y } => {
                    let dx = self.round(x - last.0);
                    let dy = self.round(y - last.1);
                    let segment = if dy == 0.0 {
                        shortest('H', format_coord(x), 'h', format_coord(dx))
                    } else if dx == 0.0 {
                        shortest('V', format_coord(y), 'v', format_coord(dy))
                    } else {
                        let absolute = svg_command('L', x, y);
                        let relative = svg_command('l', dx, dy);
                        if relative.len() < absolute.len() {
                            relative
                        } else {
                            absolute
                        }
                    };
                    out.push_str(&segment);
                    last = (x, y);
                }
                PathCommand::Close => {
                    out.push('z');
                    last = open;
                }
            }
        }

        out
    }
}

fn shortest(absolute: char, absolute_value: String, relative: char, relative_value: String) -> String {
    if absolute_value.len() <= relative_value.len() {
        format!("{absolute}{absolute_value}")
    } else {
        format!("{relative}{relative_value}")
    }
}

fn svg_command(command: char, x: f64, y: f64) -> String {
    let x = format_coord(x);
    let y = format_coord(y);
    if y.starts_with('-') || (y.starts_with('.') && x.contains('.')) {
        format!("{command}{x}{y}")
    } else {
        format!("{command}{x} {y}")
    }
}

/// Shortest decimal form without a leading zero (`0.5` becomes `.5`).
pub(crate) fn format_coord(value: f64) -> String {
    let mut text = String::new();
    let _ = write!(text, "{}", value + 0.0);
    if let Some(rest) = text.strip_prefix("0.") {
        format!(".{rest}")
    } else if let Some(rest) = text.strip_prefix("-0.") {
        format!("-.{rest}")
    } else {
        text
    }
}

/// 2D affine transform `x' = xx*x + xy*y + x0`, `y' = yx*x + yy*y + y0`.
///
/// `translate` and `scale` compose like a canvas context: the most recently
/// applied operation acts on the path first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub xx: f64,
    pub yx: f64,
    pub xy: f64,
    pub yy: f64,
    pub x0: f64,
    pub y0: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            xx: 1.0,
            yx: 0.0,
            xy: 0.0,
            yy: 1.0,
            x0: 0.0,
            y0: 0.0,
        }
    }

    #[must_use]
    pub fn translate(mut self, tx: f64, ty: f64) -> Self {
        self.x0 += self.xx * tx + self.xy * ty;
        self.y0 += self.yx * tx + self.yy * ty;
        self
    }

    #[must_use]
    pub fn scale(mut self, sx: f64, sy: f64) -> Self {
        self.xx *= sx;
        self.yx *= sx;
        self.xy *= sy;
        self.yy *= sy;
        self
    }

    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.xx * x + self.xy * y + self.x0,
            self.yx * x + self.yy * y + self.y0,
        )
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.xx, self.yx, self.xy, self.yy, self.x0, self.y0]
            .iter()
            .all(|value| value.is_finite())
    }

    /// SVG `transform` attribute value.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let parts = [self.xx, self.yx, self.xy, self.yy, self.x0, self.y0].map(format_coord);
        format!("matrix({})", parts.join(" "))
    }
}
