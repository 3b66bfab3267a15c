use crate::core::Viewport;
use crate::error::{GraphError, GraphResult};
use crate::render::{FillPrimitive, RectPrimitive, ScratchLayer, StrokePrimitive, TextPrimitive};

/// One painting step. Commands are painted in order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect(RectPrimitive),
    Fill(FillPrimitive),
    Stroke(StrokePrimitive),
    Text(TextPrimitive),
    Layer(ScratchLayer),
}

impl DrawCommand {
    pub fn validate(&self) -> GraphResult<()> {
        match self {
            Self::Rect(rect) => rect.validate(),
            Self::Fill(fill) => fill.validate(),
            Self::Stroke(stroke) => stroke.validate(),
            Self::Text(text) => text.validate(),
            Self::Layer(layer) => layer.validate(),
        }
    }
}

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub commands: Vec<DrawCommand>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_command(mut self, command: DrawCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn push_rect(&mut self, rect: RectPrimitive) {
        self.commands.push(DrawCommand::Rect(rect));
    }

    /// Adds a fill unless its path is empty.
    pub fn push_fill(&mut self, fill: FillPrimitive) {
        if !fill.path.is_empty() {
            self.commands.push(DrawCommand::Fill(fill));
        }
    }

    /// Adds a stroke unless its path is empty.
    pub fn push_stroke(&mut self, stroke: StrokePrimitive) {
        if !stroke.path.is_empty() {
            self.commands.push(DrawCommand::Stroke(stroke));
        }
    }

    pub fn push_text(&mut self, text: TextPrimitive) {
        self.commands.push(DrawCommand::Text(text));
    }

    /// Adds a layer unless it has nothing to draw.
    pub fn push_layer(&mut self, layer: ScratchLayer) {
        if layer.strokes.iter().any(|entry| !entry.stroke.path.is_empty()) {
            self.commands.push(DrawCommand::Layer(layer));
        }
    }

    pub fn validate(&self) -> GraphResult<()> {
        if !self.viewport.is_valid() {
            return Err(GraphError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        for command in &self.commands {
            command.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextPrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn fills(&self) -> impl Iterator<Item = &FillPrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Fill(fill) => Some(fill),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = &StrokePrimitive> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Stroke(stroke) => Some(stroke),
            _ => None,
        })
    }

    pub fn layers(&self) -> impl Iterator<Item = &ScratchLayer> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Layer(layer) => Some(layer),
            _ => None,
        })
    }
}
