use crate::job::FontSpec;

/// Device pixel coordinate, origin at the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Measured size of a string in the currently selected font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextExtent {
    pub width: i32,
    pub height: i32,
}

impl TextExtent {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Drawing commands issued against a device page, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    SelectFont(FontSpec),
    Text { position: Point, text: String },
}

/// Recorded page content, replayed by spooling backends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintDisplayList {
    pub commands: Vec<DisplayCommand>,
}

impl PrintDisplayList {
    /// Append a command to the display list.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// Text runs paired with the font active when each was drawn.
    pub fn text_runs(&self) -> Vec<(Option<&FontSpec>, Point, &str)> {
        let mut font = None;
        let mut runs = Vec::new();
        for command in &self.commands {
            match command {
                DisplayCommand::SelectFont(spec) => font = Some(spec),
                DisplayCommand::Text { position, text } => {
                    runs.push((font, *position, text.as_str()))
                }
            }
        }
        runs
    }

    /// Lowest pixel row touched by any text run.
    pub fn content_bottom(&self) -> i32 {
        self.text_runs()
            .into_iter()
            .map(|(font, position, _)| position.y + font.map_or(0, |font| font.height_px))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{FontSpec, FontWeight};

    #[test]
    fn text_runs_track_the_active_font() {
        let big = FontSpec::new("Arial", 44, FontWeight::Bold);
        let small = FontSpec::new("Arial", 20, FontWeight::Normal);
        let mut list = PrintDisplayList::default();
        list.push(DisplayCommand::Text {
            position: Point::new(0, 0),
            text: "no font".into(),
        });
        list.push(DisplayCommand::SelectFont(big.clone()));
        list.push(DisplayCommand::Text {
            position: Point::new(20, 40),
            text: "task".into(),
        });
        list.push(DisplayCommand::SelectFont(small.clone()));
        list.push(DisplayCommand::Text {
            position: Point::new(20, 131),
            text: "time".into(),
        });

        let runs = list.text_runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].0, None);
        assert_eq!(runs[1].0, Some(&big));
        assert_eq!(runs[2].0, Some(&small));
        assert_eq!(list.content_bottom(), 151);
    }
}
