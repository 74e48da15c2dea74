/// Line buffer with block indentation. Blank lines carry no indentation.
#[derive(Debug, Clone, Default)]
pub struct SourceWriter {
    lines: Vec<String>,
    depth: usize,
    unit: &'static str,
}

impl SourceWriter {
    pub fn new(unit: &'static str) -> Self {
        Self { lines: Vec::new(), depth: 0, unit }
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.unit.repeat(self.depth), text));
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Write `header`, then the body one level deeper. An empty body gets `filler`.
    pub fn block(&mut self, header: impl AsRef<str>, filler: &str, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(header);
        let before = self.lines.len();
        self.depth += 1;
        body(self);
        if self.lines.len() == before {
            self.line(filler);
        }
        self.depth -= 1;
        self
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
