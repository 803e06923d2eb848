use std::io::{self, Write};

use ecotree::tree::Painter;
use serde::Serialize;
use thiserror::Error;
use tinytemplate::TinyTemplate;

/// Errors raised while producing the SVG document
#[derive(Error, Debug)]
pub enum SvgError {
    /// The document could not be written
    #[error("Could not write the SVG document")]
    Io(#[from] io::Error),
    /// The document could not be rendered
    #[error("Could not render the SVG template")]
    Template(#[from] tinytemplate::error::Error),
}

#[derive(Serialize)]
struct Line {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    stroke: i32,
}

#[derive(Serialize)]
struct Text {
    x: i32,
    y: i32,
    size: i32,
    label: String,
}

#[derive(Serialize)]
struct Context<'a> {
    width: i32,
    height: i32,
    lines: &'a [Line],
    texts: &'a [Text],
}

/// Collects drawing calls and writes them as an SVG document when the drawing ends
pub struct SvgPainter<W: Write> {
    writer: W,
    font_width: i32,
    font_height: i32,
    width: i32,
    height: i32,
    lines: Vec<Line>,
    texts: Vec<Text>,
}

impl<W: Write> SvgPainter<W> {
    pub fn new(writer: W, font_width: i32, font_height: i32) -> Self {
        Self {
            writer,
            font_width,
            font_height,
            width: 0,
            height: 0,
            lines: vec![],
            texts: vec![],
        }
    }
}

impl<W: Write> Painter for SvgPainter<W> {
    type Error = SvgError;

    fn font_width(&self) -> i32 {
        self.font_width
    }

    fn font_height(&self) -> i32 {
        self.font_height
    }

    fn start(&mut self, width: i32, height: i32) -> Result<(), Self::Error> {
        self.width = width;
        self.height = height;
        self.lines.clear();
        self.texts.clear();
        Ok(())
    }

    fn draw_string(&mut self, text: &str, x: i32, y: i32) -> Result<(), Self::Error> {
        self.texts.push(Text {
            x,
            y,
            size: self.font_height,
            label: text.to_string(),
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        stroke: i32,
    ) -> Result<(), Self::Error> {
        self.lines.push(Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        });
        Ok(())
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        let ctx = Context {
            width: self.width,
            height: self.height,
            lines: &self.lines,
            texts: &self.texts,
        };

        let mut tt = TinyTemplate::new();
        tt.add_template("svg", SVG)?;
        self.writer.write_all(tt.render("svg", &ctx)?.as_bytes())?;
        self.writer.flush()?;

        Ok(())
    }
}

static SVG : &str =  "\
<?xml version=\"1.0\" standalone=\"no\"?>
<svg viewBox=\"0 0 {width} {height}\" width=\"{width}\" height=\"{height}\" xmlns='http://www.w3.org/2000/svg'>
    <rect fill=\"white\" x=\"0\" y=\"0\" width=\"100%\" height=\"100%\"/>
    {{ for line in lines }}
    <line x1=\"{line.x1}\" y1=\"{line.y1}\" x2=\"{line.x2}\" y2=\"{line.y2}\" stroke=\"black\" stroke-width=\"{line.stroke}\" stroke-linecap=\"square\"/>
    {{ endfor }}
    {{ for text in texts }}
    <text x=\"{text.x}\" y=\"{text.y}\" font-family=\"monospace\" font-size=\"{text.size}px\">{text.label}</text>
    {{ endfor }}
</svg>
";

#[cfg(test)]
mod tests {
    use super::*;
    use ecotree::tree::{PaintMode, Tree};

    #[test]
    fn paint_svg() {
        let mut tree = Tree::from_newick("((A:0.1,B:0.2)AB:0.3,('C<D':0.4,D:0.5):0.6);").unwrap();
        let ab = tree.get_descendant("AB").unwrap();
        tree.get_mut(&ab).unwrap().collapsed = true;

        let mut output = Vec::new();
        let mut painter = SvgPainter::new(&mut output, 6, 10);
        tree.paint_tree(&mut painter, PaintMode::Collapsed).unwrap();

        let svg = String::from_utf8(output).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("viewBox=\"0 0 1118 40\""));
        assert_eq!(svg.matches("<line ").count(), 10);
        assert_eq!(svg.matches("<text ").count(), 3);
        // Labels are escaped
        assert!(svg.contains("C&lt;D"));
    }
}
