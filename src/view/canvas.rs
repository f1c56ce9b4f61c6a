use std::io::{self, Write};

use crate::{pos, Pos};

pub struct Canvas {
    lines: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl Canvas {
    /// fills the terminal, minus one line kept for the status footer.
    pub fn from_screen() -> io::Result<Self> {
        let (width, height) = termion::terminal_size()?;
        Ok(Self::new(width as usize, height.saturating_sub(1) as usize))
    }

    pub fn new(width: usize, height: usize) -> Self {
        let lines = (0..height).map(|_| vec![' '; width]).collect();
        Self {
            height,
            lines,
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layer(&mut self, f: impl Fn(Pos) -> Option<char>) {
        for (y, line) in self.lines.iter_mut().enumerate() {
            for (x, slot) in line.iter_mut().enumerate() {
                if let Some(char) = f(pos!(x as i32, y as i32)) {
                    *slot = char;
                }
            }
        }
    }

    pub fn line(&self, y: usize) -> String {
        self.lines.get(y).map(|l| l.iter().collect()).unwrap_or_default()
    }

    pub fn display(&self, out: &mut impl Write, footer: &str) -> io::Result<()> {
        let clear = termion::clear::All;
        write!(out, "{clear}")?;
        for index in 0..self.height {
            let goto = termion::cursor::Goto(1, index as u16 + 1);
            write!(out, "{goto}{}", self.line(index))?;
        }
        let goto = termion::cursor::Goto(1, self.height as u16 + 1);
        let footer: String = footer.chars().take(self.width).collect();
        write!(out, "{goto}{footer}")?;
        out.flush()
    }
}

#[test]
fn test_layers() {
    let mut canvas = Canvas::new(4, 2);
    canvas.layer(|_| Some('.'));
    canvas.layer(|p| (p.x == p.y).then_some('#'));
    assert_eq!(canvas.line(0), "#...");
    assert_eq!(canvas.line(1), ".#..");
    assert_eq!(canvas.line(2), "");
}
