use std::io::Write;

/// A colour, expressed in RGB, CMYK or grey colour spaces
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Colour {
    /// DeviceRGB colour; r, g, b, range from 0.0 to 1.0
    RGB { r: f32, g: f32, b: f32 },
    /// DeviceCMYK colour; c, m, y, and k range from 0.0 to 1.0
    CMYK { c: f32, m: f32, y: f32, k: f32 },
    /// DeviceGray colour; g ranges from 0.0 to 1.0
    Grey { g: f32 },
}

impl Colour {
    /// Create a new colour in the RGB space. r, g, and b range from 0.0 to 1.0
    pub fn new_rgb(r: f32, g: f32, b: f32) -> Colour {
        Colour::RGB { r, g, b }
    }

    /// Create a new colour in the RGB space from 8-bit components
    pub fn new_rgb_bytes(r: u8, g: u8, b: u8) -> Colour {
        Colour::RGB {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Create a new colour in the Gray space, g ranges from 0.0 to 1.0
    pub fn new_grey(g: f32) -> Colour {
        Colour::Grey { g }
    }

    /// Write the non-stroking (fill) colour operator used for text
    pub(crate) fn write_fill<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match *self {
            Colour::RGB { r, g, b } => writeln!(out, "{r} {g} {b} rg"),
            Colour::CMYK { c, m, y, k } => writeln!(out, "{c} {m} {y} {k} k"),
            Colour::Grey { g } => writeln!(out, "{g} g"),
        }
    }

    /// Write the stroking colour operator used for lines
    pub(crate) fn write_stroke<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        match *self {
            Colour::RGB { r, g, b } => writeln!(out, "{r} {g} {b} RG"),
            Colour::CMYK { c, m, y, k } => writeln!(out, "{c} {m} {y} {k} K"),
            Colour::Grey { g } => writeln!(out, "{g} G"),
        }
    }
}

impl From<(f32, f32, f32)> for Colour {
    fn from((r, g, b): (f32, f32, f32)) -> Self {
        Colour::RGB { r, g, b }
    }
}

impl From<(f32, f32, f32, f32)> for Colour {
    fn from((c, m, y, k): (f32, f32, f32, f32)) -> Self {
        Colour::CMYK { c, m, y, k }
    }
}

/// A list of pre-defined colour constants
pub mod colours {
    use super::*;

    pub const BLACK: Colour = Colour::Grey { g: 0.0 };
    pub const WHITE: Colour = Colour::Grey { g: 1.0 };
    pub const GREY: Colour = Colour::Grey { g: 0.5 };
    pub const RED: Colour = Colour::RGB {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const BLUE: Colour = Colour::RGB {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
}
