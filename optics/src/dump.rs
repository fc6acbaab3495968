use std::{
    fs::File,
    io::{self, BufWriter, Write},
    ops::Deref,
    path::Path,
    rc::Rc,
    sync::Arc,
};

use super::*;

/// Row-major, tab separated text output, meant for external plotting tools.
///
/// Every implementor writes whole lines, so dumps of several objects can
/// simply be concatenated.
pub trait Dump {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Writes the x coordinates of `points` on one line, then their y coordinates on the next.
pub fn write_rows(w: &mut dyn Write, points: impl IntoIterator<Item = Vec2> + Clone) -> io::Result<()> {
    write_row(w, points.clone().into_iter().map(|p| p.x))?;
    write_row(w, points.into_iter().map(|p| p.y))
}

fn write_row(w: &mut dyn Write, values: impl Iterator<Item = Float>) -> io::Result<()> {
    for (i, value) in values.enumerate() {
        if i > 0 {
            w.write_all(b"\t")?;
        }
        write!(w, "{value}")?;
    }
    writeln!(w)
}

/// Dumps `items` into the file at `path`, creating or truncating it.
pub fn save(path: impl AsRef<Path>, items: &(impl Dump + ?Sized)) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    items.dump(&mut w)?;
    w.flush()
}

impl Dump for Ray {
    /// Two lines: the x coordinates of every recorded position, then their y coordinates.
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        write_rows(w, self.positions().iter().copied())
    }
}

impl<T: Dump> Dump for [T] {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        self.iter().try_for_each(|item| item.dump(w))
    }
}

impl<const N: usize, T: Dump> Dump for [T; N] {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        self.as_slice().dump(w)
    }
}

impl<T: Dump> Dump for Vec<T> {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        self.as_slice().dump(w)
    }
}

impl<T: Dump + ?Sized> Dump for Box<T> {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        self.deref().dump(w)
    }
}

impl<T: Dump + ?Sized> Dump for Rc<T> {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        self.deref().dump(w)
    }
}

impl<T: Dump + ?Sized> Dump for Arc<T> {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        self.deref().dump(w)
    }
}

impl<'a, T: Dump + ?Sized> Dump for &'a T {
    fn dump(&self, w: &mut dyn Write) -> io::Result<()> {
        (*self).dump(w)
    }
}
