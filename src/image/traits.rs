//! Row access shared by the owned rasters and the borrowed 8-bit view.
//!
//! Shapes are `(height, width)`, the order used by scene and submission
//! checks throughout the crate.

pub trait Raster {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Pixels of row `y`, exactly `width()` long.
    fn row(&self, y: usize) -> &[Self::Pixel];

    fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    fn same_shape<R: Raster + ?Sized>(&self, other: &R) -> bool {
        self.shape() == other.shape()
    }

    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { raster: self, y: 0 }
    }

    /// Iterate `(x, y, pixel)` in row-major order.
    fn pixels(&self) -> impl Iterator<Item = (usize, usize, Self::Pixel)> + '_
    where
        Self: Sized,
    {
        self.rows()
            .enumerate()
            .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, &p)| (x, y, p)))
    }
}

pub trait RasterMut: Raster {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];
}

pub struct Rows<'a, R: ?Sized + Raster> {
    raster: &'a R,
    y: usize,
}

impl<'a, R: Raster> Iterator for Rows<'a, R> {
    type Item = &'a [R::Pixel];

    fn next(&mut self) -> Option<Self::Item> {
        if self.y >= self.raster.height() {
            return None;
        }
        let y = self.y;
        self.y += 1;
        Some(self.raster.row(y))
    }
}
