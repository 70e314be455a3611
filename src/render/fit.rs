use crate::foundation::error::{RefcardError, RefcardResult};

/// Upper bound on measurements per fit. The bisection halves its interval every step,
/// so any `i32` box settles well inside this.
pub const MAX_FIT_STEPS: usize = 64;

/// Rendered size of one line of text, rounded to whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: i32,
    /// Ascent of the first line.
    pub height: i32,
}

/// Anything that can measure a line of text in a named font at an integer size.
pub trait TextMeasure {
    fn measure(&mut self, font: &str, size: u32, text: &str) -> RefcardResult<TextExtent>;
}

/// Largest font size (to within one unit) at which `text` fits `target_w` x `target_h`.
///
/// The search starts at `target_h` and bisects between `min_size` and the smallest size
/// known to be too wide. The result always lies in `[min_size, target_h]`; when nothing
/// fits, `min_size` is returned. Text measuring taller than the box is an
/// [`RefcardError::Invariant`] and a box shorter than `min_size` a
/// [`RefcardError::Layout`].
pub fn fit_font_size<M: TextMeasure + ?Sized>(
    measure: &mut M,
    font: &str,
    text: &str,
    target_w: i32,
    target_h: i32,
    min_size: u32,
) -> RefcardResult<u32> {
    let floor = i64::from(min_size);
    if i64::from(target_h) < floor || target_h <= 0 {
        return Err(RefcardError::layout(format!(
            "box height {target_h} is below the minimum font size {min_size}"
        )));
    }

    // Invariant: lo <= size <= hi, and every size above hi is known to be too wide.
    let mut lo = floor;
    let mut hi = i64::from(target_h);
    let mut size = hi;
    for _ in 0..MAX_FIT_STEPS {
        let extent = measure.measure(font, size as u32, text)?;
        if extent.height > target_h {
            return Err(RefcardError::invariant(format!(
                "'{text}' is {}px tall at size {size} but its box is {target_h}px",
                extent.height
            )));
        }

        if extent.width > target_w {
            hi = size - 1;
            let delta = (size - lo) / 2;
            if delta == 0 {
                return Ok(lo as u32);
            }
            size -= delta;
        } else {
            if size >= hi - 1 {
                return Ok(size as u32);
            }
            lo = size;
            let delta = (hi - size) / 2;
            if delta == 0 {
                return Ok(size as u32);
            }
            size += delta;
        }
    }
    Ok(lo as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
