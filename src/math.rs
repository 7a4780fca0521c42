use num::Float;

/// Similar to numpy.interp: evaluates the piecewise-linear curve through `coords`
/// (sorted by x) at `x`, holding the end values outside the covered range.
pub(crate) fn interp<F: Float>(x: F, coords: impl IntoIterator<Item = (F, F)>) -> Option<F> {
    let mut iter = coords.into_iter().peekable();
    let (x0, y0) = *iter.peek()?;

    if x <= x0 {
        return Some(y0);
    }

    let mut last = (x0, y0);

    while let Some((x1, y1)) = iter.next() {
        last = (x1, y1);

        let Some(&(x2, y2)) = iter.peek() else {
            break;
        };

        if x1 <= x && x <= x2 {
            if x2 == x1 {
                return Some(y2);
            }

            return Some(y1 + (x - x1) * (y2 - y1) / (x2 - x1));
        }
    }

    Some(last.1)
}
