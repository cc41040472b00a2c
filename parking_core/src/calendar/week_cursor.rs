use crate::calendar::{CalendarDataset, Week};

/// Query parameter carrying the week index across a save/cancel round trip.
pub const WEEK_PARAM: &str = "week";

/// Index into the week sequence, always within `[0, count - 1]` (0 when
/// there are no weeks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeekCursor {
    index: usize,
    count: usize,
}

impl WeekCursor {
    pub fn new(count: usize, index: i64) -> Self {
        let last = count.saturating_sub(1) as i64;
        Self { index: index.clamp(0, last) as usize, count }
    }

    /// Restores the cursor from the raw `week` parameter. Anything that does
    /// not start with an integer means week 0.
    pub fn from_query(value: Option<&str>, count: usize) -> Self {
        Self::new(count, value.map(parse_leading_int).unwrap_or(0))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.count
    }

    pub fn previous(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.index += 1;
        }
    }

    /// Re-clamps after the dataset changed size.
    pub fn resize(&mut self, count: usize) {
        *self = Self::new(count, self.index as i64);
    }

    pub fn current<'a, T>(&self, dataset: &'a CalendarDataset<T>) -> Option<&'a Week<T>> {
        dataset.weeks.get(self.index)
    }

    pub fn to_query(&self) -> String {
        format!("{WEEK_PARAM}={}", self.index)
    }
}

/// `"3"` → 3, `" 2abc"` → 2, `"-1"` → -1, `"x"` → 0.
fn parse_leading_int(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_range() {
        assert_eq!(WeekCursor::new(4, 9).index(), 3);
        assert_eq!(WeekCursor::new(4, -2).index(), 0);
        assert_eq!(WeekCursor::new(0, 5).index(), 0);
    }

    #[test]
    fn restores_from_query_parameter() {
        assert_eq!(WeekCursor::from_query(Some("2"), 4).index(), 2);
        assert_eq!(WeekCursor::from_query(Some("2abc"), 4).index(), 2);
        assert_eq!(WeekCursor::from_query(Some("abc"), 4).index(), 0);
        assert_eq!(WeekCursor::from_query(Some("-1"), 4).index(), 0);
        assert_eq!(WeekCursor::from_query(Some("99"), 4).index(), 3);
        assert_eq!(WeekCursor::from_query(None, 4).index(), 0);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut cursor = WeekCursor::new(2, 0);
        assert!(!cursor.has_previous());
        cursor.previous();
        assert_eq!(cursor.index(), 0);

        cursor.next();
        assert_eq!(cursor.index(), 1);
        assert!(!cursor.has_next());
        cursor.next();
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.to_query(), "week=1");

        cursor.resize(1);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.count(), 1);
    }
}
