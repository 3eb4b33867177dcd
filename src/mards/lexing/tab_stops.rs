//! Adaptive indentation stops
//!
//! Non-strict parsing does not assume a fixed indent width. Instead the
//! scanner keeps an ordered stack of the leading-whitespace widths it has
//! seen, one per nesting level, and resolves each new width against it:
//! an exact match reuses that level, a width deeper than everything seen
//! opens a new level, and a width between two stops re-bases the enclosing
//! level ("slide to the left"). Stops deeper than the resolved level are
//! dropped, since they cannot be returned to once a shallower line appears.

/// Ordered stack of seen leading-whitespace widths, one per indent level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStops {
    widths: Vec<usize>,
}

impl TabStops {
    /// A fresh stack with the root level at width 0
    pub fn new() -> Self {
        TabStops { widths: vec![0] }
    }

    /// Map a raw leading-whitespace width onto an indent level, mutating
    /// the recorded stops as described in the module docs
    pub fn resolve(&mut self, width: usize) -> usize {
        let mut indent = 0;
        let mut matched = false;
        let mut exhausted = true;
        for (spot, &w) in self.widths.iter().enumerate() {
            indent = spot;
            if width < w {
                exhausted = false;
                break;
            } else if width == w {
                matched = true;
                exhausted = false;
                break;
            }
        }
        if exhausted {
            // deeper than every recorded stop: open a new level
            self.widths.push(width);
            indent += 1;
            matched = true;
        }
        if !matched {
            self.widths[indent] = width;
        }
        self.widths.truncate(indent + 1);
        indent
    }
}

impl Default for TabStops {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_widths_reuse_levels() {
        let mut tabs = TabStops::new();
        let widths = [0, 2, 2, 4, 2, 0];
        let levels: Vec<usize> = widths.iter().map(|&w| tabs.resolve(w)).collect();
        assert_eq!(levels, vec![0, 1, 1, 2, 1, 0]);
    }

    #[test]
    fn test_new_deepest_width_opens_level() {
        let mut tabs = TabStops::new();
        assert_eq!(tabs.resolve(0), 0);
        assert_eq!(tabs.resolve(4), 1);
        assert_eq!(tabs.resolve(8), 2);
    }

    #[test]
    fn test_intermediate_width_rebases_level() {
        let mut tabs = TabStops::new();
        tabs.resolve(0);
        tabs.resolve(2);
        tabs.resolve(4);
        // 3 lands between the stops for levels 1 and 2: level 2 re-bases to 3
        assert_eq!(tabs.resolve(3), 2);
        // and the re-based stop now matches exactly
        assert_eq!(tabs.resolve(3), 2);
    }

    #[test]
    fn test_shallower_line_truncates_deeper_stops() {
        let mut tabs = TabStops::new();
        tabs.resolve(0);
        tabs.resolve(4);
        tabs.resolve(8);
        assert_eq!(tabs.resolve(0), 0);
        // the old depth-2 stop is gone; 8 is now simply one level deep
        assert_eq!(tabs.resolve(8), 1);
    }
}
